//! Build-graph compilation for mini-program output.
//!
//! This module owns the walk from each page to everything it imports:
//!
//! - **resolve**: Node-style module resolution
//! - **classify**: Component / plain script / asset decision
//! - **walker**: Depth-first build of one page
//! - **emit**: Writing compiled parts to disk
//! - **paths**: Source to destination mapping, including `npm/` relocation
//! - **command** / **rename**: External compiler and import-rewrite transforms
//! - **runtime**: Runtime support library copy
//!
//! # Build Flow
//!
//! ```text
//! page ──► ComponentCompiler ──► emit ──► imported ──► classify
//!                                                         │
//!                  ┌──────────────────┬───────────────────┤
//!                  ▼                  ▼                   ▼
//!             Component         ScriptTransformer       copy
//! ```

pub mod classify;
pub mod command;
pub mod emit;
pub mod error;
pub mod imports;
pub mod paths;
pub mod rename;
pub mod resolve;
pub mod runtime;
pub mod unit;
pub mod walker;

pub use command::{CommandCompiler, CommandTransformer};
pub use rename::RenameImports;
pub use resolve::Resolver;
pub use runtime::copy_runtime;
pub use unit::{ComponentCompiler, ScriptTransformer};
pub use walker::BuildGraph;

use crate::config::{Platform, ProjectConfig};
use serde::Serialize;
use std::path::PathBuf;

/// What a build task produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Page,
    Component,
    Script,
    Asset,
}

impl TaskKind {
    /// Name sent to the compiler and used as the log prefix
    pub const fn name(self) -> &'static str {
        match self {
            Self::Page => "page",
            Self::Component => "component",
            Self::Script => "script",
            Self::Asset => "asset",
        }
    }
}

/// One unit of work discovered during the walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTask {
    pub kind: TaskKind,
    pub source_root: PathBuf,
    /// Absolute, resolved path of the resource
    pub resource_path: PathBuf,
    pub dest_root: PathBuf,
}

impl BuildTask {
    pub fn new(kind: TaskKind, resource_path: PathBuf, ctx: &BuildContext) -> Self {
        Self {
            kind,
            source_root: ctx.src_root.clone(),
            resource_path,
            dest_root: ctx.dest_root.clone(),
        }
    }
}

/// Roots and platform shared by every task of a build.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub src_root: PathBuf,
    pub dest_root: PathBuf,
    /// Dependency root (`node_modules`)
    pub modules_root: PathBuf,
    pub platform: Platform,
}

impl BuildContext {
    pub fn from_config(config: &ProjectConfig) -> Self {
        Self {
            src_root: config.build.src.clone(),
            dest_root: config.build.output.clone(),
            modules_root: config.build.modules.clone(),
            platform: config.platform(),
        }
    }

    /// Folder name of the dependency root, escaped to `npm` in destinations.
    pub fn modules_dir_name(&self) -> &str {
        self.modules_root
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}
