//! The seams to the external JSX compiler and import-rewrite transform.
//!
//! Both collaborators are opaque: the walker hands them a request and
//! consumes what they return. [`CommandCompiler`](super::command::CommandCompiler)
//! and [`CommandTransformer`](super::command::CommandTransformer) speak JSON
//! over stdin/stdout; [`RenameImports`](super::rename::RenameImports) is the
//! built-in transform.

use super::TaskKind;
use super::error::BuildResult;
use crate::config::Platform;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Input to the JSX compiler for one page or component.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileRequest<'a> {
    pub source_text: &'a str,
    pub r#type: TaskKind,
    /// Destination root
    pub output_path: &'a Path,
    /// Source root
    pub source_path: &'a Path,
    pub resource_path: &'a Path,
    pub platform: &'a Platform,
    pub source_file_name: &'a Path,
}

/// Result of compiling one page or component.
///
/// Lives only for the emission and classification of its own resource.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompiledUnit {
    pub code: Option<String>,
    /// Source map; carried but never written
    pub map: Option<Value>,
    pub style: Option<String>,
    pub config: Option<Value>,
    pub template: Option<String>,
    /// Extra files keyed by path relative to the destination root
    pub assets: Map<String, Value>,
    /// Specifier → declaration, in import order
    pub imported: Map<String, Value>,
    /// Tag name → resolved component path prefix
    pub using_components: Map<String, Value>,
}

/// Input to the import-rewrite transform for one plain script.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformRequest<'a> {
    pub source_text: &'a str,
    /// Where the rewritten script will be written
    pub dist_source_path: &'a Path,
    pub resource_path: &'a Path,
    /// Destination root
    pub output_path: &'a Path,
    pub disable_copy_npm: bool,
    pub platform: &'a Platform,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransformOutput {
    pub code: String,
}

/// Compiles a page or component into its mini-program parts.
pub trait ComponentCompiler: Send + Sync {
    fn compile(&self, request: &CompileRequest<'_>) -> BuildResult<CompiledUnit>;
}

/// Rewrites a plain script's import specifiers for its new location.
pub trait ScriptTransformer: Send + Sync {
    fn transform(&self, request: &TransformRequest<'_>) -> BuildResult<TransformOutput>;
}
