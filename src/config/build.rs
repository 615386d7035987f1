//! `[build]` section configuration.
//!
//! Contains build settings: source/output/dependency roots, pages, the
//! external compiler and transform commands, and the runtime library copy.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in raxmini.toml - build pipeline configuration.
///
/// # Example
/// ```toml
/// [build]
/// src = "src"
/// output = "dist"
/// pages = ["./pages/Home/index"]
///
/// [build.compiler]
/// command = ["node", "scripts/jsx-compiler.js"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Application source directory.
    #[serde(default = "defaults::build::src")]
    #[educe(Default = defaults::build::src())]
    pub src: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Shared dependency directory.
    #[serde(default = "defaults::build::modules")]
    #[educe(Default = defaults::build::modules())]
    pub modules: PathBuf,

    /// Page specifiers relative to `src`. Discovered from `src/pages` when empty.
    #[serde(default)]
    pub pages: Vec<String>,

    /// Script extensions in resolution priority order.
    #[serde(default = "defaults::build::extensions")]
    #[educe(Default = defaults::build::extensions())]
    pub extensions: Vec<String>,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,

    /// External JSX compiler.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Import-rewrite transform for plain scripts.
    #[serde(default)]
    pub transform: TransformConfig,

    /// Runtime support library copied once per build.
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// `[build.compiler]` section - the JSX compiler command.
///
/// The command receives a JSON request on stdin and prints the compiled unit
/// as JSON on stdout.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CompilerConfig {
    /// Command and leading arguments.
    #[serde(default = "defaults::build::compiler::command")]
    #[educe(Default = defaults::build::compiler::command())]
    pub command: Vec<String>,
}

/// `[build.transform]` section - import rewriting for plain scripts.
///
/// An empty command selects the built-in renamer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransformConfig {
    #[serde(default)]
    pub command: Vec<String>,

    /// Leave package imports untouched instead of pointing them at `npm/`.
    #[serde(default)]
    pub disable_copy_npm: bool,
}

/// `[build.runtime]` section - runtime support library.
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Module specifier resolved from the project root.
    #[serde(default = "defaults::build::runtime::module")]
    #[educe(Default = defaults::build::runtime::module())]
    pub module: String,

    /// File name under `<output>/npm/`.
    #[serde(default = "defaults::build::runtime::name")]
    #[educe(Default = defaults::build::runtime::name())]
    pub name: String,
}
