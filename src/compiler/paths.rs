//! Source-to-destination path mapping.
//!
//! Two naming schemes share one destination tree:
//!
//! ```text
//! <src>/components/Logo.jsx              → <dist>/components/Logo.{js,json,ttml,ttss}
//! <src>/utils.js                         → <dist>/utils.js
//! <modules>/@ali/lib/node_modules/x.js   → <dist>/npm/_ali/lib/npm/x.js
//! ```
//!
//! Anything under the dependency root lands in `<dist>/npm/` with `@` turned
//! into `_` and the dependency folder name turned into `npm`.

use super::BuildContext;
use super::error::{BuildError, BuildResult};
use std::{
    ffi::OsString,
    path::{Component, Path, PathBuf},
};

/// Folder under the destination root holding relocated dependency files
pub const NPM_DIR: &str = "npm";

/// Destination paths for every part a compiled component can produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPathSet {
    /// Compiled script (`.js`)
    pub code: PathBuf,
    /// Serialized config (`.json`)
    pub json: PathBuf,
    /// Stylesheet (platform style extension)
    pub css: PathBuf,
    /// Template markup (platform template extension)
    pub template: PathBuf,
    /// Root that compiler-emitted asset names are joined onto
    pub assets_dir: PathBuf,
}

impl OutputPathSet {
    /// Derive output paths for a component or page resource.
    pub fn for_resource(resource: &Path, ctx: &BuildContext) -> BuildResult<Self> {
        let base = remove_ext(&destination_path(resource, ctx)?);
        Ok(Self {
            code: with_suffix(&base, ".js"),
            json: with_suffix(&base, ".json"),
            css: with_suffix(&base, ctx.platform.style_ext()),
            template: with_suffix(&base, ctx.platform.template_ext()),
            assets_dir: ctx.dest_root.clone(),
        })
    }
}

/// Map a resolved resource to its place in the destination tree.
///
/// Dependency-root files are checked first, so a dependency folder nested in
/// the source tree still uses the `npm/` scheme.
pub fn destination_path(resource: &Path, ctx: &BuildContext) -> BuildResult<PathBuf> {
    if let Ok(rel) = resource.strip_prefix(&ctx.modules_root) {
        let rel = rel.to_string_lossy().replace('\\', "/");
        let escaped = escape_npm_path(&rel, ctx.modules_dir_name());
        return Ok(ctx.dest_root.join(NPM_DIR).join(escaped));
    }
    if let Ok(rel) = resource.strip_prefix(&ctx.src_root) {
        return Ok(ctx.dest_root.join(rel));
    }
    Err(BuildError::OutsideRoots(resource.to_path_buf()))
}

/// Escape a dependency-relative path for the `npm/` tree.
///
/// Replaces every `@` with `_` and every occurrence of `modules_name` with `npm`.
pub fn escape_npm_path(rel: &str, modules_name: &str) -> String {
    let escaped = rel.replace('@', "_");
    if modules_name.is_empty() {
        return escaped;
    }
    escaped.replace(modules_name, NPM_DIR)
}

/// Strip the final extension, keeping the directory and stem.
pub fn remove_ext(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Append a suffix (usually `.ext`) to the full path.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_owned();
    s.push(suffix);
    PathBuf::from(s)
}

/// Join `rel` onto `base` and fold `.` and `..` lexically.
///
/// No file system access; symlinks are not followed.
pub fn join_normalized(base: &Path, rel: &str) -> PathBuf {
    normalize_lexically(&base.join(rel))
}

/// Fold `.` and `..` components without touching the file system.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !out.pop() && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Relative module specifier from `from_dir` to `to`, always starting with
/// `./` or `../` and using forward slashes.
pub fn relative_specifier(from_dir: &Path, to: &Path) -> String {
    let from: Vec<_> = from_dir.components().collect();
    let target: Vec<_> = to.components().collect();
    let common = from
        .iter()
        .zip(&target)
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..from.len() {
        parts.push("..".into());
    }
    for component in &target[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    let joined = parts.join("/");
    if joined.starts_with("..") {
        joined
    } else {
        format!("./{joined}")
    }
}
