//! Runtime support library copy.

use super::BuildContext;
use super::emit::copy_file_with_dir_check;
use super::error::BuildResult;
use super::paths::{NPM_DIR, escape_npm_path};
use super::resolve::Resolver;
use crate::log;
use std::path::{Path, PathBuf};

/// Resolve `module` from `root` and copy it to `<dist>/npm/<name>`.
///
/// Returns the destination path.
pub fn copy_runtime(
    resolver: &Resolver,
    root: &Path,
    ctx: &BuildContext,
    module: &str,
    name: &str,
) -> BuildResult<PathBuf> {
    let source = resolver.resolve(root, module)?;
    let dest = ctx
        .dest_root
        .join(NPM_DIR)
        .join(escape_npm_path(name, ctx.modules_dir_name()));

    log!("runtime"; "{module}");
    copy_file_with_dir_check(&source, &dest)?;
    Ok(dest)
}
