//! Built-in import renamer for plain scripts.
//!
//! Package imports are pointed at their relocated copy under `<dist>/npm/`,
//! relative to where the script itself is written:
//!
//! ```text
//! <dist>/utils.js:            import { x } from 'rax'
//!                          →  import { x } from './npm/rax/lib/index.js'
//! <dist>/pages/Home/a.js:     require('@ali/env')
//!                          →  require('../../npm/_ali/env/index.js')
//! ```
//!
//! Relative imports keep their text: local files and files inside one package
//! keep their relative layout in the destination tree.

use super::BuildContext;
use super::error::BuildResult;
use super::imports::find_imports;
use super::paths::{destination_path, relative_specifier};
use super::resolve::{Resolver, is_path_specifier};
use super::unit::{ScriptTransformer, TransformOutput, TransformRequest};
use std::path::Path;

/// Rewrites bare package specifiers to relative paths into `npm/`.
#[derive(Debug, Clone)]
pub struct RenameImports {
    resolver: Resolver,
    ctx: BuildContext,
}

impl RenameImports {
    pub fn new(resolver: Resolver, ctx: BuildContext) -> Self {
        Self { resolver, ctx }
    }

    /// Replacement for one specifier, or `None` to keep it.
    fn rename(
        &self,
        specifier: &str,
        resource_dir: &Path,
        dist_dir: &Path,
    ) -> BuildResult<Option<String>> {
        if is_path_specifier(specifier) {
            return Ok(None);
        }
        let resolved = self.resolver.resolve(resource_dir, specifier)?;
        let target = destination_path(&resolved, &self.ctx)?;
        Ok(Some(relative_specifier(dist_dir, &target)))
    }
}

impl ScriptTransformer for RenameImports {
    fn transform(&self, request: &TransformRequest<'_>) -> BuildResult<TransformOutput> {
        let source = request.source_text;
        if request.disable_copy_npm {
            return Ok(TransformOutput {
                code: source.to_owned(),
            });
        }

        let resource_dir = request.resource_path.parent().unwrap_or(Path::new("/"));
        let dist_dir = request.dist_source_path.parent().unwrap_or(request.output_path);

        let mut code = String::with_capacity(source.len());
        let mut last = 0;
        for import in find_imports(source, request.resource_path)? {
            if let Some(renamed) = self.rename(&import.specifier, resource_dir, dist_dir)? {
                code.push_str(&source[last..import.span.start]);
                code.push_str(&renamed);
                last = import.span.end;
            }
        }
        code.push_str(&source[last..]);

        Ok(TransformOutput { code })
    }
}
