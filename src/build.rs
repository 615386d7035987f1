//! Project build orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_project()
//!     │
//!     ├── prepare_output() ──► clear (when clean) and create output
//!     │
//!     ├── pages, one after another ──► BuildGraph::build_page()
//!     │
//!     ├── copy_runtime() ──► only once every page succeeded
//!     │
//!     └── log_build_result()
//! ```

use crate::{
    compiler::{
        BuildContext, BuildGraph, CommandCompiler, CommandTransformer, ComponentCompiler,
        RenameImports, Resolver, ScriptTransformer, copy_runtime,
    },
    config::ProjectConfig,
    log,
};
use anyhow::{Context, Result, anyhow};
use std::{fs, path::Path};

/// Fallback dependency folder name when the configured root has none
const DEFAULT_MODULES_DIR: &str = "node_modules";

/// Build every page and copy the runtime library.
///
/// If `config.build.clean` is true, clears the entire output directory first.
pub fn build_project(config: &ProjectConfig) -> Result<()> {
    let ctx = BuildContext::from_config(config);
    let resolver = resolver_for(config, &ctx);

    let compiler =
        CommandCompiler::new(config.build.compiler.command.clone(), config.get_root());
    let transformer: Box<dyn ScriptTransformer> = if config.build.transform.command.is_empty() {
        Box::new(RenameImports::new(resolver.clone(), ctx.clone()))
    } else {
        Box::new(CommandTransformer::new(
            config.build.transform.command.clone(),
            config.get_root(),
        ))
    };

    build_with(config, &ctx, &resolver, &compiler, transformer.as_ref())
}

fn resolver_for(config: &ProjectConfig, ctx: &BuildContext) -> Resolver {
    let modules_dir = match ctx.modules_dir_name() {
        "" => DEFAULT_MODULES_DIR,
        name => name,
    };
    Resolver::new(config.build.extensions.clone(), modules_dir)
}

/// Run the build with the given compiler and transform.
fn build_with(
    config: &ProjectConfig,
    ctx: &BuildContext,
    resolver: &Resolver,
    compiler: &dyn ComponentCompiler,
    transformer: &dyn ScriptTransformer,
) -> Result<()> {
    prepare_output(&ctx.dest_root, config.build.clean)?;

    let pages = config.pages();
    if pages.is_empty() {
        log!("warn"; "no pages configured or found under {}", ctx.src_root.display());
    }

    let graph = BuildGraph::new(ctx, resolver, compiler, transformer)
        .disable_copy_npm(config.build.transform.disable_copy_npm);
    let runtime = &config.build.runtime;

    for page in &pages {
        graph.build_page(page).map_err(|e| {
            log!("error"; "page `{}`: {:#}", page, anyhow::Error::from(e));
            anyhow!("Build failed")
        })?;
    }

    if runtime.enable {
        copy_runtime(resolver, config.get_root(), ctx, &runtime.module, &runtime.name).map_err(
            |e| {
                log!("error"; "runtime: {:#}", anyhow::Error::from(e));
                anyhow!("Build failed")
            },
        )?;
    }

    log_build_result(&ctx.dest_root)
}

/// Ensure the output directory exists, clearing it first when `clean` is set.
fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output).with_context(|| {
            format!("Failed to clear output directory: {}", output.display())
        })?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Log build result based on output directory contents
fn log_build_result(output: &Path) -> Result<()> {
    let file_count = fs::read_dir(output)?.filter_map(Result::ok).count();

    if file_count == 0 {
        log!("warn"; "output is empty, check the configured pages");
    } else {
        log!("build"; "done");
    }

    Ok(())
}
