//! Project configuration management for `raxmini.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[build]`     | Roots, pages, compiler/transform, runtime copy   |
//! | `[platform]`  | Target mini-program dialect and file extensions  |
//!
//! # Example
//!
//! ```toml
//! [build]
//! src = "src"
//! output = "dist"
//! pages = ["./pages/Home/index", "./pages/About/index"]
//!
//! [build.compiler]
//! command = ["node", "scripts/jsx-compiler.js"]
//!
//! [platform]
//! type = "bytedance"
//! ```

mod build;
pub mod defaults;
mod error;
mod platform;

pub use platform::Platform;

use build::BuildConfig;
use error::ConfigError;
use platform::PlatformConfig;

use crate::cli::{Cli, Commands};
use crate::compiler::paths::normalize_lexically;
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Directory under `src` searched for pages when none are configured
const PAGES_DIR: &str = "pages";

/// Root configuration structure representing raxmini.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// CLI arguments reference
    #[serde(skip)]
    pub cli: Option<&'static Cli>,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Target platform
    #[serde(default)]
    pub platform: PlatformConfig,
}

impl ProjectConfig {
    /// Parse configuration read from `path`
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: ProjectConfig = toml::from_str(content)
            .map_err(|err| ConfigError::Toml(path.to_path_buf(), err))?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::parse(&content, path)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf());
    }

    /// Resolved platform descriptor
    pub fn platform(&self) -> Platform {
        self.platform.descriptor()
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &'static Cli) {
        self.cli = Some(cli);

        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.src, cli.src.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());
        self.update_path_with_root(&root, &cli.config);

        match &cli.command {
            Commands::Build { clean, page } => {
                if *clean {
                    self.build.clean = true;
                }
                if !page.is_empty() {
                    self.build.pages = page.clone();
                }
            }
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Update all paths relative to root directory and normalize to absolute paths
    fn update_path_with_root(&mut self, root: &Path, config_file: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_file));
        self.build.src = Self::normalize_path(&root.join(&self.build.src));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        // Kept lexical: a symlinked dependency root must stay a prefix of the
        // paths the resolver returns.
        self.build.modules = normalize_lexically(&root.join(&self.build.modules));
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Page specifiers to build, relative to `build.src`.
    ///
    /// Configured pages get a `./` prefix when they lack one so they resolve
    /// as relative paths. Without configured pages, `src/pages` is searched
    /// for `index.<ext>` files.
    pub fn pages(&self) -> Vec<String> {
        if !self.build.pages.is_empty() {
            return self
                .build
                .pages
                .iter()
                .map(|page| normalize_page_specifier(page))
                .collect();
        }
        discover_pages(&self.build.src, &self.build.extensions)
    }

    /// Validate configuration before building
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        Self::check_command_installed("[build.compiler.command]", &self.build.compiler.command)?;

        if !self.build.transform.command.is_empty() {
            Self::check_command_installed(
                "[build.transform.command]",
                &self.build.transform.command,
            )?;
        }

        if self.build.extensions.is_empty() {
            bail!(ConfigError::Validation(
                "[build.extensions] must have at least one element".into()
            ));
        }
        if let Some(ext) = self.build.extensions.iter().find(|e| !e.starts_with('.')) {
            bail!(ConfigError::Validation(format!(
                "[build.extensions] entry `{ext}` must start with `.`"
            )));
        }

        if !self.build.src.is_dir() {
            bail!(ConfigError::Validation(format!(
                "[build.src] not found: {}",
                self.build.src.display()
            )));
        }

        if self.build.output == self.build.src {
            bail!(ConfigError::Validation(
                "[build.output] must differ from [build.src]".into()
            ));
        }

        Ok(())
    }

    /// Check if a command is installed and available
    fn check_command_installed(field: &str, command: &[String]) -> Result<()> {
        let Some(cmd) = command.first() else {
            bail!(ConfigError::Validation(format!(
                "{field} must have at least one element"
            )));
        };

        which::which(cmd).map_err(|source| ConfigError::CommandNotFound {
            field: field.to_owned(),
            command: cmd.clone(),
            source,
        })?;

        Ok(())
    }
}

/// Prefix bare page paths with `./` so they are not resolved as packages.
fn normalize_page_specifier(page: &str) -> String {
    if page.starts_with("./") || page.starts_with("../") || page.starts_with('/') {
        page.to_owned()
    } else {
        format!("./{page}")
    }
}

/// Find `index.<ext>` files under `<src>/pages`, sorted for a stable build order.
fn discover_pages(src: &Path, extensions: &[String]) -> Vec<String> {
    let mut pages: Vec<String> = WalkDir::new(src.join(PAGES_DIR))
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let path = e.path();
            path.file_stem().is_some_and(|stem| stem == "index")
                && path.extension().and_then(|ext| ext.to_str()).is_some_and(|ext| {
                    extensions.iter().any(|e| e.trim_start_matches('.') == ext)
                })
        })
        .filter_map(|e| {
            let rel = e.path().strip_prefix(src).ok()?.with_extension("");
            Some(format!("./{}", rel.to_string_lossy().replace('\\', "/")))
        })
        .collect();
    pages.sort();
    pages.dedup();
    pages
}
