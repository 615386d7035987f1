//! Module resolution.
//!
//! Follows the Node.js lookup rules closely enough that application imports
//! resolve to the same files a conventional bundler would pick:
//!
//! ```text
//! "./utils"      → <base>/utils, <base>/utils.js, <base>/utils.jsx,
//!                  <base>/utils/package.json#main, <base>/utils/index.js, ...
//! "rax"          → <ancestor>/node_modules/rax (same file/directory rules),
//!                  walking from <base> up to the file system root
//! ```

use super::error::{BuildError, BuildResult};
use super::paths::join_normalized;
use serde::Deserialize;
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

/// Subset of `package.json` consulted during resolution.
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    main: Option<String>,
}

/// Extension-priority module resolver.
#[derive(Debug, Clone)]
pub struct Resolver {
    /// Candidate extensions in priority order, each with a leading dot
    extensions: Vec<String>,
    /// Dependency folder name searched in every ancestor (`node_modules`)
    modules_dir: String,
}

impl Resolver {
    pub fn new(extensions: Vec<String>, modules_dir: impl Into<String>) -> Self {
        Self {
            extensions,
            modules_dir: modules_dir.into(),
        }
    }

    /// Candidate extensions in priority order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve `specifier` as imported from a file in `base_dir`.
    ///
    /// # Errors
    /// `BuildError::ModuleNotFound` when no candidate exists on disk.
    pub fn resolve(&self, base_dir: &Path, specifier: &str) -> BuildResult<PathBuf> {
        let found = if is_path_specifier(specifier) {
            let target = join_normalized(base_dir, specifier);
            self.load_as_file(&target)
                .or_else(|| self.load_as_directory(&target))
        } else {
            self.load_from_modules(base_dir, specifier)
        };

        found.ok_or_else(|| BuildError::ModuleNotFound {
            specifier: specifier.to_owned(),
            base: base_dir.to_path_buf(),
        })
    }

    /// Exact file first, then each extension appended to the full name.
    fn load_as_file(&self, path: &Path) -> Option<PathBuf> {
        if path.is_file() {
            return Some(path.to_path_buf());
        }
        self.extensions.iter().find_map(|ext| {
            let mut candidate: OsString = path.as_os_str().to_owned();
            candidate.push(ext);
            let candidate = PathBuf::from(candidate);
            candidate.is_file().then_some(candidate)
        })
    }

    /// `package.json` `main`, then `index` with each extension.
    fn load_as_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !dir.is_dir() {
            return None;
        }

        if let Some(main) = read_main(&dir.join("package.json")) {
            let main = join_normalized(dir, &main);
            if let Some(found) = self
                .load_as_file(&main)
                .or_else(|| self.load_index(&main))
            {
                return Some(found);
            }
        }

        self.load_index(dir)
    }

    fn load_index(&self, dir: &Path) -> Option<PathBuf> {
        self.extensions.iter().find_map(|ext| {
            let candidate = dir.join(format!("index{ext}"));
            candidate.is_file().then_some(candidate)
        })
    }

    /// Walk `base_dir` and its ancestors looking in each dependency folder.
    fn load_from_modules(&self, base_dir: &Path, specifier: &str) -> Option<PathBuf> {
        base_dir
            .ancestors()
            // `node_modules/node_modules` is never searched
            .filter(|dir| dir.file_name().is_none_or(|name| name != self.modules_dir.as_str()))
            .find_map(|dir| {
                let target = join_normalized(&dir.join(&self.modules_dir), specifier);
                self.load_as_file(&target)
                    .or_else(|| self.load_as_directory(&target))
            })
    }
}

/// Relative or absolute specifiers resolve against the importing directory.
pub fn is_path_specifier(specifier: &str) -> bool {
    specifier == "."
        || specifier == ".."
        || specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
}

/// Read the `main` field, ignoring unreadable or malformed manifests.
fn read_main(manifest: &Path) -> Option<String> {
    let content = fs::read_to_string(manifest).ok()?;
    let manifest: PackageManifest = serde_json::from_str(&content).ok()?;
    manifest.main.filter(|main| !main.is_empty())
}
