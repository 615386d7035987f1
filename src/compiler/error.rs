//! Build error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while walking a page's dependency graph.
///
/// None of these are caught by the walker: the first one aborts the build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Cannot find module `{specifier}` from `{}`", base.display())]
    ModuleNotFound { specifier: String, base: PathBuf },

    #[error("Failed to compile `{}`: {message}", path.display())]
    Compile { path: PathBuf, message: String },

    #[error("IO error on `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("`{}` is outside both the source and dependency roots", .0.display())]
    OutsideRoots(PathBuf),
}

impl BuildError {
    pub fn compile(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Compile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Closure for `map_err` that tags an IO error with its path.
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |err| Self::Io(path, err)
    }
}

pub type BuildResult<T> = Result<T, BuildError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Error, ErrorKind};

    #[test]
    fn test_module_not_found_display() {
        let err = BuildError::ModuleNotFound {
            specifier: "../../missing".into(),
            base: PathBuf::from("/app/src/pages/Home"),
        };
        let display = err.to_string();
        assert!(display.contains("`../../missing`"));
        assert!(display.contains("/app/src/pages/Home"));
    }

    #[test]
    fn test_compile_display() {
        let err = BuildError::compile("/app/src/pages/Home/index.jsx", "unexpected token");
        assert_eq!(
            err.to_string(),
            "Failed to compile `/app/src/pages/Home/index.jsx`: unexpected token"
        );
    }

    #[test]
    fn test_io_helper_keeps_source() {
        let err = BuildError::io("/app/dist/index.js")(Error::new(
            ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(err.to_string().contains("/app/dist/index.js"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
