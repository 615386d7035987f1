//! Errors raised while loading and checking `raxmini.toml`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file `{}`", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("invalid config file `{}`", .0.display())]
    Toml(PathBuf, #[source] toml::de::Error),

    /// An external command named in the config is not on `PATH`.
    #[error("{field}: `{command}` not found. Please install it first.")]
    CommandNotFound {
        field: String,
        command: String,
        #[source]
        source: which::Error,
    },

    #[error("invalid config: {0}")]
    Validation(String),
}
