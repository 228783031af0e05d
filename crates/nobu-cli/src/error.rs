//! Error handling for the nobu CLI.
//!
//! Errors are split the same way the program is:
//! - **Top-level errors** (`CliError`) are what commands return to `main`
//! - **Configuration errors** (`ConfigError`) carry the field and a hint
//! - **Request errors** live in [`crate::dev::error`] and never reach `main`,
//!   they are turned into HTTP responses instead
//!
//! # Example
//!
//! ```rust,no_run
//! use nobu_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn absolute_root(root: &Path) -> Result<std::path::PathBuf> {
//!     std::fs::canonicalize(root).with_path(root)
//! }
//! ```

pub mod report;

use std::path::{Path, PathBuf};
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Failure of a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required file or directory is missing
    #[error("No such file or directory: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File system failure other than a missing path
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Listener could not be bound or the server loop failed
    #[error("Server error: {0}")]
    Server(String),
}

/// Problems with the merged configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `--config` points at a file that doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a nobu.config.json file or drop the --config flag", .0.display())]
    NotFound(PathBuf),

    /// A field holds a value the server can't use
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// camelCase field name as written in nobu.config.json
        field: String,
        /// Offending value
        value: String,
        /// What to use instead
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Context helpers for I/O results on the CLI path.
pub trait ResultExt<T> {
    /// Reports a not-found error as [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<Path>) -> Result<T>;

    /// Reports the error as a [`CliError::Server`] failure of `action`.
    fn while_serving(self, action: impl std::fmt::Display) -> Result<T>;
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => CliError::FileNotFound(path.as_ref().to_path_buf()),
            _ => CliError::Io(err),
        })
    }

    fn while_serving(self, action: impl std::fmt::Display) -> Result<T> {
        self.map_err(|err| CliError::Server(format!("{action}: {err}")))
    }
}
