//! Error handling for the jsoncgen CLI.
//!
//! `CliError` is returned by commands. Generation failures keep their
//! `jsoncgen::GenerateError` so the binary can report them as diagnostics;
//! configuration problems carry a hint on how to fix them.
//!
//! # Example
//!
//! ```rust,no_run
//! use jsoncgen_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_output(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod report;

use std::path::PathBuf;

use jsoncgen::GenerateError;
use thiserror::Error;

pub use report::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration-related errors (file not found, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Extraction or rendering failed
    #[error(transparent)]
    Generate(#[from] GenerateError),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a jsoncgen.toml file or fix the --config path", .0.display())]
    NotFound(PathBuf),

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            match err {
                CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    CliError::FileNotFound(path.as_ref().to_path_buf())
                }
                other => other,
            }
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{err}\n\nHint: {hint}"))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_not_found() {
        let err = ConfigError::NotFound(PathBuf::from("custom.toml"));
        let msg = err.to_string();
        assert!(msg.contains("Config file not found"));
        assert!(msg.contains("custom.toml"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_cli_error_from_generate_error() {
        let err: CliError = GenerateError::StructNotFound {
            name: "Config".to_string(),
            package: "example.com/app".to_string(),
        }
        .into();
        assert!(matches!(err, CliError::Generate(_)));
        assert!(err.to_string().contains("Config"));
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/test/out.jsonc").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_hint() {
        let result: std::result::Result<(), ConfigError> =
            Err(ConfigError::NotFound(PathBuf::from("test.toml")));

        let err = result.with_hint("Try creating the file").unwrap_err();
        assert!(err.to_string().contains("Hint: Try creating the file"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::io::Result<()> = Err(std::io::Error::other("disk full"));

        let err = result.context("Failed to write output").unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to write output: "));
        assert!(msg.contains("disk full"));
    }
}
