//! jsoncgen CLI - commented JSONC configuration files from Go structs.
//!
//! This crate provides the command-line interface around the `jsoncgen`
//! library.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions
//! - [`config`] - Settings merged from defaults, `jsoncgen.toml`, the
//!   environment and the command line
//! - [`commands`] - The generation command
//! - [`error`] - CLI error types and their conversion to diagnostics
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Status messages on stderr
//!
//! # Example
//!
//! ```rust,no_run
//! use jsoncgen_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, ResultExt};
