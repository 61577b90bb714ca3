//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Generate(e) => {
            if e.is_fatal() {
                tracing::error!(kind = ?e.kind(), "declaration cannot be rendered");
            }
            Report::new(e)
        }
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        _ => miette::miette!("{}", err),
    }
}
