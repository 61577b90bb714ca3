//! Logging infrastructure for the jsoncgen CLI.
//!
//! Logs go to stderr so that a document written to stdout stays clean.
//!
//! # Example
//!
//! ```rust,no_run
//! use jsoncgen_cli::logger::init_logger;
//! use tracing::{debug, info};
//!
//! init_logger(false, false, false);
//!
//! info!("Generating");
//! debug!("Loaded package: {}", "example.com/app");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "jsoncgen=debug,jsoncgen_syntax=debug,jsoncgen_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "jsoncgen=warn,jsoncgen_syntax=warn,jsoncgen_cli=info";

/// Initialize the tracing subscriber with the specified options.
///
/// The logging level is determined in this order:
/// 1. `--verbose` flag: DEBUG for jsoncgen crates
/// 2. `--quiet` flag: errors only
/// 3. `RUST_LOG` environment variable
/// 4. Default: warnings from the library, INFO from the CLI
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    // A second initialization (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_build() {
        assert!(filter_for(true, false).to_string().contains("jsoncgen=debug"));
        assert!(filter_for(false, true).to_string().contains("error"));
    }
}
