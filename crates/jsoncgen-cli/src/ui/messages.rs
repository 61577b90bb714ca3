//! Status message functions for terminal output.

use console::style;

/// Print a success message to stderr.
pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold().for_stderr(), message);
}

/// Print a warning message to stderr.
pub fn warning(message: &str) {
    eprintln!(
        "{} {}",
        style("⚠").yellow().bold().for_stderr(),
        style(message).yellow().for_stderr()
    );
}
