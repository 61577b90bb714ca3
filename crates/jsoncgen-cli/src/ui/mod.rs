//! Terminal status messages.
//!
//! Messages go to stderr; stdout is reserved for the generated document.
//!
//! # Examples
//!
//! ```no_run
//! use jsoncgen_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Wrote config.jsonc");
//! ```

mod messages;

pub use messages::{success, warning};

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr() && console::Term::stderr().features().colors_supported()
}

/// Initialize color support for styled messages.
pub fn init_colors(no_color: bool) {
    console::set_colors_enabled_stderr(!no_color && should_use_color());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_no_color_wins_over_force_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        unsafe {
            std::env::remove_var("NO_COLOR");
        }
        assert!(should_use_color());
        unsafe {
            std::env::remove_var("FORCE_COLOR");
        }
    }
}
