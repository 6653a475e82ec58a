//! Small stderr helpers for the binary.

use owo_colors::OwoColorize;

pub(crate) fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Prefix for error lines on stderr.
pub fn error_prefix() -> String {
    styled_error_prefix(use_colors())
}

/// `error:` prefix, bold red when `color` is on.
pub fn styled_error_prefix(color: bool) -> String {
    if color {
        "error:".red().bold().to_string()
    } else {
        "error:".to_string()
    }
}
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_error_prefix() {
        assert_eq!(styled_error_prefix(false), "error:");
        assert!(styled_error_prefix(true).contains("\x1b["));
    }
}
