//! Errors with source locations.
//!
//! [`SpannedError`] pairs a message with the [`Span`] of the offending text.
//! The lexer reports stray characters this way, and callers can turn the
//! span into a line/column pair when they still have the source at hand.

use crate::span::Span;
use std::fmt;

/// An error annotated with where in the source it happened.
#[derive(Debug, Clone)]
pub struct SpannedError {
    /// Human-readable description.
    pub message: String,
    /// Location of the offending text.
    pub span: Span,
}

impl SpannedError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }

    /// Renders the error with a 1-based line/column position.
    pub fn display_with_source(&self, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        format!("{} at line {}, column {}", self.message, line, col)
    }
}

impl fmt::Display for SpannedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for SpannedError {}

/// Alias for `std::result::Result<T, SpannedError>`.
pub type Result<T> = std::result::Result<T, SpannedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_message_and_span() {
        let err = SpannedError::new("unexpected character '@'", Span::new(4, 5));
        let shown = err.to_string();
        assert!(shown.contains("unexpected character"));
        assert!(shown.contains("4..5"));
    }

    #[test]
    fn display_with_source_reports_line_and_column() {
        let source = "n = 2;\ne @ f;";
        let err = SpannedError::new("unexpected character '@'", Span::new(9, 10));
        let shown = err.display_with_source(source);
        assert!(shown.contains("line 2"));
        assert!(shown.contains("column 3"));
    }
}
