//! Parse errors with source rendering.

use pcolsim_base::Span;
use std::fmt;

use crate::style::Style;
use crate::token::TokenKind;

#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ParseErrorKind {
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
    },
    ExpectedIdentifier {
        found: TokenKind,
    },
    ExpectedNumber {
        found: TokenKind,
    },
    ExpectedRuleOperator {
        found: TokenKind,
    },
    /// An agent block for a name that was not declared in `B`.
    UnknownAgent {
        name: String,
    },
    /// A colony block for a name that was not declared in `C`.
    UnknownColony {
        name: String,
    },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "expected {}, found {}", expected.describe(), found.describe())
            }
            ParseErrorKind::ExpectedIdentifier { found } => {
                write!(f, "expected an identifier, found {}", found.describe())
            }
            ParseErrorKind::ExpectedNumber { found } => {
                write!(f, "expected a number, found {}", found.describe())
            }
            ParseErrorKind::ExpectedRuleOperator { found } => {
                write!(
                    f,
                    "expected a rule operator (->, <->, <=>, <I=> or <=O>), found {}",
                    found.describe()
                )
            }
            ParseErrorKind::UnknownAgent { name } => {
                write!(f, "agent '{}' is not declared in B", name)
            }
            ParseErrorKind::UnknownColony { name } => {
                write!(f, "colony '{}' is not declared in C", name)
            }
        }
    }
}

impl ParseError {
    /// Renders the error with the offending source line and a caret
    /// underline:
    ///
    /// ```text
    /// error: expected ',', found ';'
    ///
    ///    3 | env = (a; b),
    ///      |         ^
    /// ```
    pub fn display_with_source(&self, source: &str) -> String {
        let (line_num, line_start, line_content) = self.find_context(source);
        let col = self.span.start.saturating_sub(line_start);
        let len = self.span.len().max(1);
        let underline = format!("{}{}", " ".repeat(col), "^".repeat(len));

        format!(
            "{}: {}\n\n{} {} {}\n     {} {}",
            Style::bold_red("error"),
            self.kind,
            Style::blue(&format!("{:4}", line_num)),
            Style::blue("|"),
            line_content,
            Style::blue("|"),
            Style::red(&underline),
        )
    }

    fn find_context<'a>(&self, source: &'a str) -> (usize, usize, &'a str) {
        let mut line_num = 1;
        let mut line_start = 0;
        for (i, c) in source.char_indices() {
            if i >= self.span.start {
                break;
            }
            if c == '\n' {
                line_num += 1;
                line_start = i + 1;
            }
        }
        let line_end = source[line_start..]
            .find('\n')
            .map(|off| line_start + off)
            .unwrap_or(source.len());
        (line_num, line_start, &source[line_start..line_end])
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.kind, self.span.start, self.span.end)
    }
}

impl std::error::Error for ParseError {}
