//! # pcolsim-language
//!
//! The textual input language of the simulator: lexer, recursive-descent
//! parser and wildcard expander.
//!
//! ## Pipeline
//!
//! ```text
//! source text ──▶ Lexer ──▶ Vec<Token> ──▶ Parser ──▶ Pcolony / Pswarm
//!                                                          │
//!                                            (optional) expand_colony
//! ```
//!
//! The one-stop entry point is [`parse_source`]:
//!
//! ```
//! use pcolsim_base::Interner;
//! use pcolsim_language::{parse_source, ParsedSystem};
//!
//! let mut interner = Interner::new();
//! let system = parse_source(
//!     "c = ( n = 1, env = (e), B = (ag), ag = ( { a }, < a -> a > ) );",
//!     &mut interner,
//! ).unwrap();
//! assert!(matches!(system, ParsedSystem::Colony(_)));
//! ```

pub mod error;
pub mod expand;
pub mod lexer;
pub mod parser;
pub mod style;
pub mod token;

pub use error::{ParseError, ParseErrorKind};
pub use expand::expand_colony;
pub use lexer::Lexer;
pub use parser::{ParsedSystem, Parser};
pub use style::Style;
pub use token::{Token, TokenKind};

use pcolsim_base::{Interner, SpannedError};

/// Failure to turn source text into a system: either the lexer or the
/// parser rejected it.
#[derive(Debug, Clone)]
pub enum LoadError {
    Lex(SpannedError),
    Parse(ParseError),
}

impl LoadError {
    /// Renders the error against the source it came from, with line
    /// context where available.
    pub fn display_with_source(&self, source: &str) -> String {
        match self {
            LoadError::Lex(err) => err.display_with_source(source),
            LoadError::Parse(err) => err.display_with_source(source),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Lex(err) => write!(f, "{}", err),
            LoadError::Parse(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<SpannedError> for LoadError {
    fn from(err: SpannedError) -> Self {
        LoadError::Lex(err)
    }
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        LoadError::Parse(err)
    }
}

/// Lexes and parses a complete colony or swarm description.
pub fn parse_source(source: &str, interner: &mut Interner) -> Result<ParsedSystem, LoadError> {
    let tokens = Lexer::new(source).tokenize(interner)?;
    Ok(Parser::new(tokens, interner).parse()?)
}
