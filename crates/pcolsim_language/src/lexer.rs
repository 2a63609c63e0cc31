//! Lexer for the colony description language.
//!
//! A single-pass byte scanner. Multi-character operators are matched
//! longest-first, so `<I=>` and `<=O>` win over `<=>`, which wins over
//! `<->`, which wins over a bare `<`. A `#` starts a comment that runs to
//! the end of the line. Whitespace separates tokens and is otherwise
//! ignored. Any other character is a lexical error carrying its span.

use pcolsim_base::{Interner, Span, SpannedError};

use crate::token::{Token, TokenKind};

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'*' || b == b'%'
}

pub struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// True if the bytes at the current position start with `literal`.
    fn starts_with(&self, literal: &str) -> bool {
        self.bytes[self.pos..].starts_with(literal.as_bytes())
    }

    /// Tokenizes the whole input, interning identifiers on the way.
    /// The returned stream always ends with an `Eof` token.
    pub fn tokenize(mut self, interner: &mut Interner) -> Result<Vec<Token>, SpannedError> {
        let mut tokens = Vec::new();

        while self.pos < self.bytes.len() {
            let start = self.pos;
            let b = self.bytes[self.pos];

            match b {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.pos += 1;
                }
                b'#' => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                b'=' => tokens.push(self.single(TokenKind::Assign)),
                b';' => tokens.push(self.single(TokenKind::End)),
                b',' => tokens.push(self.single(TokenKind::Comma)),
                b'(' => tokens.push(self.single(TokenKind::LParen)),
                b')' => tokens.push(self.single(TokenKind::RParen)),
                b'{' => tokens.push(self.single(TokenKind::LBrace)),
                b'}' => tokens.push(self.single(TokenKind::RBrace)),
                b'/' => tokens.push(self.single(TokenKind::Check)),
                b'>' => tokens.push(self.single(TokenKind::Gt)),
                b'<' => {
                    // Longest literal first.
                    let kind = if self.starts_with("<I=>") {
                        self.pos += 4;
                        TokenKind::InExteroceptive
                    } else if self.starts_with("<=O>") {
                        self.pos += 4;
                        TokenKind::OutExteroceptive
                    } else if self.starts_with("<=>") {
                        self.pos += 3;
                        TokenKind::Exteroceptive
                    } else if self.starts_with("<->") {
                        self.pos += 3;
                        TokenKind::Communication
                    } else {
                        self.pos += 1;
                        TokenKind::Lt
                    };
                    tokens.push(Token::new(kind, Span::new(start, self.pos)));
                }
                b'-' => {
                    if self.starts_with("->") {
                        self.pos += 2;
                        tokens.push(Token::new(TokenKind::Evolution, Span::new(start, self.pos)));
                    } else {
                        return Err(self.unexpected(start));
                    }
                }
                b'0'..=b'9' => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos].is_ascii_digit() {
                        self.pos += 1;
                    }
                    let span = Span::new(start, self.pos);
                    let value = self.source[start..self.pos].parse().map_err(|_| {
                        SpannedError::new(
                            format!("number '{}' is too large", &self.source[start..self.pos]),
                            span,
                        )
                    })?;
                    tokens.push(Token::new(TokenKind::Number(value), span));
                }
                _ if is_ident_byte(b) => {
                    while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
                        self.pos += 1;
                    }
                    let sym = interner.intern(&self.source[start..self.pos]);
                    tokens.push(Token::new(TokenKind::Ident(sym), Span::new(start, self.pos)));
                }
                _ => return Err(self.unexpected(start)),
            }
        }

        tokens.push(Token::new(TokenKind::Eof, Span::new(self.pos, self.pos)));
        Ok(tokens)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.pos += 1;
        Token::new(kind, Span::new(start, self.pos))
    }

    fn unexpected(&self, start: usize) -> SpannedError {
        // Report the whole character, not just its first byte.
        let ch = self.source[start..].chars().next().unwrap_or('\u{fffd}');
        SpannedError::new(
            format!("unexpected character '{}'", ch),
            Span::new(start, start + ch.len_utf8()),
        )
    }
}
