//! Token definitions for the reader

use super::Span;
use logos::Logos;

/// A token with its kind, span, and text
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Token kinds recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")]
pub enum TokenKind {
    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("'")]
    Quote,

    // Literals
    #[regex(r#""([^"\\]|\\.)*""#)]
    Str,
    #[regex(r#""([^"\\]|\\.)*\\?"#)]
    UnterminatedStr,

    /// Numbers and symbols; the reader tells them apart
    #[regex(r#"[^ \t\r\n\f()';"]+"#)]
    Atom,

    // Special
    /// Input the lexer could not match
    Invalid,
    Eof,
}

impl TokenKind {
    /// Get the string representation of the token
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Quote => "'",
            TokenKind::Str => "string",
            TokenKind::UnterminatedStr => "unterminated string",
            TokenKind::Atom => "atom",
            TokenKind::Invalid => "invalid input",
            TokenKind::Eof => "<eof>",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
