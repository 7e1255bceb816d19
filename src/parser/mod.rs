//! Reader for s-expressions
//!
//! Turns a token stream into values, one top-level expression at a time.
//! Input that simply stops too early is `Incomplete`, so a line-oriented
//! driver can ask for more; anything else wrong is `Malformed`.

use tracing::debug;

use crate::arith::Number;
use crate::diagnostics::{LispError, Result, SourceFile};
use crate::interp::eval::{STACK_GROW_SIZE, STACK_RED_ZONE};
use crate::interp::{Symbol, Value};
use crate::lexer::{Span, Token, TokenKind, lex};

/// Deepest nesting of lists and quotes the reader accepts
pub const MAX_READ_DEPTH: usize = 10_000;

/// Read every top-level expression in `source`
pub fn read_all(source: &str) -> Result<Vec<Value>> {
    let mut reader = Reader::new("<input>", source);
    let mut exprs = Vec::new();
    while let Some(expr) = reader.read()? {
        exprs.push(expr);
    }
    debug!(count = exprs.len(), "read expressions");
    Ok(exprs)
}

/// Reader state
pub struct Reader {
    tokens: Vec<Token>,
    pos: usize,
    source: SourceFile,
}

impl Reader {
    pub fn new(name: &str, source: &str) -> Self {
        Reader {
            tokens: lex(source),
            pos: 0,
            source: SourceFile::new(name, source),
        }
    }

    /// Read the next expression, `None` at end of input
    pub fn read(&mut self) -> Result<Option<Value>> {
        if self.at(TokenKind::Eof) {
            return Ok(None);
        }
        self.datum(0).map(Some)
    }

    // ==================== Token Helpers ====================

    fn current(&self) -> &Token {
        // `lex` always ends the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> TokenKind {
        self.current().kind
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn malformed(&self, message: impl Into<String>, span: Span) -> LispError {
        LispError::malformed(message, &self.source, span)
    }

    // ==================== Data ====================

    fn datum(&mut self, depth: usize) -> Result<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.datum_at(depth))
    }

    fn datum_at(&mut self, depth: usize) -> Result<Value> {
        let token = self.advance();
        let nests = matches!(token.kind, TokenKind::LParen | TokenKind::Quote);
        if nests && depth >= MAX_READ_DEPTH {
            return Err(self.malformed(
                format!("nesting deeper than {MAX_READ_DEPTH} levels"),
                token.span,
            ));
        }
        match token.kind {
            TokenKind::LParen => self.list_body(depth + 1),
            TokenKind::RParen => Err(self.malformed("unexpected `)`", token.span)),
            TokenKind::Quote => {
                let quoted = self.datum(depth + 1)?;
                Ok(Value::list([Value::Symbol(Symbol::QUOTE), quoted]))
            }
            TokenKind::Str => self.string(&token),
            TokenKind::Atom => Ok(atom(&token.text)),
            TokenKind::UnterminatedStr | TokenKind::Eof => Err(LispError::Incomplete),
            TokenKind::Invalid => Err(self.malformed("unrecognized input", token.span)),
        }
    }

    /// Elements up to the matching `)`; the `(` is already consumed
    fn list_body(&mut self, depth: usize) -> Result<Value> {
        let mut items = Vec::new();
        loop {
            match self.peek() {
                TokenKind::RParen => {
                    self.advance();
                    return Ok(Value::list(items));
                }
                TokenKind::Eof => return Err(LispError::Incomplete),
                _ => items.push(self.datum(depth)?),
            }
        }
    }

    fn string(&self, token: &Token) -> Result<Value> {
        let body = &token.text[1..token.text.len() - 1];
        let mut text = String::with_capacity(body.len());
        let mut chars = body.char_indices();
        while let Some((_, c)) = chars.next() {
            if c != '\\' {
                text.push(c);
                continue;
            }
            let Some((at, escaped)) = chars.next() else {
                return Err(self.malformed("dangling `\\` in string", token.span));
            };
            text.push(match escaped {
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                '0' => '\0',
                '\\' | '"' | '\'' => escaped,
                other => {
                    // +1 for the opening quote, -1 for the backslash
                    let start = token.span.start + at;
                    let span = Span::new(start, start + 1 + other.len_utf8());
                    return Err(self.malformed(format!("invalid escape `\\{other}`"), span));
                }
            });
        }
        Ok(Value::Str(text.into()))
    }
}

/// `nil` is the empty list; numbers take priority over symbols
fn atom(text: &str) -> Value {
    if text == "nil" {
        return Value::Nil;
    }
    match Number::parse(text) {
        Some(n) => Value::Number(n),
        None => Value::symbol(text),
    }
}
