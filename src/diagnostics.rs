//! Diagnostic reporting with source locations
//!
//! Every failure of the reader, the evaluator and the driver is a
//! [`LispError`]. Reader errors carry a miette source span; evaluation errors
//! carry the rendered offending expression instead.

use crate::arith::ArithError;
use crate::lexer::Span;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::sync::Arc;
use thiserror::Error;

/// Source text for error reporting
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Arc<str>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Arc::from(content.into()),
        }
    }

    pub fn to_named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.content.to_string())
    }
}

/// Convert our Span to miette's SourceSpan
impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::new(span.start.into(), span.len())
    }
}

pub type Result<T> = std::result::Result<T, LispError>;

/// Interpreter diagnostic
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum LispError {
    // === Reader Errors ===
    #[error("incomplete input")]
    #[diagnostic(
        code(read::incomplete),
        help("a list, quote or string is still open at the end of input")
    )]
    Incomplete,

    #[error("{message}")]
    #[diagnostic(code(read::malformed))]
    Malformed {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    // === Environment Errors ===
    #[error("unbound symbol: {name}")]
    #[diagnostic(code(eval::unbound_symbol))]
    UnboundSymbol { name: String },

    #[error("global symbol created locally: {name}")]
    #[diagnostic(
        code(eval::illegal_global_creation),
        help("bind `{name}` with `let` or define it at top level first")
    )]
    IllegalGlobalCreation { name: String },

    // === Application Errors ===
    #[error("not function: {expr}")]
    #[diagnostic(code(eval::not_a_function))]
    NotAFunction { expr: String },

    #[error("{callee}: arity {expected}; given {given}")]
    #[diagnostic(code(eval::arity_mismatch))]
    ArityMismatch {
        callee: String,
        expected: String,
        given: usize,
    },

    #[error("missing argument for: {param}")]
    #[diagnostic(code(eval::arity_mismatch))]
    MissingArgument { param: String },

    #[error("unused rest: {rest}")]
    #[diagnostic(code(eval::arity_mismatch))]
    UnusedArguments { rest: String },

    #[error("{form}: expected {expected}; given {given}")]
    #[diagnostic(code(eval::malformed_form))]
    MalformedForm {
        form: String,
        expected: String,
        given: String,
    },

    #[error("{expected} expected: {found}")]
    #[diagnostic(code(eval::type_mismatch))]
    TypeMismatch { expected: String, found: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Arithmetic(#[from] ArithError),

    #[error("evaluation nested deeper than {limit} levels")]
    #[diagnostic(
        code(eval::recursion_limit),
        help("rewrite the recursion so the recursive call is in tail position")
    )]
    RecursionLimit { limit: usize },

    // === Driver Errors ===
    #[error("cannot read {path}: {message}")]
    #[diagnostic(code(driver::io))]
    Io { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(code(driver::config))]
    Config { message: String },
}

impl LispError {
    pub fn malformed(message: impl Into<String>, source: &SourceFile, span: Span) -> Self {
        LispError::Malformed {
            message: message.into(),
            src: source.to_named_source(),
            span: span.into(),
        }
    }

    pub fn type_mismatch(expected: &str, found: impl ToString) -> Self {
        LispError::TypeMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, LispError::Incomplete)
    }
}
