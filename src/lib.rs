//! ratlisp: a small Lisp over an exact numeric tower
//!
//! Numbers move transparently between 32-bit integers, floats and
//! arbitrary-precision rationals:
//!
//! ```text
//! > (/ 7 2)
//! (/ 7 2) => 7/2 /*=3.5*/
//! > (* 65536 65536)
//! (* 65536 65536) => 4294967296
//! ```
//!
//! # Architecture
//!
//! ```text
//! Source → Lexer → Reader → Value → Evaluator (trampoline) → Value
//!                                      ↑
//!                          Env chain, special forms, builtins, arith
//! ```
//!
//! # Example
//!
//! ```
//! let interp = ratlisp::Interpreter::new()?;
//! let value = interp.eval_str("(defun sq (x) (* x x)) (sq 1/3)")?;
//! assert_eq!(ratlisp::render(&value), "1/9");
//! # Ok::<(), ratlisp::LispError>(())
//! ```

pub mod arith;
pub mod config;
pub mod diagnostics;
pub mod interp;
pub mod lexer;
pub mod parser;
pub mod repl;

// Re-export diagnostics for convenience
pub use diagnostics::{LispError, Result, SourceFile};

// Re-exports for convenience
pub use arith::Number;
pub use config::Config;
pub use interp::{Env, Interpreter, MAX_EVAL_DEPTH, Symbol, Value, evaluate, global_env, render};

/// Interpreter version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Read and evaluate `source` in a fresh interpreter with the prelude
pub fn interpret(source: &str) -> Result<Value> {
    Interpreter::new()?.eval_str(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_interpret() {
        let value = interpret("(length '(a b c))").unwrap();
        assert_eq!(render(&value), "3");
    }
}
