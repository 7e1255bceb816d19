//! Tree-walking interpreter
//!
//! Evaluates s-expressions directly against a chain of environments.

pub mod builtins;
pub mod env;
pub mod eval;
pub mod forms;
pub mod printer;
pub mod symbol;
pub mod value;

pub use env::Env;
pub use eval::{MAX_EVAL_DEPTH, evaluate};
pub use printer::{PrintOptions, render, render_with};
pub use symbol::{Symbol, symbol_count};
pub use value::{Arity, Builtin, Cell, Closure, Form, List, Step, Value};

use tracing::debug;

use crate::diagnostics::Result;
use crate::parser::Reader;

/// Lisp definitions evaluated by [`Interpreter::new`]
pub const PRELUDE: &str = include_str!("prelude.lisp");

/// A fresh global environment with every special form and builtin bound
pub fn global_env() -> Env {
    let env = Env::new_global();
    env.define(Symbol::T, Value::Symbol(Symbol::T));
    forms::install(&env);
    builtins::install(&env);
    env
}

/// Interpreter with its own global environment
pub struct Interpreter {
    env: Env,
}

impl Interpreter {
    /// Create an interpreter with the prelude loaded
    pub fn new() -> Result<Self> {
        let interp = Self::bare();
        interp.eval_str(PRELUDE)?;
        debug!(
            bindings = interp.env.global_names().len(),
            "prelude loaded"
        );
        Ok(interp)
    }

    /// Create an interpreter with only the native forms and builtins
    pub fn bare() -> Self {
        Interpreter { env: global_env() }
    }

    pub fn eval(&self, expr: &Value) -> Result<Value> {
        evaluate(expr, &self.env)
    }

    /// Read and evaluate every expression in `source`, returning the last value
    pub fn eval_str(&self, source: &str) -> Result<Value> {
        let mut reader = Reader::new("<input>", source);
        let mut last = Value::Nil;
        while let Some(expr) = reader.read()? {
            last = self.eval(&expr)?;
        }
        Ok(last)
    }

    pub fn global_env(&self) -> &Env {
        &self.env
    }
}
