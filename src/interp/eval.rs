//! Trampolined evaluator
//!
//! Special forms return either a final value or the next expression and
//! environment to evaluate. The loop below picks up the latter without a
//! recursive call, so tail positions of `if`, `progn`, `and`, `let` and
//! closure bodies run in constant stack.
//!
//! Every other evaluation (operators, operands, conditions) recurses and
//! counts toward [`MAX_EVAL_DEPTH`]. The recursion grows its own stack, so
//! the limit is reached on any thread rather than overflowing it.

use tracing::trace;

use crate::diagnostics::{LispError, Result};

use super::env::Env;
use super::forms;
use super::printer::render;
use super::value::{Builtin, Form, List, Step, Value, iter};

/// Deepest non-tail nesting before evaluation fails with `RecursionLimit`
pub const MAX_EVAL_DEPTH: usize = 10_000;

/// Remaining stack below which a recursive walk moves to a fresh segment
pub(crate) const STACK_RED_ZONE: usize = 128 * 1024;
/// Size of each segment allocated by that growth
pub(crate) const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

/// Evaluate an expression in an environment
pub fn evaluate(expr: &Value, env: &Env) -> Result<Value> {
    eval(expr, env, 0)
}

pub(crate) fn eval(expr: &Value, env: &Env, depth: usize) -> Result<Value> {
    if depth > MAX_EVAL_DEPTH {
        return Err(LispError::RecursionLimit {
            limit: MAX_EVAL_DEPTH,
        });
    }
    stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || eval_loop(expr, env, depth))
}

fn eval_loop(expr: &Value, env: &Env, depth: usize) -> Result<Value> {
    let mut expr = expr.clone();
    let mut env = env.clone();
    loop {
        let (operator, operands) = match &expr {
            Value::Pair(cell) => (cell.car(), cell.cdr()),
            Value::Symbol(symbol) => return env.lookup(*symbol),
            other => return Ok(other.clone()),
        };

        match eval(&operator, &env, depth + 1)? {
            Value::Form(form) => match call_form(&form, &operands, &env, depth)? {
                Step::Done(value) => return Ok(value),
                Step::Continue(next, next_env) => {
                    expr = next;
                    env = next_env;
                }
            },
            Value::Builtin(builtin) => {
                let args = iter(&operands)
                    .map(|arg| eval(&arg, &env, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                return call_builtin(&builtin, &args);
            }
            _ => {
                return Err(LispError::NotAFunction {
                    expr: render(&operator),
                });
            }
        }
    }
}

fn call_form(form: &Form, operands: &List, env: &Env, depth: usize) -> Result<Step> {
    match form {
        Form::Native { name, func } => {
            trace!(form = *name, "special form");
            func(operands, env, depth)
        }
        Form::Closure(closure) => {
            trace!(name = ?closure.name, "closure call");
            forms::call_closure(closure, operands, env, depth)
        }
    }
}

/// Check the declared arity, then call
pub fn call_builtin(builtin: &Builtin, args: &[Value]) -> Result<Value> {
    if !builtin.arity.accepts(args.len()) {
        return Err(LispError::ArityMismatch {
            callee: builtin.name.to_string(),
            expected: builtin.arity.to_string(),
            given: args.len(),
        });
    }
    (builtin.func)(args)
}
