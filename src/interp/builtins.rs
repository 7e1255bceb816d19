//! Built-in functions
//!
//! Builtins take their arguments already evaluated. The evaluator checks
//! the declared arity before calling, so each function may index its
//! arguments directly.

use std::cmp::Ordering;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

use crate::arith::{self, Number};
use crate::diagnostics::{LispError, Result};

use super::env::Env;
use super::printer::render;
use super::symbol::Symbol;
use super::value::{Arity, Builtin, Cell, List, Value};

static GENSYM_COUNTER: AtomicUsize = AtomicUsize::new(0);

macro_rules! builtin {
    ($name:literal, $arity:expr, $func:expr) => {
        Builtin {
            name: $name,
            arity: $arity,
            func: $func,
        }
    };
}

pub const BUILTINS: &[Builtin] = &[
    // Lists
    builtin!("car", Arity::Exactly(1), car),
    builtin!("cdr", Arity::Exactly(1), cdr),
    builtin!("cons", Arity::Exactly(2), cons),
    builtin!("list", Arity::Any, list),
    builtin!("listp", Arity::Exactly(1), listp),
    builtin!("eq", Arity::Exactly(2), eq),
    builtin!("rplaca", Arity::Exactly(2), rplaca),
    builtin!("rplacd", Arity::Exactly(2), rplacd),
    // Comparison
    builtin!("=", Arity::Exactly(2), num_eq),
    builtin!("/=", Arity::Exactly(2), num_ne),
    builtin!("<", Arity::Exactly(2), num_lt),
    builtin!("<=", Arity::Exactly(2), num_le),
    builtin!(">", Arity::Exactly(2), num_gt),
    builtin!(">=", Arity::Exactly(2), num_ge),
    // Arithmetic
    builtin!("+", Arity::Any, add),
    builtin!("-", Arity::Any, subtract),
    builtin!("*", Arity::Any, multiply),
    builtin!("/", Arity::AtLeast(2), divide),
    builtin!("float", Arity::Exactly(1), float),
    builtin!("truncate", Arity::Between(1, 2), truncate),
    // Misc
    builtin!("gensym", Arity::Exactly(0), gensym),
    builtin!("print", Arity::Exactly(1), print),
];

/// Bind every builtin in `env`
pub fn install(env: &Env) {
    for builtin in BUILTINS {
        env.define(Symbol::intern(builtin.name), Value::Builtin(*builtin));
    }
}

// ==================== Lists ====================

fn expect_list(value: &Value) -> Result<List> {
    value
        .as_list()
        .ok_or_else(|| LispError::type_mismatch("list", render(value)))
}

fn expect_pair(value: &Value) -> Result<&Arc<Cell>> {
    match value {
        Value::Pair(cell) => Ok(cell),
        other => Err(LispError::type_mismatch("pair", render(other))),
    }
}

fn car(args: &[Value]) -> Result<Value> {
    Ok(match expect_list(&args[0])? {
        Some(cell) => cell.car(),
        None => Value::Nil,
    })
}

fn cdr(args: &[Value]) -> Result<Value> {
    Ok(match expect_list(&args[0])? {
        Some(cell) => Value::from_list(cell.cdr()),
        None => Value::Nil,
    })
}

fn cons(args: &[Value]) -> Result<Value> {
    let tail = expect_list(&args[1])?;
    Ok(Value::cons(args[0].clone(), tail))
}

fn list(args: &[Value]) -> Result<Value> {
    Ok(Value::list(args.iter().cloned()))
}

fn listp(args: &[Value]) -> Result<Value> {
    Ok(Value::from_bool(args[0].as_list().is_some()))
}

fn eq(args: &[Value]) -> Result<Value> {
    Ok(Value::from_bool(args[0].is_eq(&args[1])))
}

fn rplaca(args: &[Value]) -> Result<Value> {
    expect_pair(&args[0])?.set_car(args[1].clone());
    Ok(args[1].clone())
}

fn rplacd(args: &[Value]) -> Result<Value> {
    let cell = expect_pair(&args[0])?;
    cell.set_cdr(expect_list(&args[1])?);
    Ok(args[1].clone())
}

// ==================== Numbers ====================

fn expect_number(value: &Value) -> Result<&Number> {
    value
        .as_number()
        .ok_or_else(|| LispError::type_mismatch("number", render(value)))
}

fn compare_with(args: &[Value], test: fn(Ordering) -> bool) -> Result<Value> {
    let ordering = arith::compare(expect_number(&args[0])?, expect_number(&args[1])?)?;
    Ok(Value::from_bool(test(ordering)))
}

fn num_eq(args: &[Value]) -> Result<Value> {
    compare_with(args, Ordering::is_eq)
}

fn num_ne(args: &[Value]) -> Result<Value> {
    compare_with(args, Ordering::is_ne)
}

fn num_lt(args: &[Value]) -> Result<Value> {
    compare_with(args, Ordering::is_lt)
}

fn num_le(args: &[Value]) -> Result<Value> {
    compare_with(args, Ordering::is_le)
}

fn num_gt(args: &[Value]) -> Result<Value> {
    compare_with(args, Ordering::is_gt)
}

fn num_ge(args: &[Value]) -> Result<Value> {
    compare_with(args, Ordering::is_ge)
}

/// Left fold of `op` starting from `init`
fn fold(
    init: Number,
    args: &[Value],
    op: fn(&Number, &Number) -> arith::ArithResult<Number>,
) -> Result<Value> {
    let mut acc = init;
    for arg in args {
        acc = op(&acc, expect_number(arg)?)?;
    }
    Ok(Value::Number(acc))
}

fn add(args: &[Value]) -> Result<Value> {
    fold(Number::Int(0), args, arith::add)
}

fn multiply(args: &[Value]) -> Result<Value> {
    fold(Number::Int(1), args, arith::multiply)
}

fn subtract(args: &[Value]) -> Result<Value> {
    match args {
        [] => Ok(Value::from(0)),
        [only] => Ok(Value::Number(expect_number(only)?.negate())),
        [first, rest @ ..] => fold(expect_number(first)?.clone(), rest, arith::subtract),
    }
}

fn divide(args: &[Value]) -> Result<Value> {
    fold(expect_number(&args[0])?.clone(), &args[1..], arith::divide)
}

fn float(args: &[Value]) -> Result<Value> {
    Ok(Value::from(expect_number(&args[0])?.to_f64()?))
}

fn truncate(args: &[Value]) -> Result<Value> {
    let n = expect_number(&args[0])?;
    Ok(Value::Number(match args.get(1) {
        Some(divisor) => arith::quotient(n, expect_number(divisor)?)?,
        None => n.truncate(),
    }))
}

// ==================== Misc ====================

fn gensym(_args: &[Value]) -> Result<Value> {
    let n = GENSYM_COUNTER.fetch_add(1, AtomicOrdering::Relaxed) + 1;
    Ok(Value::symbol(&format!("G{:05}", n)))
}

fn print(args: &[Value]) -> Result<Value> {
    println!("{}", render(&args[0]));
    Ok(args[0].clone())
}
