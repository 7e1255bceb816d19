//! Special forms
//!
//! A form receives its operands unevaluated. Forms whose value is the value
//! of a trailing expression return that expression as `Step::Continue` so
//! the evaluator loop can take it without growing the stack.

use std::sync::Arc;

use crate::diagnostics::{LispError, Result};

use super::env::Env;
use super::eval::eval;
use super::printer::{render, render_list};
use super::symbol::Symbol;
use super::value::{Closure, Form, FormFn, List, Step, Value, build_list, iter};

const FORMS: &[(&str, FormFn)] = &[
    ("quote", quote),
    ("setq", setq),
    ("progn", progn),
    ("if", if_form),
    ("lambda", lambda),
    ("let", let_form),
    ("defun", defun),
    ("apply", apply),
    ("and", and),
];

/// Bind every special form in `env`
pub fn install(env: &Env) {
    for &(name, func) in FORMS {
        env.define(Symbol::intern(name), Value::Form(Form::Native { name, func }));
    }
}

// ==================== Forms ====================

/// `(quote x)`
fn quote(args: &List, _env: &Env, _depth: usize) -> Result<Step> {
    Ok(Step::Done(unary("quote", args)?))
}

/// `(setq symbol expr)`
fn setq(args: &List, env: &Env, depth: usize) -> Result<Step> {
    let (target, expr) = binary("setq", args)?;
    let symbol = expect_symbol(&target)?;
    let value = eval(&expr, env, depth + 1)?;
    env.assign(symbol, value.clone())?;
    Ok(Step::Done(value))
}

/// `(progn expr...)`: all but the last for effect, the last in tail position
pub(crate) fn progn(body: &List, env: &Env, depth: usize) -> Result<Step> {
    let Some(mut cell) = body.clone() else {
        return Ok(Step::Done(Value::Nil));
    };
    while let Some(next) = cell.cdr() {
        eval(&cell.car(), env, depth + 1)?;
        cell = next;
    }
    Ok(Step::Continue(cell.car(), env.clone()))
}

/// `(if cond then else...)`
fn if_form(args: &List, env: &Env, depth: usize) -> Result<Step> {
    let (cond, then, otherwise) = binary_and_rest("if", args)?;
    if eval(&cond, env, depth + 1)?.is_truthy() {
        Ok(Step::Continue(then, env.clone()))
    } else {
        progn(&otherwise, env, depth)
    }
}

/// `(lambda (params...) body...)`
fn lambda(args: &List, env: &Env, _depth: usize) -> Result<Step> {
    let (params, body) = unary_and_rest("lambda", args)?;
    let closure = make_closure(None, &params, body, env)?;
    Ok(Step::Done(closure))
}

/// `(let (var | (var init)...) body...)`
///
/// Every init is evaluated in the outer environment before any is bound.
fn let_form(args: &List, env: &Env, depth: usize) -> Result<Step> {
    let (vars, body) = unary_and_rest("let", args)?;
    let vars = vars.as_list().ok_or_else(|| malformed("let", "binding list", &vars))?;

    let mut bindings = Vec::new();
    for var in iter(&vars) {
        match &var {
            Value::Symbol(symbol) => bindings.push((*symbol, Value::Nil)),
            Value::Pair(cell) => {
                let (name, init) = binary("let", &Some(cell.clone()))?;
                let symbol = expect_symbol(&name)?;
                bindings.push((symbol, eval(&init, env, depth + 1)?));
            }
            other => return Err(malformed("let", "symbol or (symbol expression)", other)),
        }
    }
    progn(&body, &env.extend(bindings), depth)
}

/// `(defun name (params...) body...)`
fn defun(args: &List, env: &Env, _depth: usize) -> Result<Step> {
    let (name, rest) = unary_and_rest("defun", args)?;
    let symbol = expect_symbol(&name)?;
    let (params, body) = unary_and_rest("defun", &rest)?;
    let closure = make_closure(Some(symbol), &params, body, env)?;
    env.assign(symbol, closure)?;
    Ok(Step::Done(Value::Symbol(symbol)))
}

/// `(apply f list)`
///
/// Calls `f` through the evaluator with every element quoted, so the
/// already-evaluated elements are not evaluated again.
fn apply(args: &List, env: &Env, depth: usize) -> Result<Step> {
    let (func, list) = binary("apply", args)?;
    let func = eval(&func, env, depth + 1)?;
    let list = eval(&list, env, depth + 1)?;
    let list = list
        .as_list()
        .ok_or_else(|| LispError::type_mismatch("list", render(&list)))?;

    let quoted: Vec<Value> = iter(&list)
        .map(|item| Value::list([Value::Symbol(Symbol::QUOTE), item]))
        .collect();
    Ok(Step::Continue(Value::cons(func, build_list(quoted)), env.clone()))
}

/// `(and expr...)`
fn and(args: &List, env: &Env, depth: usize) -> Result<Step> {
    let Some(mut cell) = args.clone() else {
        return Ok(Step::Done(Value::Symbol(Symbol::T)));
    };
    while let Some(next) = cell.cdr() {
        if eval(&cell.car(), env, depth + 1)?.is_nil() {
            return Ok(Step::Done(Value::Nil));
        }
        cell = next;
    }
    Ok(Step::Continue(cell.car(), env.clone()))
}

// ==================== Closures ====================

fn make_closure(name: Option<Symbol>, params: &Value, body: List, env: &Env) -> Result<Value> {
    let list = params
        .as_list()
        .ok_or_else(|| malformed("lambda", "parameter list", params))?;

    let mut fixed = Vec::new();
    let mut rest = None;
    let mut items = iter(&list);
    while let Some(item) = items.next() {
        let symbol = expect_symbol(&item)?;
        if symbol == Symbol::REST {
            let remaining: Vec<Value> = items.by_ref().collect();
            match remaining.as_slice() {
                [param] => rest = Some(expect_symbol(param)?),
                _ => {
                    return Err(malformed(
                        "&rest",
                        "exactly one parameter",
                        &Value::list(remaining),
                    ));
                }
            }
            break;
        }
        fixed.push(symbol);
    }

    Ok(Value::Form(Form::Closure(Arc::new(Closure {
        name,
        params: fixed,
        rest,
        body,
        env: env.clone(),
    }))))
}

/// Bind the arguments, evaluated in the caller's environment, then run the
/// body in a frame on top of the captured environment.
pub(crate) fn call_closure(closure: &Closure, args: &List, env: &Env, depth: usize) -> Result<Step> {
    let mut bindings = Vec::with_capacity(closure.params.len() + 1);
    let mut remaining = args.clone();
    for &param in &closure.params {
        let Some(cell) = remaining else {
            return Err(LispError::MissingArgument {
                param: param.name(),
            });
        };
        bindings.push((param, eval(&cell.car(), env, depth + 1)?));
        remaining = cell.cdr();
    }

    match closure.rest {
        Some(rest) => {
            let values = iter(&remaining)
                .map(|arg| eval(&arg, env, depth + 1))
                .collect::<Result<Vec<_>>>()?;
            bindings.push((rest, Value::list(values)));
        }
        None if remaining.is_some() => {
            return Err(LispError::UnusedArguments {
                rest: render_list(&remaining),
            });
        }
        None => {}
    }

    progn(&closure.body, &closure.env.extend(bindings), depth)
}

// ==================== Shapes ====================

fn malformed(form: &str, expected: &str, given: &Value) -> LispError {
    LispError::MalformedForm {
        form: form.to_string(),
        expected: expected.to_string(),
        given: render(given),
    }
}

fn shape_error(form: &str, expected: &str, args: &List) -> LispError {
    LispError::MalformedForm {
        form: form.to_string(),
        expected: expected.to_string(),
        given: render_list(args),
    }
}

fn expect_symbol(value: &Value) -> Result<Symbol> {
    value
        .as_symbol()
        .ok_or_else(|| LispError::type_mismatch("symbol", render(value)))
}

/// Exactly one operand
fn unary(form: &str, args: &List) -> Result<Value> {
    match args {
        Some(cell) if cell.cdr().is_none() => Ok(cell.car()),
        _ => Err(shape_error(form, "1 argument", args)),
    }
}

/// At least one operand; returns the first and the rest
fn unary_and_rest(form: &str, args: &List) -> Result<(Value, List)> {
    match args {
        Some(cell) => Ok((cell.car(), cell.cdr())),
        None => Err(shape_error(form, "1+ arguments", args)),
    }
}

/// Exactly two operands
fn binary(form: &str, args: &List) -> Result<(Value, Value)> {
    if let Some(first) = args {
        if let Some(second) = first.cdr() {
            if second.cdr().is_none() {
                return Ok((first.car(), second.car()));
            }
        }
    }
    Err(shape_error(form, "2 arguments", args))
}

/// At least two operands; returns the first two and the rest
fn binary_and_rest(form: &str, args: &List) -> Result<(Value, Value, List)> {
    if let Some(first) = args {
        if let Some(second) = first.cdr() {
            return Ok((first.car(), second.car(), second.cdr()));
        }
    }
    Err(shape_error(form, "2+ arguments", args))
}
