//! Rendering values as Lisp text
//!
//! Cells are mutable, so lists may share structure or loop back on
//! themselves. The printer tracks the cells it is currently inside and gives
//! each revisit a small budget before cutting the list short with `...`.

use std::collections::HashSet;
use std::sync::Arc;

use crate::arith::{self, Number};

use super::eval::{STACK_GROW_SIZE, STACK_RED_ZONE};
use super::symbol::Symbol;
use super::value::{Cell, Form, List, Value};

/// Default number of times a list may be re-entered before printing `...`
pub const MAX_PRINT_RECUR: i32 = 4;

/// Lists nested deeper than this print as `...`
pub const MAX_PRINT_NESTING: usize = 1_000;

/// Printer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Revisit budget for cyclic structure
    pub max_recur: i32,
    /// Follow non-integral rationals with their float value, `7/2 /*=3.5*/`
    pub annotate_rationals: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            max_recur: MAX_PRINT_RECUR,
            annotate_rationals: false,
        }
    }
}

/// Render with the default options
pub fn render(value: &Value) -> String {
    render_with(value, PrintOptions::default())
}

pub fn render_with(value: &Value, options: PrintOptions) -> String {
    let mut printer = Printer {
        options,
        printed: HashSet::new(),
        out: String::new(),
    };
    printer.value(value, options.max_recur, 0);
    printer.out
}

/// Render a list as if it were a value, `()` when empty
pub fn render_list(list: &List) -> String {
    render(&Value::from_list(list.clone()))
}

struct Printer {
    options: PrintOptions,
    /// Cells of the lists currently being printed, by address
    printed: HashSet<*const Cell>,
    out: String,
}

impl Printer {
    fn value(&mut self, value: &Value, budget: i32, nesting: usize) {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.value_inner(value, budget, nesting)
        })
    }

    fn value_inner(&mut self, value: &Value, budget: i32, nesting: usize) {
        match value {
            Value::Nil => self.out.push_str("()"),
            Value::Pair(_) if nesting >= MAX_PRINT_NESTING => self.out.push_str("..."),
            Value::Pair(cell) => match self.quoted_datum(cell) {
                Some((tail, quoted)) => {
                    // Both cells count as visited so a cycle through the
                    // quoted datum falls back to the budgeted list walk.
                    self.printed.insert(Arc::as_ptr(cell));
                    self.printed.insert(Arc::as_ptr(&tail));
                    self.out.push('\'');
                    self.value(&quoted, budget, nesting + 1);
                    self.printed.remove(&Arc::as_ptr(cell));
                    self.printed.remove(&Arc::as_ptr(&tail));
                }
                None => {
                    self.out.push('(');
                    self.list(cell, budget, nesting + 1);
                    self.out.push(')');
                }
            },
            Value::Symbol(symbol) => symbol.with_name(|name| self.out.push_str(name)),
            Value::Number(n) => self.number(n),
            Value::Str(s) => self.out.push_str(&format!("{:?}", &**s)),
            Value::Form(Form::Native { name, .. }) => {
                self.out.push_str(&format!("#<special {}>", name));
            }
            Value::Form(Form::Closure(closure)) => match closure.name {
                Some(name) => self.out.push_str(&format!("#<lambda {}>", name)),
                None => self.out.push_str("#<lambda>"),
            },
            Value::Builtin(builtin) => {
                self.out.push_str(&format!("#<function {}>", builtin.name));
            }
        }
    }

    fn list(&mut self, head: &Arc<Cell>, mut budget: i32, nesting: usize) {
        let mut next = Some(head.clone());
        let mut first = true;
        while let Some(cell) = next {
            if !first {
                self.out.push(' ');
            }
            first = false;

            if self.printed.contains(&Arc::as_ptr(&cell)) {
                budget -= 1;
                if budget < 0 {
                    self.out.push_str("...");
                    return;
                }
            } else {
                self.printed.insert(Arc::as_ptr(&cell));
                budget = self.options.max_recur;
            }
            self.value(&cell.car(), budget, nesting);
            next = cell.cdr();
        }

        // Reached the end, so the list is acyclic and may print again in full.
        let mut next = Some(head.clone());
        while let Some(cell) = next {
            self.printed.remove(&Arc::as_ptr(&cell));
            next = cell.cdr();
        }
    }

    /// `(quote x)` yields its tail cell and `x`, unless either cell is
    /// already being printed
    fn quoted_datum(&self, cell: &Arc<Cell>) -> Option<(Arc<Cell>, Value)> {
        if cell.car().as_symbol() != Some(Symbol::QUOTE)
            || self.printed.contains(&Arc::as_ptr(cell))
        {
            return None;
        }
        let rest = cell.cdr()?;
        if rest.cdr().is_some() || self.printed.contains(&Arc::as_ptr(&rest)) {
            return None;
        }
        let quoted = rest.car();
        Some((rest, quoted))
    }

    fn number(&mut self, n: &Number) {
        let text = n.to_string();
        self.out.push_str(&text);
        if !self.options.annotate_rationals {
            return;
        }
        let Number::Rational(r) = n else {
            return;
        };
        if r.is_integer() {
            return;
        }
        let Ok(x) = n.to_f64() else {
            return;
        };
        let approx = arith::format_general(x, 21);
        if approx == text {
            return;
        }
        let exact = arith::parse_decimal(&approx).is_some_and(|back| &back == r);
        let mark = if exact { '=' } else { '~' };
        self.out.push_str(&format!(" /*{mark}{approx}*/"));
    }
}
