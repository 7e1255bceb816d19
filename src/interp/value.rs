//! Runtime values for the interpreter

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::arith::Number;
use crate::diagnostics::Result;

use super::env::Env;
use super::printer;
use super::symbol::Symbol;

/// A proper list: `None` is the empty list
pub type List = Option<Arc<Cell>>;

/// Runtime value
#[derive(Clone)]
pub enum Value {
    /// The empty list `()`, also false
    Nil,
    /// Cons cell
    Pair(Arc<Cell>),
    Symbol(Symbol),
    Number(Number),
    /// Immutable string
    Str(Arc<str>),
    /// Special form: receives its operands unevaluated
    Form(Form),
    /// Ordinary function: receives evaluated arguments
    Builtin(Builtin),
}

/// A mutable cons cell
///
/// The tail is always a list, never an arbitrary value.
pub struct Cell {
    car: Mutex<Value>,
    cdr: Mutex<List>,
}

impl Cell {
    pub fn new(car: Value, cdr: List) -> Arc<Cell> {
        Arc::new(Cell {
            car: Mutex::new(car),
            cdr: Mutex::new(cdr),
        })
    }

    pub fn car(&self) -> Value {
        self.car.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn cdr(&self) -> List {
        self.cdr.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_car(&self, value: Value) {
        *self.car.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub fn set_cdr(&self, list: List) {
        *self.cdr.lock().unwrap_or_else(PoisonError::into_inner) = list;
    }
}

impl Drop for Cell {
    // Unlink nested cells through a worklist so neither long lists nor
    // deeply nested ones overflow the stack.
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.take_links(&mut pending);
        while let Some(cell) = pending.pop() {
            if let Ok(mut cell) = Arc::try_unwrap(cell) {
                cell.take_links(&mut pending);
            }
        }
    }
}

impl Cell {
    /// Move the cells this one owns into `pending`, leaving it empty
    fn take_links(&mut self, pending: &mut Vec<Arc<Cell>>) {
        let cdr = self.cdr.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(next) = cdr.take() {
            pending.push(next);
        }
        let car = self.car.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Value::Pair(inner) = std::mem::replace(car, Value::Nil) {
            pending.push(inner);
        }
    }
}

/// What a special form hands back to the evaluator
pub enum Step {
    /// Final value
    Done(Value),
    /// Evaluate this expression in this environment next
    Continue(Value, Env),
}

/// Native special form. The `usize` is the current evaluation depth.
pub type FormFn = fn(&List, &Env, usize) -> Result<Step>;

/// Special form
#[derive(Clone)]
pub enum Form {
    Native { name: &'static str, func: FormFn },
    Closure(Arc<Closure>),
}

/// User function created by `lambda` or `defun`
pub struct Closure {
    /// Set by `defun`, for printing
    pub name: Option<Symbol>,
    pub params: Vec<Symbol>,
    /// Parameter following `&rest`
    pub rest: Option<Symbol>,
    pub body: List,
    /// Environment captured at creation
    pub env: Env,
}

/// Number of arguments a builtin accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Between(usize, usize),
    Any,
}

impl Arity {
    pub fn accepts(self, given: usize) -> bool {
        match self {
            Arity::Exactly(n) => given == n,
            Arity::AtLeast(n) => given >= n,
            Arity::Between(lo, hi) => (lo..=hi).contains(&given),
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(n) => write!(f, "{}+", n),
            Arity::Between(lo, hi) => write!(f, "{}..{}", lo, hi),
            Arity::Any => write!(f, "0+"),
        }
    }
}

pub type BuiltinFn = fn(&[Value]) -> Result<Value>;

/// Ordinary function implemented in Rust
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl Value {
    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Pair(_) => "pair",
            Value::Symbol(_) => "symbol",
            Value::Number(n) => n.type_name(),
            Value::Str(_) => "string",
            Value::Form(_) => "special form",
            Value::Builtin(_) => "function",
        }
    }

    pub fn symbol(name: &str) -> Value {
        Value::Symbol(Symbol::intern(name))
    }

    pub fn string(text: &str) -> Value {
        Value::Str(Arc::from(text))
    }

    pub fn cons(car: Value, cdr: List) -> Value {
        Value::Pair(Cell::new(car, cdr))
    }

    /// `t` for true, `()` for false
    pub fn from_bool(b: bool) -> Value {
        if b { Value::Symbol(Symbol::T) } else { Value::Nil }
    }

    pub fn from_list(list: List) -> Value {
        match list {
            Some(cell) => Value::Pair(cell),
            None => Value::Nil,
        }
    }

    /// Build a proper list from the items, in order
    pub fn list(items: impl IntoIterator<Item = Value, IntoIter: DoubleEndedIterator>) -> Value {
        Value::from_list(build_list(items))
    }

    /// Everything except `()` is true
    pub fn is_truthy(&self) -> bool {
        !self.is_nil()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// View as a list: `Some(None)` for `()`, `None` for a non-list
    pub fn as_list(&self) -> Option<List> {
        match self {
            Value::Nil => Some(None),
            Value::Pair(cell) => Some(Some(cell.clone())),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            _ => None,
        }
    }

    /// Identity as tested by `eq`
    ///
    /// Cells and callables compare by address; numbers by variant and
    /// value; strings by content.
    pub fn is_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Pair(a), Value::Pair(b)) => Arc::ptr_eq(a, b),
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Form(Form::Closure(a)), Value::Form(Form::Closure(b))) => Arc::ptr_eq(a, b),
            (Value::Form(Form::Native { func: a, .. }), Value::Form(Form::Native { func: b, .. })) => {
                std::ptr::fn_addr_eq(*a, *b)
            }
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            _ => false,
        }
    }
}

/// Build a proper list back to front
pub fn build_list(items: impl IntoIterator<Item = Value, IntoIter: DoubleEndedIterator>) -> List {
    items
        .into_iter()
        .rev()
        .fold(None, |tail, item| Some(Cell::new(item, tail)))
}

/// Iterator over the elements of a list
pub struct ListIter {
    next: List,
}

impl Iterator for ListIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        let cell = self.next.take()?;
        self.next = cell.cdr();
        Some(cell.car())
    }
}

/// Iterate the elements of a list, reading each cell as it is reached
pub fn iter(list: &List) -> ListIter {
    ListIter { next: list.clone() }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(Number::Float(x))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::render(self))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&printer::render(self))
    }
}
