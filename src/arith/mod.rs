//! The numeric tower
//!
//! Numbers range over three representations: 32-bit integers, IEEE doubles
//! and exact arbitrary-precision rationals. Integer arithmetic runs in 64
//! bits so that overflow promotes to a rational instead of wrapping, and any
//! exact result that fits back into 32 bits is demoted again.
//!
//! ```text
//! Int ⊕ Int        -> Int, or Rational on overflow
//! Int ⊕ Rational   -> Rational, demoted to Int when integral and in range
//! Float ⊕ anything -> Float
//! ```

mod format;
mod literal;
mod number;
mod ops;

pub use format::{format_float, format_general};
pub use literal::parse_decimal;
pub use number::Number;
pub use ops::{add, compare, divide, multiply, quotient, subtract};

use miette::Diagnostic;
use thiserror::Error;

/// Failures of the numeric tower
#[derive(Error, Debug, Diagnostic, Clone, PartialEq, Eq)]
pub enum ArithError {
    #[error("division by zero")]
    #[diagnostic(code(arith::division_by_zero))]
    DivisionByZero,

    #[error("{value} is out of the float range")]
    #[diagnostic(
        code(arith::float_overflow),
        help("keep the computation exact, or scale the value before converting")
    )]
    FloatOverflow { value: String },
}

pub type ArithResult<T> = Result<T, ArithError>;
