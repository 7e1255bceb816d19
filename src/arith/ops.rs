//! Binary operators over every pair of number variants
//!
//! Each operator matches all nine variant pairs explicitly so that adding a
//! variant is a compile error until every operator handles it.

use std::cmp::Ordering;

use num_rational::BigRational;

use super::number::{rational_to_f64, truncate_f64, truncate_rational, widen};
use super::{ArithError, ArithResult, Number};

use Number::{Float, Int, Rational};

/// Ring operators share one shape: exact paths widen and demote, float paths stay float.
macro_rules! ring_op {
    ($(#[$doc:meta])* $name:ident, $op:tt) => {
        $(#[$doc])*
        pub fn $name(a: &Number, b: &Number) -> ArithResult<Number> {
            Ok(match (a, b) {
                (Int(x), Int(y)) => Number::from_i64(i64::from(*x) $op i64::from(*y)),
                (Int(x), Float(y)) => Float(f64::from(*x) $op *y),
                (Int(x), Rational(y)) => Number::from_rational(widen(*x) $op y),
                (Float(x), Int(y)) => Float(*x $op f64::from(*y)),
                (Float(x), Float(y)) => Float(*x $op *y),
                (Float(x), Rational(y)) => Float(*x $op rational_to_f64(y)?),
                (Rational(x), Int(y)) => Number::from_rational(x $op widen(*y)),
                (Rational(x), Float(y)) => Float(rational_to_f64(x)? $op *y),
                (Rational(x), Rational(y)) => Number::from_rational(x $op y),
            })
        }
    };
}

ring_op!(
    /// `a + b`
    add, +
);
ring_op!(
    /// `a - b`
    subtract, -
);
ring_op!(
    /// `a * b`
    multiply, *
);

/// `a / b`, exact when both operands are exact
///
/// `7 / 2` is the rational `7/2`; only an evenly divisible pair gives an `Int`.
pub fn divide(a: &Number, b: &Number) -> ArithResult<Number> {
    Ok(match (a, b) {
        (Int(x), Int(y)) => Number::from_rational(exact_ratio(widen(*x), *y)?),
        (Int(x), Float(y)) => Float(f64::from(*x) / *y),
        (Int(x), Rational(y)) => Number::from_rational(widen(*x) / y),
        (Float(x), Int(y)) => Float(*x / f64::from(*y)),
        (Float(x), Float(y)) => Float(*x / *y),
        (Float(x), Rational(y)) => Float(*x / rational_to_f64(y)?),
        (Rational(x), Int(y)) => Number::from_rational(exact_ratio(x.clone(), *y)?),
        (Rational(x), Float(y)) => Float(rational_to_f64(x)? / *y),
        (Rational(x), Rational(y)) => Number::from_rational(x / y),
    })
}

/// `a / b` truncated toward zero
pub fn quotient(a: &Number, b: &Number) -> ArithResult<Number> {
    Ok(match (a, b) {
        (Int(x), Int(y)) => {
            if *y == 0 {
                return Err(ArithError::DivisionByZero);
            }
            Number::from_i64(i64::from(*x) / i64::from(*y))
        }
        (Int(x), Float(y)) => truncate_f64(f64::from(*x) / *y),
        (Int(x), Rational(y)) => truncate_rational(&(widen(*x) / y)),
        (Float(x), Int(y)) => truncate_f64(*x / f64::from(*y)),
        (Float(x), Float(y)) => truncate_f64(*x / *y),
        (Float(x), Rational(y)) => truncate_f64(*x / rational_to_f64(y)?),
        (Rational(x), Int(y)) => truncate_rational(&exact_ratio(x.clone(), *y)?),
        (Rational(x), Float(y)) => truncate_f64(rational_to_f64(x)? / *y),
        (Rational(x), Rational(y)) => truncate_rational(&(x / y)),
    })
}

/// Three-way comparison; float paths take the sign of the difference
pub fn compare(a: &Number, b: &Number) -> ArithResult<Ordering> {
    Ok(match (a, b) {
        (Int(x), Int(y)) => x.cmp(y),
        (Int(x), Float(y)) => sign(f64::from(*x) - *y),
        (Int(x), Rational(y)) => widen(*x).cmp(y),
        (Float(x), Int(y)) => sign(*x - f64::from(*y)),
        (Float(x), Float(y)) => sign(*x - *y),
        (Float(x), Rational(y)) => sign(*x - rational_to_f64(y)?),
        (Rational(x), Int(y)) => x.cmp(&widen(*y)),
        (Rational(x), Float(y)) => sign(rational_to_f64(x)? - *y),
        (Rational(x), Rational(y)) => x.cmp(y),
    })
}

/// Divide an exact value by an `Int`, rejecting a zero divisor.
/// A `Rational` divisor is never zero since zero always demotes to `Int`.
fn exact_ratio(numer: BigRational, denom: i32) -> ArithResult<BigRational> {
    if denom == 0 {
        return Err(ArithError::DivisionByZero);
    }
    Ok(numer / widen(denom))
}

/// NaN differences count as greater.
fn sign(diff: f64) -> Ordering {
    if diff < 0.0 {
        Ordering::Less
    } else if diff == 0.0 {
        Ordering::Equal
    } else {
        Ordering::Greater
    }
}
