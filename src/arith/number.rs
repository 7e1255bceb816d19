//! The number type and conversions between its variants

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::literal::parse_decimal;
use super::{ArithError, ArithResult};

/// Significant digits carried when a rational is rendered for float conversion
const FLOAT_DIGITS: usize = 17;

/// A number of the tower
///
/// `Rational` is always in lowest terms with a positive denominator and never
/// holds a value that fits `Int`. Build numbers through [`Number::from_i64`],
/// [`Number::from_bigint`] and [`Number::from_rational`] to keep that true.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// 32-bit signed integer
    Int(i32),
    /// 64-bit float
    Float(f64),
    /// Exact rational
    Rational(BigRational),
}

impl Number {
    /// Narrow a 64-bit integer to `Int`, or keep it exact as a rational
    pub fn from_i64(n: i64) -> Number {
        match i32::try_from(n) {
            Ok(i) => Number::Int(i),
            Err(_) => Number::Rational(BigRational::from_integer(BigInt::from(n))),
        }
    }

    pub fn from_bigint(n: BigInt) -> Number {
        Number::from_rational(BigRational::from_integer(n))
    }

    /// Demote a rational to `Int` when it is an integer in the 32-bit range
    pub fn from_rational(r: BigRational) -> Number {
        if r.is_integer() {
            if let Some(i) = r.numer().to_i32() {
                return Number::Int(i);
            }
        }
        Number::Rational(r)
    }

    /// Get the type name of this number
    pub fn type_name(&self) -> &'static str {
        match self {
            Number::Int(_) => "integer",
            Number::Float(_) => "float",
            Number::Rational(_) => "rational",
        }
    }

    /// The exact value as a rational, `None` for floats
    pub fn to_rational(&self) -> Option<BigRational> {
        match self {
            Number::Int(n) => Some(widen(*n)),
            Number::Float(_) => None,
            Number::Rational(r) => Some(r.clone()),
        }
    }

    /// Convert to a float. Fails when a rational lies outside the float range.
    pub fn to_f64(&self) -> ArithResult<f64> {
        match self {
            Number::Int(n) => Ok(f64::from(*n)),
            Number::Float(x) => Ok(*x),
            Number::Rational(r) => rational_to_f64(r),
        }
    }

    /// Round toward zero. Non-finite floats come back unchanged.
    pub fn truncate(&self) -> Number {
        match self {
            Number::Int(_) => self.clone(),
            Number::Float(x) => truncate_f64(*x),
            Number::Rational(r) => truncate_rational(r),
        }
    }

    pub fn negate(&self) -> Number {
        match self {
            Number::Int(n) => Number::from_i64(-i64::from(*n)),
            Number::Float(x) => Number::Float(-x),
            Number::Rational(r) => Number::from_rational(-r),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Number::Int(n) => *n == 0,
            Number::Float(x) => *x == 0.0,
            Number::Rational(r) => r.is_zero(),
        }
    }
}

impl From<i32> for Number {
    fn from(n: i32) -> Self {
        Number::Int(n)
    }
}

impl From<i64> for Number {
    fn from(n: i64) -> Self {
        Number::from_i64(n)
    }
}

impl From<f64> for Number {
    fn from(x: f64) -> Self {
        Number::Float(x)
    }
}

impl From<BigRational> for Number {
    fn from(r: BigRational) -> Self {
        Number::from_rational(r)
    }
}

pub(crate) fn widen(n: i32) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Render the rational as a decimal string precise enough to round-trip and
/// let the float parser do the rounding.
pub(crate) fn rational_to_f64(r: &BigRational) -> ArithResult<f64> {
    let digits = FLOAT_DIGITS + r.denom().to_string().len();
    let text = decimal_string(r, digits);
    match text.parse::<f64>() {
        Ok(x) if x.is_finite() => Ok(x),
        _ => Err(ArithError::FloatOverflow {
            value: r.to_string(),
        }),
    }
}

/// Fixed-point rendering with `digits` fractional digits, the last one
/// rounded half away from zero.
fn decimal_string(r: &BigRational, digits: usize) -> String {
    let scale = BigInt::from(10u32).pow(digits as u32);
    let (mut q, rem) = (r.numer().abs() * scale).div_rem(r.denom());
    if rem * 2u32 >= *r.denom() {
        q += 1u32;
    }

    let mut text = q.to_string();
    if text.len() <= digits {
        text = format!("{}{}", "0".repeat(digits + 1 - text.len()), text);
    }
    let (int_part, frac_part) = text.split_at(text.len() - digits);
    let sign = if r.is_negative() { "-" } else { "" };
    format!("{sign}{int_part}.{frac_part}")
}

pub(crate) fn truncate_f64(x: f64) -> Number {
    if f64::from(i32::MIN) - 1.0 < x && x < f64::from(i32::MAX) + 1.0 {
        return Number::Int(x as i32);
    }
    if !x.is_finite() {
        return Number::Float(x);
    }
    // The shortest decimal form is what the user sees, so truncate that.
    match parse_decimal(&format!("{:e}", x)) {
        Some(r) => truncate_rational(&r),
        None => Number::Float(x),
    }
}

pub(crate) fn truncate_rational(r: &BigRational) -> Number {
    Number::from_bigint(r.to_integer())
}
