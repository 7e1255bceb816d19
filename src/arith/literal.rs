//! Numeric literal parsing

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Num, Zero};

use super::Number;

/// Largest decimal exponent accepted in a literal. Beyond this the exact
/// value would take an unreasonable amount of memory to build.
const MAX_EXPONENT: i64 = 100_000;

impl Number {
    /// Parse a token as a number
    ///
    /// The token is tried as a 32-bit integer, then as a big integer (both
    /// honoring `0x`, `0o`, `0b` and leading-zero octal prefixes), then as an
    /// exact decimal, exponential or `a/b` literal. Returns `None` when all
    /// three fail.
    pub fn parse(text: &str) -> Option<Number> {
        let int = Radix::split(text);
        if let Some(int) = &int {
            if let Some(n) = int.small() {
                return Some(Number::Int(n));
            }
            if let Some(n) = int.big() {
                return Some(Number::from_bigint(n));
            }
        }
        parse_decimal(text).map(Number::from_rational)
    }
}

/// An integer literal split into sign, radix and digits
struct Radix {
    negative: bool,
    radix: u32,
    digits: String,
}

impl Radix {
    fn split(text: &str) -> Option<Radix> {
        let (negative, body) = split_sign(text);
        let (radix, digits) = if let Some(rest) = strip_prefix2(body, "0x", "0X") {
            (16, rest)
        } else if let Some(rest) = strip_prefix2(body, "0o", "0O") {
            (8, rest)
        } else if let Some(rest) = strip_prefix2(body, "0b", "0B") {
            (2, rest)
        } else if body.len() > 1 && body.starts_with('0') {
            (8, &body[1..])
        } else {
            (10, body)
        };

        let digits = strip_underscores(digits)?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        Some(Radix {
            negative,
            radix,
            digits,
        })
    }

    fn small(&self) -> Option<i32> {
        let magnitude = i64::from_str_radix(&self.digits, self.radix).ok()?;
        let value = if self.negative { -magnitude } else { magnitude };
        i32::try_from(value).ok()
    }

    fn big(&self) -> Option<BigInt> {
        let magnitude = BigInt::from_str_radix(&self.digits, self.radix).ok()?;
        Some(if self.negative { -magnitude } else { magnitude })
    }
}

/// Parse an exact decimal (`1.5`, `-2.5e-3`, `.5`) or fraction (`3/4`)
pub fn parse_decimal(text: &str) -> Option<BigRational> {
    if let Some((numer, denom)) = text.split_once('/') {
        let numer = Radix::split(numer)?.big()?;
        let denom = Radix::split(denom)?;
        if denom.negative || denom.digits.is_empty() {
            return None;
        }
        let denom = denom.big()?;
        if denom.is_zero() {
            return None;
        }
        return Some(BigRational::new(numer, denom));
    }

    let (negative, body) = split_sign(text);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], parse_exponent(&body[at + 1..])?),
        None => (body, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let int_part = strip_underscores(int_part)?;
    let frac_part = strip_underscores(frac_part)?;
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let mut value = BigInt::from_str_radix(&digits, 10).ok()?;
    if negative {
        value = -value;
    }
    let scale = exponent - frac_part.len() as i64;
    if scale.abs() > MAX_EXPONENT {
        return None;
    }
    let power = BigInt::from(10u32).pow(scale.unsigned_abs() as u32);
    Some(if scale >= 0 {
        BigRational::from_integer(value * power)
    } else {
        BigRational::new(value, power)
    })
}

fn parse_exponent(text: &str) -> Option<i64> {
    let (negative, digits) = split_sign(text);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let magnitude: i64 = digits.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn split_sign(text: &str) -> (bool, &str) {
    if let Some(rest) = text.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = text.strip_prefix('+') {
        (false, rest)
    } else {
        (false, text)
    }
}

fn strip_prefix2<'a>(text: &'a str, lower: &str, upper: &str) -> Option<&'a str> {
    text.strip_prefix(lower).or_else(|| text.strip_prefix(upper))
}

/// Underscores may separate digits (`1_000`) but not lead, trail or repeat.
fn strip_underscores(digits: &str) -> Option<String> {
    if !digits.contains('_') {
        return Some(digits.to_string());
    }
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    Some(digits.chars().filter(|c| *c != '_').collect())
}
