//! Exact-decimal numbers.
//!
//! A [`Number`] keeps the decimal value it was created from without rounding
//! through binary floating point. Values parsed from text additionally keep
//! the original spelling so writers can round-trip `1.10` as `1.10`.
//! Comparisons between any two finite numbers are exact; the only lossy
//! operations are the explicit `to_f64_lossy` style conversions.
use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use fraction::{BigFraction, BigUint};

use crate::error::NumberParseError;

/// A number with exact decimal semantics.
#[derive(Debug, Clone)]
pub struct Number {
    text: Option<Box<str>>,
    repr: Repr,
}

#[derive(Debug, Clone)]
enum Repr {
    /// Fast path for integers in the `i64` range.
    Int(i64),
    /// A value of binary-float origin. Finite floats still compare exactly
    /// via their rational expansion; NaN and the infinities live only here.
    Float(f64),
    /// Everything else: wide integers and non-integral decimals.
    Big(Box<BigFraction>),
}

impl Number {
    /// Parse a decimal text form (`-?digits(.digits)?((e|E)(+|-)?digits)?`),
    /// keeping the original spelling.
    pub fn parse(text: &str) -> Result<Number, NumberParseError> {
        let repr = parse_decimal(text).ok_or_else(|| NumberParseError {
            text: text.to_string(),
        })?;
        Ok(Number {
            text: Some(text.into()),
            repr,
        })
    }

    #[must_use]
    pub fn from_i64(value: i64) -> Number {
        Number {
            text: None,
            repr: Repr::Int(value),
        }
    }

    #[must_use]
    pub fn from_u64(value: u64) -> Number {
        let repr = if let Ok(value) = i64::try_from(value) {
            Repr::Int(value)
        } else {
            Repr::Big(Box::new(BigFraction::new(
                BigUint::from(value),
                BigUint::from(1_u8),
            )))
        };
        Number { text: None, repr }
    }

    #[must_use]
    pub fn from_f64(value: f64) -> Number {
        Number {
            text: None,
            repr: Repr::Float(value),
        }
    }

    /// The spelling this number was parsed from, if any.
    #[must_use]
    pub fn original_text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        match &self.repr {
            Repr::Int(_) | Repr::Big(_) => true,
            Repr::Float(value) => value.is_finite(),
        }
    }

    #[must_use]
    pub fn is_nan(&self) -> bool {
        matches!(&self.repr, Repr::Float(value) if value.is_nan())
    }

    /// Whether the decimal value is a mathematical integer. `123.0` counts.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        match &self.repr {
            Repr::Int(_) => true,
            Repr::Float(value) => value.is_finite() && value.fract() == 0.0,
            Repr::Big(fraction) => fraction.denom().is_some_and(|denom| denom == &one()),
        }
    }

    /// Lossless conversion to `i64`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match &self.repr {
            Repr::Int(value) => Some(*value),
            Repr::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && is_i64_range(*value) {
                    Some(*value as i64)
                } else {
                    None
                }
            }
            Repr::Big(fraction) => {
                if self.is_integer() {
                    let numer = fraction.numer()?;
                    let magnitude = u64::try_from(numer.clone()).ok()?;
                    if fraction.sign() == Some(fraction::Sign::Minus) {
                        if magnitude == i64::MAX as u64 + 1 {
                            Some(i64::MIN)
                        } else {
                            i64::try_from(magnitude).ok().map(|m| -m)
                        }
                    } else {
                        i64::try_from(magnitude).ok()
                    }
                } else {
                    None
                }
            }
        }
    }

    /// Lossless conversion to `u64`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match &self.repr {
            Repr::Int(value) => u64::try_from(*value).ok(),
            Repr::Float(value) => {
                if value.is_finite() && value.fract() == 0.0 && *value >= 0.0 && *value < 2e19 {
                    Some(*value as u64)
                } else {
                    None
                }
            }
            Repr::Big(fraction) => {
                if self.is_integer() && fraction.sign() != Some(fraction::Sign::Minus) {
                    u64::try_from(fraction.numer()?.clone()).ok()
                } else {
                    None
                }
            }
        }
    }

    /// Lossless conversion to `f64`: `Some` only when converting back yields
    /// an equal number.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match &self.repr {
            Repr::Float(value) => Some(*value),
            Repr::Int(value) => {
                let converted = *value as f64;
                if converted as i64 == *value && converted.fract() == 0.0 {
                    Some(converted)
                } else {
                    None
                }
            }
            Repr::Big(_) => {
                let lossy = self.to_f64_lossy();
                if exact_from_f64(lossy).as_ref() == self.as_fraction().as_ref() {
                    Some(lossy)
                } else {
                    None
                }
            }
        }
    }

    /// Nearest `f64`, rounding if needed.
    #[must_use]
    pub fn to_f64_lossy(&self) -> f64 {
        match &self.repr {
            Repr::Int(value) => *value as f64,
            Repr::Float(value) => *value,
            Repr::Big(_) => {
                if let Some(text) = &self.text {
                    text.parse().unwrap_or(f64::NAN)
                } else if let Some(fraction) = self.as_fraction() {
                    let numer = fraction
                        .numer()
                        .map_or(f64::NAN, |n| n.to_string().parse().unwrap_or(f64::NAN));
                    let denom = fraction
                        .denom()
                        .map_or(f64::NAN, |d| d.to_string().parse().unwrap_or(f64::NAN));
                    let magnitude = numer / denom;
                    if fraction.sign() == Some(fraction::Sign::Minus) {
                        -magnitude
                    } else {
                        magnitude
                    }
                } else {
                    f64::NAN
                }
            }
        }
    }

    /// The exact rational expansion; `None` for NaN and the infinities.
    #[must_use]
    pub fn as_fraction(&self) -> Option<BigFraction> {
        match &self.repr {
            Repr::Int(value) => {
                let magnitude = BigUint::from(value.unsigned_abs());
                Some(if *value < 0 {
                    BigFraction::new_neg(magnitude, one())
                } else {
                    BigFraction::new(magnitude, one())
                })
            }
            Repr::Float(value) => exact_from_f64(*value),
            Repr::Big(fraction) => Some((**fraction).clone()),
        }
    }

    /// A decimal spelling suitable for JSON output; `None` for NaN and the
    /// infinities. Prefers the original text, then exact forms, then the
    /// nearest `f64`.
    #[must_use]
    pub fn to_decimal_string(&self) -> Option<String> {
        if !self.is_finite() {
            return None;
        }
        if let Some(text) = &self.text {
            return Some(text.to_string());
        }
        match &self.repr {
            Repr::Int(value) => Some(itoa::Buffer::new().format(*value).to_string()),
            Repr::Float(value) => Some(format_f64(*value)),
            Repr::Big(fraction) => {
                if self.is_integer() {
                    let numer = fraction.numer()?;
                    let sign = if fraction.sign() == Some(fraction::Sign::Minus) {
                        "-"
                    } else {
                        ""
                    };
                    Some(format!("{sign}{numer}"))
                } else {
                    Some(format_f64(self.to_f64_lossy()))
                }
            }
        }
    }

    /// Exact `multipleOf` check: whether `self / divisor` is an integer.
    #[must_use]
    pub fn is_multiple_of(&self, divisor: &Number) -> bool {
        if let (Repr::Int(lhs), Repr::Int(rhs)) = (&self.repr, &divisor.repr) {
            return *rhs != 0 && lhs % rhs == 0;
        }
        let (Some(lhs), Some(rhs)) = (self.as_fraction(), divisor.as_fraction()) else {
            return false;
        };
        if rhs.numer().is_some_and(|numer| numer == &BigUint::from(0_u8)) {
            return false;
        }
        let quotient = lhs / rhs;
        quotient.denom().is_some_and(|denom| denom == &one())
    }
}

fn one() -> BigUint {
    BigUint::from(1_u8)
}

fn is_i64_range(value: f64) -> bool {
    // 2^63 is exactly representable; i64::MAX is not.
    value >= -9_223_372_036_854_775_808.0 && value < 9_223_372_036_854_775_808.0
}

/// Exact rational expansion of a finite `f64` from its bit pattern.
fn exact_from_f64(value: f64) -> Option<BigFraction> {
    if !value.is_finite() {
        return None;
    }
    let bits = value.to_bits();
    let negative = bits >> 63 == 1;
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction_bits = bits & ((1_u64 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction_bits, -1074_i64)
    } else {
        (fraction_bits | (1_u64 << 52), biased - 1075)
    };
    let (numer, denom) = if exponent >= 0 {
        (
            BigUint::from(mantissa) << usize::try_from(exponent).expect("small exponent"),
            one(),
        )
    } else {
        (
            BigUint::from(mantissa),
            one() << usize::try_from(-exponent).expect("small exponent"),
        )
    };
    Some(if negative {
        BigFraction::new_neg(numer, denom)
    } else {
        BigFraction::new(numer, denom)
    })
}

/// Parse a decimal spelling into the smallest representation that holds it
/// exactly.
fn parse_decimal(text: &str) -> Option<Repr> {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let mut position = 0;
    let negative = match bytes[0] {
        b'-' => {
            position += 1;
            true
        }
        b'+' => return None,
        _ => false,
    };
    let int_start = position;
    while position < bytes.len() && bytes[position].is_ascii_digit() {
        position += 1;
    }
    let int_digits = &text[int_start..position];
    if int_digits.is_empty() {
        return None;
    }
    let mut frac_digits = "";
    if position < bytes.len() && bytes[position] == b'.' {
        position += 1;
        let frac_start = position;
        while position < bytes.len() && bytes[position].is_ascii_digit() {
            position += 1;
        }
        frac_digits = &text[frac_start..position];
        if frac_digits.is_empty() {
            return None;
        }
    }
    let mut exponent = 0_i64;
    if position < bytes.len() && (bytes[position] == b'e' || bytes[position] == b'E') {
        position += 1;
        let exp_negative = match bytes.get(position) {
            Some(b'-') => {
                position += 1;
                true
            }
            Some(b'+') => {
                position += 1;
                false
            }
            _ => false,
        };
        let exp_start = position;
        while position < bytes.len() && bytes[position].is_ascii_digit() {
            position += 1;
        }
        let exp_digits = &text[exp_start..position];
        if exp_digits.is_empty() {
            return None;
        }
        exponent = exp_digits.parse::<i64>().ok()?;
        if exp_negative {
            exponent = -exponent;
        }
    }
    if position != bytes.len() {
        return None;
    }

    // Plain integers stay on the i64 fast path.
    if frac_digits.is_empty() && exponent == 0 {
        if let Ok(value) = text.parse::<i64>() {
            return Some(Repr::Int(value));
        }
    }

    let mut digits = String::with_capacity(int_digits.len() + frac_digits.len());
    digits.push_str(int_digits);
    digits.push_str(frac_digits);
    let scale = exponent.checked_sub(i64::try_from(frac_digits.len()).ok()?)?;
    let magnitude = BigUint::from_str(&digits).ok()?;
    let (numer, denom) = if scale >= 0 {
        let scale = usize::try_from(scale).ok()?;
        (magnitude * pow10(scale), one())
    } else {
        let scale = usize::try_from(-scale).ok()?;
        (magnitude, pow10(scale))
    };
    let fraction = if negative {
        BigFraction::new_neg(numer, denom)
    } else {
        BigFraction::new(numer, denom)
    };
    // Collapse to the fast path when reduction lands back in i64 range,
    // e.g. "1e2" or "123.0".
    let candidate = Number {
        text: None,
        repr: Repr::Big(Box::new(fraction)),
    };
    if let Some(value) = candidate.as_i64() {
        return Some(Repr::Int(value));
    }
    let Repr::Big(fraction) = candidate.repr else {
        unreachable!()
    };
    Some(Repr::Big(fraction))
}

/// Shortest `f64` spelling that still parses as a JSON number.
fn format_f64(value: f64) -> String {
    let text = format!("{value}");
    // Rust prints integral floats without a fractional part; keep the
    // number-ness visible.
    if text.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        format!("{text}.0")
    } else {
        text
    }
}

fn pow10(exponent: usize) -> BigUint {
    BigUint::from(10_u8).pow(u32::try_from(exponent).expect("exponent fits u32"))
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Int(lhs), Repr::Int(rhs)) => lhs == rhs,
            _ => {
                if !self.is_finite() || !other.is_finite() {
                    // Structural equality is total: NaN equals NaN here so
                    // containers stay lawful. Ordering keywords treat NaN as
                    // unordered via `partial_cmp`.
                    return match (&self.repr, &other.repr) {
                        (Repr::Float(lhs), Repr::Float(rhs)) => {
                            (lhs.is_nan() && rhs.is_nan()) || lhs == rhs
                        }
                        _ => false,
                    };
                }
                self.as_fraction() == other.as_fraction()
            }
        }
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (&self.repr, &other.repr) {
            (Repr::Int(lhs), Repr::Int(rhs)) => Some(lhs.cmp(rhs)),
            // Mixed int/float comparisons have an exact fast path.
            (Repr::Int(lhs), Repr::Float(rhs)) if rhs.is_finite() => {
                num_cmp::NumCmp::num_cmp(*lhs, *rhs)
            }
            (Repr::Float(lhs), Repr::Int(rhs)) if lhs.is_finite() => {
                num_cmp::NumCmp::num_cmp(*lhs, *rhs)
            }
            _ => {
                if self.is_nan() || other.is_nan() {
                    return None;
                }
                match (&self.repr, &other.repr) {
                    (Repr::Float(lhs), _) if lhs.is_infinite() => {
                        if other.is_finite() {
                            Some(if *lhs > 0.0 {
                                Ordering::Greater
                            } else {
                                Ordering::Less
                            })
                        } else {
                            let Repr::Float(rhs) = &other.repr else {
                                unreachable!()
                            };
                            lhs.partial_cmp(rhs)
                        }
                    }
                    (_, Repr::Float(rhs)) if rhs.is_infinite() => Some(if *rhs > 0.0 {
                        Ordering::Less
                    } else {
                        Ordering::Greater
                    }),
                    _ => self.as_fraction()?.partial_cmp(&other.as_fraction()?),
                }
            }
        }
    }
}

impl Hash for Number {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // The digest must agree across representations: 4, 4.0 and "4e0"
        // hash identically because they compare equal.
        if let Some(value) = self.as_i64() {
            state.write_u8(0);
            state.write_i64(value);
        } else if self.is_finite() {
            let fraction = self.as_fraction().expect("finite number");
            state.write_u8(1);
            state.write_u8(u8::from(
                fraction.sign() == Some(fraction::Sign::Minus),
            ));
            if let Some(numer) = fraction.numer() {
                state.write(&numer.to_bytes_le());
            }
            if let Some(denom) = fraction.denom() {
                state.write(&denom.to_bytes_le());
            }
        } else {
            let Repr::Float(value) = &self.repr else {
                unreachable!()
            };
            state.write_u8(2);
            state.write_u64(if value.is_nan() {
                f64::NAN.to_bits()
            } else {
                value.to_bits()
            });
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(text) = &self.text {
            return f.write_str(text);
        }
        match &self.repr {
            Repr::Int(value) => write!(f, "{value}"),
            Repr::Float(value) => {
                if value.is_nan() {
                    f.write_str(".nan")
                } else if value.is_infinite() {
                    f.write_str(if *value > 0.0 { ".inf" } else { "-.inf" })
                } else if value.fract() == 0.0 && value.abs() < 1e15 {
                    write!(f, "{value:.1}")
                } else {
                    write!(f, "{value}")
                }
            }
            Repr::Big(fraction) => write!(f, "{fraction}"),
        }
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::from_i64(value)
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        Number::from_u64(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Number::from_i64(i64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Number::from_i64(i64::from(value))
    }
}

impl From<usize> for Number {
    fn from(value: usize) -> Self {
        Number::from_u64(value as u64)
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::from_f64(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use test_case::test_case;

    use super::Number;

    fn digest(number: &Number) -> u64 {
        let mut hasher = DefaultHasher::new();
        number.hash(&mut hasher);
        hasher.finish()
    }

    #[test_case("123", "123.0")]
    #[test_case("123", "1.23e2")]
    #[test_case("0.5", "5e-1")]
    #[test_case("-7", "-7.000")]
    #[test_case("0", "-0")]
    fn equal_spellings(lhs: &str, rhs: &str) {
        let lhs = Number::parse(lhs).unwrap();
        let rhs = Number::parse(rhs).unwrap();
        assert_eq!(lhs, rhs);
        assert_eq!(digest(&lhs), digest(&rhs));
    }

    #[test_case("0.1", "0.2")]
    #[test_case("123", "123.5")]
    #[test_case("1e300", "1e301")]
    fn unequal(lhs: &str, rhs: &str) {
        assert_ne!(Number::parse(lhs).unwrap(), Number::parse(rhs).unwrap());
    }

    #[test_case("0.3", "0.1", true)]
    #[test_case("0.35", "0.1", false)]
    #[test_case("9", "3", true)]
    #[test_case("7", "2", false)]
    #[test_case("4.5", "1.5", true)]
    fn multiple_of(value: &str, divisor: &str, expected: bool) {
        let value = Number::parse(value).unwrap();
        let divisor = Number::parse(divisor).unwrap();
        assert_eq!(value.is_multiple_of(&divisor), expected);
    }

    #[test]
    fn wide_decimal_round_trips_through_text() {
        let text = "123456789012345678901234567890.000000000000000000001";
        let number = Number::parse(text).unwrap();
        assert_eq!(number.original_text(), Some(text));
        assert_eq!(number.to_string(), text);
        assert!(!number.is_integer());
        assert_eq!(number.as_i64(), None);
    }

    #[test]
    fn float_and_decimal_agree() {
        // 0.5 is exactly representable in binary.
        assert_eq!(Number::from_f64(0.5), Number::parse("0.5").unwrap());
        // 0.1 is not.
        assert_ne!(Number::from_f64(0.1), Number::parse("0.1").unwrap());
    }

    #[test]
    fn nan_is_unordered_but_structurally_equal() {
        let nan = Number::from_f64(f64::NAN);
        assert_eq!(nan, Number::from_f64(f64::NAN));
        assert!(nan.partial_cmp(&Number::from_i64(0)).is_none());
    }

    #[test]
    fn lossless_conversions() {
        assert_eq!(Number::parse("42").unwrap().as_i64(), Some(42));
        assert_eq!(Number::parse("42.0").unwrap().as_u64(), Some(42));
        assert_eq!(Number::parse("0.25").unwrap().as_f64(), Some(0.25));
        assert_eq!(Number::parse("0.1").unwrap().as_f64(), None);
        assert_eq!(
            Number::from_u64(u64::MAX).as_u64(),
            Some(u64::MAX),
        );
        assert_eq!(Number::from_u64(u64::MAX).as_i64(), None);
    }
}
