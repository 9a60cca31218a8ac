//! Plural operands of a number, as defined by CLDR.
//!
//! | Operand | Meaning for `-1.2050c3` → `1205.0` |
//! |---|---|
//! | `n` | absolute value |
//! | `i` | integer digits |
//! | `v` | count of visible fraction digits, with trailing zeros |
//! | `w` | count of visible fraction digits, without trailing zeros |
//! | `f` | visible fraction digits, with trailing zeros |
//! | `t` | visible fraction digits, without trailing zeros |
//! | `e` | compact decimal exponent |

use thiserror::Error;

/// Fraction digits beyond this do not fit the `f` operand.
const MAX_FRACTION_DIGITS: usize = 18;
const MAX_EXPONENT: u32 = 308;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot take plural operands of `{input}`: {reason}")]
pub struct OperandError {
    pub input: String,
    pub reason: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PluralOperands {
    pub n: f64,
    pub i: u64,
    pub v: u32,
    pub w: u32,
    pub f: u64,
    pub t: u64,
    pub e: u32,
}

impl PluralOperands {
    /// Operands of a decimal string such as `1.50`, `-3`, `1.2e3` or `1.2c3`.
    /// Visible trailing fraction zeros are significant.
    pub fn from_decimal_str(input: &str) -> Result<Self, OperandError> {
        let err = |reason| OperandError {
            input: input.to_owned(),
            reason,
        };

        let s = input.trim();
        let s = s.strip_prefix(['-', '+']).unwrap_or(s);
        let (mantissa, exponent) = match s.find(['e', 'c', 'E', 'C']) {
            Some(at) => {
                let exp = s[at + 1..]
                    .parse::<u32>()
                    .map_err(|_| err("exponent must be a non-negative integer"))?;
                if exp > MAX_EXPONENT {
                    return Err(err("exponent out of range"));
                }
                (&s[..at], exp)
            }
            None => (s, 0),
        };
        let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits = |d: &str| d.bytes().all(|b| b.is_ascii_digit());
        if int.is_empty() || !digits(int) || !digits(frac) {
            return Err(err("not a decimal number"));
        }

        // Shift the decimal point right by the exponent.
        let shift = (exponent as usize).min(frac.len());
        let mut int_digits = String::with_capacity(int.len() + exponent as usize);
        int_digits.push_str(int);
        int_digits.push_str(&frac[..shift]);
        int_digits.extend(std::iter::repeat_n('0', exponent as usize - shift));
        let frac = &frac[shift..];

        if frac.len() > MAX_FRACTION_DIGITS {
            return Err(err("too many fraction digits"));
        }
        let trimmed = frac.trim_end_matches('0');

        let low = &int_digits[int_digits.len().saturating_sub(MAX_FRACTION_DIGITS)..];
        let i = low.parse::<u64>().map_err(|_| err("not a decimal number"))?;
        let n = format!("{int_digits}.{frac}0")
            .parse::<f64>()
            .map_err(|_| err("not a decimal number"))?;

        Ok(Self {
            n,
            i,
            v: frac.len() as u32,
            w: trimmed.len() as u32,
            f: if frac.is_empty() { 0 } else { frac.parse().map_err(|_| err("not a decimal number"))? },
            t: if trimmed.is_empty() { 0 } else { trimmed.parse().map_err(|_| err("not a decimal number"))? },
            e: exponent,
        })
    }

    /// Operands of a float, using its shortest round-trip decimal form with
    /// fraction digits past the representable limit dropped.
    pub fn from_f64(x: f64) -> Result<Self, OperandError> {
        if !x.is_finite() {
            return Err(OperandError {
                input: x.to_string(),
                reason: "not a finite number",
            });
        }
        let text = x.abs().to_string();
        let text = match text.split_once('.') {
            Some((int, frac)) if frac.len() > MAX_FRACTION_DIGITS => {
                format!("{int}.{}", &frac[..MAX_FRACTION_DIGITS])
            }
            _ => text,
        };
        Self::from_decimal_str(&text)
    }
}

impl From<u64> for PluralOperands {
    fn from(n: u64) -> Self {
        Self {
            n: n as f64,
            i: n,
            ..Default::default()
        }
    }
}

impl From<i64> for PluralOperands {
    fn from(n: i64) -> Self {
        Self::from(n.unsigned_abs())
    }
}

impl From<u32> for PluralOperands {
    fn from(n: u32) -> Self {
        Self::from(u64::from(n))
    }
}

impl TryFrom<f64> for PluralOperands {
    type Error = OperandError;

    fn try_from(x: f64) -> Result<Self, Self::Error> {
        Self::from_f64(x)
    }
}

impl std::str::FromStr for PluralOperands {
    type Err = OperandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ops(s: &str) -> PluralOperands {
        PluralOperands::from_decimal_str(s).unwrap()
    }

    #[test]
    fn visible_fraction_digits() {
        let o = ops("1.50");
        assert_eq!((o.n, o.i, o.v, o.w, o.f, o.t), (1.5, 1, 2, 1, 50, 5));
        let o = ops("-3");
        assert_eq!((o.n, o.i, o.v, o.f), (3.0, 3, 0, 0));
        let o = ops("0.0");
        assert_eq!((o.i, o.v, o.w, o.f, o.t), (0, 1, 0, 0, 0));
    }

    #[test]
    fn compact_exponent_shifts_digits() {
        let o = ops("1.2c3");
        assert_eq!((o.n, o.i, o.v, o.e), (1200.0, 1200, 0, 3));
        let o = ops("1.2050c3");
        assert_eq!((o.n, o.i, o.v, o.w, o.f, o.t), (1205.0, 1205, 1, 0, 0, 0));
        assert_eq!(ops("5e0").e, 0);
    }

    #[test]
    fn rejects_garbage() {
        for bad in ["", "abc", "1.2.3", ".5", "1e-2", "1.0000000000000000001"] {
            assert!(PluralOperands::from_decimal_str(bad).is_err(), "{bad:?}");
        }
        assert!(PluralOperands::from_f64(f64::NAN).is_err());
    }

    #[test]
    fn floats_use_shortest_form() {
        let o = PluralOperands::from_f64(2.5).unwrap();
        assert_eq!((o.i, o.v, o.f), (2, 1, 5));
        let o = PluralOperands::from_f64(1e-30).unwrap();
        assert_eq!((o.i, o.v), (0, 18));
        assert_eq!(PluralOperands::from(-7i64).i, 7);
    }
}
