//! Numeric scalars
//!
//! [`Number`] keeps integers exact and only falls back to `f64` for values
//! that were written or parsed as floating point.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Numeric scalar stored in a config tree
///
/// Unsigned values that fit in `i64` are normalised to [`Number::Int`], so
/// `5u64` and `5i64` compare equal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed integer
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    UInt(u64),
    /// Floating point value
    Float(f64),
}

impl Number {
    /// Integer view, if the number is integral and fits
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Int(i) => Some(i),
            Self::UInt(u) => i64::try_from(u).ok(),
            Self::Float(_) => None,
        }
    }

    /// Unsigned view, if the number is a non-negative integer
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Self::Int(i) => u64::try_from(i).ok(),
            Self::UInt(u) => Some(u),
            Self::Float(_) => None,
        }
    }

    /// Lossy floating point view
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(i) => i as f64,
            Self::UInt(u) => u as f64,
            Self::Float(f) => f,
        }
    }

    /// Check if the number was stored as floating point
    #[inline]
    #[must_use]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::UInt(value), Self::Int)
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(v) => write!(f, "{v}"),
        }
    }
}

/// Error parsing a number from text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid number: '{0}'")]
pub struct NumberParseError(pub String);

impl FromStr for Number {
    type Err = NumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Self::Int(i));
        }
        if let Ok(u) = trimmed.parse::<u64>() {
            return Ok(Self::UInt(u));
        }
        trimmed
            .parse::<f64>()
            .map(Self::Float)
            .map_err(|_| NumberParseError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_normalises_to_int() {
        assert_eq!(Number::from(5u64), Number::Int(5));
        assert_eq!(Number::from(u64::MAX), Number::UInt(u64::MAX));
    }

    #[test]
    fn parse_prefers_integers() {
        assert_eq!("42".parse::<Number>(), Ok(Number::Int(42)));
        assert_eq!(" -7 ".parse::<Number>(), Ok(Number::Int(-7)));
        assert_eq!("18446744073709551615".parse::<Number>(), Ok(Number::UInt(u64::MAX)));
        assert_eq!("2.5".parse::<Number>(), Ok(Number::Float(2.5)));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("forty".parse::<Number>().is_err());
        assert!("".parse::<Number>().is_err());
    }

    #[test]
    fn views() {
        assert_eq!(Number::Int(-1).as_u64(), None);
        assert_eq!(Number::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Number::Float(1.5).as_i64(), None);
        assert!((Number::Int(3).as_f64() - 3.0).abs() < f64::EPSILON);
    }
}
