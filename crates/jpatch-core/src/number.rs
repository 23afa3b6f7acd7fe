use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number as JsonNumber;

use crate::{hash::hash_bytes, ValueError};

/// Represents a JSON number.
///
/// Integers that fit in 64 bits are kept exactly; everything else is a finite
/// IEEE-754 double. Equality is by numeric value across representations, so
/// `1` and `1.0` are the same number while `9007199254740993` and
/// `9007199254740992` are not.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(try_from = "JsonNumber")]
pub struct Number(Repr);

#[derive(Clone, Copy, Debug)]
enum Repr {
    Int(i64),
    /// Only holds values above `i64::MAX`.
    UInt(u64),
    Float(f64),
}

/// 2^63 and 2^64 as doubles; both are exact.
const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

impl Number {
    /// Creates a new [`Number`] after validating finiteness.
    ///
    /// ```
    /// # use jpatch_core::Number;
    /// let num = Number::new(42.0)?;
    /// assert_eq!(num.get(), 42.0);
    /// assert!(Number::new(f64::NAN).is_err());
    /// # Ok::<(), jpatch_core::ValueError>(())
    /// ```
    pub fn new(value: f64) -> Result<Self, ValueError> {
        if value.is_finite() {
            Ok(Self(Repr::Float(value)))
        } else {
            Err(ValueError::NotFinite { value })
        }
    }

    /// Returns the value as a double, rounding integers beyond 2^53.
    #[must_use]
    pub fn get(self) -> f64 {
        match self.0 {
            Repr::Int(v) => v as f64,
            Repr::UInt(v) => v as f64,
            Repr::Float(v) => v,
        }
    }

    /// Returns the value as an `i64` if it is an integer in range.
    ///
    /// ```
    /// # use jpatch_core::Number;
    /// assert_eq!(Number::from(-7).as_i64(), Some(-7));
    /// assert_eq!(Number::new(1.5)?.as_i64(), None);
    /// # Ok::<(), jpatch_core::ValueError>(())
    /// ```
    #[must_use]
    pub fn as_i64(self) -> Option<i64> {
        self.integer().and_then(|v| i64::try_from(v).ok())
    }

    /// Returns the value as a `u64` if it is a non-negative integer in range.
    #[must_use]
    pub fn as_u64(self) -> Option<u64> {
        self.integer().and_then(|v| u64::try_from(v).ok())
    }

    /// Exact integer value, if the number is integral and fits in 64 bits.
    fn integer(self) -> Option<i128> {
        match self.0 {
            Repr::Int(v) => Some(i128::from(v)),
            Repr::UInt(v) => Some(i128::from(v)),
            // -0.0 lands on 0 here
            Repr::Float(v) if v.fract() == 0.0 && (-TWO_POW_63..TWO_POW_64).contains(&v) => {
                Some(v as i128)
            }
            Repr::Float(_) => None,
        }
    }

    /// Fingerprint consistent with equality: every integral value hashes by
    /// its exact integer, whatever the representation.
    pub(crate) fn fingerprint(self) -> crate::hash::HashCode {
        match self.integer() {
            Some(v) => hash_bytes(&v.to_le_bytes()),
            None => hash_bytes(&self.get().to_le_bytes()),
        }
    }

    /// Converts the number into a `serde_json::Number` using minimal integer representation when possible.
    #[must_use]
    pub fn to_json_number(self) -> JsonNumber {
        let value = match self.0 {
            Repr::Int(v) => return JsonNumber::from(v),
            Repr::UInt(v) => return JsonNumber::from(v),
            Repr::Float(v) => v,
        };
        if value.fract() == 0.0 && !(value == 0.0 && value.is_sign_negative()) {
            if (-TWO_POW_63..TWO_POW_63).contains(&value) {
                return JsonNumber::from(value as i64);
            }
            if (0.0..TWO_POW_64).contains(&value) {
                return JsonNumber::from(value as u64);
            }
        }
        JsonNumber::from_f64(value).unwrap_or_else(|| JsonNumber::from(0))
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.integer(), other.integer()) {
            (Some(lhs), Some(rhs)) => lhs == rhs,
            (None, None) => self.get() == other.get(),
            _ => false,
        }
    }
}

impl TryFrom<f64> for Number {
    type Error = ValueError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<JsonNumber> for Number {
    type Error = ValueError;

    fn try_from(value: JsonNumber) -> Result<Self, Self::Error> {
        if let Some(v) = value.as_i64() {
            return Ok(Self::from(v));
        }
        if let Some(v) = value.as_u64() {
            return Ok(Self::from(v));
        }
        match value.as_f64() {
            Some(v) => Self::new(v),
            None => Err(ValueError::NumberOutOfRange { value: value.to_string() }),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self(Repr::Int(i64::from(value)))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Self(Repr::Int(i64::from(value)))
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self(Repr::Int(value))
    }
}

impl From<u64> for Number {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Self(Repr::Int(v)),
            Err(_) => Self(Repr::UInt(value)),
        }
    }
}

impl Serialize for Number {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json_number().serialize(serializer)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_number())
    }
}
