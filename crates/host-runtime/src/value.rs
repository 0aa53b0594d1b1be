//! Generic host value representation
//!
//! Every value crossing into the host is a [`Value`]. Only the variants the
//! extension boundary needs are modelled:
//! - `Fixnum` - immediate integer within the fixnum range
//! - `Bignum` - integer outside the fixnum range
//! - `Module` - a module object, passed as the receiver of module functions
//!
//! Integers built through `from_i64`/`from_i128` are canonical: a value that
//! fits the fixnum range is a `Fixnum`, anything else a `Bignum`. The runtime
//! passes every callback result through [`Value::normalize`], so values the
//! host hands out are canonical and structural equality is numeric equality.

use crate::conversion::ConversionError;
use std::fmt;

/// Largest integer representable as an immediate fixnum (63-bit signed)
pub const FIXNUM_MAX: i64 = (1i64 << 62) - 1;

/// Smallest integer representable as an immediate fixnum (63-bit signed)
pub const FIXNUM_MIN: i64 = -(1i64 << 62);

/// Index of a module in the runtime's module table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

impl ModuleId {
    /// Raw table index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Tagged host value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    /// Immediate integer, `FIXNUM_MIN <= n <= FIXNUM_MAX`
    Fixnum(i64),
    /// Integer outside the fixnum range
    Bignum(i128),
    /// Module object
    Module(ModuleId),
}

impl Value {
    /// Box a native integer
    ///
    /// Values inside the fixnum range become `Fixnum`; anything else is
    /// widened to `Bignum`. Never truncates.
    ///
    /// # Examples
    ///
    /// ```
    /// use host_runtime::value::{Value, FIXNUM_MAX};
    ///
    /// assert_eq!(Value::from_i64(3), Value::Fixnum(3));
    /// assert_eq!(Value::from_i64(FIXNUM_MAX + 1), Value::Bignum((FIXNUM_MAX + 1) as i128));
    /// ```
    pub fn from_i64(n: i64) -> Self {
        if fixable(n) {
            Value::Fixnum(n)
        } else {
            Value::Bignum(i128::from(n))
        }
    }

    /// Box a 128-bit integer, normalising to `Fixnum` when it fits
    pub fn from_i128(n: i128) -> Self {
        match i64::try_from(n) {
            Ok(small) if fixable(small) => Value::Fixnum(small),
            _ => Value::Bignum(n),
        }
    }

    /// Canonical form of this value
    ///
    /// Rebuilds integers through `from_i64`/`from_i128`, so a `Fixnum` outside
    /// the fixnum range becomes a `Bignum` and a small `Bignum` a `Fixnum`.
    pub fn normalize(self) -> Self {
        match self {
            Value::Fixnum(n) => Value::from_i64(n),
            Value::Bignum(n) => Value::from_i128(n),
            module => module,
        }
    }

    /// Unbox an integer as `i64`
    pub fn to_i64(&self) -> Result<i64, ConversionError> {
        match *self {
            Value::Fixnum(n) => Ok(n),
            Value::Bignum(n) => i64::try_from(n).map_err(|_| ConversionError::OutOfRange {
                value: n,
                target: "i64",
            }),
            Value::Module(_) => Err(ConversionError::TypeMismatch {
                expected: "Integer".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }

    /// Unbox an integer as `i128`
    pub fn to_i128(&self) -> Result<i128, ConversionError> {
        match *self {
            Value::Fixnum(n) => Ok(i128::from(n)),
            Value::Bignum(n) => Ok(n),
            Value::Module(_) => Err(ConversionError::TypeMismatch {
                expected: "Integer".to_string(),
                found: self.type_name().to_string(),
            }),
        }
    }

    /// Whether the value is an immediate fixnum
    pub fn is_fixnum(&self) -> bool {
        matches!(self, Value::Fixnum(_))
    }

    /// Whether the value is an integer of either width
    pub fn is_integer(&self) -> bool {
        matches!(self, Value::Fixnum(_) | Value::Bignum(_))
    }

    /// Host class name, used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Fixnum(_) | Value::Bignum(_) => "Integer",
            Value::Module(_) => "Module",
        }
    }
}

/// Whether `n` fits the fixnum range
pub fn fixable(n: i64) -> bool {
    (FIXNUM_MIN..=FIXNUM_MAX).contains(&n)
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::from_i64(i64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::from_i64(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Fixnum(n) => write!(f, "{}", n),
            Value::Bignum(n) => write!(f, "{}", n),
            Value::Module(id) => write!(f, "#<Module:{}>", id.0),
        }
    }
}
