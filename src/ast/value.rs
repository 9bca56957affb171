//! Typed views over primitive text.
//!
//! Coercions never panic: malformed text yields a [`CoerceError`] that the
//! caller can report or attach as the cause of a diagnostic.

use super::node::Primitive;
use crate::errors::CoerceError;

impl Primitive {
    /// Parses `true` or `false`; anything else is an error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_construct::ast::Primitive;
    /// assert_eq!(Primitive::new("true").as_bool().ok(), Some(true));
    /// assert!(Primitive::new("yes").as_bool().is_err());
    /// ```
    pub fn as_bool(&self) -> Result<bool, CoerceError> {
        match self.value() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(CoerceError::InvalidBool {
                value: other.to_string(),
            }),
        }
    }

    pub fn as_int(&self) -> Result<i32, CoerceError> {
        self.value()
            .parse::<i32>()
            .map_err(|source| CoerceError::InvalidInt {
                value: self.value().to_string(),
                source,
            })
    }

    pub fn as_long(&self) -> Result<i64, CoerceError> {
        self.value()
            .parse::<i64>()
            .map_err(|source| CoerceError::InvalidInt {
                value: self.value().to_string(),
                source,
            })
    }

    pub fn as_float(&self) -> Result<f32, CoerceError> {
        self.value()
            .parse::<f32>()
            .map_err(|source| CoerceError::InvalidFloat {
                value: self.value().to_string(),
                source,
            })
    }

    pub fn as_double(&self) -> Result<f64, CoerceError> {
        self.value()
            .parse::<f64>()
            .map_err(|source| CoerceError::InvalidFloat {
                value: self.value().to_string(),
                source,
            })
    }
}

/// Formats a number the way evaluated primitives are written back.
///
/// Integral values print without a fractional part.
///
/// ```rust
/// use sutra_construct::ast::value::format_number;
/// assert_eq!(format_number(10.0), "10");
/// assert_eq!(format_number(1e12), "1000000000000");
/// assert_eq!(format_number(0.5), "0.5");
/// ```
pub fn format_number(n: f64) -> String {
    n.to_string()
}
