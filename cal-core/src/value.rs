//! Numeric values produced and consumed by the evaluator.

use std::fmt;

/// Tolerance used for float zero checks and the integral test.
pub const FLOAT_EPSILON: f64 = 1e-9;

/// Concrete numeric representation of a valid [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Integer,
    Float,
}

/// Result of evaluating a literal, an operator or a whole expression.
///
/// `Invalid` marks a value whose computation already failed; it is never
/// converted or operated on, only passed through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Invalid,
}

impl Value {
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            Value::Integer(_) => Some(ValueKind::Integer),
            Value::Float(_) => Some(ValueKind::Float),
            Value::Invalid => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Value::Invalid)
    }

    /// Convert to `target`, widening integers to floats.
    ///
    /// Narrowing a float to an integer is never needed by the evaluator and
    /// yields `Invalid`.
    pub fn promote(self, target: ValueKind) -> Value {
        match (self, target) {
            (Value::Integer(_), ValueKind::Integer) | (Value::Float(_), ValueKind::Float) => self,
            (Value::Integer(i), ValueKind::Float) => Value::Float(i as f64),
            (Value::Float(_), ValueKind::Integer) | (Value::Invalid, _) => Value::Invalid,
        }
    }

    /// Flip the sign in place. Integer negation wraps at `i64::MIN`.
    pub fn negate(self) -> Value {
        match self {
            Value::Integer(i) => Value::Integer(i.wrapping_neg()),
            Value::Float(f) => Value::Float(-f),
            Value::Invalid => Value::Invalid,
        }
    }

    /// Whether this value prints as a whole number.
    ///
    /// Integers always do; floats do when they are within
    /// [`FLOAT_EPSILON`] of their truncation toward zero.
    pub fn is_integral(&self) -> bool {
        match self {
            Value::Integer(_) => true,
            Value::Float(f) => is_integral(*f),
            Value::Invalid => false,
        }
    }
}

pub fn is_integral(f: f64) -> bool {
    (f - f.trunc()).abs() < FLOAT_EPSILON
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => f.write_str(&crate::format::format_float(*x)),
            Value::Invalid => f.write_str("<invalid>"),
        }
    }
}
