//! Binary operator application with integer/float promotion.

use tracing::trace;

use crate::error::{ErrorKind, ErrorLatch};
use crate::lexer::{Token, TokenKind};
use crate::value::{FLOAT_EPSILON, Value, ValueKind};

/// Apply `operator` to two already evaluated operands.
///
/// Faults are latched at the operator token's position and yield
/// `Value::Invalid`. An `Invalid` operand is passed through untouched.
pub fn apply(errors: &mut ErrorLatch, left: Value, operator: &Token, right: Value) -> Value {
    let (Some(left_kind), Some(right_kind)) = (left.kind(), right.kind()) else {
        return Value::Invalid;
    };

    let target = if left_kind == ValueKind::Float || right_kind == ValueKind::Float {
        ValueKind::Float
    } else {
        ValueKind::Integer
    };

    let result = match (left.promote(target), right.promote(target)) {
        (Value::Integer(l), Value::Integer(r)) => apply_integer(errors, l, operator, r),
        (Value::Float(l), Value::Float(r)) => apply_float(errors, l, operator, r),
        _ => {
            errors.raise(operator.position, ErrorKind::InternalTypeError);
            Value::Invalid
        }
    };

    trace!(op = ?operator.kind, %left, %right, %result, "apply");
    result
}

fn apply_integer(errors: &mut ErrorLatch, l: i64, operator: &Token, r: i64) -> Value {
    if matches!(operator.kind, TokenKind::Slash | TokenKind::Power) && r == 0 {
        errors.raise(operator.position, ErrorKind::IntegerDivisionByZero);
        return Value::Invalid;
    }

    match operator.kind {
        TokenKind::Plus => Value::Integer(l.wrapping_add(r)),
        TokenKind::Minus => Value::Integer(l.wrapping_sub(r)),
        TokenKind::Star => Value::Integer(l.wrapping_mul(r)),
        TokenKind::Slash => Value::Integer(l.wrapping_div(r)),
        // Integer exponentiation is always carried out in floating point.
        TokenKind::Power => Value::Float((l as f64).powf(r as f64)),
        _ => {
            errors.raise(operator.position, ErrorKind::UnknownOperator);
            Value::Invalid
        }
    }
}

fn apply_float(errors: &mut ErrorLatch, l: f64, operator: &Token, r: f64) -> Value {
    if operator.kind == TokenKind::Slash && r.abs() < FLOAT_EPSILON {
        errors.raise(operator.position, ErrorKind::FloatDivisionByZero);
        return Value::Invalid;
    }

    match operator.kind {
        TokenKind::Plus => Value::Float(l + r),
        TokenKind::Minus => Value::Float(l - r),
        TokenKind::Star => Value::Float(l * r),
        TokenKind::Slash => Value::Float(l / r),
        TokenKind::Power => Value::Float(l.powf(r)),
        _ => {
            errors.raise(operator.position, ErrorKind::UnknownOperator);
            Value::Invalid
        }
    }
}
