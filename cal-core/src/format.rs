//! Text rendering of evaluation results.
//!
//! Integers print verbatim. Floats that are integral print as integers;
//! other floats use C's `%.15g` conventions. Failures print as
//! `ERROR:<position>`.

use crate::Evaluation;
use crate::value::{Value, is_integral};

/// Significant digits used for non-integral floats.
pub const SIGNIFICANT_DIGITS: usize = 15;

/// Render the single output line for an evaluation (without newline).
pub fn render(evaluation: &Evaluation) -> String {
    match (&evaluation.error, evaluation.value) {
        (None, Value::Integer(_) | Value::Float(_)) => format_value(evaluation.value),
        (error, _) => format!("ERROR:{}", error.map_or(0, |d| d.position)),
    }
}

pub fn format_value(value: Value) -> String {
    match value {
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format_float(f),
        Value::Invalid => "ERROR".to_string(),
    }
}

pub fn format_float(f: f64) -> String {
    // i64 range is [-2^63, 2^63); the upper bound itself does not fit.
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    if f.is_finite() && is_integral(f) && f >= -I64_BOUND && f < I64_BOUND {
        return (f as i64).to_string();
    }
    format_general(f, SIGNIFICANT_DIGITS)
}

/// Equivalent of printf's `%.<precision>g`.
pub fn format_general(f: f64, precision: usize) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f < 0.0 { "-inf" } else { "inf" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    // Rounding to `precision` digits first fixes the decimal exponent.
    let scientific = format!("{:.*e}", precision - 1, f);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let mantissa = strip_fraction_zeros(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    } else {
        let decimals = (precision as i32 - 1 - exponent) as usize;
        strip_fraction_zeros(&format!("{f:.decimals$}")).to_string()
    }
}

fn strip_fraction_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}
