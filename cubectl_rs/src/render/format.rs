//! Scalar formatting for rendered cells and lines.

use super::Scalar;

/// Integral numbers print without a decimal point; everything else numeric
/// prints with six decimals. Strings are verbatim.
pub fn format_scalar(scalar: &Scalar) -> String {
    match scalar {
        Scalar::Null => "null".to_string(),
        Scalar::Bool(value) => value.to_string(),
        Scalar::String(value) => value.clone(),
        Scalar::Number(number) => {
            if number.is_i64() || number.is_u64() {
                return number.to_string();
            }
            match number.as_f64() {
                Some(value) => format_float(value),
                None => number.to_string(),
            }
        }
    }
}

fn format_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e21 {
        format!("{:.0}", value)
    } else {
        format!("{:.6}", value)
    }
}
