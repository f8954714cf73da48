//! Unit conversion and display helpers shared by the forms and the CLI.

const CM_PER_FOOT: f64 = 30.48;
const CM_PER_INCH: f64 = 2.54;

/// Formats a height in centimetres as feet and inches, e.g. `5' 7''`.
///
/// Both parts are truncated, never rounded.
pub fn feet_inches(cm: i32) -> String {
    let cm = f64::from(cm);
    let feet = (cm / CM_PER_FOOT) as i64;
    let inches = (cm / CM_PER_INCH) as i64 % 12;
    format!("{feet}' {inches}''")
}

/// Formats `value / divisor` with at most two decimals and no trailing zeros.
///
/// Zero is always rendered as `0`.
pub fn fraction(value: i32, divisor: i32) -> String {
    if value == 0 || divisor == 0 {
        return "0".to_string();
    }
    let scaled = f64::from(value) / f64::from(divisor);
    let text = format!("{scaled:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Integer-divides a stored value back to control units, rounding toward zero.
pub fn from_store_units(raw: i32, scale: i32) -> i32 {
    if scale <= 1 {
        raw
    } else {
        raw / scale
    }
}

/// Converts a control value to stored units, saturating at the `i32` bounds.
pub fn to_store_units(value: i32, scale: i32) -> i32 {
    if scale <= 1 {
        value
    } else {
        value.saturating_mul(scale)
    }
}
