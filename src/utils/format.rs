//! Fixed-precision number formatting for plot labels.

/// Format `value` the way C's `%<width>.<precision>g` does.
///
/// The shorter of fixed and scientific notation is chosen from the decimal
/// exponent after rounding to `precision` significant digits, trailing zeros
/// are removed, and the result is right-aligned in `width` columns.
///
/// ```
/// use specfit_rs::utils::format::format_g;
///
/// assert_eq!(format_g(1.0, 6, 4), "     1");
/// assert_eq!(format_g(0.0123456, 6, 4), "0.01235");
/// assert_eq!(format_g(123456.0, 6, 4), "1.235e+05");
/// ```
pub fn format_g(value: f64, width: usize, precision: usize) -> String {
    format!("{:>width$}", format_g_body(value, precision), width = width)
}

fn format_g_body(value: f64, precision: usize) -> String {
    let precision = precision.max(1);

    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= precision as i32 {
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            if exponent < 0 { '-' } else { '+' },
            exponent.abs()
        )
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", decimals, value))
    }
}

fn trim_fraction(digits: &str) -> String {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        digits.to_string()
    }
}
