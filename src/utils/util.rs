use crate::error::JacquardResult;
use std::{
    fmt::{Binary, Display},
    sync::Once,
};

pub type Result<T> = JacquardResult<T>;

/// Missing value marker for VCF columns and FORMAT tag values.
pub const MISSING_VALUE: &str = ".";

/// Significant digits used when rendering a float as text.
const FLOAT_SIGNIFICANT_DIGITS: i32 = 12;

#[allow(unused)]
static INIT_LOG: Once = Once::new();

#[allow(unused)]
pub fn init_logger() {
    INIT_LOG.call_once(|| {
        env_logger::builder()
            .filter_level(log::LevelFilter::Trace)
            .is_test(true)
            .init();
    });
}

pub fn handle_error_and_exit(err: impl Display) -> ! {
    log::error!("{err}");
    std::process::exit(1);
}

/// Renders a float using 12 significant digits, trailing zeros trimmed and
/// at least one fractional digit kept (`1.0`, `0.2`, `1e-05`).
pub fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0.0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }

    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= FLOAT_SIGNIFICANT_DIGITS {
        return format_scientific(value);
    }

    let decimals = (FLOAT_SIGNIFICANT_DIGITS - 1 - exponent).max(0) as usize;
    let fixed = format!("{:.*}", decimals, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    if trimmed.contains('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.0")
    }
}

fn format_scientific(value: f64) -> String {
    let rendered = format!("{:.*e}", (FLOAT_SIGNIFICANT_DIGITS - 1) as usize, value);
    let (mantissa, exponent) = rendered.split_once('e').unwrap_or((rendered.as_str(), "0"));
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
    };
    format!("{mantissa}e{sign}{digits:0>2}")
}

/// Rounds a decimal string to two fractional digits.
///
/// Values already carrying at most two fractional digits (or none) are
/// returned untouched. Otherwise the value is scaled by 100, rounded half
/// away from zero and scaled back, so `0.205` becomes `0.21`.
pub fn round_two_digits(value: &str) -> Result<String> {
    let fraction_len = match value.split_once('.') {
        Some((_, fraction)) => fraction.len(),
        None => return Ok(value.to_string()),
    };
    if fraction_len <= 2 {
        return Ok(value.to_string());
    }
    let parsed: f64 = value.parse()?;
    Ok(format_float((100.0 * parsed).round() / 100.0))
}

/// Rounds a float the same way [`round_two_digits`] rounds its text form.
pub fn round_float_two_digits(value: f64) -> Result<String> {
    round_two_digits(&format_float(value))
}

/// Parses a numeric value, `None` for the VCF missing marker.
pub fn parse_optional_f64(value: &str) -> std::result::Result<Option<f64>, std::num::ParseFloatError> {
    if value == MISSING_VALUE || value.is_empty() {
        return Ok(None);
    }
    value.parse::<f64>().map(Some)
}

pub fn format_number_with_commas<T>(n: T) -> String
where
    T: Display + Binary,
{
    let s = n.to_string();
    let (sign, digits) = s.strip_prefix('-').map_or(("", s.as_str()), |d| ("-", d));

    if let 0..=3 = digits.len() {
        return s;
    }

    let mut result = String::with_capacity(digits.len() + (digits.len() - 1) / 3 + sign.len());
    for (digit_count, c) in digits.chars().rev().enumerate() {
        if digit_count > 0 && digit_count % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result = result.chars().rev().collect();
    if !sign.is_empty() {
        result.insert_str(0, sign);
    }

    result
}
