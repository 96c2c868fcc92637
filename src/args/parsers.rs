use std::time::Duration;

use super::types::PositiveU64;
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

/// Parses `<digits>[ms|s|m|h]`; a bare number means seconds. Zero is rejected.
///
/// # Errors
///
/// Returns an error when the value is malformed, overflows, or is zero.
pub fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    let duration = parse_duration_value(s)?;
    if duration.as_millis() == 0 {
        return Err(AppError::validation(ValidationError::DurationZero));
    }
    Ok(duration)
}

/// Same syntax as [`parse_duration_arg`], but `0` disables the pause.
///
/// # Errors
///
/// Returns an error when the value is malformed or overflows.
pub fn parse_pause_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let digits_len = value.chars().take_while(char::is_ascii_digit).count();
    if digits_len == 0 {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let (num_part, unit_part) = value.split_at(digits_len);
    let number: u64 = num_part
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let unit = if unit_part.is_empty() { "s" } else { unit_part };
    match unit {
        "ms" => Ok(Duration::from_millis(number)),
        "s" => Ok(Duration::from_secs(number)),
        "m" => number
            .checked_mul(60)
            .map(Duration::from_secs)
            .ok_or(ValidationError::DurationOverflow),
        "h" => number
            .checked_mul(60)
            .and_then(|minutes| minutes.checked_mul(60))
            .map(Duration::from_secs)
            .ok_or(ValidationError::DurationOverflow),
        _ => Err(ValidationError::InvalidDurationUnit {
            unit: unit.to_owned(),
        }),
    }
}

/// Parses a dispatch rate in requests per second; `0` means unlimited.
///
/// # Errors
///
/// Returns an error when the value is not a finite, non-negative number.
pub fn parse_rate(s: &str) -> AppResult<f64> {
    let value = s.trim();
    let rate: f64 = value.parse().map_err(|err| ValidationError::InvalidRate {
        value: value.to_owned(),
        source: err,
    })?;
    check_rate(rate).map_err(AppError::from)
}

/// Parses a success-rate percentage within `0..=100`.
///
/// # Errors
///
/// Returns an error when the value is not a number or is out of range.
pub fn parse_threshold(s: &str) -> AppResult<f64> {
    let value = s.trim();
    let threshold: f64 = value
        .parse()
        .map_err(|err| ValidationError::InvalidThreshold {
            value: value.to_owned(),
            source: err,
        })?;
    check_threshold(threshold).map_err(AppError::from)
}

pub(crate) fn check_rate(rate: f64) -> Result<f64, ValidationError> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(ValidationError::NegativeRate { value: rate });
    }
    Ok(rate)
}

pub(crate) fn check_threshold(threshold: f64) -> Result<f64, ValidationError> {
    if !(0.0..=100.0).contains(&threshold) {
        return Err(ValidationError::ThresholdOutOfRange { value: threshold });
    }
    Ok(threshold)
}
