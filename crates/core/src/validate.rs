//! Validation helpers applied at the argument boundary.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValidationError;

/// Deserialize a raw tool argument bag. A missing bag (`null`) is treated as an
/// empty object so that every field falls back to its default.
pub fn parse_args<T>(arguments: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned,
{
    let arguments = match arguments {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|e| ValidationError::new("arguments", e.to_string()))
}

/// Apply a default and check an inclusive integer range.
pub fn bounded(
    field: &str,
    value: Option<i64>,
    default: u32,
    min: u32,
    max: u32,
) -> Result<u32, ValidationError> {
    let value = value.unwrap_or(i64::from(default));
    if value < i64::from(min) || value > i64::from(max) {
        return Err(ValidationError::new(
            field,
            format!("must be between {min} and {max}, got {value}"),
        ));
    }
    Ok(value as u32)
}

/// Apply a default of zero and reject negative offsets.
pub fn offset(field: &str, value: Option<i64>) -> Result<u32, ValidationError> {
    match value {
        None => Ok(0),
        Some(v) if v < 0 => Err(ValidationError::new(
            field,
            format!("must be greater than or equal to 0, got {v}"),
        )),
        Some(v) => u32::try_from(v)
            .map_err(|_| ValidationError::new(field, format!("is too large: {v}"))),
    }
}

/// Empty or whitespace-only strings count as absent.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Drop empty entries from a term list.
pub fn terms(values: Option<Vec<String>>) -> Vec<String> {
    values
        .unwrap_or_default()
        .into_iter()
        .filter(|v| !v.trim().is_empty())
        .collect()
}

/// Accept ISO-8601 dates and date-times, plus the `yyyy/MM/dd [HH:mm]` form
/// JQL itself understands. The string is returned untouched.
pub fn date(field: &str, value: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(value) = present(value) else {
        return Ok(None);
    };
    let trimmed = value.trim();

    let valid = DateTime::parse_from_rfc3339(trimmed).is_ok()
        || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
        || NaiveDate::parse_from_str(trimmed, "%Y/%m/%d").is_ok()
        || NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f").is_ok()
        || NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M").is_ok()
        || NaiveDateTime::parse_from_str(trimmed, "%Y/%m/%d %H:%M").is_ok();

    if valid {
        Ok(Some(trimmed.to_string()))
    } else {
        Err(ValidationError::new(
            field,
            format!("'{value}' is not a valid ISO-8601 date"),
        ))
    }
}
