//! Opening hours document shape.
//!
//! Day data is read in the upstream snake_case form and written to the index
//! in camelCase.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One time window of a day, as reported by the opening hours source.
///
/// Fields of an unexpected type read as absent so that one odd window does
/// not invalidate the rest of the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct OpeningHoursTimes {
    /// `HH:MM:SS`, absent for full-day windows.
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_time: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub end_time_on_next_day: bool,
    /// `open`, `closed`, or another state that is ignored when computing ranges.
    #[serde(default, deserialize_with = "lenient_string")]
    pub resource_state: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub full_day: bool,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(false))
}

/// All time windows of one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpeningHoursDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub times: Vec<OpeningHoursTimes>,
}

/// An open range stored in a `date_range` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningHoursTimesRange {
    /// Inclusive start, RFC 3339.
    pub gte: String,
    /// Exclusive end, RFC 3339.
    pub lt: String,
}

/// Opening hours of one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningHours {
    pub url: String,
    pub is_open_now_url: String,
    /// Source day list with keys in camelCase, every field kept.
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default)]
    pub open_ranges: Vec<OpeningHoursTimesRange>,
}

impl OpeningHours {
    /// Opening hours without data, used when the source could not be reached.
    pub fn empty(url: impl Into<String>, is_open_now_url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_open_now_url: is_open_now_url.into(),
            data: Vec::new(),
            open_ranges: Vec::new(),
        }
    }
}

/// Rename every object key from snake_case to camelCase, recursively.
pub fn camelize(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (camel_case(&key), camelize(value)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize).collect()),
        other => other,
    }
}

fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for c in key.chars() {
        if c == '_' && !out.is_empty() {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
