//! Forgiving field deserializers for persisted records.
//!
//! Stored blobs may come from older app versions or hand edits, so scalar
//! fields accept the obvious literal coercions: `"true"` for `true`, `"3"` for
//! `3`, `42` for `"42"`. A JSON `null` is read as the field's default.

use chrono::{DateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Loose {
    fn describe(&self) -> String {
        match self {
            Loose::Bool(b) => format!("boolean {b}"),
            Loose::Int(i) => format!("integer {i}"),
            Loose::Float(f) => format!("number {f}"),
            Loose::Str(s) => format!("string {s:?}"),
        }
    }
}

fn loose_to_bool(value: Loose) -> Result<bool, String> {
    match value {
        Loose::Bool(b) => Ok(b),
        Loose::Int(0) => Ok(false),
        Loose::Int(1) => Ok(true),
        Loose::Str(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(format!("expected a boolean, got {}", value.describe())),
        },
        other => Err(format!("expected a boolean, got {}", other.describe())),
    }
}

/// Boolean with loose literals. A null value reads as `true`.
pub(crate) fn bool_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Loose>::deserialize(deserializer)? {
        None => Ok(true),
        Some(value) => loose_to_bool(value).map_err(D::Error::custom),
    }
}

pub(crate) fn i32_or_default<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<Loose>::deserialize(deserializer)? else {
        return Ok(0);
    };
    let wide = match value {
        Loose::Int(i) => i,
        Loose::Float(f) if f.fract() == 0.0 => f as i64,
        Loose::Str(ref s) => s.trim().parse::<i64>().map_err(|_| {
            D::Error::custom(format!("expected an integer, got {}", value.describe()))
        })?,
        other => {
            return Err(D::Error::custom(format!(
                "expected an integer, got {}",
                other.describe()
            )));
        }
    };
    i32::try_from(wide).map_err(|_| D::Error::custom(format!("integer {wide} out of range")))
}

pub(crate) fn string_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Loose>::deserialize(deserializer)? {
        None => String::new(),
        Some(Loose::Str(s)) => s,
        Some(Loose::Int(i)) => i.to_string(),
        Some(Loose::Float(f)) => f.to_string(),
        Some(Loose::Bool(b)) => b.to_string(),
    })
}

/// Epoch milliseconds as a number or numeric string; RFC 3339 text is also
/// accepted. Missing or null reads as the Unix epoch.
pub(crate) fn millis_or_epoch<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = match Option::<Loose>::deserialize(deserializer)? {
        None => return Ok(DateTime::<Utc>::UNIX_EPOCH),
        Some(Loose::Int(i)) => i,
        Some(Loose::Float(f)) => f as i64,
        Some(Loose::Str(s)) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                i
            } else {
                return DateTime::parse_from_rfc3339(trimmed)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| D::Error::custom(format!("invalid timestamp {s:?}: {e}")));
            }
        }
        Some(other) => {
            return Err(D::Error::custom(format!(
                "expected a timestamp, got {}",
                other.describe()
            )));
        }
    };
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| D::Error::custom(format!("timestamp {millis} out of range")))
}

pub(crate) fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_i64(value.timestamp_millis())
}
