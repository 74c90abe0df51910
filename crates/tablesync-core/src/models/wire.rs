//! Lenient field decoders for remote payloads.
//!
//! The restaurant service has returned booleans and numbers as strings
//! (`"is_favorite": "true"`, `"rating": "4"`) depending on how a record was
//! last written. These helpers accept both shapes; serialization always
//! writes native JSON values.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum BoolLike {
    Bool(bool),
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Decode a boolean that may arrive as `true`, `"true"`, `1` or `null`.
///
/// `null` and a missing field decode as `false`.
pub fn bool_or_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<BoolLike>::deserialize(deserializer)? {
        None => Ok(false),
        Some(BoolLike::Bool(value)) => Ok(value),
        Some(BoolLike::Number(value)) => Ok(value != 0),
        Some(BoolLike::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            other => Err(D::Error::custom(format!("invalid boolean value '{other}'"))),
        },
    }
}

/// Decode an integer that may arrive as a number or a numeric string.
pub fn i64_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    number_like_to_i64(NumberLike::deserialize(deserializer)?).map_err(D::Error::custom)
}

/// Decode a 1..=5 star rating that may arrive as a number or a numeric string.
pub fn rating_or_string<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = number_like_to_i64(NumberLike::deserialize(deserializer)?)
        .map_err(D::Error::custom)?;
    u8::try_from(value)
        .ok()
        .filter(|rating| (1..=5).contains(rating))
        .ok_or_else(|| D::Error::custom(format!("rating {value} is outside 1..=5")))
}

/// Decode an optional timestamp in unix milliseconds.
///
/// Accepts a number, a numeric string, or an RFC 3339 date string.
pub fn timestamp_millis_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<NumberLike>::deserialize(deserializer)? else {
        return Ok(None);
    };

    if let NumberLike::Text(text) = &raw {
        if let Ok(parsed) = chrono::DateTime::parse_from_rfc3339(text.trim()) {
            return Ok(Some(parsed.timestamp_millis()));
        }
    }

    number_like_to_i64(raw).map(Some).map_err(D::Error::custom)
}

#[allow(clippy::cast_possible_truncation)]
fn number_like_to_i64(value: NumberLike) -> Result<i64, String> {
    match value {
        NumberLike::Int(value) => Ok(value),
        NumberLike::Float(value) if value.fract() == 0.0 => Ok(value as i64),
        NumberLike::Float(value) => Err(format!("expected an integer, got {value}")),
        NumberLike::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("expected an integer, got '{text}'")),
    }
}
