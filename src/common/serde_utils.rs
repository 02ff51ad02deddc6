// src/common/serde_utils.rs
//
// Form helpers: the SPA posts `""` for untouched inputs and numbers either as
// JSON numbers or strings, so blank strings are read as "no value".

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de::Error as _, Deserialize, Deserializer};
use serde_json::Value;

/// `""` and whitespace-only strings become `None`; other strings are trimmed.
pub fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }))
}

/// Patch flavour of [`empty_string_as_none`]. Use with `#[serde(default)]` on an
/// `Option<Option<String>>`: absent -> `None`, `null` or blank -> `Some(None)`,
/// value -> `Some(Some(v))`.
pub fn patch_string<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_string_as_none(deserializer).map(Some)
}

pub fn decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    optional_decimal(deserializer)?.ok_or_else(|| D::Error::custom("a number is required"))
}

pub fn optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    parse_decimal(&value).map_err(D::Error::custom)
}

pub fn patch_decimal<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_decimal(deserializer).map(Some)
}

fn parse_decimal(value: &Value) -> Result<Option<Decimal>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => from_text(s.trim()).map(Some),
        Value::Number(n) => from_text(&n.to_string()).map(Some),
        other => Err(format!("expected a number, found {}", other)),
    }
}

fn from_text(text: &str) -> Result<Decimal, String> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| format!("{:?} is not a valid number", text))
}
