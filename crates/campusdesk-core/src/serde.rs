//! Deserialization helpers for query strings.
//!
//! HTML forms and hand-built URLs often send empty values (`?class_id=`).
//! These helpers treat an empty string as `None` instead of failing.

use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Parses any `FromStr` value, treating blank input as `None`.
pub fn deserialize_optional_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_parsed(deserializer)
}

pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_parsed(deserializer)
}

/// Empty or whitespace-only strings become `None`, others are trimmed.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Query {
        #[serde(default, deserialize_with = "deserialize_optional_parsed")]
        id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        active: Option<bool>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        search: Option<String>,
    }

    #[test]
    fn test_empty_values_become_none() {
        let q: Query = serde_json::from_str(r#"{"id":"","active":"","search":"  "}"#).unwrap();
        assert!(q.id.is_none());
        assert!(q.active.is_none());
        assert!(q.search.is_none());
    }

    #[test]
    fn test_values_are_parsed() {
        let q: Query = serde_json::from_str(
            r#"{"id":"12345678-1234-1234-1234-123456789abc","active":"true","search":" kumar "}"#,
        )
        .unwrap();
        assert_eq!(
            q.id,
            Some(Uuid::from_u128(0x12345678_1234_1234_1234_123456789abc))
        );
        assert_eq!(q.active, Some(true));
        assert_eq!(q.search.as_deref(), Some("kumar"));
    }

    #[test]
    fn test_invalid_uuid_is_rejected() {
        assert!(serde_json::from_str::<Query>(r#"{"id":"nope"}"#).is_err());
    }
}
