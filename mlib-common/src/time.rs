//! Timestamp utilities
//!
//! Release dates arrive in several shapes: RFC 3339 from API clients, plain
//! ISO dates, and the day-first dotted form (`16.07.2006`) emitted by the
//! metadata service. All of them normalize to a UTC timestamp; a date with no
//! time component is midnight UTC.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Parse a release date in any accepted input format
pub fn parse_release_date(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Ok(midnight.and_utc());
            }
        }
    }

    Err(Error::InvalidInput(format!(
        "unrecognized release date '{}' (expected RFC 3339, YYYY-MM-DD or DD.MM.YYYY)",
        raw
    )))
}

/// Format a timestamp the way the API emits it
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Serde adapter for optional release dates
///
/// Use with `#[serde(default, with = "mlib_common::time::release_date")]`.
/// `null`, a missing field, and an empty string all mean "no date".
pub mod release_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&super::format_timestamp(dt)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            Some(s) if !s.trim().is_empty() => super::parse_release_date(&s)
                .map(Some)
                .map_err(serde::de::Error::custom),
            _ => Ok(None),
        }
    }
}
