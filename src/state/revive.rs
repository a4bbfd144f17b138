//! Date revival for stored JSON.
//!
//! Stored dates are RFC 3339 strings. Older data also holds date-times
//! without an offset, or bare calendar dates. Revival rewrites the former
//! everywhere in a document so typed deserialization into
//! `DateTime<Utc>` succeeds; bare dates are only rewritten for known date
//! fields (see [`crate::state::migration`]).

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

/// True when `s` starts with `YYYY-MM-DDTHH:MM:SS`.
pub fn has_datetime_prefix(s: &str) -> bool {
    const PATTERN: &[u8] = b"dddd-dd-ddTdd:dd:dd";
    let bytes = s.as_bytes();
    bytes.len() >= PATTERN.len()
        && PATTERN.iter().zip(bytes).all(|(p, b)| match p {
            b'd' => b.is_ascii_digit(),
            other => other == b,
        })
}

/// Parse a stored date leniently.
///
/// Accepts RFC 3339, offset-less date-times (read as UTC) and bare dates
/// (midnight UTC).
pub fn parse_date_lenient(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Canonical stored form of a date.
pub fn canonical(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Rewrite one string if it is a date that is not already RFC 3339.
///
/// Returns `None` when the string should be left alone.
pub fn revive_date_string(s: &str) -> Option<String> {
    if DateTime::parse_from_rfc3339(s).is_ok() {
        return None;
    }
    parse_date_lenient(s).map(|dt| canonical(&dt))
}

/// Revive every date-time-like string in `value`, recursively.
///
/// Returns how many strings were rewritten. Strings that merely start like a
/// date but do not parse as one are left untouched.
pub fn revive(value: &mut Value) -> usize {
    match value {
        Value::String(s) if has_datetime_prefix(s) => match revive_date_string(s) {
            Some(fixed) => {
                *s = fixed;
                1
            }
            None => 0,
        },
        Value::Array(items) => items.iter_mut().map(revive).sum(),
        Value::Object(map) => map.values_mut().map(revive).sum(),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_prefix_detection() {
        assert!(has_datetime_prefix("2024-04-15T10:00:00.000Z"));
        assert!(has_datetime_prefix("2024-04-15T10:00:00"));
        assert!(!has_datetime_prefix("2024-04-15"));
        assert!(!has_datetime_prefix("Spring 2024-04-15T10:00:00"));
        assert!(!has_datetime_prefix("测试项目"));
    }

    #[test]
    fn test_lenient_parsing() {
        let expected = Utc.with_ymd_and_hms(2024, 4, 15, 10, 0, 0).unwrap();
        assert_eq!(parse_date_lenient("2024-04-15T10:00:00Z"), Some(expected));
        assert_eq!(parse_date_lenient("2024-04-15T18:00:00+08:00"), Some(expected));
        assert_eq!(parse_date_lenient("2024-04-15T10:00:00"), Some(expected));
        assert_eq!(
            parse_date_lenient("2024-04-15"),
            Some(Utc.with_ymd_and_hms(2024, 4, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date_lenient("tomorrow"), None);
    }

    #[test]
    fn test_revive_rewrites_nested_offsetless_dates() {
        let mut doc = json!({
            "createdAt": "2024-03-01T09:00:00.000Z",
            "checklist": [
                { "task": "2024-03-01T09:00:00 is not a date", "dueDate": "2024-04-15T10:00:00" }
            ],
            "shootDate": "2024-04-15",
            "budget": 2000
        });

        let changed = revive(&mut doc);

        assert_eq!(changed, 1);
        assert_eq!(doc["checklist"][0]["dueDate"], "2024-04-15T10:00:00Z");
        assert_eq!(doc["createdAt"], "2024-03-01T09:00:00.000Z");
        assert_eq!(doc["checklist"][0]["task"], "2024-03-01T09:00:00 is not a date");
        // Bare dates are not date-times; they are left for targeted migration
        assert_eq!(doc["shootDate"], "2024-04-15");
    }
}
