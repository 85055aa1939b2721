//! Store key conventions.

use crate::{Result, StoreError};
use expectations_core::ValidationResult;

/// Key prefix under which suites are stored.
pub const SUITE_PREFIX: &str = "expectations";

/// Key prefix under which validation results are stored.
pub const RESULT_PREFIX: &str = "validations";

/// Key of the suite with the given name.
pub fn suite_key(name: &str) -> String {
    format!("{}/{}", SUITE_PREFIX, name)
}

/// Key of a validation result: suite name plus run timestamp to the
/// millisecond.
pub fn result_key(result: &ValidationResult) -> String {
    format!(
        "{}/{}/{}",
        RESULT_PREFIX,
        result.suite_name,
        result.timestamp.format("%Y%m%dT%H%M%S%.3fZ")
    )
}

/// Splits a key into its segments, rejecting empty keys and empty, `.` or
/// `..` segments.
pub fn validate_key(key: &str) -> Result<Vec<&str>> {
    let segments: Vec<&str> = key.split('/').collect();
    let valid = !key.is_empty()
        && segments
            .iter()
            .all(|s| !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\'));
    if valid {
        Ok(segments)
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Validates a list prefix. The empty prefix selects every key.
pub(crate) fn validate_prefix(prefix: &str) -> Result<Vec<&str>> {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() {
        Ok(Vec::new())
    } else {
        validate_key(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    #[test]
    fn test_suite_key() {
        assert_eq!(suite_key("yellow_trips"), "expectations/yellow_trips");
    }

    #[test]
    fn test_result_key() {
        let result = ValidationResult::new(
            "yellow_trips",
            "trips-2024-01",
            Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap(),
            Vec::new(),
            BTreeMap::new(),
        );
        assert_eq!(
            result_key(&result),
            "validations/yellow_trips/20240201T060000.000Z"
        );
    }

    #[test]
    fn test_result_keys_differ_within_a_second() {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap();
        let first = ValidationResult::new("yellow_trips", "a", at, Vec::new(), BTreeMap::new());
        let second = ValidationResult::new(
            "yellow_trips",
            "a",
            at + chrono::Duration::milliseconds(250),
            Vec::new(),
            BTreeMap::new(),
        );

        assert_eq!(
            result_key(&second),
            "validations/yellow_trips/20240201T060000.250Z"
        );
        assert_ne!(result_key(&first), result_key(&second));
    }

    #[test]
    fn test_validate_key() {
        assert_eq!(
            validate_key("expectations/yellow_trips").unwrap(),
            vec!["expectations", "yellow_trips"]
        );
        for bad in ["", "/abs", "a//b", "a/./b", "../etc/passwd", "trailing/", "a\\b"] {
            assert!(
                matches!(validate_key(bad), Err(StoreError::InvalidKey(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_prefix() {
        assert!(validate_prefix("").unwrap().is_empty());
        assert_eq!(validate_prefix("validations/").unwrap(), vec!["validations"]);
        assert!(validate_prefix("../").is_err());
    }
}
