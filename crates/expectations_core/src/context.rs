//! Run configuration passed explicitly to every validation run.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Default cap on the number of unexpected values kept per outcome.
pub const DEFAULT_SAMPLE_LIMIT: usize = 20;

/// Context for validation runs.
///
/// Carries the options of a single run. There is no ambient project state:
/// two runs with different contexts never influence each other.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Abort on configuration errors instead of reporting them as failed outcomes
    pub strict: bool,

    /// Maximum number of unexpected values sampled per outcome
    pub sample_limit: usize,

    /// Fixed run timestamp; the current time is used when unset
    pub run_time: Option<DateTime<Utc>>,

    /// Whether per-assertion durations are recorded
    pub record_timing: bool,

    /// Additional metadata copied into the validation result
    pub metadata: BTreeMap<String, String>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            strict: false,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
            run_time: None,
            record_timing: false,
            metadata: BTreeMap::new(),
        }
    }
}

impl RunContext {
    /// Creates a new run context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets strict mode.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Sets the unexpected-value sample limit.
    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Pins the run timestamp.
    pub fn with_run_time(mut self, run_time: DateTime<Utc>) -> Self {
        self.run_time = Some(run_time);
        self
    }

    /// Enables or disables per-assertion timing.
    pub fn with_timing(mut self, record_timing: bool) -> Self {
        self.record_timing = record_timing;
        self
    }

    /// Adds metadata to the context.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Returns the pinned run time or the current time.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.run_time.unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_defaults() {
        let context = RunContext::new();
        assert!(!context.strict);
        assert_eq!(context.sample_limit, 20);
        assert!(!context.record_timing);
        assert!(context.run_time.is_none());
    }

    #[test]
    fn test_builder_methods() {
        let at = Utc.with_ymd_and_hms(2019, 1, 31, 0, 0, 0).unwrap();
        let context = RunContext::new()
            .with_strict(true)
            .with_sample_limit(5)
            .with_run_time(at)
            .with_timing(true)
            .with_metadata("checkpoint", "taxi_nightly");

        assert!(context.strict);
        assert_eq!(context.sample_limit, 5);
        assert_eq!(context.timestamp(), at);
        assert!(context.record_timing);
        assert_eq!(context.metadata.get("checkpoint").unwrap(), "taxi_nightly");
    }
}
