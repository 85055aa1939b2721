//! Integration tests for suite stores.
//!
//! Every scenario runs against both the local-directory and the in-memory
//! object store backend.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use expectations_core::{AssertionConfig, DataValue, ExpectationSuite, RunContext, SuiteBuilder};
use expectations_store::{
    LocalDirectoryBackend, ObjectStoreBackend, SavePolicy, StoreBackend, StoreConfig, StoreError,
    SuiteStore, result_key, suite_key,
};
use expectations_validator::{DataRow, Dataset, Validator};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A store plus whatever keeps its storage alive.
struct Fixture {
    store: SuiteStore,
    _dir: Option<TempDir>,
}

fn fixtures() -> Vec<Fixture> {
    let dir = tempfile::tempdir().unwrap();
    vec![
        Fixture {
            store: SuiteStore::new(Arc::new(LocalDirectoryBackend::new(dir.path()))),
            _dir: Some(dir),
        },
        Fixture {
            store: SuiteStore::new(Arc::new(ObjectStoreBackend::in_memory())),
            _dir: None,
        },
    ]
}

fn trips_suite(validator: &Validator) -> ExpectationSuite {
    SuiteBuilder::new("yellow_trips")
        .meta("owner", "mobility-analytics")
        .expectation(AssertionConfig::not_null("vendor_id"))
        .expectation(AssertionConfig::values_in_set("vendor_id", [1, 2]))
        .expectation(AssertionConfig::values_between("fare_amount", Some(0.0), Some(500.0)).mostly(0.99))
        .build(validator.registry().as_ref())
        .unwrap()
}

fn trips_dataset() -> Dataset {
    let rows = [(1, 12.5), (3, 7.0), (2, -4.0)]
        .into_iter()
        .map(|(vendor, fare)| {
            DataRow::from([
                ("vendor_id".to_string(), DataValue::Int(vendor)),
                ("fare_amount".to_string(), DataValue::Float(fare)),
            ])
        })
        .collect();
    Dataset::from_rows("trips-2024-01", rows).unwrap()
}

fn fixed_context() -> RunContext {
    RunContext::new()
        .with_run_time(Utc.with_ymd_and_hms(2024, 2, 1, 6, 0, 0).unwrap())
        .with_timing(false)
}

#[tokio::test]
async fn test_suite_round_trip() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    for fixture in fixtures() {
        let key = suite_key(&suite.name);
        fixture.store.save_suite(&key, &suite).await.unwrap();
        let loaded = fixture.store.load_suite(&key).await.unwrap();
        assert_eq!(loaded, suite, "{}", fixture.store.backend().describe());
        loaded.validate(validator.registry().as_ref()).unwrap();
    }
}

#[tokio::test]
async fn test_loaded_suite_is_an_independent_draft() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    for fixture in fixtures() {
        fixture.store.save_suite("expectations/trips", &suite).await.unwrap();

        let mut draft = fixture.store.load_suite("expectations/trips").await.unwrap();
        draft.remove(|c| c.column == "fare_amount");

        let again = fixture.store.load_suite("expectations/trips").await.unwrap();
        assert_eq!(again.len(), 3);
        assert_eq!(draft.len(), 2);
    }
}

#[tokio::test]
async fn test_missing_key_is_not_found() {
    for fixture in fixtures() {
        let err = fixture
            .store
            .load_suite("expectations/ghost")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(key) if key == "expectations/ghost"));

        let err = fixture.store.delete("expectations/ghost").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_invalid_keys_rejected() {
    let suite = ExpectationSuite::new("x");
    for fixture in fixtures() {
        for key in ["", "expectations//x", "../x", "expectations/./x"] {
            let err = fixture.store.save_suite(key, &suite).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidKey(_)), "key {:?}", key);
        }
    }
}

#[tokio::test]
async fn test_list_and_delete() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    let result = validator
        .run(&trips_dataset(), &suite, &fixed_context())
        .unwrap();

    for fixture in fixtures() {
        let store = &fixture.store;
        store.save_suite("expectations/yellow_trips", &suite).await.unwrap();
        store.save_suite("expectations/green_trips", &suite).await.unwrap();
        store.save_result(&result_key(&result), &result).await.unwrap();

        assert_eq!(
            store.list("expectations").await.unwrap(),
            vec!["expectations/green_trips", "expectations/yellow_trips"]
        );
        assert_eq!(
            store.list("").await.unwrap(),
            vec![
                "expectations/green_trips",
                "expectations/yellow_trips",
                "validations/yellow_trips/20240201T060000.000Z",
            ]
        );

        store.delete("expectations/green_trips").await.unwrap();
        assert_eq!(
            store.list("expectations/").await.unwrap(),
            vec!["expectations/yellow_trips"]
        );
    }
}

#[tokio::test]
async fn test_result_round_trip() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    let result = validator
        .run(&trips_dataset(), &suite, &fixed_context())
        .unwrap();
    assert!(!result.success);

    for fixture in fixtures() {
        let key = result_key(&result);
        fixture.store.save_result(&key, &result).await.unwrap();
        assert_eq!(fixture.store.load_result(&key).await.unwrap(), result);
    }
}

#[tokio::test]
async fn test_result_with_timestamp_like_strings_reloads_unchanged() {
    let validator = Validator::with_builtins();
    let suite = SuiteBuilder::new("pickups")
        .expectation(AssertionConfig::values_in_set("pickup_datetime", ["x"]))
        .expectation(AssertionConfig::column_max_between(
            "dropoff_datetime",
            None::<&str>,
            Some("2030-01-01T00:00:00Z"),
        ))
        .build(validator.registry().as_ref())
        .unwrap();
    let dropoff = Utc.with_ymd_and_hms(2019, 1, 1, 1, 2, 3).unwrap();
    let rows = vec![DataRow::from([
        (
            "pickup_datetime".to_string(),
            DataValue::from("2019-01-01T00:46:40Z"),
        ),
        ("dropoff_datetime".to_string(), DataValue::Timestamp(dropoff)),
    ])];
    let dataset = Dataset::from_rows("pickups-2019-01", rows).unwrap();
    let result = validator.run(&dataset, &suite, &fixed_context()).unwrap();

    assert_eq!(
        result.outcomes[0].unexpected_sample,
        vec![DataValue::from("2019-01-01T00:46:40Z")]
    );
    assert_eq!(
        result.outcomes[1].observed_value,
        Some(DataValue::Timestamp(dropoff))
    );

    for fixture in fixtures() {
        let key = result_key(&result);
        fixture.store.save_result(&key, &result).await.unwrap();
        let loaded = fixture.store.load_result(&key).await.unwrap();
        assert_eq!(
            loaded.outcomes[0].unexpected_sample,
            vec![DataValue::String("2019-01-01T00:46:40Z".to_string())]
        );
        assert_eq!(loaded, result, "{}", fixture.store.backend().describe());
    }
}

#[tokio::test]
async fn test_overwrite_drops_removed_assertions() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    for fixture in fixtures() {
        fixture.store.save_suite("expectations/trips", &suite).await.unwrap();

        let mut edited = suite.clone();
        edited.remove(|c| c.expectation_type == "values_in_set");
        fixture.store.save_suite("expectations/trips", &edited).await.unwrap();

        let stored = fixture.store.load_suite("expectations/trips").await.unwrap();
        assert_eq!(stored, edited);
    }
}

#[tokio::test]
async fn test_preserve_failed_keeps_dropped_failures() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    // vendor 3 breaks values_in_set, fare -4.0 breaks values_between.
    let result = validator
        .run(&trips_dataset(), &suite, &fixed_context())
        .unwrap();

    for fixture in fixtures() {
        fixture.store.save_suite("expectations/trips", &suite).await.unwrap();

        let edited = SuiteBuilder::new("yellow_trips")
            .expectation(AssertionConfig::unique("vendor_id"))
            .build(validator.registry().as_ref())
            .unwrap();
        let stored = fixture
            .store
            .save_suite_with(
                "expectations/trips",
                &edited,
                &SavePolicy::PreserveFailed(&result),
            )
            .await
            .unwrap();

        assert_eq!(
            stored.list().to_vec(),
            vec![
                AssertionConfig::unique("vendor_id"),
                AssertionConfig::values_in_set("vendor_id", [1, 2]),
                AssertionConfig::values_between("fare_amount", Some(0.0), Some(500.0)).mostly(0.99),
            ]
        );
        assert_eq!(
            fixture.store.load_suite("expectations/trips").await.unwrap(),
            stored
        );
    }
}

#[tokio::test]
async fn test_preserve_failed_without_previous_snapshot() {
    let validator = Validator::with_builtins();
    let suite = trips_suite(&validator);
    let result = validator
        .run(&trips_dataset(), &suite, &fixed_context())
        .unwrap();

    for fixture in fixtures() {
        let stored = fixture
            .store
            .save_suite_with("expectations/new", &suite, &SavePolicy::PreserveFailed(&result))
            .await
            .unwrap();
        assert_eq!(stored, suite);
    }
}

#[tokio::test]
async fn test_malformed_document_is_serialization_error() {
    for fixture in fixtures() {
        fixture
            .store
            .backend()
            .save("expectations/broken", &serde_json::json!({"name": 42}))
            .await
            .unwrap();
        let err = fixture
            .store
            .load_suite("expectations/broken")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }
}

/// Never answers within any reasonable timeout.
struct StalledBackend;

#[async_trait]
impl StoreBackend for StalledBackend {
    async fn save(&self, _key: &str, _document: &Value) -> expectations_store::Result<()> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    }

    async fn load(&self, _key: &str) -> expectations_store::Result<Value> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Value::Null)
    }

    async fn delete(&self, _key: &str) -> expectations_store::Result<()> {
        Ok(())
    }

    async fn list(&self, _prefix: &str) -> expectations_store::Result<Vec<String>> {
        Ok(Vec::new())
    }

    fn describe(&self) -> String {
        "stalled".to_string()
    }
}

#[tokio::test]
async fn test_timeout_reports_unavailable() {
    let store =
        SuiteStore::new(Arc::new(StalledBackend)).with_timeout(Duration::from_millis(20));

    let err = store
        .save_suite("expectations/trips", &ExpectationSuite::new("trips"))
        .await
        .unwrap_err();
    match err {
        StoreError::Unavailable { backend, message } => {
            assert_eq!(backend, "stalled");
            assert!(message.contains("timed out"), "{}", message);
        }
        other => panic!("expected Unavailable, got {:?}", other),
    }

    assert!(matches!(
        store.load_suite("expectations/trips").await,
        Err(StoreError::Unavailable { .. })
    ));
}

#[tokio::test]
async fn test_open_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config: StoreConfig = serde_json::from_value(serde_json::json!({
        "backend": {"type": "local", "root": dir.path()},
        "timeout_ms": 5000
    }))
    .unwrap();
    assert_eq!(config.timeout(), Duration::from_secs(5));
    let store = config.open().unwrap();

    let suite = ExpectationSuite::new("trips");
    store.save_suite("expectations/trips", &suite).await.unwrap();
    assert!(dir.path().join("expectations").join("trips.json").exists());
}
