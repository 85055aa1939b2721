use anyhow::{Context, Result};
use expectations_parser::parse_file;
use expectations_store::{SavePolicy, suite_key};
use expectations_validator::ExpectationRegistry;
use std::path::Path;
use tracing::info;

use super::open_store;
use crate::output;

pub async fn execute(
    suite_path: &str,
    store_root: &Path,
    key: Option<&str>,
    preserve_failed: Option<&str>,
) -> Result<()> {
    let suite = parse_file(Path::new(suite_path))
        .with_context(|| format!("Failed to parse suite file: {}", suite_path))?;

    let registry = ExpectationRegistry::with_builtins();
    suite
        .validate(&registry)
        .with_context(|| format!("Suite '{}' has an invalid assertion", suite.name))?;

    let key = key.map(str::to_string).unwrap_or_else(|| suite_key(&suite.name));
    let store = open_store(store_root)?;

    let stored = match preserve_failed {
        Some(result_key) => {
            info!("Preserving assertions that failed in '{}'", result_key);
            let result = store
                .load_result(result_key)
                .await
                .with_context(|| format!("Failed to load validation result '{}'", result_key))?;
            store
                .save_suite_with(&key, &suite, &SavePolicy::PreserveFailed(&result))
                .await
        }
        None => store
            .save_suite_with(&key, &suite, &SavePolicy::Overwrite)
            .await,
    }
    .with_context(|| format!("Failed to save suite under '{}'", key))?;

    let kept = stored.len().saturating_sub(suite.len());
    if kept > 0 {
        output::print_info(&format!(
            "Kept {} previously failed assertion(s) missing from the suite file",
            kept
        ));
    }
    output::print_success(&format!(
        "Saved suite '{}' ({} assertions) under '{}'",
        stored.name,
        stored.len(),
        key
    ));

    Ok(())
}
