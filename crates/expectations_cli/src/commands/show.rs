use anyhow::{Context, Result};
use expectations_parser::{SuiteFormat, to_string};
use expectations_store::RESULT_PREFIX;
use std::path::Path;

use super::open_store;
use crate::output;

/// Prints a stored entry. Keys under the result prefix are shown as
/// validation reports; anything else is read as a suite.
pub async fn execute(key: &str, store_root: &Path, format: &str) -> Result<()> {
    let store = open_store(store_root)?;

    if key.split('/').next() == Some(RESULT_PREFIX) {
        let result = store
            .load_result(key)
            .await
            .with_context(|| format!("Failed to load validation result '{}'", key))?;
        return output::print_validation_report(&result, format);
    }

    let suite = store
        .load_suite(key)
        .await
        .with_context(|| format!("Failed to load suite '{}'", key))?;

    let rendered = match format {
        "json" => suite.to_json()?,
        _ => to_string(&suite, SuiteFormat::Yaml)?,
    };
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }

    Ok(())
}
