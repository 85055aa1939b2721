use anyhow::{Context, Result};
use expectations_core::RunContext;
use expectations_parser::parse_file;
use expectations_store::result_key;
use expectations_validator::Validator;
use std::path::Path;
use tracing::info;

use super::open_store;
use crate::{output, records};

pub async fn execute(
    suite_path: &str,
    data_path: &str,
    strict: bool,
    format: &str,
    sample_limit: usize,
    store_root: Option<&Path>,
) -> Result<()> {
    info!("Validating suite: {}", suite_path);

    let suite = parse_file(Path::new(suite_path))
        .with_context(|| format!("Failed to parse suite file: {}", suite_path))?;

    info!("Suite '{}' loaded ({} assertions)", suite.name, suite.len());

    let dataset = records::load_records(Path::new(data_path))?;

    info!(
        "Dataset '{}' loaded ({} rows, {} columns)",
        dataset.id(),
        dataset.row_count(),
        dataset.column_names().len()
    );

    let context = RunContext::new()
        .with_strict(strict)
        .with_sample_limit(sample_limit)
        .with_metadata("suite_file", suite_path)
        .with_metadata("data_file", data_path);

    let validator = Validator::with_builtins();
    let result = validator
        .run(&dataset, &suite, &context)
        .context("Validation aborted")?;

    output::print_validation_report(&result, format)?;

    if let Some(root) = store_root {
        let store = open_store(root)?;
        let key = result_key(&result);
        store
            .save_result(&key, &result)
            .await
            .with_context(|| format!("Failed to save validation result under '{}'", key))?;

        if format == "json" {
            info!("Result saved under '{}'", key);
        } else {
            output::print_info(&format!("Result saved under '{}'", key));
        }
    }

    if !result.success {
        output::print_error(&format!(
            "{} of {} assertions failed",
            result.statistics.unsuccessful, result.statistics.evaluated
        ));
        std::process::exit(1);
    }

    Ok(())
}
