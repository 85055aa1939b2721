use anyhow::{Context, Result};
use expectations_parser::parse_file;
use expectations_validator::ExpectationRegistry;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

use crate::output;

pub async fn execute(suite_path: &str, format: &str) -> Result<()> {
    info!("Checking suite: {}", suite_path);

    let path = Path::new(suite_path);
    let suite = parse_file(path)
        .with_context(|| format!("Failed to parse suite file: {}", suite_path))?;

    let registry = ExpectationRegistry::with_builtins();
    suite
        .validate(&registry)
        .with_context(|| format!("Suite '{}' has an invalid assertion", suite.name))?;

    let mut by_type: BTreeMap<&str, usize> = BTreeMap::new();
    for config in suite.list() {
        *by_type.entry(config.expectation_type.as_str()).or_default() += 1;
    }
    let mut columns: Vec<&str> = suite.list().iter().map(|c| c.column.as_str()).collect();
    columns.sort_unstable();
    columns.dedup();

    if format == "json" {
        let summary = json!({
            "name": suite.name,
            "valid": true,
            "assertions": suite.len(),
            "columns": columns,
            "types": by_type,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::print_info(&format!(
        "Suite loaded: {} ({} assertions)",
        suite.name,
        suite.len()
    ));
    output::print_success("All assertions are valid");

    println!("\nSuite Summary:");
    println!("  Name:        {}", suite.name);
    println!("  Assertions:  {}", suite.len());
    println!("  Columns:     {}", columns.join(", "));

    if !by_type.is_empty() {
        println!("\nAssertion Types:");
        for (type_id, count) in &by_type {
            println!("  {:<28} {}", type_id, count);
        }
    }

    if !suite.meta.is_empty() {
        println!("\nMeta:");
        for (key, value) in &suite.meta {
            println!("  {}: {}", key, value);
        }
    }

    Ok(())
}
