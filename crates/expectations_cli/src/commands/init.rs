use anyhow::{Context, Result};
use expectations_core::ExpectationSuite;
use expectations_parser::{SuiteFormat, to_string, write_file};
use expectations_validator::{ExpectationRegistry, profile};
use std::path::Path;
use tracing::info;

use crate::{output, records};

pub async fn execute(name: &str, data_path: Option<&str>, output_path: Option<&str>) -> Result<()> {
    let suite = match data_path {
        Some(data_path) => {
            info!("Profiling '{}' to scaffold suite '{}'", data_path, name);

            let dataset = records::load_records(Path::new(data_path))?;
            let registry = ExpectationRegistry::with_builtins();
            profile::suggest_suite(name, &dataset, &registry)
                .with_context(|| format!("Failed to profile dataset '{}'", dataset.id()))?
        }
        None => {
            info!("Scaffolding empty suite '{}'", name);
            ExpectationSuite::new(name)
        }
    };

    match output_path {
        Some(path) => {
            write_file(Path::new(path), &suite)
                .with_context(|| format!("Failed to write suite file: {}", path))?;
            output::print_success(&format!(
                "Suite '{}' with {} assertions written to {}",
                suite.name,
                suite.len(),
                path
            ));
        }
        None => {
            let yaml =
                to_string(&suite, SuiteFormat::Yaml).context("Failed to serialize suite to YAML")?;
            print!("{}", yaml);
        }
    }

    Ok(())
}
