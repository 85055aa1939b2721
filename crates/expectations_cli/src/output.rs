use anyhow::Result;
use colored::*;
use expectations_core::{ValidationOutcome, ValidationResult};

pub fn print_validation_report(result: &ValidationResult, format: &str) -> Result<()> {
    match format {
        "json" => print_json_report(result),
        _ => {
            print_text_report(result);
            Ok(())
        }
    }
}

fn print_text_report(result: &ValidationResult) {
    println!("\n{}", "═".repeat(60));
    println!("{}", "  VALIDATION REPORT".bold());
    println!("{}", "═".repeat(60));

    println!("  Suite:    {}", result.suite_name);
    println!("  Dataset:  {}", result.dataset_id);
    println!("  Run at:   {}", result.timestamp.to_rfc3339());

    if result.success {
        println!(
            "\n{} {}",
            "✓".green().bold(),
            "Validation PASSED".green().bold()
        );
    } else {
        println!(
            "\n{} {}",
            "✗".red().bold(),
            "Validation FAILED".red().bold()
        );
    }

    if !result.outcomes.is_empty() {
        println!("\n{}", "Assertions:".bold());
        for outcome in &result.outcomes {
            print_outcome(outcome);
        }
    }

    let stats = &result.statistics;
    println!("\n{}", "Summary:".bold());
    println!("  Evaluated:    {}", stats.evaluated);
    println!("  Successful:   {}", stats.successful);
    println!("  Unsuccessful: {}", stats.unsuccessful);
    if let Some(percent) = stats.success_percent {
        println!("  Success rate: {:.2}%", percent);
    }
    println!("{}", "═".repeat(60));
}

fn print_outcome(outcome: &ValidationOutcome) {
    if outcome.success {
        println!("  {} {}", "✓".green().bold(), outcome.config);
    } else {
        println!("  {} {}", "✗".red().bold(), outcome.config.to_string().red());
    }

    if let Some(error) = &outcome.error {
        println!("      {}: {}", error.kind.yellow(), error.message);
        return;
    }

    if let Some(observed) = &outcome.observed_value {
        println!("      observed: {}", observed);
    }

    if outcome.unexpected_count > 0 {
        let percent = outcome
            .unexpected_percent
            .map(|p| format!(" ({:.2}%)", p))
            .unwrap_or_default();
        println!(
            "      unexpected: {} of {}{}",
            outcome.unexpected_count, outcome.element_count, percent
        );

        let sample: Vec<String> = outcome
            .unexpected_sample
            .iter()
            .map(|v| v.to_string())
            .collect();
        let more = if outcome.is_sample_truncated() {
            ", ..."
        } else {
            ""
        };
        println!("      sample: [{}{}]", sample.join(", "), more);
    }
}

fn print_json_report(result: &ValidationResult) -> Result<()> {
    println!("{}", result.to_json()?);
    Ok(())
}

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message.green());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}
