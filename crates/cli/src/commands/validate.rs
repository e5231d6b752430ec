//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{LogLevel, SimulationBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    total_units: usize,
    route_count: usize,
    redirect_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    total_units: blueprint.departments.police.units
                        + blueprint.departments.ambulance.units
                        + blueprint.departments.fire_dept.units,
                    route_count: blueprint.routing.len(),
                    redirect_count: blueprint
                        .routing
                        .iter()
                        .filter(|r| r.redirect_allowed && r.alternative.is_some())
                        .count(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &SimulationBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if !blueprint
        .routing
        .iter()
        .any(|r| r.redirect_allowed && r.alternative.is_some())
    {
        warnings.push(
            "No redirect rules configured - overflow events only wait on their primary queue"
                .to_string(),
        );
    }

    for route in &blueprint.routing {
        if route.alternative.is_some() && !route.redirect_allowed {
            warnings.push(format!(
                "Route for code {} names an alternative but redirect_allowed is false",
                route.code
            ));
        }
    }

    if blueprint.logging.min_level == LogLevel::Debug && blueprint.queues.log < 100 {
        warnings.push(format!(
            "Debug logging with a log queue of {} records will drop records under load",
            blueprint.queues.log
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Units: {}", summary.total_units);
            println!("  Routes: {}", summary.route_count);
            println!("  Redirects: {}", summary.redirect_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
