//! `run` command implementation.

use anyhow::{Context, Result};
use contracts::{Department, SimulationBlueprint};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig, StatsReport};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    let mut blueprint = super::load_blueprint(&args.config)?;

    if let Some(seed) = args.seed {
        info!(seed, "Overriding random seed from CLI");
        blueprint.random.seed = Some(seed);
    }

    info!(
        tick_ms = blueprint.event_source.tick_ms,
        police = blueprint.departments.police.units,
        ambulance = blueprint.departments.ambulance.units,
        fire_dept = blueprint.departments.fire_dept.units,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    let stats = pipeline
        .run(shutdown_signal())
        .await
        .context("Simulation failed")?;

    info!(
        generated = stats.source.generated,
        lost = stats.dispatch.lost,
        processed = stats.total_processed(),
        duration_secs = stats.duration.as_secs_f64(),
        "Simulation finished"
    );

    if args.json {
        let report = StatsReport::from(&stats);
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize stats")?;
        println!("{}", json);
    } else {
        stats.print_summary();
    }

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves; the run then ends only
/// by its duration.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &SimulationBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Event source:");
    println!("  Tick: {} ms", blueprint.event_source.tick_ms);
    println!(
        "  Inter-arrival: {}..={} ticks",
        blueprint.event_source.min_delay_ticks(),
        blueprint.event_source.max_delay_ticks()
    );
    let (min, max, fallback) = blueprint.service_ticks();
    println!("  Service: {min}..={max} ticks (fallback {fallback})");

    println!("\nDepartments:");
    for department in Department::ALL {
        println!(
            "  - {} - {} units, queue {}",
            department,
            blueprint.departments.units(department),
            blueprint.queues.department(department)
        );
    }

    println!("\nRouting:");
    for route in &blueprint.routing {
        match route.alternative.filter(|_| route.redirect_allowed) {
            Some(alternative) => println!(
                "  - code {} -> {} (overflow to {})",
                route.code, route.primary, alternative
            ),
            None => println!("  - code {} -> {}", route.code, route.primary),
        }
    }

    match blueprint.random.seed {
        Some(seed) => println!("\nRandom seed: {seed}"),
        None => println!("\nRandom seed: OS entropy"),
    }
    println!();
}
