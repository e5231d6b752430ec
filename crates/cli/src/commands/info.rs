//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::{Department, SimulationBlueprint};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    event_source: EventSourceInfo,
    service: ServiceInfo,
    dispatch_queue: usize,
    departments: Vec<DepartmentInfo>,
    routing: Vec<RouteInfo>,
    timeouts_ms: TimeoutInfo,
    logging: LoggingInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Serialize)]
struct EventSourceInfo {
    tick_ms: u64,
    min_delay_ticks: u32,
    max_delay_ticks: u32,
}

#[derive(Serialize)]
struct ServiceInfo {
    min_ticks: u32,
    max_ticks: u32,
    fallback_ticks: u32,
}

#[derive(Serialize)]
struct DepartmentInfo {
    name: &'static str,
    units: usize,
    queue_capacity: usize,
}

#[derive(Serialize)]
struct RouteInfo {
    code: u8,
    primary: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alternative: Option<&'static str>,
    redirect_allowed: bool,
}

#[derive(Serialize)]
struct TimeoutInfo {
    department_send: u64,
    log_send: u64,
    output_lock: u64,
}

#[derive(Serialize)]
struct LoggingInfo {
    min_level: String,
    record_max_bytes: usize,
    queue_capacity: usize,
    output: String,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    let blueprint = super::load_blueprint(&args.config)?;

    if args.json {
        let info = build_config_info(&blueprint);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &SimulationBlueprint) -> ConfigInfo {
    let (min_ticks, max_ticks, fallback_ticks) = blueprint.service_ticks();

    let departments = Department::ALL
        .into_iter()
        .map(|department| DepartmentInfo {
            name: department.name(),
            units: blueprint.departments.units(department),
            queue_capacity: blueprint.queues.department(department),
        })
        .collect();

    let routing = blueprint
        .routing
        .iter()
        .map(|route| RouteInfo {
            code: route.code.as_u8(),
            primary: route.primary.name(),
            alternative: route.alternative.map(Department::name),
            redirect_allowed: route.redirect_allowed,
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        event_source: EventSourceInfo {
            tick_ms: blueprint.event_source.tick_ms,
            min_delay_ticks: blueprint.event_source.min_delay_ticks(),
            max_delay_ticks: blueprint.event_source.max_delay_ticks(),
        },
        service: ServiceInfo {
            min_ticks,
            max_ticks,
            fallback_ticks,
        },
        dispatch_queue: blueprint.queues.dispatch,
        departments,
        routing,
        timeouts_ms: TimeoutInfo {
            department_send: blueprint.timeouts.department_send_ms,
            log_send: blueprint.timeouts.log_send_ms,
            output_lock: blueprint.timeouts.output_lock_ms,
        },
        logging: LoggingInfo {
            min_level: blueprint.logging.min_level.to_string(),
            record_max_bytes: blueprint.logging.record_max_bytes,
            queue_capacity: blueprint.queues.log,
            output: format!("{:?}", blueprint.logging.output),
        },
        seed: blueprint.random.seed,
    }
}

fn print_config_info(blueprint: &SimulationBlueprint) {
    let info = build_config_info(blueprint);

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Dispatch Sim Configuration                     ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("⏱  Event Source");
    println!("   ├─ Version: {}", info.version);
    println!("   ├─ Tick: {} ms", info.event_source.tick_ms);
    println!(
        "   ├─ Inter-arrival: {}..={} ticks",
        info.event_source.min_delay_ticks, info.event_source.max_delay_ticks
    );
    println!(
        "   └─ Service: {}..={} ticks (fallback {})",
        info.service.min_ticks, info.service.max_ticks, info.service.fallback_ticks
    );

    println!("\n🚑 Departments (dispatch queue {})", info.dispatch_queue);
    for (i, department) in info.departments.iter().enumerate() {
        let prefix = if i == info.departments.len() - 1 { "└─" } else { "├─" };
        println!(
            "   {} {}: {} units, queue {}",
            prefix, department.name, department.units, department.queue_capacity
        );
    }

    println!("\n🚦 Routing");
    for (i, route) in info.routing.iter().enumerate() {
        let prefix = if i == info.routing.len() - 1 { "└─" } else { "├─" };
        match route.alternative {
            Some(alternative) if route.redirect_allowed => println!(
                "   {} code {} → {} (overflow → {})",
                prefix, route.code, route.primary, alternative
            ),
            _ => println!("   {} code {} → {}", prefix, route.code, route.primary),
        }
    }

    println!("\n⚙️  Timeouts");
    println!("   ├─ Department send: {} ms", info.timeouts_ms.department_send);
    println!("   ├─ Log send: {} ms", info.timeouts_ms.log_send);
    println!("   └─ Output lock: {} ms", info.timeouts_ms.output_lock);

    println!("\n📝 Logging");
    println!("   ├─ Min level: {}", info.logging.min_level);
    println!("   ├─ Record size: {} bytes", info.logging.record_max_bytes);
    println!("   ├─ Queue: {}", info.logging.queue_capacity);
    println!("   └─ Output: {}", info.logging.output);

    println!();
}
