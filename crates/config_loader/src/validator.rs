//! Configuration validation
//!
//! Rules:
//! - capacities, unit counts and timeouts >= 1 (field-level, `validator` derive)
//! - min_delay_ms <= max_delay_ms, and the minimum is at least one tick
//! - min_task_duration_ms <= max_task_duration_ms, fallback within that range
//! - exactly one routing rule per event code
//! - a redirecting rule names an alternative different from its primary

use std::collections::HashSet;

use contracts::{ContractError, EventCode, SimulationBlueprint};
use validator::Validate;

/// Validate a SimulationBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    validate_fields(blueprint)?;
    validate_event_timing(blueprint)?;
    validate_service_timing(blueprint)?;
    validate_routing(blueprint)?;
    Ok(())
}

/// Per-field range checks declared on the blueprint types
fn validate_fields(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    blueprint
        .validate()
        .map_err(|e| ContractError::config_validation("fields", e.to_string()))
}

fn validate_event_timing(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.event_source;

    if source.min_delay_ms > source.max_delay_ms {
        return Err(ContractError::config_validation(
            "event_source.min_delay_ms / event_source.max_delay_ms",
            format!(
                "min_delay_ms ({}) must be <= max_delay_ms ({})",
                source.min_delay_ms, source.max_delay_ms
            ),
        ));
    }

    if source.min_delay_ticks() == 0 {
        return Err(ContractError::config_validation(
            "event_source.min_delay_ms",
            format!(
                "min_delay_ms ({}) must cover at least one tick of {}ms",
                source.min_delay_ms, source.tick_ms
            ),
        ));
    }

    Ok(())
}

fn validate_service_timing(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let service = &blueprint.service;

    if service.min_task_duration_ms > service.max_task_duration_ms {
        return Err(ContractError::config_validation(
            "service.min_task_duration_ms / service.max_task_duration_ms",
            format!(
                "min_task_duration_ms ({}) must be <= max_task_duration_ms ({})",
                service.min_task_duration_ms, service.max_task_duration_ms
            ),
        ));
    }

    let range = service.min_task_duration_ms..=service.max_task_duration_ms;
    if !range.contains(&service.fallback_task_duration_ms) {
        return Err(ContractError::config_validation(
            "service.fallback_task_duration_ms",
            format!(
                "fallback_task_duration_ms ({}) must lie within [{}, {}]",
                service.fallback_task_duration_ms,
                service.min_task_duration_ms,
                service.max_task_duration_ms
            ),
        ));
    }

    Ok(())
}

fn validate_routing(blueprint: &SimulationBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, rule) in blueprint.routing.iter().enumerate() {
        if !seen.insert(rule.code) {
            return Err(ContractError::config_validation(
                format!("routing[{}].code", idx),
                format!("duplicate rule for event code {:?}", rule.code),
            ));
        }

        if rule.redirect_allowed && rule.alternative.is_none() {
            return Err(ContractError::config_validation(
                format!("routing[{}].alternative", idx),
                "redirect_allowed requires an alternative department",
            ));
        }

        if rule.alternative == Some(rule.primary) {
            return Err(ContractError::config_validation(
                format!("routing[{}].alternative", idx),
                "alternative must differ from primary",
            ));
        }
    }

    for code in EventCode::ALL {
        if !seen.contains(&code) {
            return Err(ContractError::config_validation(
                "routing",
                format!("no routing rule for event code {:?}", code),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{default_routing, Department, RouteConfig};

    #[test]
    fn test_valid_config() {
        let bp = SimulationBlueprint::default();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_zero_units_rejected() {
        let mut bp = SimulationBlueprint::default();
        bp.departments.fire_dept.units = 0;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("units"), "got: {err}");
    }

    #[test]
    fn test_invalid_delay_range() {
        let mut bp = SimulationBlueprint::default();
        bp.event_source.min_delay_ms = 6000;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("min_delay_ms"), "got: {err}");
    }

    #[test]
    fn test_delay_shorter_than_tick() {
        let mut bp = SimulationBlueprint::default();
        bp.event_source.tick_ms = 50;
        bp.event_source.min_delay_ms = 20;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("at least one tick"), "got: {err}");
    }

    #[test]
    fn test_fallback_outside_service_range() {
        let mut bp = SimulationBlueprint::default();
        bp.service.fallback_task_duration_ms = 2000;
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("fallback_task_duration_ms"), "got: {err}");
    }

    #[test]
    fn test_duplicate_routing_rule() {
        let mut bp = SimulationBlueprint::default();
        bp.routing.push(bp.routing[0].clone());
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("duplicate rule"), "got: {err}");
    }

    #[test]
    fn test_missing_routing_rule() {
        let mut bp = SimulationBlueprint::default();
        bp.routing.retain(|r| r.code != EventCode::FireDept);
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("no routing rule"), "got: {err}");
    }

    #[test]
    fn test_redirect_without_alternative() {
        let mut bp = SimulationBlueprint::default();
        bp.routing = default_routing();
        bp.routing[0] = RouteConfig {
            code: EventCode::Police,
            primary: Department::Police,
            alternative: None,
            redirect_allowed: true,
        };
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("requires an alternative"), "got: {err}");
    }

    #[test]
    fn test_alternative_equal_to_primary() {
        let mut bp = SimulationBlueprint::default();
        bp.routing[2].alternative = Some(Department::FireDept);
        let err = validate(&bp).unwrap_err().to_string();
        assert!(err.contains("must differ"), "got: {err}");
    }
}
