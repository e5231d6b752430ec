//! Configuration parsing
//!
//! Supports TOML (primary) and JSON formats.

use contracts::{ContractError, SimulationBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (recommended)
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Infer format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<SimulationBlueprint, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<SimulationBlueprint, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse according to format
pub fn parse(content: &str, format: ConfigFormat) -> Result<SimulationBlueprint, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Department, EventCode, LogLevel, OutputTarget};

    #[test]
    fn test_parse_toml_partial() {
        let content = r#"
[event_source]
tick_ms = 5
min_delay_ms = 50

[departments.police]
units = 7

[logging]
min_level = "debug"
output = { file = "dispatch.log" }

[[routing]]
code = "police"
primary = "police"

[[routing]]
code = "ambulance"
primary = "ambulance"
alternative = "fire_dept"
redirect_allowed = true

[[routing]]
code = "fire_dept"
primary = "fire_dept"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.event_source.tick_ms, 5);
        assert_eq!(bp.event_source.min_delay_ms, 50);
        // untouched fields keep their defaults
        assert_eq!(bp.event_source.max_delay_ms, 5000);
        assert_eq!(bp.departments.units(Department::Police), 7);
        assert_eq!(bp.departments.units(Department::Ambulance), 4);
        assert_eq!(bp.logging.min_level, LogLevel::Debug);
        assert_eq!(
            bp.logging.output,
            OutputTarget::File("dispatch.log".into())
        );
        assert_eq!(bp.routing[1].code, EventCode::Ambulance);
        assert_eq!(bp.routing[1].alternative, Some(Department::FireDept));
        assert!(!bp.routing[2].redirect_allowed);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "queues": { "dispatch": 8, "log": 16 },
            "random": { "seed": 99 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.queues.dispatch, 8);
        assert_eq!(bp.queues.police, 10);
        assert_eq!(bp.random.seed, Some(99));
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_department() {
        let content = r#"
[[routing]]
code = "police"
primary = "coast_guard"
"#;
        assert!(parse_toml(content).is_err());
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
