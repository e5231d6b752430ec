//! Command implementations.

mod info;
mod run;
mod validate;

pub use info::run_info;
pub use run::run_pipeline;
pub use validate::run_validate;

use std::path::Path;

use anyhow::{Context, Result};
use contracts::SimulationBlueprint;
use tracing::info;

use crate::cli::DEFAULT_CONFIG;
use crate::error::CliError;

/// Load and validate a blueprint
///
/// A missing default file yields the built-in defaults; any other missing
/// file is an error.
pub(crate) fn load_blueprint(path: &Path) -> Result<SimulationBlueprint> {
    if !path.exists() {
        if path == Path::new(DEFAULT_CONFIG) {
            info!("No {} found, using built-in defaults", DEFAULT_CONFIG);
            let blueprint = SimulationBlueprint::default();
            config_loader::ConfigLoader::validate(&blueprint)
                .context("Built-in defaults failed validation")?;
            return Ok(blueprint);
        }
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }

    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
