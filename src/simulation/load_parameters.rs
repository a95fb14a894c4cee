// src/simulation/load_parameters.rs

use std::path::Path;

use tracing::info;

use crate::config::{load_yaml, scenario::Scenario};
use crate::simulation::SimulationError;

/// シナリオの読み込み
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario, SimulationError> {
    let path = path.as_ref();
    let scenario: Scenario = load_yaml(path)?;
    info!(
        path = %path.display(),
        elements = scenario.elements.len(),
        final_time = scenario.final_time,
        "scenario loaded"
    );
    Ok(scenario)
}
