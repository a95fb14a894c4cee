// src/config/scenario.rs

use serde::{Deserialize, Serialize};

use crate::config::options::TimeStepperOptions;

/// デモ用シナリオ: 一次元に並んだ要素の拡散と減衰
///
/// 要素 i の状態は `y_i' = -decay_rate_i * y_i + Σ_j coupling_strength * (y_j - y_i)`
/// に従い、j は左右の隣接要素である。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub stepper: TimeStepperOptions,
    pub final_time: f64,
    pub coupling_strength: f64,
    #[serde(default = "default_output")]
    pub output: String,
    pub elements: Vec<ElementInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementInstance {
    pub id: String,
    #[serde(default)]
    pub decay_rate: f64,
    pub initial_value: f64,
    pub step_size: f64,
}

fn default_output() -> String {
    "output/simulation_results.csv".to_string()
}
