// src/config/mod.rs

pub mod options;
pub mod scenario;

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use options::{AdamsBashforthOptions, OptionDescription, TimeStepperOptions, ORDER_OPTION};
pub use scenario::{ElementInstance, Scenario};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルを読み込めません: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML の解析に失敗しました: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

// =======================
// YAML パース共通関数
// =======================
pub fn load_yaml<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ConfigError> {
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let data: T = serde_yaml::from_str(&contents)?;
    Ok(data)
}
