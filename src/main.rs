// src/main.rs

use std::error::Error;
use std::io::Write;

use ltsab::logging;
use ltsab::simulation::csv::setup_csv_output;
use ltsab::simulation::framework::{initialize_simulation_state, run_simulation};
use ltsab::simulation::load_parameters::load_scenario;

fn main() -> Result<(), Box<dyn Error>> {
    logging::init()?;

    // シナリオの読み込み
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/scenario.yaml".to_string());
    let scenario = load_scenario(&path)?;

    // 要素と境界の初期化
    let mut state = initialize_simulation_state(&scenario)?;

    // CSV出力の設定
    let mut writer = setup_csv_output(&scenario.output)?;

    // シミュレーションのメインループ
    run_simulation(&mut state, &mut writer)?;
    writer.flush()?;

    Ok(())
}
