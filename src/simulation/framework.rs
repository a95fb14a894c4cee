// src/simulation/framework.rs

use std::io::Write;

use tracing::{debug, info};

use crate::config::scenario::Scenario;
use crate::history::History;
use crate::simulation::csv::create_csv_row;
use crate::simulation::{Element, Mortar, SimulationError, SimulationState};
use crate::stepper::{LtsTimeStepper, TimeStepper};

/// 刻み幅が最小刻み幅の整数倍とみなせる相対誤差
const TICK_TOLERANCE: f64 = 1e-9;

fn whole_ticks(value: f64, tick: f64) -> Option<u64> {
    let ratio = value / tick;
    let rounded = ratio.round();
    if rounded >= 0.0 && (ratio - rounded).abs() <= TICK_TOLERANCE * ratio.max(1.0) {
        Some(rounded as u64)
    } else {
        None
    }
}

/// シミュレーションステートの初期化
///
/// 要素は `elements` の順に一列につながり、隣り合う要素の間に境界を一つずつ持つ。
/// 初期値のサンプルは各履歴と隣接要素の受信箱に入った状態で返す。
pub fn initialize_simulation_state(scenario: &Scenario) -> Result<SimulationState, SimulationError> {
    let stepper = scenario.stepper.build()?;
    let order = stepper.order();

    if scenario.elements.is_empty() {
        return Err(SimulationError::InvalidScenario("要素がありません".to_string()));
    }
    if let Some(element) = scenario.elements.iter().find(|e| !(e.step_size > 0.0)) {
        return Err(SimulationError::InvalidScenario(format!(
            "{} の刻み幅が正ではありません",
            element.id
        )));
    }
    let tick = scenario
        .elements
        .iter()
        .map(|e| e.step_size)
        .fold(f64::INFINITY, f64::min);

    let final_ticks = whole_ticks(scenario.final_time, tick).ok_or_else(|| {
        SimulationError::InvalidScenario("終了時刻が最小刻み幅の整数倍ではありません".to_string())
    })?;
    let self_start_ticks = (order - 1) as u64;
    if final_ticks < self_start_ticks {
        return Err(SimulationError::InvalidScenario(
            "終了時刻が自己始動の区間より前です".to_string(),
        ));
    }

    let count = scenario.elements.len();
    let mut elements = Vec::with_capacity(count);
    for (index, instance) in scenario.elements.iter().enumerate() {
        let step_ticks = whole_ticks(instance.step_size, tick)
            .filter(|m| (final_ticks - self_start_ticks) % m == 0)
            .ok_or_else(|| {
                SimulationError::InvalidScenario(format!(
                    "{} の刻み幅が最小刻み幅と終了時刻に整合しません",
                    instance.id
                ))
            })?;

        let mut mortars = Vec::new();
        if index > 0 {
            mortars.push(Mortar::new(index - 1, order));
        }
        if index + 1 < count {
            mortars.push(Mortar::new(index + 1, order));
        }

        elements.push(Element {
            id: instance.id.clone(),
            value: instance.initial_value,
            decay_rate: instance.decay_rate,
            step_ticks,
            ticks: 0,
            steps_taken: 0,
            history: History::new(order),
            mortars,
        });
    }

    let mut state = SimulationState {
        stepper,
        elements,
        coupling_strength: scenario.coupling_strength,
        tick,
        final_ticks,
        self_start_complete: order == 1,
    };
    for index in 0..count {
        record_sample(&mut state, index)?;
    }
    Ok(state)
}

/// 要素の現在の値を履歴に記録し、隣接要素へ送る
fn record_sample(state: &mut SimulationState, index: usize) -> Result<(), SimulationError> {
    let coupling_strength = state.coupling_strength;
    let time = state.time_of(state.elements[index].ticks);
    let element = &mut state.elements[index];
    let value = element.value;

    // 隣接要素の値に比例しない部分は体積項に入れる
    let degree = element.mortars.len() as f64;
    let derivative = -(element.decay_rate + coupling_strength * degree) * value;
    element.history.push(time, derivative)?;
    for mortar in &mut element.mortars {
        mortar.history.local_insert(time, value)?;
    }

    let neighbours: Vec<usize> = element.mortars.iter().map(|m| m.neighbour).collect();
    for neighbour in neighbours {
        if let Some(mortar) = state.elements[neighbour]
            .mortars
            .iter_mut()
            .find(|m| m.neighbour == index)
        {
            mortar.inbox.push_back((time, value));
        }
    }
    Ok(())
}

/// 要素が次に作るサンプルの時刻
fn next_sample(element: &Element, order: usize) -> u64 {
    element.ticks + element.next_step_ticks(order)
}

/// 次に進める要素を選ぶ
///
/// 要素は、すべての隣接要素の次のサンプルが自分のステップの終了時刻以降にあるときだけ進める。
/// 条件を満たす要素のうち最も遅れているものを返す。
pub fn select_next_element(state: &SimulationState) -> Result<Option<usize>, SimulationError> {
    let order = state.stepper.order();

    let mut unfinished = state
        .elements
        .iter()
        .enumerate()
        .filter(|(_, e)| e.ticks < state.final_ticks)
        .peekable();
    if unfinished.peek().is_none() {
        return Ok(None);
    }

    let selected = unfinished
        .filter(|(_, element)| {
            let end = next_sample(element, order);
            element
                .mortars
                .iter()
                .all(|m| next_sample(&state.elements[m.neighbour], order) >= end)
        })
        .min_by_key(|(index, element)| (element.ticks, *index))
        .map(|(index, _)| index);

    match selected {
        Some(index) => Ok(Some(index)),
        None => {
            let ticks = state.elements.iter().map(|e| e.ticks).min().unwrap_or(0);
            Err(SimulationError::Deadlock {
                time: state.time_of(ticks).value(),
            })
        }
    }
}

/// シミュレーションステップの実行
pub fn execute_simulation_step(
    state: &mut SimulationState,
    index: usize,
) -> Result<(), SimulationError> {
    let stepper = state.stepper;
    let order = stepper.order();
    let coupling_strength = state.coupling_strength;

    let step_ticks = state.elements[index].next_step_ticks(order);
    let start = state.time_of(state.elements[index].ticks);
    let end = state.time_of(state.elements[index].ticks + step_ticks);
    let time_step = end - start;
    let coupling = |_: &f64, remote: &f64| coupling_strength * remote;

    let element = &mut state.elements[index];
    let mut value = element.value;

    element.history.ramp_integration_order(order);
    stepper.advance(&mut value, &mut element.history, time_step)?;

    for mortar in &mut element.mortars {
        // ステップの終了時刻以降のサンプルは次回まで受信箱に残す
        while let Some(&(time, remote_value)) = mortar.inbox.front() {
            if !(time < end) {
                break;
            }
            mortar.history.remote_insert(time, remote_value)?;
            mortar.inbox.pop_front();
        }
        mortar.history.ramp_integration_order(order);
        stepper.add_boundary_delta(&mut value, &mut mortar.history, time_step, &coupling)?;
    }

    element.value = value;
    element.ticks += step_ticks;
    element.steps_taken += 1;
    debug!(element = %element.id, time = %end, value, "element advanced");

    record_sample(state, index)?;

    if !state.self_start_complete
        && state
            .elements
            .iter()
            .all(|e| e.steps_taken + 1 >= order)
    {
        state.self_start_complete = true;
        info!(time = %end, "self-start complete");
    }
    Ok(())
}

/// 全要素が終了時刻に達するまで進め、各ステップの結果を書き出す
///
/// ヘッダーは書き込まない。
pub fn run_simulation<W: Write>(
    state: &mut SimulationState,
    writer: &mut W,
) -> Result<(), SimulationError> {
    for element in &state.elements {
        writer.write_all(create_csv_row(state.time_of(element.ticks), element).as_bytes())?;
    }

    let mut steps = 0usize;
    while let Some(index) = select_next_element(state)? {
        execute_simulation_step(state, index)?;
        let element = &state.elements[index];
        writer.write_all(create_csv_row(state.time_of(element.ticks), element).as_bytes())?;
        steps += 1;
    }

    for element in &state.elements {
        info!(element = %element.id, value = element.value, "final state");
    }
    info!(steps, final_time = %state.time_of(state.final_ticks), "simulation finished");
    Ok(())
}
