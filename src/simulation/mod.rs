// src/simulation/mod.rs

pub mod csv;
pub mod framework;
pub mod load_parameters;

use std::collections::VecDeque;

use thiserror::Error;

use crate::config::ConfigError;
use crate::history::{BoundaryHistory, History};
use crate::math::error::StepperError;
use crate::stepper::AdamsBashforth;
use crate::time::Time;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("実行可能な要素がありません（時刻 {time}）")]
    Deadlock { time: f64 },
    #[error("シナリオが不正です: {0}")]
    InvalidScenario(String),
    #[error(transparent)]
    Stepper(#[from] StepperError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("結果を書き込めません: {0}")]
    Io(#[from] std::io::Error),
}

/// 隣接要素との境界
#[derive(Debug)]
pub struct Mortar {
    pub neighbour: usize,
    pub history: BoundaryHistory<f64, f64, f64>,
    /// 隣接要素から届き、まだ履歴に入れていないサンプル
    pub inbox: VecDeque<(Time, f64)>,
}

impl Mortar {
    pub fn new(neighbour: usize, order: usize) -> Self {
        Mortar {
            neighbour,
            history: BoundaryHistory::new(order),
            inbox: VecDeque::new(),
        }
    }
}

/// 一つの要素（スカラー状態）
#[derive(Debug)]
pub struct Element {
    pub id: String,
    pub value: f64,
    pub decay_rate: f64,
    /// 自己始動後の刻み幅（最小刻み幅の整数倍）
    pub step_ticks: u64,
    /// 現在時刻（最小刻み幅の整数倍）
    pub ticks: u64,
    pub steps_taken: usize,
    pub history: History<f64>,
    pub mortars: Vec<Mortar>,
}

impl Element {
    /// 次のステップの刻み幅
    ///
    /// 自己始動の `order - 1` ステップは全要素が最小刻み幅で進む。
    pub fn next_step_ticks(&self, order: usize) -> u64 {
        if self.steps_taken + 1 < order {
            1
        } else {
            self.step_ticks
        }
    }
}

/// シミュレーションの全体状態を表す構造体
#[derive(Debug)]
pub struct SimulationState {
    pub stepper: AdamsBashforth,
    pub elements: Vec<Element>,
    pub coupling_strength: f64,
    /// 最小刻み幅
    pub tick: f64,
    pub final_ticks: u64,
    pub self_start_complete: bool,
}

impl SimulationState {
    pub fn time_of(&self, ticks: u64) -> Time {
        Time(ticks as f64 * self.tick)
    }

    pub fn is_finished(&self) -> bool {
        self.elements.iter().all(|e| e.ticks >= self.final_ticks)
    }
}
