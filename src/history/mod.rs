// src/history/mod.rs

pub mod boundary;
pub mod samples;

pub use boundary::{BoundaryHistory, BoundaryHistoryEvaluator};
pub use samples::{SampleId, Samples};

use crate::math::error::{HistorySide, StepperError};
use crate::time::{EvolutionLess, Time};

/// 体積項の微分値の履歴
///
/// 積分次数は自己始動の間だけ積分器の次数より小さい。
#[derive(Debug, Clone)]
pub struct History<T> {
    samples: Samples<T>,
    integration_order: usize,
    time_runs_forward: bool,
}

impl<T> History<T> {
    pub fn new(integration_order: usize) -> Self {
        Self::with_direction(integration_order, true)
    }

    pub fn with_direction(integration_order: usize, time_runs_forward: bool) -> Self {
        History {
            samples: Samples::new(),
            integration_order,
            time_runs_forward,
        }
    }

    /// サンプルを追加する
    ///
    /// 追加の前に、不要と印の付いたサンプルを削除する。
    pub fn push(&mut self, time: Time, derivative: T) -> Result<(), StepperError> {
        let less = EvolutionLess::new(self.time_runs_forward);
        if let Some(latest) = self.samples.back_time() {
            if !less.less(latest, time) {
                return Err(StepperError::UnsortedHistory {
                    side: HistorySide::Volume,
                });
            }
        }
        self.samples.discard_unneeded();
        self.samples.push(time, derivative);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn integration_order(&self) -> usize {
        self.integration_order
    }

    pub fn set_integration_order(&mut self, integration_order: usize) {
        self.integration_order = integration_order;
    }

    /// 自己始動: 積分次数を `min(サンプル数, target_order)` にする
    pub fn ramp_integration_order(&mut self, target_order: usize) -> usize {
        self.integration_order = self.len().min(target_order);
        self.integration_order
    }

    pub fn time_runs_forward(&self) -> bool {
        self.time_runs_forward
    }

    pub fn times(&self) -> &[Time] {
        self.samples.times()
    }

    pub fn values(&self) -> &[T] {
        self.samples.values()
    }

    pub fn back_time(&self) -> Option<Time> {
        self.samples.back_time()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Time, &T)> + '_ {
        self.samples.iter()
    }

    pub fn mark_unneeded(&mut self, first_needed: usize) {
        self.samples.mark_unneeded(first_needed);
    }

    pub fn unneeded(&self) -> usize {
        self.samples.unneeded()
    }
}
