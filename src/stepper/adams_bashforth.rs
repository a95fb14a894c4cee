// src/stepper/adams_bashforth.rs

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::options::AdamsBashforthOptions;
use crate::history::History;
use crate::math::coefficients::{coefficients, MAXIMUM_ORDER};
use crate::math::error::{HistorySide, StepperError};
use crate::math::value::IntegrationValue;
use crate::stepper::TimeStepper;
use crate::time::{EvolutionLess, Time, TimeDelta, TimeStepId};

/// N 次の Adams-Bashforth 法
///
/// 状態は次数だけで、ステップごとの状態はすべて呼び出し側が持つ履歴にある。
///
/// | 次数 | CFL 係数 |
/// |------|----------|
/// | 1 | 1 |
/// | 2 | 1 / 2 |
/// | 3 | 3 / 11 |
/// | 4 | 3 / 20 |
/// | 5 | 45 / 551 |
/// | 6 | 5 / 114 |
/// | 7 | 945 / 40663 |
/// | 8 | 945 / 77432 |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AdamsBashforthOptions", into = "AdamsBashforthOptions")]
pub struct AdamsBashforth {
    order: usize,
}

impl Default for AdamsBashforth {
    fn default() -> Self {
        AdamsBashforth { order: 3 }
    }
}

impl AdamsBashforth {
    pub const HELP: &'static str = "An Adams-Bashforth Nth order time-stepper.";

    pub fn new(order: usize) -> Result<Self, StepperError> {
        if !(1..=MAXIMUM_ORDER).contains(&order) {
            return Err(StepperError::UnsupportedOrder(order));
        }
        Ok(AdamsBashforth { order })
    }

    /// 履歴の積分次数を確認して返す
    fn history_order<T>(&self, history: &History<T>) -> Result<usize, StepperError> {
        let integration_order = history.integration_order();
        if integration_order > self.order {
            return Err(StepperError::HistoryOrderTooHigh {
                history_order: integration_order,
                stepper_order: self.order,
            });
        }
        let required = integration_order.max(1);
        if history.len() < required {
            return Err(StepperError::InsufficientHistory {
                side: HistorySide::Volume,
                available: history.len(),
                required,
            });
        }
        Ok(required)
    }

    /// 最新の `order` 個の微分値で `u` を `time_step` だけ進める
    fn update_u_common<T: IntegrationValue>(
        u: &mut T,
        history: &History<T>,
        time_step: TimeDelta,
        order: usize,
    ) -> Result<(), StepperError> {
        let start = history.len() - order;
        let times = &history.times()[start..];
        if !EvolutionLess::new(time_step.is_positive()).is_sorted(times) {
            return Err(StepperError::UnsortedHistory {
                side: HistorySide::Volume,
            });
        }
        let weights = coefficients(times, time_step)?;
        for (weight, derivative) in weights.iter().zip(&history.values()[start..]) {
            u.add_scaled(time_step.value() * weight, derivative);
        }
        Ok(())
    }
}

impl TimeStepper for AdamsBashforth {
    fn order(&self) -> usize {
        self.order
    }

    fn error_estimate_order(&self) -> usize {
        self.order - 1
    }

    fn number_of_past_steps(&self) -> usize {
        self.order - 1
    }

    fn number_of_substeps(&self) -> usize {
        1
    }

    fn stable_step(&self) -> f64 {
        match self.order {
            1 => 1.0,
            2 => 0.5,
            3 => 3.0 / 11.0,
            4 => 3.0 / 20.0,
            5 => 45.0 / 551.0,
            6 => 5.0 / 114.0,
            7 => 945.0 / 40663.0,
            _ => 945.0 / 77432.0,
        }
    }

    fn next_time_id(
        &self,
        current_id: &TimeStepId,
        time_step: TimeDelta,
    ) -> Result<TimeStepId, StepperError> {
        if current_id.substep != 0 {
            return Err(StepperError::UnexpectedSubstep(current_id.substep));
        }
        if time_step.is_positive() != current_id.time_runs_forward {
            return Err(StepperError::DirectionMismatch);
        }
        Ok(TimeStepId {
            time_runs_forward: current_id.time_runs_forward,
            step_number: current_id.step_number + 1,
            substep: 0,
            step_time: current_id.step_time + time_step,
        })
    }

    fn advance<T>(
        &self,
        u: &mut T,
        history: &mut History<T>,
        time_step: TimeDelta,
    ) -> Result<(), StepperError>
    where
        T: IntegrationValue,
    {
        let order = self.history_order(history)?;
        history.mark_unneeded(history.len() - order);
        Self::update_u_common(u, history, time_step, order)
    }

    fn advance_with_error<T>(
        &self,
        u: &mut T,
        u_error: &mut T,
        history: &mut History<T>,
        time_step: TimeDelta,
    ) -> Result<bool, StepperError>
    where
        T: IntegrationValue,
    {
        let mut lower_order = u.clone();
        self.advance(u, history, time_step)?;
        let order = history.integration_order();
        if order < 2 {
            return Ok(false);
        }
        Self::update_u_common(&mut lower_order, history, time_step, order - 1)?;
        *u_error = u.clone();
        u_error.subtract(&lower_order);
        Ok(true)
    }

    fn dense_output<T>(&self, u: &mut T, history: &History<T>, time: Time) -> Result<(), StepperError>
    where
        T: IntegrationValue,
    {
        let order = self.history_order(history)?;
        let latest = history.times()[history.len() - 1];
        if !EvolutionLess::new(history.time_runs_forward()).less(latest, time) {
            return Err(StepperError::StaleDenseOutputRequest {
                requested: time.value(),
                latest: latest.value(),
            });
        }
        Self::update_u_common(u, history, time - latest, order)
    }

    fn can_change_step_size<T>(&self, time_id: &TimeStepId, history: &History<T>) -> bool {
        let less = EvolutionLess::new(time_id.time_runs_forward);
        let allowed = history.len() >= self.order
            && history.integration_order() == self.order
            && history
                .back_time()
                .is_some_and(|latest| !less.less(time_id.step_time, latest))
            && less.is_sorted(history.times());
        if !allowed {
            debug!(time_id = %time_id, samples = history.len(), "step size change refused");
        }
        allowed
    }
}
