// src/stepper/mod.rs

pub mod adams_bashforth;
pub mod boundary;

pub use adams_bashforth::AdamsBashforth;

use crate::history::{BoundaryHistory, History};
use crate::math::error::StepperError;
use crate::math::value::IntegrationValue;
use crate::time::{Time, TimeDelta, TimeStepId};

/// 時間積分器の共通インターフェース
///
/// 次数や安定刻みなどの情報はトレイトオブジェクトからも参照できる。
pub trait TimeStepper {
    fn order(&self) -> usize;

    /// 誤差推定に使う次数（0 は推定不可）
    fn error_estimate_order(&self) -> usize;

    fn number_of_past_steps(&self) -> usize;

    fn number_of_substeps(&self) -> usize;

    /// 安定な刻み幅の係数（CFL 係数）
    fn stable_step(&self) -> f64;

    fn next_time_id(
        &self,
        current_id: &TimeStepId,
        time_step: TimeDelta,
    ) -> Result<TimeStepId, StepperError>;

    /// `u` を一ステップ進める
    fn advance<T>(
        &self,
        u: &mut T,
        history: &mut History<T>,
        time_step: TimeDelta,
    ) -> Result<(), StepperError>
    where
        Self: Sized,
        T: IntegrationValue;

    /// `u` を一ステップ進め、一つ低い次数との差を `u_error` に書き込む
    ///
    /// # 戻り値
    /// - 誤差推定が得られたかどうか
    fn advance_with_error<T>(
        &self,
        u: &mut T,
        u_error: &mut T,
        history: &mut History<T>,
        time_step: TimeDelta,
    ) -> Result<bool, StepperError>
    where
        Self: Sized,
        T: IntegrationValue;

    /// 履歴を変更せずに `time` での値を求める
    fn dense_output<T>(&self, u: &mut T, history: &History<T>, time: Time) -> Result<(), StepperError>
    where
        Self: Sized,
        T: IntegrationValue;

    fn can_change_step_size<T>(&self, time_id: &TimeStepId, history: &History<T>) -> bool
    where
        Self: Sized;
}

/// 局所時間刻み（LTS）に対応した時間積分器
pub trait LtsTimeStepper: TimeStepper {
    /// 境界の結合項による一ステップ分の変化を `result` に加える
    fn add_boundary_delta<L, R, C, F>(
        &self,
        result: &mut C,
        history: &mut BoundaryHistory<L, R, C>,
        time_step: TimeDelta,
        coupling: &F,
    ) -> Result<(), StepperError>
    where
        Self: Sized,
        C: IntegrationValue,
        F: Fn(&L, &R) -> C;

    /// 履歴を変更せずに `time` までの結合項の変化を `result` に加える
    fn boundary_dense_output<L, R, C, F>(
        &self,
        result: &mut C,
        history: &BoundaryHistory<L, R, C>,
        time: Time,
        coupling: &F,
    ) -> Result<(), StepperError>
    where
        Self: Sized,
        C: IntegrationValue,
        F: Fn(&L, &R) -> C;
}
