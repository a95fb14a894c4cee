// src/stepper/boundary.rs

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::history::{BoundaryHistory, BoundaryHistoryEvaluator};
use crate::math::coefficients::coefficients;
use crate::math::error::{HistorySide, StepperError};
use crate::math::lagrange::lagrange_basis;
use crate::math::value::IntegrationValue;
use crate::stepper::{AdamsBashforth, LtsTimeStepper, TimeStepper};
use crate::time::{EvolutionLess, Time, TimeDelta};

/// 境界計算の呼び出し元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryMode {
    Step,
    DenseOutput,
}

/// 局所側と隣接側の評価時刻の和集合
///
/// 一回の境界計算の間だけ存在し、和集合上の各区間の係数をキャッシュする。
struct UnionTimeline {
    times: Vec<Time>,
    less: EvolutionLess,
    order: usize,
    end_time: Time,
    coefficients: HashMap<(usize, u64), Vec<f64>>,
}

impl UnionTimeline {
    fn new(local: &[Time], remote: &[Time], less: EvolutionLess, order: usize, end_time: Time) -> Self {
        let mut times = Vec::with_capacity(local.len() + remote.len());
        let (mut i, mut j) = (0, 0);
        while i < local.len() && j < remote.len() {
            if less.less(local[i], remote[j]) {
                times.push(local[i]);
                i += 1;
            } else if less.less(remote[j], local[i]) {
                times.push(remote[j]);
                j += 1;
            } else {
                times.push(local[i]);
                i += 1;
                j += 1;
            }
        }
        times.extend_from_slice(&local[i..]);
        times.extend_from_slice(&remote[j..]);

        UnionTimeline {
            times,
            less,
            order,
            end_time,
            coefficients: HashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.times.len()
    }

    /// 時刻 `t` の和集合上の位置
    fn index(&self, t: Time) -> usize {
        self.less.lower_bound(&self.times, t)
    }

    /// `min(n + order, len)`
    fn advance_within_step(&self, n: usize) -> usize {
        (n + self.order).min(self.len())
    }

    /// 和集合上の区間 `step` を通常の Adams-Bashforth 法で積分したときの、
    /// `evaluation_step` の値に掛かる係数（刻み幅込み）
    fn base_summand(&mut self, step: usize, evaluation_step: usize) -> Result<f64, StepperError> {
        let step_size: TimeDelta = if step + 1 < self.len() {
            self.times[step + 1] - self.times[step]
        } else {
            self.end_time - self.times[step]
        };
        let key = (step, step_size.value().to_bits());
        if !self.coefficients.contains_key(&key) {
            trace!(step, step_size = step_size.value(), "computing union coefficients");
            let window = &self.times[step + 1 - self.order..=step];
            let weights = coefficients(window, step_size)?;
            self.coefficients.insert(key, weights);
        }
        let weights = &self.coefficients[&key];
        Ok(step_size.value() * weights[self.order - 1 - (step - evaluation_step)])
    }
}

/// 刻みが 0 でないことと、両側の最新のサンプルがステップの向きに並んでいることを確かめる
///
/// 次数 1 でも向きを確かめられるよう、直前のサンプルも含めて調べる。
fn check_step(
    time_step: TimeDelta,
    local_times: &[Time],
    remote_times: &[Time],
    order: usize,
) -> Result<EvolutionLess, StepperError> {
    if time_step.value() == 0.0 {
        return Err(StepperError::ZeroTimeStep);
    }
    let less = EvolutionLess::new(time_step.is_positive());
    let checked = order.max(2);
    if !less.is_sorted(&local_times[local_times.len().saturating_sub(checked)..]) {
        return Err(StepperError::UnsortedHistory {
            side: HistorySide::Local,
        });
    }
    if !less.is_sorted(&remote_times[remote_times.len().saturating_sub(checked)..]) {
        return Err(StepperError::UnsortedHistory {
            side: HistorySide::Remote,
        });
    }
    Ok(less)
}

impl AdamsBashforth {
    fn boundary_order(
        &self,
        integration_order: usize,
        local_len: usize,
        remote_len: usize,
    ) -> Result<usize, StepperError> {
        if integration_order > self.order() {
            return Err(StepperError::HistoryOrderTooHigh {
                history_order: integration_order,
                stepper_order: self.order(),
            });
        }
        let required = integration_order.max(1);
        if local_len < required {
            return Err(StepperError::InsufficientHistory {
                side: HistorySide::Local,
                available: local_len,
                required,
            });
        }
        if remote_len < required {
            return Err(StepperError::InsufficientHistory {
                side: HistorySide::Remote,
                available: remote_len,
                required,
            });
        }
        Ok(required)
    }

    /// 境界の結合項の変化
    ///
    /// 局所側の時刻 `t^L` と隣接側の時刻 `t^R` の和集合を `t~` とし、
    /// ステップ `[t^L_{m_S}, end_time)` の変化を
    ///
    /// `F = Σ_{q^L} Σ_{q^R} D(q^L, q^R) I(q^L, q^R)`
    ///
    /// と書く。係数 `I` は三つの寄与の和である。
    /// - 同時刻の評価 (`t^L = t^R`): 和集合上の各区間の通常の AB 係数
    /// - `t^R` が局所側の時刻にない場合: 局所側の時刻で `t^R` へ補間した値に対する AB 係数
    /// - `t^L` が隣接側の時刻にない場合: 区間ごとの隣接側の窓で `t^L` へ補間した値に対する AB 係数
    ///
    /// 係数が厳密に 0 の組では結合関数を評価しない。
    fn boundary_impl<L, R, C, F>(
        &self,
        result: &mut C,
        coupling: &BoundaryHistoryEvaluator<'_, L, R, C, F>,
        end_time: Time,
        mode: BoundaryMode,
    ) -> Result<(), StepperError>
    where
        C: IntegrationValue,
        F: Fn(&L, &R) -> C,
    {
        let local_times = coupling.local_times();
        let remote_times = coupling.remote_times();
        // 自己始動中は self.order() より小さい
        let order = self.boundary_order(
            coupling.integration_order(),
            local_times.len(),
            remote_times.len(),
        )?;

        let start_time = local_times[local_times.len() - 1];
        let time_step = end_time - start_time;

        // 前のステップで使った古いデータが削除されずに残っていることがある
        let local_begin = local_times.len() - order;
        let local_window = &local_times[local_begin..];

        let less = check_step(time_step, local_times, remote_times, order)?;

        if local_window == &remote_times[remote_times.len() - order..] {
            debug!(order, "boundary step without local time-stepping");
            let weights = coefficients(local_window, time_step)?;
            let remote_begin = remote_times.len() - order;
            for (offset, weight) in weights.iter().enumerate() {
                coupling.add_coupling(
                    result,
                    time_step.value() * weight,
                    local_begin + offset,
                    remote_begin + offset,
                );
            }
            return Ok(());
        }

        if order != self.order() {
            return Err(StepperError::OrderMismatchDuringSelfStart {
                history_order: order,
                stepper_order: self.order(),
            });
        }

        let remote_step_for_step_start = less.upper_bound(remote_times, start_time);
        if remote_step_for_step_start < order {
            return Err(StepperError::InsufficientHistory {
                side: HistorySide::Remote,
                available: remote_step_for_step_start,
                required: order,
            });
        }
        let remote_begin = remote_step_for_step_start - order;
        let remote_window = &remote_times[remote_begin..];

        if !less.is_sorted(remote_window) {
            return Err(StepperError::UnsortedHistory {
                side: HistorySide::Remote,
            });
        }
        let latest_remote = remote_times[remote_times.len() - 1];
        if !less.less(latest_remote, end_time) {
            return Err(match mode {
                BoundaryMode::Step => StepperError::RemoteDataBeyondStep {
                    remote: latest_remote.value(),
                    end: end_time.value(),
                },
                BoundaryMode::DenseOutput => StepperError::StaleDenseOutputRequest {
                    requested: end_time.value(),
                    latest: latest_remote.value(),
                },
            });
        }

        let mut union = UnionTimeline::new(local_window, remote_window, less, order, end_time);
        let union_step_start = union.index(start_time);
        debug!(
            order,
            union_len = union.len(),
            union_step_start,
            "boundary step with local time-stepping"
        );

        let local_nodes: Vec<f64> = local_window.iter().map(|t| t.value()).collect();
        let remote_nodes: Vec<f64> = remote_window.iter().map(|t| t.value()).collect();

        for local in local_begin..local_times.len() {
            let local_time = local_times[local];
            let union_local = union.index(local_time);
            for remote in remote_begin..remote_times.len() {
                let remote_time = remote_times[remote];
                let mut deriv_coef = 0.0;

                if local_time == remote_time {
                    // 両側が同時刻に評価した: 各区間で通常の AB の寄与
                    for step in union_step_start..union.advance_within_step(union_local) {
                        deriv_coef += union.base_summand(step, union_local)?;
                    }
                } else {
                    let union_remote = union.index(remote_time);
                    let union_step_lower_bound = union_step_start.max(union_remote);

                    // 局所側の時刻で remote_time へ補間した値の寄与
                    // 局所側に同じ時刻があればラグランジュ多項式は 0
                    if !less.contains(local_window, remote_time) {
                        for step in union_step_lower_bound..union.advance_within_step(union_remote) {
                            deriv_coef += union.base_summand(step, union_remote)?;
                        }
                        deriv_coef *=
                            lagrange_basis(local - local_begin, remote_time.value(), &local_nodes);
                    }

                    // 隣接側の時刻で local_time へ補間した値の寄与
                    // 使える隣接側の窓は区間ごとに一つずつずれる
                    if !less.contains(remote_window, local_time) {
                        let mut union_step_upper_bound = union.advance_within_step(union_local);
                        if remote_times.len() - remote > order {
                            union_step_upper_bound = union_step_upper_bound
                                .min(union.index(remote_times[remote + order]));
                        }

                        let mut control = if remote - remote_begin >= order {
                            remote - (order - 1)
                        } else {
                            remote_begin
                        };
                        for step in union_step_lower_bound..union_step_upper_bound {
                            let nodes = &remote_nodes[control - remote_begin..control - remote_begin + order];
                            deriv_coef += union.base_summand(step, union_local)?
                                * lagrange_basis(remote - control, local_time.value(), nodes);
                            control += 1;
                        }
                    }
                }

                if deriv_coef != 0.0 {
                    coupling.add_coupling(result, deriv_coef, local, remote);
                }
            }
        }
        trace!(
            cached_coefficients = union.coefficients.len(),
            "boundary step finished"
        );
        Ok(())
    }
}

impl LtsTimeStepper for AdamsBashforth {
    fn add_boundary_delta<L, R, C, F>(
        &self,
        result: &mut C,
        history: &mut BoundaryHistory<L, R, C>,
        time_step: TimeDelta,
        coupling: &F,
    ) -> Result<(), StepperError>
    where
        C: IntegrationValue,
        F: Fn(&L, &R) -> C,
    {
        let local_len = history.local().len();
        let remote_len = history.remote().len();
        let order = self.boundary_order(history.integration_order(), local_len, remote_len)?;

        let local_times = history.local().times();
        let remote_times = history.remote().times();
        let less = check_step(time_step, local_times, remote_times, order)?;
        let start_time = local_times[local_len - 1];

        // このステップに必要な範囲だけを残す
        let remote_first_needed =
            if local_times[local_len - order..] == remote_times[remote_len - order..] {
                remote_len - order
            } else {
                let remote_step_for_step_start = less.upper_bound(remote_times, start_time);
                if remote_step_for_step_start < order {
                    return Err(StepperError::InsufficientHistory {
                        side: HistorySide::Remote,
                        available: remote_step_for_step_start,
                        required: order,
                    });
                }
                remote_step_for_step_start - order
            };
        debug!(
            local_first_needed = local_len - order,
            remote_first_needed, "marking boundary history"
        );
        history.local_mark_unneeded(local_len - order);
        history.remote_mark_unneeded(remote_first_needed);

        self.boundary_impl(
            result,
            &history.evaluator(coupling),
            start_time + time_step,
            BoundaryMode::Step,
        )
    }

    fn boundary_dense_output<L, R, C, F>(
        &self,
        result: &mut C,
        history: &BoundaryHistory<L, R, C>,
        time: Time,
        coupling: &F,
    ) -> Result<(), StepperError>
    where
        C: IntegrationValue,
        F: Fn(&L, &R) -> C,
    {
        if history.integration_order() != self.order() {
            return Err(StepperError::SelfStartDenseOutputUnsupported {
                history_order: history.integration_order(),
                stepper_order: self.order(),
            });
        }
        let less = EvolutionLess::new(history.time_runs_forward());
        for latest in [history.local().back_time(), history.remote().back_time()]
            .into_iter()
            .flatten()
        {
            if !less.less(latest, time) {
                return Err(StepperError::StaleDenseOutputRequest {
                    requested: time.value(),
                    latest: latest.value(),
                });
            }
        }
        self.boundary_impl(
            result,
            &history.evaluator(coupling),
            time,
            BoundaryMode::DenseOutput,
        )
    }
}
