// src/history/boundary.rs

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::trace;

use crate::history::samples::{SampleId, Samples};
use crate::math::error::{HistorySide, StepperError};
use crate::math::value::IntegrationValue;
use crate::time::{EvolutionLess, Time};

/// 境界（モルタル）の両側の履歴と結合値のキャッシュ
///
/// - `L`: 局所側のデータ
/// - `R`: 隣接側のデータ
/// - `C`: 結合関数の値
///
/// 結合関数は二つのサンプルの純関数とみなし、同じ組に対しては一度だけ評価する。
/// キャッシュのキーは安定な `SampleId` の組なので、サンプルの追加では無効にならない。
/// サンプルを削除したときは、削除されたサンプルを含む組だけを捨てる。
#[derive(Debug)]
pub struct BoundaryHistory<L, R, C> {
    local: Samples<L>,
    remote: Samples<R>,
    integration_order: usize,
    time_runs_forward: bool,
    couplings: RefCell<HashMap<(SampleId, SampleId), C>>,
}

impl<L, R, C> BoundaryHistory<L, R, C> {
    pub fn new(integration_order: usize) -> Self {
        Self::with_direction(integration_order, true)
    }

    pub fn with_direction(integration_order: usize, time_runs_forward: bool) -> Self {
        BoundaryHistory {
            local: Samples::new(),
            remote: Samples::new(),
            integration_order,
            time_runs_forward,
            couplings: RefCell::new(HashMap::new()),
        }
    }

    /// 局所側のサンプルを追加する
    pub fn local_insert(&mut self, time: Time, value: L) -> Result<(), StepperError> {
        check_ordering(self.time_runs_forward, self.local.back_time(), time, HistorySide::Local)?;
        if let Some(first_kept) = self.local.discard_unneeded() {
            self.couplings
                .get_mut()
                .retain(|(local, _), _| *local >= first_kept);
        }
        self.local.push(time, value);
        Ok(())
    }

    /// 隣接側のサンプルを追加する
    pub fn remote_insert(&mut self, time: Time, value: R) -> Result<(), StepperError> {
        check_ordering(self.time_runs_forward, self.remote.back_time(), time, HistorySide::Remote)?;
        if let Some(first_kept) = self.remote.discard_unneeded() {
            self.couplings
                .get_mut()
                .retain(|(_, remote), _| *remote >= first_kept);
        }
        self.remote.push(time, value);
        Ok(())
    }

    pub fn local(&self) -> &Samples<L> {
        &self.local
    }

    pub fn remote(&self) -> &Samples<R> {
        &self.remote
    }

    pub fn local_mark_unneeded(&mut self, first_needed: usize) {
        self.local.mark_unneeded(first_needed);
    }

    pub fn remote_mark_unneeded(&mut self, first_needed: usize) {
        self.remote.mark_unneeded(first_needed);
    }

    pub fn integration_order(&self) -> usize {
        self.integration_order
    }

    pub fn set_integration_order(&mut self, integration_order: usize) {
        self.integration_order = integration_order;
    }

    /// 自己始動: 積分次数を `min(局所サンプル数, target_order)` にする
    pub fn ramp_integration_order(&mut self, target_order: usize) -> usize {
        self.integration_order = self.local.len().min(target_order);
        self.integration_order
    }

    pub fn time_runs_forward(&self) -> bool {
        self.time_runs_forward
    }

    /// キャッシュ済みの結合値の数
    pub fn cached_couplings(&self) -> usize {
        self.couplings.borrow().len()
    }

    /// 結合関数を評価するアクセサを作る
    pub fn evaluator<'a, F>(&'a self, coupling: &'a F) -> BoundaryHistoryEvaluator<'a, L, R, C, F>
    where
        F: Fn(&L, &R) -> C,
    {
        BoundaryHistoryEvaluator {
            history: self,
            coupling,
        }
    }
}

fn check_ordering(
    time_runs_forward: bool,
    latest: Option<Time>,
    time: Time,
    side: HistorySide,
) -> Result<(), StepperError> {
    match latest {
        Some(latest) if !EvolutionLess::new(time_runs_forward).less(latest, time) => {
            Err(StepperError::UnsortedHistory { side })
        }
        _ => Ok(()),
    }
}

/// 局所側と隣接側のサンプルの組に対する結合値のメモ化アクセサ
pub struct BoundaryHistoryEvaluator<'a, L, R, C, F> {
    history: &'a BoundaryHistory<L, R, C>,
    coupling: &'a F,
}

impl<'a, L, R, C, F> BoundaryHistoryEvaluator<'a, L, R, C, F>
where
    F: Fn(&L, &R) -> C,
{
    pub fn integration_order(&self) -> usize {
        self.history.integration_order
    }

    pub fn local_times(&self) -> &'a [Time] {
        self.history.local.times()
    }

    pub fn remote_times(&self) -> &'a [Time] {
        self.history.remote.times()
    }

    /// `result += coefficient * D(local, remote)`
    pub fn add_coupling(&self, result: &mut C, coefficient: f64, local: usize, remote: usize)
    where
        C: IntegrationValue,
    {
        let key = (self.history.local.id(local), self.history.remote.id(remote));
        let mut couplings = self.history.couplings.borrow_mut();
        let value = couplings.entry(key).or_insert_with(|| {
            let (SampleId(local_id), SampleId(remote_id)) = key;
            trace!(local_id, remote_id, "evaluating coupling");
            (self.coupling)(self.history.local.value(local), self.history.remote.value(remote))
        });
        result.add_scaled(coefficient, value);
    }

    /// `D(local, remote)` の値
    pub fn coupling(&self, local: usize, remote: usize) -> C
    where
        C: Clone,
    {
        let key = (self.history.local.id(local), self.history.remote.id(remote));
        self.history
            .couplings
            .borrow_mut()
            .entry(key)
            .or_insert_with(|| {
                (self.coupling)(self.history.local.value(local), self.history.remote.value(remote))
            })
            .clone()
    }
}
