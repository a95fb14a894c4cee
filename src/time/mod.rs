// src/time/mod.rs

use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// 時間発展上の時刻
///
/// 等値判定は厳密な浮動小数点比較で行う。近さによる同一視はしない。
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(pub f64);

impl Time {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 符号付きの時間刻み
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeDelta(pub f64);

impl TimeDelta {
    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0.0
    }
}

impl Sub for Time {
    type Output = TimeDelta;

    fn sub(self, rhs: Time) -> TimeDelta {
        TimeDelta(self.0 - rhs.0)
    }
}

impl Add<TimeDelta> for Time {
    type Output = Time;

    fn add(self, rhs: TimeDelta) -> Time {
        Time(self.0 + rhs.0)
    }
}

/// 時間発展の向きを考慮した狭義の順序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionLess {
    pub time_runs_forward: bool,
}

impl EvolutionLess {
    pub fn new(time_runs_forward: bool) -> Self {
        EvolutionLess { time_runs_forward }
    }

    /// `a` が `b` より時間発展の上で前にあるか
    pub fn less(&self, a: Time, b: Time) -> bool {
        if self.time_runs_forward {
            a.0 < b.0
        } else {
            b.0 < a.0
        }
    }

    pub fn is_sorted(&self, times: &[Time]) -> bool {
        times.windows(2).all(|pair| !self.less(pair[1], pair[0]))
    }

    /// `t` より前にない最初の位置（lower bound）
    pub fn lower_bound(&self, times: &[Time], t: Time) -> usize {
        times.partition_point(|&x| self.less(x, t))
    }

    /// `t` より後にある最初の位置（upper bound）
    pub fn upper_bound(&self, times: &[Time], t: Time) -> usize {
        times.partition_point(|&x| !self.less(t, x))
    }

    /// 整列済みの `times` に `t` と等しい時刻が含まれるか
    pub fn contains(&self, times: &[Time], t: Time) -> bool {
        let index = self.lower_bound(times, t);
        index < times.len() && times[index] == t
    }
}

/// ステップの識別子
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeStepId {
    pub time_runs_forward: bool,
    pub step_number: u64,
    pub substep: u64,
    pub step_time: Time,
}

impl TimeStepId {
    pub fn new(time_runs_forward: bool, step_number: u64, step_time: Time) -> Self {
        TimeStepId {
            time_runs_forward,
            step_number,
            substep: 0,
            step_time,
        }
    }
}

impl fmt::Display for TimeStepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            if self.time_runs_forward { "+" } else { "-" },
            self.step_number,
            self.substep,
            self.step_time
        )
    }
}
