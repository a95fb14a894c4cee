// src/math/error.rs

use std::fmt;

use thiserror::Error;

/// 履歴の種類（エラー報告用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySide {
    Volume,
    Local,
    Remote,
}

impl fmt::Display for HistorySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistorySide::Volume => write!(f, "volume"),
            HistorySide::Local => write!(f, "local"),
            HistorySide::Remote => write!(f, "remote"),
        }
    }
}

/// 時間積分器のエラー
///
/// いずれも呼び出し側のバグ、またはデータ不足を示す致命的なエラーで、
/// 積分器の内部で再試行することはない。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StepperError {
    #[error("{side} 履歴のデータが不足しています: {available} 個の時刻に対して {required} 個が必要です。")]
    InsufficientHistory {
        side: HistorySide,
        available: usize,
        required: usize,
    },

    #[error("{side} 履歴の時刻が時間発展の向きに整列していません。")]
    UnsortedHistory { side: HistorySide },

    #[error("自己始動中（積分次数 {history_order} < {stepper_order}）は局所時間刻みを実行できません。")]
    OrderMismatchDuringSelfStart {
        history_order: usize,
        stepper_order: usize,
    },

    #[error("密出力の時刻 {requested} が最新の履歴時刻 {latest} より後ではありません。")]
    StaleDenseOutputRequest { requested: f64, latest: f64 },

    #[error("自己始動中（積分次数 {history_order} < {stepper_order}）は境界の密出力を実行できません。")]
    SelfStartDenseOutputUnsupported {
        history_order: usize,
        stepper_order: usize,
    },

    #[error("履歴の積分次数 {history_order} が積分器の次数 {stepper_order} を超えています。")]
    HistoryOrderTooHigh {
        history_order: usize,
        stepper_order: usize,
    },

    #[error("次数 {0} は対応範囲 1..=8 の外です。")]
    UnsupportedOrder(usize),

    #[error("リモート側の時刻 {remote} がステップ終了時刻 {end} より前ではありません。")]
    RemoteDataBeyondStep { remote: f64, end: f64 },

    #[error("Adams-Bashforth 法は中間段を持ちません（substep = {0}）。")]
    UnexpectedSubstep(u64),

    #[error("時間刻みの符号が時間発展の向きと一致しません。")]
    DirectionMismatch,

    #[error("時間刻みが 0 です。")]
    ZeroTimeStep,
}
