// src/lib.rs

//! 局所時間刻み（LTS）に対応した可変次数・可変刻みの Adams-Bashforth 法

pub mod config;
pub mod history;
pub mod logging;
pub mod math;
pub mod simulation;
pub mod stepper;
pub mod time;

pub use history::{BoundaryHistory, History};
pub use math::{IntegrationValue, StepperError};
pub use stepper::{AdamsBashforth, LtsTimeStepper, TimeStepper};
pub use time::{EvolutionLess, Time, TimeDelta, TimeStepId};
