// src/math/mod.rs

pub mod coefficients;
pub mod error;
pub mod lagrange;
pub mod value;

pub use coefficients::{coefficients, MAXIMUM_ORDER};
pub use error::{HistorySide, StepperError};
pub use lagrange::{lagrange_basis, lagrange_polynomial};
pub use value::IntegrationValue;
