// src/config/options.rs

use serde::{Deserialize, Serialize};

use crate::math::coefficients::MAXIMUM_ORDER;
use crate::math::error::StepperError;
use crate::stepper::AdamsBashforth;

/// 外部のオプション解析器に渡すための説明
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDescription {
    pub name: &'static str,
    pub help: &'static str,
    pub lower_bound: usize,
    pub upper_bound: usize,
}

impl OptionDescription {
    pub fn contains(&self, value: usize) -> bool {
        (self.lower_bound..=self.upper_bound).contains(&value)
    }
}

/// 次数オプション
pub const ORDER_OPTION: OptionDescription = OptionDescription {
    name: "Order",
    help: "Convergence order",
    lower_bound: 1,
    upper_bound: MAXIMUM_ORDER,
};

/// Adams-Bashforth 法のオプション
///
/// 積分器の永続化される状態はこの次数だけである。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdamsBashforthOptions {
    pub order: usize,
}

impl TryFrom<AdamsBashforthOptions> for AdamsBashforth {
    type Error = StepperError;

    fn try_from(options: AdamsBashforthOptions) -> Result<Self, Self::Error> {
        AdamsBashforth::new(options.order)
    }
}

impl From<AdamsBashforth> for AdamsBashforthOptions {
    fn from(stepper: AdamsBashforth) -> Self {
        AdamsBashforthOptions {
            order: crate::stepper::TimeStepper::order(&stepper),
        }
    }
}

/// 設定時に選ぶ時間積分器の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimeStepperOptions {
    AdamsBashforth(AdamsBashforthOptions),
}

impl TimeStepperOptions {
    pub fn build(&self) -> Result<AdamsBashforth, StepperError> {
        match self {
            TimeStepperOptions::AdamsBashforth(options) => AdamsBashforth::try_from(*options),
        }
    }

    pub fn help(&self) -> &'static str {
        match self {
            TimeStepperOptions::AdamsBashforth(_) => AdamsBashforth::HELP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stepper::TimeStepper;

    #[test]
    fn test_order_option_bounds() {
        assert!(ORDER_OPTION.contains(1));
        assert!(ORDER_OPTION.contains(8));
        assert!(!ORDER_OPTION.contains(0));
        assert!(!ORDER_OPTION.contains(9));
        assert_eq!(ORDER_OPTION.help, "Convergence order");
    }

    #[test]
    fn test_tagged_options_from_yaml() {
        let options: TimeStepperOptions =
            serde_yaml::from_str("type: AdamsBashforth\norder: 4\n").unwrap();
        let stepper = options.build().unwrap();
        assert_eq!(stepper.order(), 4);
        assert_eq!(options.help(), "An Adams-Bashforth Nth order time-stepper.");
    }

    #[test]
    fn test_out_of_range_order_is_rejected() {
        let options: TimeStepperOptions =
            serde_yaml::from_str("type: AdamsBashforth\norder: 9\n").unwrap();
        assert_eq!(options.build(), Err(StepperError::UnsupportedOrder(9)));
    }
}
