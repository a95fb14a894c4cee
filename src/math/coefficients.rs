// src/math/coefficients.rs

use crate::math::error::StepperError;
use crate::time::{Time, TimeDelta};

/// 対応する最大次数
pub const MAXIMUM_ORDER: usize = 8;

/// Adams-Bashforth 法の係数を求める
///
/// # 引数
/// - `times`: 過去の評価時刻（古い順）
/// - `step`: これから取る時間刻み
///
/// # 戻り値
/// - `times[i]` の微分値に掛ける重み（最新の重みが末尾）
pub fn coefficients(times: &[Time], step: TimeDelta) -> Result<Vec<f64>, StepperError> {
    if times.is_empty() {
        return Ok(Vec::new());
    }
    let mut steps: Vec<f64> = times.windows(2).map(|pair| (pair[1] - pair[0]).value()).collect();
    steps.push(step.value());
    coefficients_from_steps(&steps)
}

/// 刻み幅の列 `{dt_{n-k+1}, ..., dt_n}`（最後がこれから取る刻み）から係数を求める
pub fn coefficients_from_steps(steps: &[f64]) -> Result<Vec<f64>, StepperError> {
    let order = steps.len();
    if order == 0 || order > MAXIMUM_ORDER {
        return Err(StepperError::UnsupportedOrder(order));
    }
    if steps[order - 1] == 0.0 {
        return Err(StepperError::ZeroTimeStep);
    }
    if steps.iter().all(|&s| s == steps[0]) {
        Ok(constant_coefficients(order).to_vec())
    } else {
        Ok(variable_coefficients(steps))
    }
}

/// 等間隔の場合の係数表
pub fn constant_coefficients(order: usize) -> &'static [f64] {
    match order {
        1 => &[1.0],
        2 => &[-0.5, 1.5],
        3 => &[5.0 / 12.0, -16.0 / 12.0, 23.0 / 12.0],
        4 => &[-9.0 / 24.0, 37.0 / 24.0, -59.0 / 24.0, 55.0 / 24.0],
        5 => &[
            251.0 / 720.0,
            -1274.0 / 720.0,
            2616.0 / 720.0,
            -2774.0 / 720.0,
            1901.0 / 720.0,
        ],
        6 => &[
            -475.0 / 1440.0,
            2877.0 / 1440.0,
            -7298.0 / 1440.0,
            9982.0 / 1440.0,
            -7923.0 / 1440.0,
            4277.0 / 1440.0,
        ],
        7 => &[
            19087.0 / 60480.0,
            -134472.0 / 60480.0,
            407139.0 / 60480.0,
            -688256.0 / 60480.0,
            705549.0 / 60480.0,
            -447288.0 / 60480.0,
            198721.0 / 60480.0,
        ],
        8 => &[
            -36799.0 / 120960.0,
            295767.0 / 120960.0,
            -1041723.0 / 120960.0,
            2102243.0 / 120960.0,
            -2664477.0 / 120960.0,
            2183877.0 / 120960.0,
            -1152169.0 / 120960.0,
            434241.0 / 120960.0,
        ],
        _ => &[],
    }
}

/// 不等間隔の場合の係数
///
/// 最後の刻み（これから取る刻み）は 0 であってはならない。
///
/// 時刻を新しい刻み `h` で正規化し、評価点を `y_i = (t_i - t_n) / h` とすると
/// 係数は `∫_0^1 ℓ_i(s) ds` になる。`ℓ_i` の分子を単項式基底で展開し、
/// 不定積分を閉じた形で評価する。
pub fn variable_coefficients(steps: &[f64]) -> Vec<f64> {
    let order = steps.len();
    let step = steps[order - 1];

    let mut nodes = vec![0.0; order];
    for i in (0..order - 1).rev() {
        nodes[i] = nodes[i + 1] - steps[i] / step;
    }

    (0..order)
        .map(|j| {
            let mut numerator = Vec::with_capacity(order);
            numerator.push(1.0);
            let mut denominator = 1.0;
            for (m, &y_m) in nodes.iter().enumerate() {
                if m == j {
                    continue;
                }
                // numerator <- numerator * (s - y_m)
                numerator.push(0.0);
                for p in (0..numerator.len()).rev() {
                    let lower = if p > 0 { numerator[p - 1] } else { 0.0 };
                    numerator[p] = lower - y_m * numerator[p];
                }
                denominator *= nodes[j] - y_m;
            }
            let integral: f64 = numerator
                .iter()
                .enumerate()
                .map(|(p, a)| a / (p as f64 + 1.0))
                .sum();
            integral / denominator
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_coefficients_sum_to_one() {
        for order in 1..=MAXIMUM_ORDER {
            let sum: f64 = constant_coefficients(order).iter().sum();
            assert_relative_eq!(sum, 1.0, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_order_three_table() {
        let times = [Time(0.0), Time(0.25), Time(0.5)];
        let coefs = coefficients(&times, TimeDelta(0.25)).unwrap();
        assert_eq!(coefs, vec![5.0 / 12.0, -16.0 / 12.0, 23.0 / 12.0]);
    }

    #[test]
    fn test_variable_formula_matches_table() {
        for order in 1..=MAXIMUM_ORDER {
            let steps = vec![0.25; order];
            let variable = variable_coefficients(&steps);
            for (a, b) in variable.iter().zip(constant_coefficients(order)) {
                assert_relative_eq!(*a, *b, epsilon = 1e-10, max_relative = 1e-10);
            }
        }
    }

    #[test]
    fn test_variable_order_two() {
        // 前の刻み 2h、次の刻み h: y = {-2, 0}
        // c_0 = ∫ s / (-2) = -1/4, c_1 = ∫ (s + 2) / 2 = 5/4
        let coefs = coefficients_from_steps(&[0.2, 0.1]).unwrap();
        assert_relative_eq!(coefs[0], -0.25, epsilon = 1e-14);
        assert_relative_eq!(coefs[1], 1.25, epsilon = 1e-14);
    }

    #[test]
    fn test_backward_steps() {
        let times = [Time(0.0), Time(-0.125), Time(-0.375)];
        let coefs = coefficients(&times, TimeDelta(-0.25)).unwrap();
        let forward =
            coefficients(&[Time(0.0), Time(0.125), Time(0.375)], TimeDelta(0.25)).unwrap();
        for (a, b) in coefs.iter().zip(forward.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-14);
        }
    }

    #[test]
    fn test_variable_integrates_polynomials() {
        // 4 点の係数は 3 次多項式を厳密に積分する
        let times = [0.0, 0.3, 0.45, 1.0];
        let step = 0.2;
        let f = |t: f64| 1.0 - 2.0 * t + 3.0 * t * t - t * t * t;
        let antiderivative =
            |t: f64| t - t * t + t * t * t - 0.25 * t * t * t * t;
        let time_values: Vec<Time> = times.iter().copied().map(Time).collect();
        let coefs = coefficients(&time_values, TimeDelta(step)).unwrap();
        let approx: f64 = coefs
            .iter()
            .zip(times.iter())
            .map(|(c, &t)| step * c * f(t))
            .sum();
        assert_relative_eq!(
            approx,
            antiderivative(1.0 + step) - antiderivative(1.0),
            epsilon = 1e-13
        );
    }

    #[test]
    fn test_unsupported_order() {
        assert_eq!(
            coefficients_from_steps(&[0.1; 9]),
            Err(StepperError::UnsupportedOrder(9))
        );
        assert!(coefficients(&[], TimeDelta(0.1)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_step_is_rejected() {
        assert_eq!(
            coefficients(&[Time(0.0), Time(0.5)], TimeDelta(0.0)),
            Err(StepperError::ZeroTimeStep)
        );
        assert_eq!(
            coefficients(&[Time(0.0)], TimeDelta(0.0)),
            Err(StepperError::ZeroTimeStep)
        );
    }
}
