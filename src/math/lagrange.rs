// src/math/lagrange.rs

use crate::math::value::IntegrationValue;

/// 制御点 `nodes` 上の `index` 番目のラグランジュ基底多項式を `x` で評価する
///
/// 外挿に対する保護はない。呼び出し側が妥当な `x` を渡すこと。
pub fn lagrange_basis(index: usize, x: f64, nodes: &[f64]) -> f64 {
    let x_i = nodes[index];
    nodes
        .iter()
        .enumerate()
        .filter(|&(m, _)| m != index)
        .fold(1.0, |acc, (_, &x_m)| acc * (x - x_m) / (x_i - x_m))
}

/// 制御点 (時刻, 値) を通る補間多項式を `query_time` で評価する
///
/// # 引数
/// - `query_time`: 評価する時刻
/// - `control_times`: 制御点の時刻（次数は `len - 1`）
/// - `control_values`: 制御点の値
///
/// # 戻り値
/// - 補間値（制御点が空の場合は `None`）
pub fn lagrange_polynomial<T: IntegrationValue>(
    query_time: f64,
    control_times: &[f64],
    control_values: &[T],
) -> Option<T> {
    debug_assert_eq!(control_times.len(), control_values.len());
    let (first, rest) = control_values.split_first()?;
    let mut result = first.clone();
    result.scale(lagrange_basis(0, query_time, control_times));
    for (offset, value) in rest.iter().enumerate() {
        result.add_scaled(lagrange_basis(offset + 1, query_time, control_times), value);
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_basis_is_cardinal() {
        let nodes = [0.0, 0.5, 2.0];
        for i in 0..nodes.len() {
            for (j, &x) in nodes.iter().enumerate() {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(lagrange_basis(i, x, &nodes), expected);
            }
        }
    }

    #[test]
    fn test_reproduces_quadratic() {
        let times = [-1.0, 0.25, 1.5];
        let values: Vec<f64> = times.iter().map(|t| 3.0 * t * t - t + 2.0).collect();
        let x = 0.8;
        let interpolated = lagrange_polynomial(x, &times, &values).unwrap();
        assert_relative_eq!(interpolated, 3.0 * x * x - x + 2.0, epsilon = 1e-13);
    }

    #[test]
    fn test_vector_values() {
        let times = [0.0, 1.0];
        let values = [[0.0, 1.0], [2.0, 3.0]];
        let interpolated = lagrange_polynomial(0.5, &times, &values).unwrap();
        assert_relative_eq!(interpolated[0], 1.0);
        assert_relative_eq!(interpolated[1], 2.0);
    }

    #[test]
    fn test_empty_control_points() {
        let values: [f64; 0] = [];
        assert!(lagrange_polynomial(0.0, &[], &values).is_none());
    }
}
