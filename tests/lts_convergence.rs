// tests/lts_convergence.rs

use ltsab::math::StepperError;
use ltsab::{AdamsBashforth, BoundaryHistory, EvolutionLess, LtsTimeStepper, Time};
use proptest::prelude::*;

/// 局所側と隣接側の時刻の並び
#[derive(Debug, Clone, Copy)]
struct Grid {
    order: usize,
    local_step: f64,
    remote_step: f64,
    /// 隣接側の時刻のずれ（0 以上 remote_step 未満）
    remote_offset: f64,
    forward: bool,
}

impl Grid {
    fn sign(&self) -> f64 {
        if self.forward {
            1.0
        } else {
            -1.0
        }
    }

    fn local_time(&self, n: i64) -> f64 {
        self.sign() * n as f64 * self.local_step
    }

    fn remote_time(&self, j: i64) -> f64 {
        self.sign() * (self.remote_offset + j as f64 * self.remote_step)
    }
}

fn product(l: &f64, r: &f64) -> f64 {
    l * r
}

/// 境界の結合項 `f(t^L) g(t^R)` を `steps` ステップ分積分する
///
/// 開始時刻以前の履歴は厳密な値で埋めておく。
fn march(
    grid: Grid,
    steps: usize,
    f: impl Fn(f64) -> f64,
    g: impl Fn(f64) -> f64,
    mut after_step: impl FnMut(&BoundaryHistory<f64, f64, f64>),
) -> Result<f64, StepperError> {
    let stepper = AdamsBashforth::new(grid.order)?;
    let less = EvolutionLess::new(grid.forward);
    let mut history = BoundaryHistory::with_direction(grid.order, grid.forward);

    for n in (0..grid.order as i64).rev() {
        let t = grid.local_time(-n);
        history.local_insert(Time(t), f(t))?;
    }
    let mut remote = -(grid.order as i64) - 1;

    let mut total = 0.0;
    for n in 0..steps as i64 {
        let start = Time(grid.local_time(n));
        let end = Time(grid.local_time(n + 1));
        while less.less(Time(grid.remote_time(remote)), end) {
            let t = grid.remote_time(remote);
            history.remote_insert(Time(t), g(t))?;
            remote += 1;
        }
        stepper.add_boundary_delta(&mut total, &mut history, end - start, &product)?;
        after_step(&history);
        history.local_insert(end, f(end.value()))?;
    }
    Ok(total)
}

fn cos_sin_error(grid: Grid) -> f64 {
    let steps = (1.0 / grid.local_step).round() as usize;
    let total = march(grid, steps, f64::cos, f64::sin, |_| {}).unwrap();
    // ∫_0^1 cos t sin t dt
    let exact = 1.0f64.sin().powi(2) / 2.0;
    (total - exact).abs()
}

#[test]
fn test_convergence_order_on_nested_and_offset_grids() {
    for order in 2..=4 {
        let layouts: [(f64, f64); 3] = [
            // 隣接側が粗い
            (2.0, 0.0),
            // 隣接側が細かい
            (0.5, 0.0),
            // 位相がずれている
            (1.0, 1.0 / 3.0),
        ];
        for (ratio, phase) in layouts {
            let errors: Vec<f64> = [1.0 / 32.0, 1.0 / 64.0]
                .iter()
                .map(|&h| {
                    cos_sin_error(Grid {
                        order,
                        local_step: h,
                        remote_step: ratio * h,
                        remote_offset: phase * ratio * h,
                        forward: true,
                    })
                })
                .collect();
            let measured = (errors[0] / errors[1]).log2();
            assert!(
                measured > order as f64 - 0.5,
                "order {order}, ratio {ratio}, phase {phase}: measured {measured} ({errors:?})"
            );
        }
    }
}

#[test]
fn test_synchronized_grid_matches_volume_scheme_error() {
    // 同じ時刻の並びでは LTS を使わないので、誤差も通常の AB と同じ次数で減る
    let errors: Vec<f64> = [1.0 / 32.0, 1.0 / 64.0]
        .iter()
        .map(|&h| {
            cos_sin_error(Grid {
                order: 3,
                local_step: h,
                remote_step: h,
                remote_offset: 0.0,
                forward: true,
            })
        })
        .collect();
    assert!((errors[0] / errors[1]).log2() > 2.5);
}

/// 多項式の係数（低次から）
fn evaluate(coefs: &[f64], t: f64) -> f64 {
    coefs.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut result = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            result[i + j] += x * y;
        }
    }
    result
}

fn integral(coefs: &[f64], a: f64, b: f64) -> f64 {
    let antiderivative: Vec<f64> = std::iter::once(0.0)
        .chain(coefs.iter().enumerate().map(|(i, c)| c / (i + 1) as f64))
        .collect();
    evaluate(&antiderivative, b) - evaluate(&antiderivative, a)
}

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (2usize..=4, 3u32..=4, -2i32..=2, 0u32..8, any::<bool>()).prop_map(
        |(order, local_exp, ratio_exp, offset_eighths, forward)| {
            let local_step = 0.5f64.powi(local_exp as i32);
            let remote_step = local_step * 2.0f64.powi(ratio_exp);
            Grid {
                order,
                local_step,
                remote_step,
                remote_offset: offset_eighths as f64 * remote_step / 8.0,
                forward,
            }
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64, .. ProptestConfig::default()
    })]

    /// 次数 order - 1 以下の積は、どの時刻の並びでも厳密に積分される
    #[test]
    fn boundary_scheme_is_exact_for_polynomials(
        grid in grid_strategy(),
        steps in 1usize..=12,
        local_coefs in prop::array::uniform3(-2.0f64..2.0),
        remote_coefs in prop::array::uniform2(-2.0f64..2.0),
    ) {
        // deg f + deg g <= order - 1
        let (f_degree, g_degree) = match grid.order {
            2 => (1, 0),
            3 => (1, 1),
            _ => (2, 1),
        };
        let f_coefs = &local_coefs[..=f_degree];
        let g_coefs = &remote_coefs[..=g_degree];

        let total = march(
            grid,
            steps,
            |t| evaluate(f_coefs, t),
            |t| evaluate(g_coefs, t),
            |_| {},
        );
        prop_assert!(total.is_ok(), "march failed: {:?}", total);
        let total = total.unwrap_or_default();

        let end = grid.local_time(steps as i64);
        let exact = integral(&multiply(f_coefs, g_coefs), 0.0, end);
        prop_assert!(
            (total - exact).abs() <= 1e-9 * (1.0 + exact.abs()),
            "grid {:?}: total {} exact {}", grid, total, exact
        );
    }

    /// 不要になったサンプルの削除で後のステップに必要なデータが失われず、
    /// 保持されるサンプル数も有界である
    #[test]
    fn pruning_keeps_bounded_sufficient_history(
        grid in grid_strategy(),
        steps in 1usize..=24,
    ) {
        let per_step = (grid.local_step / grid.remote_step).ceil() as usize;
        let mut local_needed = Vec::new();
        let mut remote_needed = Vec::new();
        let total = march(grid, steps, |_| 1.0, |_| 1.0, |history| {
            local_needed.push(history.local().len() - history.local().unneeded());
            remote_needed.push(history.remote().len() - history.remote().unneeded());
        });
        prop_assert!(total.is_ok(), "march failed: {:?}", total);
        let total = total.unwrap_or_default();
        let end = grid.local_time(steps as i64);
        prop_assert!((total - end).abs() <= 1e-12 * (1.0 + end.abs()));

        prop_assert!(local_needed.iter().all(|&n| n == grid.order));
        prop_assert!(
            remote_needed.iter().all(|&n| n >= grid.order && n <= grid.order + per_step + 1),
            "remote samples kept: {:?}", remote_needed
        );
    }
}
