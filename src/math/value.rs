// src/math/value.rs

/// 積分対象として扱える値
///
/// `value += scalar * other` の形の累積と差分さえ計算できれば、
/// スカラーでもベクトルでも積分器に渡せる。
pub trait IntegrationValue: Clone {
    /// `self += scale * other`
    fn add_scaled(&mut self, scale: f64, other: &Self);

    /// `self *= factor`
    fn scale(&mut self, factor: f64);

    /// `self -= other`
    fn subtract(&mut self, other: &Self);
}

impl IntegrationValue for f64 {
    fn add_scaled(&mut self, scale: f64, other: &Self) {
        *self += scale * other;
    }

    fn scale(&mut self, factor: f64) {
        *self *= factor;
    }

    fn subtract(&mut self, other: &Self) {
        *self -= other;
    }
}

impl<const N: usize> IntegrationValue for [f64; N] {
    fn add_scaled(&mut self, scale: f64, other: &Self) {
        for (a, b) in self.iter_mut().zip(other.iter()) {
            *a += scale * b;
        }
    }

    fn scale(&mut self, factor: f64) {
        for a in self.iter_mut() {
            *a *= factor;
        }
    }

    fn subtract(&mut self, other: &Self) {
        for (a, b) in self.iter_mut().zip(other.iter()) {
            *a -= b;
        }
    }
}

// 長さの一致は呼び出し側の責任
impl IntegrationValue for Vec<f64> {
    fn add_scaled(&mut self, scale: f64, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.iter_mut().zip(other.iter()) {
            *a += scale * b;
        }
    }

    fn scale(&mut self, factor: f64) {
        for a in self.iter_mut() {
            *a *= factor;
        }
    }

    fn subtract(&mut self, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.iter_mut().zip(other.iter()) {
            *a -= b;
        }
    }
}
