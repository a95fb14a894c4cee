// src/history/samples.rs

use crate::time::Time;

/// 履歴中のサンプルの安定した識別子
///
/// 古いサンプルが削除されても値は変わらないため、キャッシュのキーに使える。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SampleId(pub u64);

/// 時刻順に並んだサンプル列
///
/// 不要になった先頭部分は `mark_unneeded` で印を付けるだけで、
/// 実際の削除は `discard_unneeded` まで遅延される。
#[derive(Debug, Clone)]
pub struct Samples<T> {
    times: Vec<Time>,
    values: Vec<T>,
    first_id: u64,
    first_needed: usize,
}

impl<T> Default for Samples<T> {
    fn default() -> Self {
        Samples {
            times: Vec::new(),
            values: Vec::new(),
            first_id: 0,
            first_needed: 0,
        }
    }
}

impl<T> Samples<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn time(&self, index: usize) -> Time {
        self.times[index]
    }

    pub fn value(&self, index: usize) -> &T {
        &self.values[index]
    }

    pub fn id(&self, index: usize) -> SampleId {
        SampleId(self.first_id + index as u64)
    }

    pub fn back_time(&self) -> Option<Time> {
        self.times.last().copied()
    }

    /// 古い順にたどる
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (Time, &T)> + '_ {
        self.times.iter().copied().zip(self.values.iter())
    }

    /// 時刻の整合性は所有者が確認する
    pub(crate) fn push(&mut self, time: Time, value: T) {
        self.times.push(time);
        self.values.push(value);
    }

    /// `first_needed` より前のサンプルを不要とする
    ///
    /// 一度不要とした範囲は狭めない。
    pub fn mark_unneeded(&mut self, first_needed: usize) {
        self.first_needed = self.first_needed.max(first_needed.min(self.len()));
    }

    /// 削除待ちのサンプル数
    pub fn unneeded(&self) -> usize {
        self.first_needed
    }

    /// 不要なサンプルを削除する
    ///
    /// # 戻り値
    /// - 削除が発生した場合、残った先頭サンプルの識別子
    pub fn discard_unneeded(&mut self) -> Option<SampleId> {
        if self.first_needed == 0 {
            return None;
        }
        let removed = self.first_needed;
        self.times.drain(..removed);
        self.values.drain(..removed);
        self.first_id += removed as u64;
        self.first_needed = 0;
        Some(SampleId(self.first_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_survive_discard() {
        let mut samples = Samples::new();
        for i in 0..5 {
            samples.push(Time(i as f64), i);
        }
        samples.mark_unneeded(2);
        assert_eq!(samples.len(), 5);
        assert_eq!(samples.discard_unneeded(), Some(SampleId(2)));
        assert_eq!(samples.len(), 3);
        assert_eq!(samples.id(0), SampleId(2));
        assert_eq!(*samples.value(0), 2);
        assert_eq!(samples.time(2), Time(4.0));
    }

    #[test]
    fn test_mark_unneeded_never_shrinks() {
        let mut samples = Samples::new();
        for i in 0..4 {
            samples.push(Time(i as f64), ());
        }
        samples.mark_unneeded(3);
        samples.mark_unneeded(1);
        assert_eq!(samples.unneeded(), 3);
        samples.mark_unneeded(10);
        assert_eq!(samples.unneeded(), 4);
    }

    #[test]
    fn test_discard_without_marks() {
        let mut samples: Samples<f64> = Samples::new();
        samples.push(Time(0.0), 1.0);
        assert_eq!(samples.discard_unneeded(), None);
        assert_eq!(samples.len(), 1);
    }
}
