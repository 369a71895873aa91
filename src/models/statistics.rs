// Running count/min/max/sum per tracked metric

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Accumulator {
    count: u64,
    min: f64,
    max: f64,
    sum: f64,
}

impl Default for Accumulator {
    fn default() -> Self {
        Self {
            count: 0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            sum: 0.0,
        }
    }
}

impl Accumulator {
    pub fn accept(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        (self.count > 0).then_some(self.min)
    }

    pub fn max(&self) -> Option<f64> {
        (self.count > 0).then_some(self.max)
    }

    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Accumulators keyed by metric name. Lives as long as its collector; reset only by `clear`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SummaryStatistics {
    entries: BTreeMap<String, Accumulator>,
}

impl SummaryStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(&mut self, metric: &str, value: f64) {
        self.entries.entry(metric.to_string()).or_default().accept(value);
    }

    pub fn get(&self, metric: &str) -> Option<&Accumulator> {
        self.entries.get(metric)
    }

    pub fn average(&self, metric: &str) -> Option<f64> {
        self.get(metric).and_then(Accumulator::average)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Accumulator)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_accumulator_reports_no_data() {
        let acc = Accumulator::default();
        assert_eq!(acc.count(), 0);
        assert!(acc.average().is_none());
        assert!(acc.min().is_none());
        assert!(acc.max().is_none());
    }

    #[test]
    fn accumulator_tracks_min_max_average() {
        let mut acc = Accumulator::default();
        for v in [10.0, 30.0, 20.0] {
            acc.accept(v);
        }
        assert_eq!(acc.count(), 3);
        assert_eq!(acc.min(), Some(10.0));
        assert_eq!(acc.max(), Some(30.0));
        assert_eq!(acc.average(), Some(20.0));
    }

    #[test]
    fn accumulator_ignores_nan() {
        let mut acc = Accumulator::default();
        acc.accept(f64::NAN);
        acc.accept(4.0);
        assert_eq!(acc.count(), 1);
        assert_eq!(acc.average(), Some(4.0));
    }

    #[test]
    fn clear_drops_every_metric() {
        let mut stats = SummaryStatistics::new();
        stats.accept("server.cpu.total", 12.0);
        stats.accept("server.load.1", 0.5);
        stats.clear();
        assert!(stats.is_empty());
        assert!(stats.average("server.cpu.total").is_none());
    }
}
