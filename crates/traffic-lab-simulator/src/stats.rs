use crate::hurst::{HurstEstimator, MIN_SAMPLES};
use traffic_lab_abstract::TrafficStatistics;

/// Uniformly sampled `(time, aggregate_rate)` series of one run.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCollector {
    times: Vec<f64>,
    rates: Vec<f64>,
    estimator: HurstEstimator,
}

impl StatisticsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sample(&mut self, time: f64, aggregate_rate: f64) {
        self.times.push(time);
        self.rates.push(aggregate_rate);
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    pub fn sample_count(&self) -> usize {
        self.rates.len()
    }

    pub fn average_rate(&self) -> f64 {
        if self.rates.is_empty() {
            return 0.0;
        }
        self.rates.iter().sum::<f64>() / self.rates.len() as f64
    }

    pub fn peak_rate(&self) -> f64 {
        self.rates.iter().copied().fold(0.0, f64::max)
    }

    /// Sample (n - 1) standard deviation; 0 with fewer than two samples.
    pub fn std_dev_rate(&self) -> f64 {
        let n = self.rates.len();
        if n < 2 {
            return 0.0;
        }
        let mean = self.average_rate();
        let sum_sq: f64 = self.rates.iter().map(|r| (r - mean).powi(2)).sum();
        (sum_sq / (n - 1) as f64).sqrt()
    }

    /// R/S estimate of the rate series; 0.5 below [`MIN_SAMPLES`].
    pub fn hurst_exponent(&self) -> f64 {
        if self.rates.len() < MIN_SAMPLES {
            return 0.5;
        }
        self.estimator.estimate(&self.rates)
    }

    pub fn reset(&mut self) {
        self.times.clear();
        self.rates.clear();
    }

    pub fn snapshot(&self) -> TrafficStatistics {
        TrafficStatistics {
            samples: self
                .times
                .iter()
                .copied()
                .zip(self.rates.iter().copied())
                .collect(),
            sample_count: self.sample_count(),
            average_rate: self.average_rate(),
            peak_rate: self.peak_rate(),
            std_dev_rate: self.std_dev_rate(),
            hurst_exponent: self.hurst_exponent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_collector_reports_zeros() {
        let stats = StatisticsCollector::new();
        assert_eq!(stats.sample_count(), 0);
        assert_eq!(stats.average_rate(), 0.0);
        assert_eq!(stats.peak_rate(), 0.0);
        assert_eq!(stats.std_dev_rate(), 0.0);
        assert_eq!(stats.hurst_exponent(), 0.5);
    }

    #[test]
    fn summary_of_a_small_series() {
        let mut stats = StatisticsCollector::new();
        for (i, rate) in [0.2, 0.4, 0.6, 0.8].into_iter().enumerate() {
            stats.record_sample(i as f64, rate);
        }

        assert_eq!(stats.times(), &[0.0, 1.0, 2.0, 3.0]);
        assert!((stats.average_rate() - 0.5).abs() < 1e-12);
        assert_eq!(stats.peak_rate(), 0.8);
        // Sample variance of {0.2, 0.4, 0.6, 0.8} is 0.2/3.
        assert!((stats.std_dev_rate() - (0.2f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(stats.hurst_exponent(), 0.5);
    }

    #[test]
    fn hurst_is_delegated_once_enough_samples_exist() {
        let mut stats = StatisticsCollector::new();
        for i in 0..256 {
            stats.record_sample(i as f64, i as f64 / 256.0);
        }
        let h = stats.hurst_exponent();
        assert!((0.0..=1.0).contains(&h));
        assert_eq!(h, crate::hurst::estimate_hurst(stats.rates()));
    }

    #[test]
    fn snapshot_pairs_times_with_rates_and_reset_clears() {
        let mut stats = StatisticsCollector::new();
        stats.record_sample(0.0, 0.0);
        stats.record_sample(1.0, 0.5);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.samples, vec![(0.0, 0.0), (1.0, 0.5)]);
        assert_eq!(snapshot.sample_count, 2);
        assert_eq!(snapshot.peak_rate, 0.5);

        stats.reset();
        assert_eq!(stats.sample_count(), 0);
        assert!(stats.times().is_empty());
    }
}
