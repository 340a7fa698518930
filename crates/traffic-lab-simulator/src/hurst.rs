//! Hurst exponent estimation by rescaled-range (R/S) analysis.

/// Series shorter than this return the uncorrelated value 0.5.
pub const MIN_SAMPLES: usize = 20;
/// Smallest window size used in the regression.
pub const MIN_WINDOW: usize = 8;

const UNCORRELATED: f64 = 0.5;

/// Classical R/S estimator.
#[derive(Debug, Clone, Copy)]
pub struct HurstEstimator {
    min_samples: usize,
    min_window: usize,
}

impl Default for HurstEstimator {
    fn default() -> Self {
        Self {
            min_samples: MIN_SAMPLES,
            min_window: MIN_WINDOW,
        }
    }
}

impl HurstEstimator {
    /// Slope of `log(R/S)` against `log(window)`, clamped to `[0, 1]`.
    pub fn estimate(&self, data: &[f64]) -> f64 {
        if data.len() < self.min_samples {
            return UNCORRELATED;
        }

        let points: Vec<(f64, f64)> = self
            .window_sizes(data.len())
            .filter_map(|size| {
                average_rescaled_range(data, size).map(|rs| ((size as f64).ln(), rs.ln()))
            })
            .collect();

        if points.len() < 2 {
            return UNCORRELATED;
        }
        regression_slope(&points).clamp(0.0, 1.0)
    }

    /// n/2, n/4, ... down to the minimum window.
    fn window_sizes(&self, n: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(n / 2), |size| Some(size / 2))
            .take_while(|size| *size >= self.min_window)
    }
}

/// [`HurstEstimator::estimate`] with the default thresholds.
pub fn estimate_hurst(data: &[f64]) -> f64 {
    HurstEstimator::default().estimate(data)
}

/// Mean R/S over the non-overlapping windows of `size`; windows with zero spread are skipped.
fn average_rescaled_range(data: &[f64], size: usize) -> Option<f64> {
    let (sum, count) = data
        .chunks_exact(size)
        .filter_map(rescaled_range)
        .fold((0.0, 0usize), |(sum, count), rs| (sum + rs, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn rescaled_range(window: &[f64]) -> Option<f64> {
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;

    let mut cumulative = 0.0;
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for x in window {
        cumulative += x - mean;
        lo = lo.min(cumulative);
        hi = hi.max(cumulative);
    }

    let std = (window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n).sqrt();
    (std > 0.0).then(|| (hi - lo) / std).filter(|rs| *rs > 0.0)
}

/// Ordinary least squares slope; 0.5 when `x` has no spread.
fn regression_slope(points: &[(f64, f64)]) -> f64 {
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let (num, den) = points.iter().fold((0.0, 0.0), |(num, den), (x, y)| {
        let dx = x - mean_x;
        (num + dx * (y - mean_y), den + dx * dx)
    });

    if den > 0.0 { num / den } else { UNCORRELATED }
}
