//! Standalone workflow: generate one FGN series and hand it to a sink.

use crate::error::{Result, SimError};
use crate::fgn::FractionalGaussianNoise;
use crate::hurst::estimate_hurst;
use serde::Serialize;
use traffic_lab_abstract::{FgnGenerationParameters, OutputSink};
use tracing::{info, warn};

/// Below this many samples the R/S estimate is too noisy to report.
pub const MIN_FGN_HURST_SAMPLES: usize = 512;
const MIN_VARIANCE: f64 = 1e-12;

/// Descriptive statistics of one generated series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub sample_count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Share of samples at or above the threshold.
    pub on_fraction: f64,
    pub estimated_hurst: Option<f64>,
    /// Why `estimated_hurst` is missing.
    pub hurst_skipped: Option<String>,
}

impl SeriesSummary {
    /// H is only estimated for at least [`MIN_FGN_HURST_SAMPLES`] samples with non-trivial variance.
    pub fn of(series: &[f64], threshold: f64) -> Self {
        let n = series.len().max(1) as f64;
        let mean = series.iter().sum::<f64>() / n;
        let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let on = series.iter().filter(|x| **x >= threshold).count();

        let (estimated_hurst, hurst_skipped) = if series.len() < MIN_FGN_HURST_SAMPLES {
            (
                None,
                Some(format!(
                    "requires >= {} samples (generated {})",
                    MIN_FGN_HURST_SAMPLES,
                    series.len()
                )),
            )
        } else if variance <= MIN_VARIANCE {
            (None, Some("variance too low".to_string()))
        } else {
            (Some(estimate_hurst(series)), None)
        };

        Self {
            sample_count: series.len(),
            mean,
            std_dev: variance.sqrt(),
            on_fraction: on as f64 / n,
            estimated_hurst,
            hurst_skipped,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FgnReport {
    pub parameters: FgnGenerationParameters,
    pub summary: SeriesSummary,
    #[serde(skip)]
    pub series: Vec<f64>,
}

pub fn validate_generation(params: &FgnGenerationParameters) -> Result<()> {
    if params.sample_count < 2 {
        return Err(SimError::config(format!(
            "sample count must be at least 2, got {}",
            params.sample_count
        )));
    }
    if !(params.sampling_interval > 0.0) || !params.sampling_interval.is_finite() {
        return Err(SimError::config(format!(
            "sampling interval must be a positive number, got {}",
            params.sampling_interval
        )));
    }
    Ok(())
}

/// Generate the series, summarize it and save it through `sink`, which is closed afterwards.
pub fn run_fgn_generation(
    params: &FgnGenerationParameters,
    sink: &mut dyn OutputSink,
) -> Result<FgnReport> {
    let outcome = generate_and_save(params, sink);
    let closed = sink.close();
    let report = outcome?;
    closed?;
    Ok(report)
}

fn generate_and_save(
    params: &FgnGenerationParameters,
    sink: &mut dyn OutputSink,
) -> Result<FgnReport> {
    validate_generation(params)?;
    let mut generator = FractionalGaussianNoise::new(params.hurst, params.sigma, params.seed)?;
    if params.sample_count < MIN_FGN_HURST_SAMPLES {
        warn!(
            "Hurst estimation needs at least {} samples; only {} requested",
            MIN_FGN_HURST_SAMPLES, params.sample_count
        );
    }

    info!(
        "Generating {} FGN samples (H={:.3}, sigma={:.3}, seed={})",
        params.sample_count, params.hurst, params.sigma, params.seed
    );
    let series = generator.generate(params.sample_count)?;
    sink.save_fgn_results(
        &series,
        params.hurst,
        params.sigma,
        params.sampling_interval,
        params.threshold,
    )?;

    let summary = SeriesSummary::of(&series, params.threshold);
    match (summary.estimated_hurst, summary.hurst_skipped.as_deref()) {
        (Some(h), _) => info!("Target H={:.3}, estimated H={:.3}", params.hurst, h),
        (None, reason) => warn!(
            "Skipped Hurst validation: {}",
            reason.unwrap_or("no estimate")
        ),
    }
    Ok(FgnReport {
        parameters: params.clone(),
        summary,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::MemorySink;

    fn params(sample_count: usize) -> FgnGenerationParameters {
        FgnGenerationParameters {
            sample_count,
            seed: 123,
            ..Default::default()
        }
    }

    #[test]
    fn saves_series_and_closes_sink() {
        let mut sink = MemorySink::new();
        let report = run_fgn_generation(&params(128), &mut sink).unwrap();

        let saved = sink.fgn.as_ref().unwrap();
        assert_eq!(saved.series.len(), 128);
        assert_eq!(saved.series, report.series);
        assert_eq!(saved.hurst, 0.8);
        assert!(sink.is_closed());
        assert!(sink.summary.is_none());
    }

    #[test]
    fn short_series_skip_hurst_estimate() {
        let report = run_fgn_generation(&params(128), &mut MemorySink::new()).unwrap();
        assert!(report.summary.estimated_hurst.is_none());
        assert!(report.summary.hurst_skipped.is_some());
        assert!((0.0..=1.0).contains(&report.summary.on_fraction));
    }

    #[test]
    fn long_series_are_estimated() {
        let report = run_fgn_generation(&params(1024), &mut MemorySink::new()).unwrap();
        let h = report.summary.estimated_hurst.unwrap();
        assert!((0.0..=1.0).contains(&h));
        assert!(report.summary.std_dev > 0.0);
    }

    #[test]
    fn flat_series_is_not_estimated() {
        let summary = SeriesSummary::of(&[2.0; 600], 1.0);
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.on_fraction, 1.0);
        assert!(summary.estimated_hurst.is_none());
        assert_eq!(summary.hurst_skipped.as_deref(), Some("variance too low"));
    }

    #[test]
    fn invalid_parameters_still_close_the_sink() {
        let mut sink = MemorySink::new();
        let bad = FgnGenerationParameters {
            hurst: 1.2,
            ..params(64)
        };
        assert!(run_fgn_generation(&bad, &mut sink).is_err());
        assert!(sink.is_closed());
        assert!(sink.fgn.is_none());

        assert!(run_fgn_generation(&params(1), &mut MemorySink::new()).is_err());
        let zero_dt = FgnGenerationParameters {
            sampling_interval: 0.0,
            ..params(64)
        };
        assert!(run_fgn_generation(&zero_dt, &mut MemorySink::new()).is_err());
        let infinite_dt = FgnGenerationParameters {
            sampling_interval: f64::INFINITY,
            ..params(64)
        };
        assert!(validate_generation(&infinite_dt).is_err());
    }
}
