use serde::{Deserialize, Serialize};
use std::fmt;

/// Which generator drives the ON/OFF sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficModel {
    /// Heavy-tailed renewal alternation.
    #[default]
    Pareto,
    /// Thresholded Fractional Gaussian Noise schedule.
    Fgn,
}

impl fmt::Display for TrafficModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrafficModel::Pareto => f.write_str("pareto"),
            TrafficModel::Fgn => f.write_str("fgn"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Horizon in seconds.
    pub total_simulation_time: f64,
    pub number_of_sources: usize,
    /// Pareto parameters of the duration sampled while a source is OFF.
    pub on_shape: f64,
    pub on_scale: f64,
    /// Pareto parameters of the duration sampled while a source is ON.
    pub off_shape: f64,
    pub off_scale: f64,
    /// Spacing of the recorded rate series, seconds.
    pub sampling_interval: f64,
    pub random_seed: u64,
    pub traffic_model: TrafficModel,
    pub hurst: f64,
    pub fgn_sigma: f64,
    /// Samples at or above the threshold are ON.
    pub fgn_threshold: f64,
    /// Base seed; source `i` uses `fgn_seed + i`.
    pub fgn_seed: u64,
    /// Queue service rate in packets per second.
    pub service_rate: f64,
    /// Maximum packets held by the queue; unbounded when unset.
    #[serde(default)]
    pub queue_capacity: Option<usize>,
    /// Packets pushed into the queue per ON source at every sample instant.
    pub packets_per_active_source: usize,
    /// Relative jitter applied to each Pareto parameter per source (0.15 = ±15%).
    pub parameter_variation: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            total_simulation_time: 1000.0,
            number_of_sources: 10,
            on_shape: 1.5,
            on_scale: 1.0,
            off_shape: 1.2,
            off_scale: 2.0,
            sampling_interval: 1.0,
            random_seed: 42,
            traffic_model: TrafficModel::Pareto,
            hurst: 0.8,
            fgn_sigma: 1.0,
            fgn_threshold: 0.0,
            fgn_seed: 42,
            service_rate: 10.0,
            queue_capacity: None,
            packets_per_active_source: 1,
            parameter_variation: 0.15,
        }
    }
}

impl SimulationParameters {
    /// Pareto-model parameters with every other setting at its default.
    pub fn pareto(
        total_simulation_time: f64,
        number_of_sources: usize,
        on_shape: f64,
        on_scale: f64,
        off_shape: f64,
        off_scale: f64,
    ) -> Self {
        Self {
            total_simulation_time,
            number_of_sources,
            on_shape,
            on_scale,
            off_shape,
            off_scale,
            ..Default::default()
        }
    }
}

impl fmt::Display for SimulationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "time={:.2}s sources={} ON(alpha={:.2}, scale={:.2}) OFF(alpha={:.2}, scale={:.2}) dt={:.3}",
            self.total_simulation_time,
            self.number_of_sources,
            self.on_shape,
            self.on_scale,
            self.off_shape,
            self.off_scale,
            self.sampling_interval
        )?;
        match self.traffic_model {
            TrafficModel::Fgn => write!(
                f,
                " | FGN(H={:.2}, sigma={:.2}, thr={:.2})",
                self.hurst, self.fgn_sigma, self.fgn_threshold
            ),
            TrafficModel::Pareto => f.write_str(" | Pareto"),
        }
    }
}

/// Settings for the standalone FGN generation workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FgnGenerationParameters {
    pub hurst: f64,
    pub sigma: f64,
    pub sample_count: usize,
    pub sampling_interval: f64,
    pub threshold: f64,
    pub seed: u64,
}

impl Default for FgnGenerationParameters {
    fn default() -> Self {
        Self {
            hurst: 0.8,
            sigma: 1.0,
            sample_count: 1024,
            sampling_interval: 1.0,
            threshold: 0.0,
            seed: 42,
        }
    }
}

impl FgnGenerationParameters {
    /// Time span covered by the generated samples.
    pub fn total_duration(&self) -> f64 {
        self.sample_count as f64 * self.sampling_interval
    }

    /// FGN-model simulation over the same duration, cadence and generator settings.
    pub fn to_simulation_parameters(&self, number_of_sources: usize) -> SimulationParameters {
        SimulationParameters {
            traffic_model: TrafficModel::Fgn,
            total_simulation_time: self.total_duration(),
            number_of_sources,
            sampling_interval: self.sampling_interval,
            hurst: self.hurst,
            fgn_sigma: self.sigma,
            fgn_threshold: self.threshold,
            fgn_seed: self.seed,
            random_seed: self.seed,
            ..Default::default()
        }
    }
}
