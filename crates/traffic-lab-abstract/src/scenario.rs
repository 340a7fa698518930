use crate::config::{SimulationParameters, TrafficModel};
use serde::Deserialize;

/// Partial parameter set loaded from a TOML file; unset keys keep their current value.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct ParameterOverride {
    pub total_simulation_time: Option<f64>,
    pub number_of_sources: Option<usize>,
    pub on_shape: Option<f64>,
    pub on_scale: Option<f64>,
    pub off_shape: Option<f64>,
    pub off_scale: Option<f64>,
    pub sampling_interval: Option<f64>,
    pub random_seed: Option<u64>,
    pub traffic_model: Option<TrafficModel>,
    pub hurst: Option<f64>,
    pub fgn_sigma: Option<f64>,
    pub fgn_threshold: Option<f64>,
    pub fgn_seed: Option<u64>,
    pub service_rate: Option<f64>,
    pub queue_capacity: Option<usize>,
    pub packets_per_active_source: Option<usize>,
    pub parameter_variation: Option<f64>,
}

impl ParameterOverride {
    pub fn apply_to(&self, params: &mut SimulationParameters) {
        if let Some(v) = self.total_simulation_time {
            params.total_simulation_time = v;
        }
        if let Some(v) = self.number_of_sources {
            params.number_of_sources = v;
        }
        if let Some(v) = self.on_shape {
            params.on_shape = v;
        }
        if let Some(v) = self.on_scale {
            params.on_scale = v;
        }
        if let Some(v) = self.off_shape {
            params.off_shape = v;
        }
        if let Some(v) = self.off_scale {
            params.off_scale = v;
        }
        if let Some(v) = self.sampling_interval {
            params.sampling_interval = v;
        }
        if let Some(v) = self.random_seed {
            params.random_seed = v;
        }
        if let Some(v) = self.traffic_model {
            params.traffic_model = v;
        }
        if let Some(v) = self.hurst {
            params.hurst = v;
        }
        if let Some(v) = self.fgn_sigma {
            params.fgn_sigma = v;
        }
        if let Some(v) = self.fgn_threshold {
            params.fgn_threshold = v;
        }
        if let Some(v) = self.fgn_seed {
            params.fgn_seed = v;
        }
        if let Some(v) = self.service_rate {
            params.service_rate = v;
        }
        if let Some(v) = self.queue_capacity {
            params.queue_capacity = Some(v);
        }
        if let Some(v) = self.packets_per_active_source {
            params.packets_per_active_source = v;
        }
        if let Some(v) = self.parameter_variation {
            params.parameter_variation = v;
        }
    }
}
