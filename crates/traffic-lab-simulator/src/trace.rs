use serde::Serialize;
use traffic_lab_abstract::{QueueMetrics, SimulationParameters, TrafficStatistics};

/// Serializable outcome of one traffic simulation.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub parameters: SimulationParameters,
    /// Clock value when the loop stopped.
    pub final_time: f64,
    pub events_processed: u64,
    /// Events that raised a recoverable error and were skipped.
    pub events_failed: u64,
    pub statistics: TrafficStatistics,
    pub queue: QueueMetrics,
}

