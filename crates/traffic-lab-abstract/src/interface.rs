use crate::event::Event;
use serde::Serialize;
use std::io;
use std::path::Path;

/// Summary of the uniformly sampled aggregate-rate series of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrafficStatistics {
    /// `(time, aggregate_rate)` pairs in recording order.
    pub samples: Vec<(f64, f64)>,
    pub sample_count: usize,
    pub average_rate: f64,
    pub peak_rate: f64,
    pub std_dev_rate: f64,
    pub hurst_exponent: f64,
}

/// Cumulative counters of the downstream queue at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct QueueMetrics {
    pub arrived: u64,
    pub served: u64,
    pub dropped: u64,
    /// Packets still queued or in service.
    pub queue_length: usize,
    pub avg_waiting_time: f64,
    pub avg_system_time: f64,
}

/// Where a run's artifacts go.
///
/// The simulator treats the sink as a resource scoped to one run: it is
/// closed when the run ends, whether the run succeeded or not.
pub trait OutputSink {
    /// Directory holding every artifact of this run, if the sink has one.
    fn run_directory(&self) -> Option<&Path> {
        None
    }

    /// Called once per processed event. Must not influence the simulation.
    fn log_event(&mut self, event: &Event) -> io::Result<()>;

    /// Called once when a traffic simulation finishes.
    fn save_summary(&mut self, stats: &TrafficStatistics, queue: &QueueMetrics) -> io::Result<()>;

    /// Called by the standalone FGN generation workflow only.
    fn save_fgn_results(
        &mut self,
        series: &[f64],
        hurst: f64,
        sigma: f64,
        sampling_interval: f64,
        threshold: f64,
    ) -> io::Result<()>;

    /// Flush buffered output and release resources.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
