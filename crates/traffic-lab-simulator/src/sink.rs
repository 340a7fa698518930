use std::io;
use traffic_lab_abstract::{Event, OutputSink, QueueMetrics, TrafficStatistics};

/// Arguments of one [`OutputSink::save_fgn_results`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct FgnRecord {
    pub series: Vec<f64>,
    pub hurst: f64,
    pub sigma: f64,
    pub sampling_interval: f64,
    pub threshold: f64,
}

/// [`OutputSink`] that keeps everything in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<Event>,
    pub summary: Option<(TrafficStatistics, QueueMetrics)>,
    pub fgn: Option<FgnRecord>,
    pub close_count: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.close_count > 0
    }
}

impl OutputSink for MemorySink {
    fn log_event(&mut self, event: &Event) -> io::Result<()> {
        self.events.push(*event);
        Ok(())
    }

    fn save_summary(&mut self, stats: &TrafficStatistics, queue: &QueueMetrics) -> io::Result<()> {
        self.summary = Some((stats.clone(), *queue));
        Ok(())
    }

    fn save_fgn_results(
        &mut self,
        series: &[f64],
        hurst: f64,
        sigma: f64,
        sampling_interval: f64,
        threshold: f64,
    ) -> io::Result<()> {
        self.fgn = Some(FgnRecord {
            series: series.to_vec(),
            hurst,
            sigma,
            sampling_interval,
            threshold,
        });
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.close_count += 1;
        Ok(())
    }
}
