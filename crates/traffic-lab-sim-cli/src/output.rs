use chrono::Local;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use traffic_lab_abstract::{Event, OutputSink, QueueMetrics, TrafficStatistics};
use traffic_lab_simulator::SeriesSummary;
use tracing::info;

pub const EVENT_LOG: &str = "event_log.txt";
pub const TRAFFIC_DATA: &str = "traffic_data.csv";
pub const SUMMARY: &str = "summary.txt";
pub const METADATA: &str = "metadata.json";

/// Writes every artifact of one run into `<root>/run_<timestamp>/`.
pub struct FileOutputSink {
    run_dir: PathBuf,
    metadata: BTreeMap<String, String>,
    event_log: Option<BufWriter<File>>,
}

impl FileOutputSink {
    pub fn create(output_root: &Path, metadata: BTreeMap<String, String>) -> io::Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let run_dir = create_run_dir(output_root, &timestamp)?;

        let mut event_log = BufWriter::new(File::create(run_dir.join(EVENT_LOG))?);
        writeln!(event_log, "# Traffic Lab Event Log")?;
        writeln!(event_log, "# Created: {timestamp}")?;
        if !metadata.is_empty() {
            writeln!(event_log, "# --- Run Metadata ---")?;
            for (key, value) in &metadata {
                writeln!(event_log, "# {key}: {value}")?;
            }
        }
        writeln!(event_log)?;

        fs::write(
            run_dir.join(METADATA),
            serde_json::to_vec_pretty(&metadata)?,
        )?;

        info!("Writing run artifacts to {}", run_dir.display());
        Ok(Self {
            run_dir,
            metadata,
            event_log: Some(event_log),
        })
    }

    fn event_log(&mut self) -> io::Result<&mut BufWriter<File>> {
        self.event_log
            .as_mut()
            .ok_or_else(|| io::Error::other("event log already closed"))
    }

    fn create_in_run_dir(&self, name: &str) -> io::Result<BufWriter<File>> {
        Ok(BufWriter::new(File::create(self.run_dir.join(name))?))
    }

    fn write_header(&self, out: &mut impl Write, title: &str) -> io::Result<()> {
        writeln!(out, "=== {title} ===")?;
        writeln!(out, "Run Directory: {}", self.run_dir.display())?;
        writeln!(out)?;
        writeln!(out, "Run Metadata")?;
        writeln!(out, "------------")?;
        if self.metadata.is_empty() {
            writeln!(out, "  (no metadata provided)")?;
        }
        for (key, value) in &self.metadata {
            writeln!(out, "  {key}: {value}")?;
        }
        writeln!(out)
    }
}

/// `run_<timestamp>`, suffixed with `_2`, `_3`, ... when a run in the same second already exists.
fn create_run_dir(root: &Path, timestamp: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(root)?;
    let base = format!("run_{timestamp}");
    let mut attempt = 1;
    loop {
        let name = match attempt {
            1 => base.clone(),
            n => format!("{base}_{n}"),
        };
        let dir = root.join(name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok(dir),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
            Err(err) => return Err(err),
        }
    }
}

impl OutputSink for FileOutputSink {
    fn run_directory(&self) -> Option<&Path> {
        Some(&self.run_dir)
    }

    fn log_event(&mut self, event: &Event) -> io::Result<()> {
        writeln!(self.event_log()?, "{event}")
    }

    fn save_summary(&mut self, stats: &TrafficStatistics, queue: &QueueMetrics) -> io::Result<()> {
        let mut csv = self.create_in_run_dir(TRAFFIC_DATA)?;
        writeln!(csv, "Time,AggregateRate")?;
        for (time, rate) in &stats.samples {
            writeln!(csv, "{time:.4},{rate:.6}")?;
        }
        csv.flush()?;

        let mut out = self.create_in_run_dir(SUMMARY)?;
        self.write_header(&mut out, "Traffic Lab Simulation Report")?;
        writeln!(out, "Traffic Statistics")?;
        writeln!(out, "------------------")?;
        writeln!(out, "Samples Recorded : {}", stats.sample_count)?;
        writeln!(out, "Average Rate     : {:.4}", stats.average_rate)?;
        writeln!(out, "Peak Rate        : {:.4}", stats.peak_rate)?;
        writeln!(out, "Std Dev          : {:.4}", stats.std_dev_rate)?;
        writeln!(out, "Hurst Exponent   : {:.4}", stats.hurst_exponent)?;
        writeln!(out)?;
        writeln!(out, "Queue Metrics")?;
        writeln!(out, "-------------")?;
        writeln!(out, "Arrivals           : {}", queue.arrived)?;
        writeln!(out, "Served             : {}", queue.served)?;
        writeln!(out, "Dropped            : {}", queue.dropped)?;
        writeln!(out, "Still Queued       : {}", queue.queue_length)?;
        writeln!(out, "Average Waiting (s): {:.4}", queue.avg_waiting_time)?;
        writeln!(out, "Average System (s) : {:.4}", queue.avg_system_time)?;
        writeln!(out, "==============================")?;
        out.flush()?;

        info!("Summary saved to {}", self.run_dir.join(SUMMARY).display());
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
        let mut csv = self.create_in_run_dir(TRAFFIC_DATA)?;
        writeln!(csv, "Index,Value")?;
        for (i, value) in series.iter().enumerate() {
            writeln!(csv, "{i},{value:.10}")?;
        }
        csv.flush()?;

        let log = self.event_log()?;
        writeln!(log, "# Fractional Gaussian Noise samples")?;
        for (i, value) in series.iter().enumerate() {
            let state = if *value >= threshold { "ON" } else { "OFF" };
            writeln!(
                log,
                "t={:.6}, sample={}, value={:.10}, state={}",
                i as f64 * sampling_interval,
                i,
                value,
                state
            )?;
        }
        log.flush()?;

        let summary = SeriesSummary::of(series, threshold);
        let mut out = self.create_in_run_dir(SUMMARY)?;
        self.write_header(&mut out, "FGN Generation Report")?;
        writeln!(out, "Series Statistics")?;
        writeln!(out, "-----------------")?;
        writeln!(out, "Samples Generated : {}", summary.sample_count)?;
        writeln!(out, "Target Hurst (H)  : {hurst:.4}")?;
        writeln!(out, "Sigma             : {sigma:.6}")?;
        writeln!(out, "Mean Value        : {:.6}", summary.mean)?;
        writeln!(out, "Std Dev           : {:.6}", summary.std_dev)?;
        writeln!(out, "ON Fraction       : {:.4}", summary.on_fraction)?;
        match (summary.estimated_hurst, &summary.hurst_skipped) {
            (Some(h), _) => writeln!(out, "Estimated Hurst   : {h:.4}")?,
            (None, Some(reason)) => writeln!(out, "Estimated Hurst   : not computed ({reason})")?,
            (None, None) => writeln!(out, "Estimated Hurst   : not computed")?,
        }
        writeln!(out)?;
        writeln!(out, "Interpretation Notes")?;
        writeln!(out, "--------------------")?;
        writeln!(out, "Sampling Interval : {sampling_interval:.6} seconds")?;
        writeln!(out, "ON/OFF Threshold  : {threshold:.6} (>= threshold logs as ON)")?;
        writeln!(out, "==============================")?;
        out.flush()?;

        info!("FGN results saved in {}", self.run_dir.display());
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if let Some(mut log) = self.event_log.take() {
            log.flush()?;
            info!("Event log saved to {}", self.run_dir.join(EVENT_LOG).display());
        }
        Ok(())
    }
}
