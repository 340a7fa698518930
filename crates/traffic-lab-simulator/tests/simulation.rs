use std::io;
use traffic_lab_abstract::{
    Event, FgnGenerationParameters, OutputSink, QueueMetrics, SimulationParameters,
    TrafficModel, TrafficStatistics,
};
use traffic_lab_simulator::{
    FractionalGaussianNoise, MemorySink, SimError, Simulator, run_fgn_generation,
    run_simulation,
};

fn pareto_scenario() -> SimulationParameters {
    SimulationParameters {
        random_seed: 2024,
        ..SimulationParameters::pareto(50.0, 5, 1.5, 1.0, 1.2, 2.0)
    }
}

fn fgn_scenario() -> SimulationParameters {
    SimulationParameters {
        traffic_model: TrafficModel::Fgn,
        hurst: 0.8,
        fgn_seed: 11,
        ..SimulationParameters::pareto(128.0, 4, 1.5, 1.0, 1.2, 2.0)
    }
}

/// Sink whose operations fail on demand and which records what it saw.
#[derive(Default)]
struct FlakySink {
    fail_event_logs: bool,
    fail_summary: bool,
    logged: usize,
    closed: bool,
}

impl OutputSink for FlakySink {
    fn log_event(&mut self, _event: &Event) -> io::Result<()> {
        if self.fail_event_logs {
            return Err(io::Error::other("disk full"));
        }
        self.logged += 1;
        Ok(())
    }

    fn save_summary(&mut self, _: &TrafficStatistics, _: &QueueMetrics) -> io::Result<()> {
        if self.fail_summary {
            return Err(io::Error::other("read-only"));
        }
        Ok(())
    }

    fn save_fgn_results(&mut self, _: &[f64], _: f64, _: f64, _: f64, _: f64) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[test]
fn pareto_scenario_produces_51_bounded_samples() {
    let mut sink = MemorySink::new();
    let report = run_simulation(pareto_scenario(), &mut sink).unwrap();

    assert_eq!(report.statistics.sample_count, 51);
    for (i, (t, rate)) in report.statistics.samples.iter().enumerate() {
        assert!((t - i as f64).abs() < 1e-9);
        assert!((0.0..=1.0).contains(rate));
    }
    assert!(report.queue.served <= report.queue.arrived);
    assert!(report.queue.avg_system_time >= report.queue.avg_waiting_time);
    assert!(report.events_processed > 0);
    assert_eq!(report.events_failed, 0);

    assert!(sink.is_closed());
    let (stats, queue) = sink.summary.unwrap();
    assert_eq!(stats.sample_count, 51);
    assert_eq!(queue, report.queue);
    assert_eq!(sink.events.len() as u64, report.events_processed);
}

#[test]
fn logged_events_are_time_ordered_and_within_horizon() {
    let mut sink = MemorySink::new();
    run_simulation(pareto_scenario(), &mut sink).unwrap();

    assert!(sink.events.windows(2).all(|w| w[0].time() <= w[1].time()));
    assert!(sink.events.iter().all(|e| e.time() <= 50.0));
}

#[test]
fn identical_parameters_reproduce_the_run() {
    let a = run_simulation(pareto_scenario(), &mut MemorySink::new()).unwrap();
    let b = run_simulation(pareto_scenario(), &mut MemorySink::new()).unwrap();
    assert_eq!(a.statistics.samples, b.statistics.samples);
    assert_eq!(a.queue, b.queue);

    let other = SimulationParameters {
        random_seed: 1,
        ..pareto_scenario()
    };
    let c = run_simulation(other, &mut MemorySink::new()).unwrap();
    assert_eq!(c.statistics.sample_count, 51);
}

#[test]
fn fgn_model_runs_to_horizon() {
    let mut sink = MemorySink::new();
    let report = run_simulation(fgn_scenario(), &mut sink).unwrap();

    assert_eq!(report.statistics.sample_count, 129);
    assert!(
        report
            .statistics
            .samples
            .iter()
            .all(|(_, rate)| (0.0..=1.0).contains(rate))
    );
    assert!(report.queue.served <= report.queue.arrived);
    assert!(sink.is_closed());

    let again = run_simulation(fgn_scenario(), &mut MemorySink::new()).unwrap();
    assert_eq!(report.statistics.samples, again.statistics.samples);
}

#[test]
fn fgn_model_rejects_out_of_range_hurst_before_running() {
    let params = SimulationParameters {
        hurst: 1.0,
        ..fgn_scenario()
    };
    assert!(matches!(
        Simulator::new(params),
        Err(SimError::FatalConfig(_))
    ));
}

#[test]
fn failing_event_log_is_recoverable() {
    let mut sink = FlakySink {
        fail_event_logs: true,
        ..Default::default()
    };
    let report = run_simulation(pareto_scenario(), &mut sink).unwrap();

    assert_eq!(report.events_failed, report.events_processed);
    assert_eq!(report.statistics.sample_count, 51);
    assert_eq!(sink.logged, 0);
    assert!(sink.closed);
}

#[test]
fn failing_summary_is_fatal_but_sink_is_closed() {
    let mut sink = FlakySink {
        fail_summary: true,
        ..Default::default()
    };
    let err = run_simulation(pareto_scenario(), &mut sink).unwrap_err();
    assert!(matches!(err, SimError::Output(_)));
    assert!(!err.is_recoverable());
    assert!(sink.closed);
}

#[test]
fn bounded_queue_reports_drops_under_load() {
    let params = SimulationParameters {
        number_of_sources: 20,
        packets_per_active_source: 5,
        service_rate: 1.0,
        queue_capacity: Some(10),
        ..pareto_scenario()
    };
    let report = run_simulation(params, &mut MemorySink::new()).unwrap();
    let queue = report.queue;

    assert!(queue.dropped > 0);
    assert!(queue.queue_length <= 10);
    assert_eq!(
        queue.arrived,
        queue.served + queue.dropped + queue.queue_length as u64
    );
}

#[test]
fn generated_fgn_matches_direct_generation() {
    let params = FgnGenerationParameters {
        sample_count: 128,
        seed: 123,
        ..Default::default()
    };
    let report = run_fgn_generation(&params, &mut MemorySink::new()).unwrap();
    let direct = FractionalGaussianNoise::new(0.8, 1.0, 123)
        .unwrap()
        .generate(128)
        .unwrap();

    assert_eq!(report.series.len(), 128);
    assert!(report.series.iter().any(|x| x.abs() > 1e-6));
    assert_eq!(report.series, direct);
}
