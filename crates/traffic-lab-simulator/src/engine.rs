use crate::error::{Result, SimError};
use crate::pareto::ParetoDistribution;
use crate::queue::NetworkQueue;
use crate::schedule::{EventQueue, SimulationClock};
use crate::source::{FgnSource, ParetoSource, TrafficSource, TrafficSourceBehavior};
use crate::stats::StatisticsCollector;
use crate::trace::SimulationReport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use traffic_lab_abstract::{
    Event, EventKind, OutputSink, QueueMetrics, SimulationParameters, TrafficModel,
    TrafficStatistics,
};
use tracing::{debug, info, warn};

/// Initial ON events are spread uniformly over `[0, STARTUP_WINDOW)` seconds.
const STARTUP_WINDOW: f64 = 5.0;
/// Floor applied to jittered Pareto parameters.
const MIN_JITTERED_PARAMETER: f64 = 1e-4;
const PROGRESS_STEP: f64 = 100.0;

/// Reject configurations that cannot be run, before anything is built.
pub fn validate_parameters(params: &SimulationParameters) -> Result<()> {
    if !(params.total_simulation_time > 0.0) || !params.total_simulation_time.is_finite() {
        return Err(SimError::config(format!(
            "total simulation time must be a positive number, got {}",
            params.total_simulation_time
        )));
    }
    if params.number_of_sources == 0 {
        return Err(SimError::config("number of sources must be > 0"));
    }
    if !(params.sampling_interval > 0.0) || !params.sampling_interval.is_finite() {
        return Err(SimError::config(format!(
            "sampling interval must be a positive number, got {}",
            params.sampling_interval
        )));
    }
    ParetoDistribution::new(params.on_shape, params.on_scale)?;
    ParetoDistribution::new(params.off_shape, params.off_scale)?;
    if !(params.service_rate > 0.0) {
        return Err(SimError::config(format!(
            "service rate must be > 0, got {}",
            params.service_rate
        )));
    }
    if params.queue_capacity == Some(0) {
        return Err(SimError::config("queue capacity must be > 0"));
    }
    if !(0.0..1.0).contains(&params.parameter_variation) {
        return Err(SimError::config(format!(
            "parameter variation must be in [0, 1), got {}",
            params.parameter_variation
        )));
    }
    if params.traffic_model == TrafficModel::Fgn {
        if !(params.hurst > 0.5 && params.hurst < 1.0) {
            return Err(SimError::config(format!(
                "Hurst exponent must be in (0.5, 1.0), got {}",
                params.hurst
            )));
        }
        if !(params.fgn_sigma > 0.0) {
            return Err(SimError::config(format!(
                "FGN sigma must be > 0, got {}",
                params.fgn_sigma
            )));
        }
    }
    Ok(())
}

/// Discrete-event driver of the ON/OFF sources, the queue and the sampler.
pub struct Simulator {
    params: SimulationParameters,
    events: EventQueue,
    clock: SimulationClock,
    sources: Vec<TrafficSource>,
    queue: NetworkQueue,
    stats: StatisticsCollector,
    rng: StdRng,

    /// Fraction of sources ON after the most recent event.
    last_recorded_rate: f64,
    next_sample_index: u64,
    next_progress_mark: f64,

    events_processed: u64,
    events_failed: u64,
}

impl Simulator {
    pub fn new(params: SimulationParameters) -> Result<Self> {
        validate_parameters(&params)?;

        let queue = match params.queue_capacity {
            Some(capacity) => NetworkQueue::with_capacity(params.service_rate, capacity)?,
            None => NetworkQueue::new(params.service_rate)?,
        };
        match queue.capacity() {
            Some(capacity) => info!(
                "Queue: mu={} pkt/s, capacity={} packets",
                queue.service_rate(),
                capacity
            ),
            None => info!("Queue: mu={} pkt/s, unbounded", queue.service_rate()),
        }

        let mut simulator = Self {
            events: EventQueue::new(),
            clock: SimulationClock::new(),
            sources: Vec::with_capacity(params.number_of_sources),
            queue,
            stats: StatisticsCollector::new(),
            rng: StdRng::seed_from_u64(params.random_seed),
            last_recorded_rate: 0.0,
            next_sample_index: 0,
            next_progress_mark: PROGRESS_STEP,
            events_processed: 0,
            events_failed: 0,
            params,
        };
        simulator.build_sources()?;
        Ok(simulator)
    }

    fn build_sources(&mut self) -> Result<()> {
        for id in 0..self.params.number_of_sources {
            let source: TrafficSource = match self.params.traffic_model {
                TrafficModel::Pareto => self.pareto_source(id)?.into(),
                TrafficModel::Fgn => FgnSource::new(id, &self.params)?.into(),
            };
            self.sources.push(source);

            let offset = self.rng.random_range(0.0..STARTUP_WINDOW);
            self.events.add_event(Event::new(offset, id, EventKind::On));
        }
        info!(
            "Built {} {} sources, {} initial events scheduled",
            self.sources.len(),
            self.params.traffic_model,
            self.events.size()
        );
        Ok(())
    }

    /// Pareto source with every base parameter jittered independently.
    fn pareto_source(&mut self, id: usize) -> Result<ParetoSource> {
        let on = ParetoDistribution::new(
            self.jitter(self.params.on_shape),
            self.jitter(self.params.on_scale),
        )?;
        let off = ParetoDistribution::new(
            self.jitter(self.params.off_shape),
            self.jitter(self.params.off_scale),
        )?;
        debug!(
            "Source {}: ON(alpha={:.3}, scale={:.3}) OFF(alpha={:.3}, scale={:.3})",
            id,
            on.shape(),
            on.scale(),
            off.shape(),
            off.scale()
        );
        let seed = self.params.random_seed.wrapping_add(1 + id as u64);
        Ok(ParetoSource::new(id, on, off, seed))
    }

    fn jitter(&mut self, base: f64) -> f64 {
        let variation = self.params.parameter_variation;
        if variation == 0.0 {
            return base;
        }
        let delta = self.rng.random_range(-variation..=variation);
        (base * (1.0 + delta)).max(MIN_JITTERED_PARAMETER)
    }

    /// Queue an extra event, e.g. an externally injected transition.
    pub fn schedule_event(&mut self, event: Event) {
        self.events.add_event(event);
    }

    pub fn parameters(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn current_time(&self) -> f64 {
        self.clock.time()
    }

    pub fn peek_next_event_time(&self) -> Option<f64> {
        self.events.peek_next_event().map(|e| e.time())
    }

    pub fn remaining_events(&self) -> usize {
        self.events.size()
    }

    pub fn sources(&self) -> &[TrafficSource] {
        &self.sources
    }

    pub fn queue(&self) -> &NetworkQueue {
        &self.queue
    }

    pub fn statistics(&self) -> &StatisticsCollector {
        &self.stats
    }

    pub fn last_recorded_rate(&self) -> f64 {
        self.last_recorded_rate
    }

    /// Run to the horizon. The sink is closed afterwards, also when the run fails.
    pub fn run(&mut self, sink: &mut dyn OutputSink) -> Result<SimulationReport> {
        info!("Starting simulation: {}", self.params);
        let outcome = self.run_loop(sink);
        let closed = sink.close();
        let report = outcome?;
        closed?;
        info!(
            "Simulation complete at t={}: {} events ({} failed), {} samples, {}",
            self.clock,
            report.events_processed,
            report.events_failed,
            report.statistics.sample_count,
            self.queue
        );
        Ok(report)
    }

    fn run_loop(&mut self, sink: &mut dyn OutputSink) -> Result<SimulationReport> {
        let horizon = self.params.total_simulation_time;

        while self.clock.time() < horizon {
            let Some(event) = self.events.next_event() else {
                break;
            };

            self.emit_samples_until(event.time());
            if event.time() > horizon {
                break;
            }
            self.clock.advance_to(event.time());
            self.report_progress();

            self.events_processed += 1;
            if let Err(err) = self.dispatch(&event, sink) {
                if !err.is_recoverable() {
                    return Err(err);
                }
                warn!("Skipping event {}: {}", event, err);
                self.events_failed += 1;
            }
        }

        self.emit_samples_until(horizon);
        self.queue.process_until(horizon);

        let statistics = self.stats.snapshot();
        let queue = self.queue.metrics();
        sink.save_summary(&statistics, &queue)?;
        Ok(self.report(statistics, queue))
    }

    fn dispatch(&mut self, event: &Event, sink: &mut dyn OutputSink) -> Result<()> {
        let id = event.source_id();
        let source = self
            .sources
            .get_mut(id)
            .ok_or_else(|| SimError::RecoverableEvent {
                time: event.time(),
                source_id: id,
                reason: "no such source".to_string(),
            })?;

        source.process_event(event)?;
        let next = source.generate_next_event(event.time());
        debug!("Processing event {} -> next {}", event, next);
        self.events.add_event(next);
        self.last_recorded_rate = self.active_fraction();

        sink.log_event(event)
            .map_err(|err| SimError::RecoverableEvent {
                time: event.time(),
                source_id: id,
                reason: format!("event log write failed: {err}"),
            })
    }

    /// Record every sample instant at or before `limit` and the horizon.
    fn emit_samples_until(&mut self, limit: f64) {
        let dt = self.params.sampling_interval;
        let slack = dt * 1e-9;
        let limit = limit.min(self.params.total_simulation_time) + slack;
        let arrivals_per_sample =
            (self.last_recorded_rate * self.sources.len() as f64).round() as usize
                * self.params.packets_per_active_source;

        loop {
            // Index times dt rather than repeated addition, so the grid does not drift.
            let t = self.next_sample_index as f64 * dt;
            if t > limit {
                break;
            }
            self.queue.process_until(t);
            self.queue.enqueue_bulk(t, arrivals_per_sample);
            self.stats.record_sample(t, self.last_recorded_rate);
            self.next_sample_index += 1;
        }
    }

    fn active_fraction(&self) -> f64 {
        let on = self.sources.iter().filter(|s| s.is_on()).count();
        on as f64 / self.sources.len() as f64
    }

    fn report_progress(&mut self) {
        let now = self.clock.time();
        if now < self.next_progress_mark {
            return;
        }
        let active = self.sources.iter().filter(|s| s.is_on()).count();
        info!(
            "[t={:.1}] Active sources: {}/{}",
            now,
            active,
            self.sources.len()
        );
        self.next_progress_mark = ((now / PROGRESS_STEP).floor() + 1.0) * PROGRESS_STEP;
    }

    fn report(&self, statistics: TrafficStatistics, queue: QueueMetrics) -> SimulationReport {
        SimulationReport {
            parameters: self.params.clone(),
            final_time: self.clock.time(),
            events_processed: self.events_processed,
            events_failed: self.events_failed,
            statistics,
            queue,
        }
    }
}

/// Build a [`Simulator`] for `params` and run it against `sink`.
pub fn run_simulation(
    params: SimulationParameters,
    sink: &mut dyn OutputSink,
) -> Result<SimulationReport> {
    Simulator::new(params)?.run(sink)
}
