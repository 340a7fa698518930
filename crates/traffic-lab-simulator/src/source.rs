use crate::error::{Result, SimError};
use crate::fgn::FractionalGaussianNoise;
use crate::pareto::{DurationDistribution, ParetoDistribution};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::VecDeque;
use traffic_lab_abstract::{Event, EventKind, SimulationParameters, SourceState};

/// Contract every ON/OFF source exposes to the [`Simulator`](crate::Simulator).
pub trait TrafficSourceBehavior {
    fn id(&self) -> usize;

    fn state(&self) -> SourceState;

    fn is_on(&self) -> bool {
        self.state() == SourceState::On
    }

    /// Time of the event most recently produced by [`generate_next_event`](Self::generate_next_event).
    fn next_event_time(&self) -> f64;

    /// Produce this source's next transition, strictly after `current_time`.
    fn generate_next_event(&mut self, current_time: f64) -> Event;

    /// Apply a transition that was routed to this source.
    fn process_event(&mut self, event: &Event) -> Result<()>;
}

fn apply_transition(id: usize, state: &mut SourceState, event: &Event) -> Result<()> {
    if event.source_id() != id {
        return Err(SimError::RecoverableEvent {
            time: event.time(),
            source_id: event.source_id(),
            reason: format!("event routed to source {id}"),
        });
    }
    *state = event.kind().resulting_state();
    Ok(())
}

/// Renewal source alternating Pareto-distributed periods.
///
/// While OFF the next delay is drawn from the ON distribution and yields an
/// ON event; while ON it is drawn from the OFF distribution and yields OFF.
#[derive(Debug)]
pub struct ParetoSource {
    id: usize,
    state: SourceState,
    next_event_time: f64,
    on_distribution: Box<dyn DurationDistribution>,
    off_distribution: Box<dyn DurationDistribution>,
    rng: StdRng,
}

impl ParetoSource {
    pub fn new(id: usize, on: ParetoDistribution, off: ParetoDistribution, seed: u64) -> Self {
        Self::with_distributions(
            id,
            Box::new(on),
            Box::new(off),
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn with_distributions(
        id: usize,
        on_distribution: Box<dyn DurationDistribution>,
        off_distribution: Box<dyn DurationDistribution>,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            state: SourceState::Off,
            next_event_time: 0.0,
            on_distribution,
            off_distribution,
            rng,
        }
    }
}

impl TrafficSourceBehavior for ParetoSource {
    fn id(&self) -> usize {
        self.id
    }

    fn state(&self) -> SourceState {
        self.state
    }

    fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    fn generate_next_event(&mut self, current_time: f64) -> Event {
        let (distribution, kind) = match self.state {
            SourceState::Off => (&self.on_distribution, EventKind::On),
            SourceState::On => (&self.off_distribution, EventKind::Off),
        };
        let duration = distribution.sample(&mut self.rng);
        self.next_event_time = current_time + duration;
        Event::new(self.next_event_time, self.id, kind)
    }

    fn process_event(&mut self, event: &Event) -> Result<()> {
        apply_transition(self.id, &mut self.state, event)
    }
}

/// Source replaying the run lengths of a thresholded FGN series.
///
/// The schedule is a list of flip delays; each generated event flips the
/// tracked state, independent of the series' own starting value.
#[derive(Debug, Clone)]
pub struct FgnSource {
    id: usize,
    state: SourceState,
    next_event_time: f64,
    durations: VecDeque<f64>,
    idle_delay: f64,
}

impl FgnSource {
    /// Generate a series of `ceil(total / dt)` samples seeded with `fgn_seed + id`.
    pub fn new(id: usize, params: &SimulationParameters) -> Result<Self> {
        let n = ((params.total_simulation_time / params.sampling_interval).ceil() as usize).max(2);
        let seed = params.fgn_seed.wrapping_add(id as u64);
        let series = FractionalGaussianNoise::new(params.hurst, params.fgn_sigma, seed)?.generate(n)?;
        Ok(Self::from_series(
            id,
            &series,
            params.fgn_threshold,
            params.sampling_interval,
            params.total_simulation_time,
        ))
    }

    /// Build the schedule from an existing series; `idle_delay` is used once it runs out.
    pub fn from_series(
        id: usize,
        series: &[f64],
        threshold: f64,
        sampling_interval: f64,
        idle_delay: f64,
    ) -> Self {
        Self {
            id,
            state: SourceState::Off,
            next_event_time: 0.0,
            durations: run_lengths(series, threshold, sampling_interval),
            idle_delay,
        }
    }

    /// Flip delays still to be consumed.
    pub fn remaining_durations(&self) -> usize {
        self.durations.len()
    }
}

impl TrafficSourceBehavior for FgnSource {
    fn id(&self) -> usize {
        self.id
    }

    fn state(&self) -> SourceState {
        self.state
    }

    fn next_event_time(&self) -> f64 {
        self.next_event_time
    }

    fn generate_next_event(&mut self, current_time: f64) -> Event {
        let delay = self.durations.pop_front().unwrap_or(self.idle_delay);
        self.next_event_time = current_time + delay;
        Event::new(self.next_event_time, self.id, EventKind::leaving(self.state))
    }

    fn process_event(&mut self, event: &Event) -> Result<()> {
        apply_transition(self.id, &mut self.state, event)
    }
}

/// Lengths of the runs of `value >= threshold`, in units of `sampling_interval`.
fn run_lengths(series: &[f64], threshold: f64, sampling_interval: f64) -> VecDeque<f64> {
    let mut durations = VecDeque::new();
    let mut flags = series.iter().map(|x| *x >= threshold);
    let Some(mut current) = flags.next() else {
        return durations;
    };

    let mut count = 1usize;
    for flag in flags {
        if flag == current {
            count += 1;
        } else {
            durations.push_back(count as f64 * sampling_interval);
            current = flag;
            count = 1;
        }
    }
    durations.push_back(count as f64 * sampling_interval);
    durations
}

/// The two source models behind one dispatch point.
#[derive(Debug)]
pub enum TrafficSource {
    Pareto(ParetoSource),
    Fgn(FgnSource),
}

impl TrafficSource {
    fn inner(&self) -> &dyn TrafficSourceBehavior {
        match self {
            TrafficSource::Pareto(source) => source,
            TrafficSource::Fgn(source) => source,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn TrafficSourceBehavior {
        match self {
            TrafficSource::Pareto(source) => source,
            TrafficSource::Fgn(source) => source,
        }
    }
}

impl TrafficSourceBehavior for TrafficSource {
    fn id(&self) -> usize {
        self.inner().id()
    }

    fn state(&self) -> SourceState {
        self.inner().state()
    }

    fn next_event_time(&self) -> f64 {
        self.inner().next_event_time()
    }

    fn generate_next_event(&mut self, current_time: f64) -> Event {
        self.inner_mut().generate_next_event(current_time)
    }

    fn process_event(&mut self, event: &Event) -> Result<()> {
        self.inner_mut().process_event(event)
    }
}

impl From<ParetoSource> for TrafficSource {
    fn from(source: ParetoSource) -> Self {
        TrafficSource::Pareto(source)
    }
}

impl From<FgnSource> for TrafficSource {
    fn from(source: FgnSource) -> Self {
        TrafficSource::Fgn(source)
    }
}
