pub mod engine;
pub mod error;
pub mod fft;
pub mod fgn;
pub mod generation;
pub mod hurst;
pub mod pareto;
pub mod queue;
pub mod schedule;
pub mod sink;
pub mod source;
pub mod stats;
pub mod trace;

pub use engine::{Simulator, run_simulation, validate_parameters};
pub use error::{Result, SimError};
pub use fgn::FractionalGaussianNoise;
pub use generation::{FgnReport, SeriesSummary, run_fgn_generation};
pub use hurst::{HurstEstimator, estimate_hurst};
pub use pareto::{DurationDistribution, ParetoDistribution};
pub use queue::{NetworkQueue, QueueElement};
pub use schedule::{EventQueue, SimulationClock};
pub use sink::MemorySink;
pub use source::{FgnSource, ParetoSource, TrafficSource, TrafficSourceBehavior};
pub use stats::StatisticsCollector;
pub use trace::SimulationReport;
