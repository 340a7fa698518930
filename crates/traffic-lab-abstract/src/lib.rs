pub mod config;
pub mod event;
pub mod interface;
pub mod scenario;

pub use config::{FgnGenerationParameters, SimulationParameters, TrafficModel};
pub use event::{Event, EventKind, SourceState};
pub use interface::{OutputSink, QueueMetrics, TrafficStatistics};
pub use scenario::ParameterOverride;
