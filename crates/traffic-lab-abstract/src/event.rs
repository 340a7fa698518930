use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a source is currently transmitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SourceState {
    On,
    /// Every source starts idle.
    #[default]
    Off,
}

/// The transition an [`Event`] applies to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    On,
    Off,
}

impl EventKind {
    /// State the source is in after the event has been processed.
    pub fn resulting_state(self) -> SourceState {
        match self {
            EventKind::On => SourceState::On,
            EventKind::Off => SourceState::Off,
        }
    }

    /// Kind of event that moves a source out of `state`.
    pub fn leaving(state: SourceState) -> Self {
        match state {
            SourceState::On => EventKind::Off,
            SourceState::Off => EventKind::On,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::On => f.write_str("ON"),
            EventKind::Off => f.write_str("OFF"),
        }
    }
}

/// A scheduled ON/OFF transition of one traffic source.
///
/// Events are immutable once created; the scheduler orders them by `time`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    time: f64,
    source_id: usize,
    kind: EventKind,
}

impl Event {
    pub fn new(time: f64, source_id: usize, kind: EventKind) -> Self {
        Self {
            time,
            source_id,
            kind,
        }
    }

    /// Absolute simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn source_id(&self) -> usize {
        self.source_id
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:.3}, source={}, type={}",
            self.time, self.source_id, self.kind
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_event_log_layout() {
        let event = Event::new(1.25, 3, EventKind::Off);
        assert_eq!(event.to_string(), "t=1.250, source=3, type=OFF");
    }

    #[test]
    fn kinds_map_to_states() {
        assert_eq!(EventKind::On.resulting_state(), SourceState::On);
        assert_eq!(EventKind::leaving(SourceState::On), EventKind::Off);
        assert_eq!(EventKind::leaving(SourceState::Off), EventKind::On);
        assert_eq!(SourceState::default(), SourceState::Off);
    }
}
