use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// The configuration cannot be run at all. Raised before the event loop starts.
    #[error("invalid configuration: {0}")]
    FatalConfig(String),

    /// A single event could not be applied. The run continues without it.
    #[error("event at t={time:.3} for source {source_id} failed: {reason}")]
    RecoverableEvent {
        time: f64,
        source_id: usize,
        reason: String,
    },

    #[error("output sink failed: {0}")]
    Output(#[from] std::io::Error),
}

impl SimError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        SimError::FatalConfig(message.into())
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, SimError::RecoverableEvent { .. })
    }
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
