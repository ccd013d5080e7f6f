use thiserror::Error;

/// Non-fatal broadcast status. Recorded by the controller, never returned
/// from a state-changing call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BroadcastError {
    #[error("This device cannot broadcast links")]
    HardwareUnavailable,

    #[error("Broadcast failed: {0}")]
    EmissionFailed(String),
}

/// Failure reported by a hardware backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct EmitterError(pub String);

impl EmitterError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}
