//! Capability interface to the contactless radio.
//!
//! Backends are resolved once at startup into an
//! `Option<Arc<dyn HardwareEmitter>>`; `None` means the device has no radio
//! support at all. All methods are blocking and are only ever called from the
//! controller's worker thread.

use crate::error::EmitterError;

pub trait HardwareEmitter: Send + Sync {
    /// Whether the radio is present and usable.
    fn probe_available(&self) -> bool;

    /// Open the single emission session used for the rest of the run.
    fn create_session(&self) -> Result<Box<dyn EmissionSession>, EmitterError>;
}

pub trait EmissionSession: Send {
    /// Install the link advertised while enabled.
    fn set_payload(&mut self, url: &str) -> Result<(), EmitterError>;

    /// Start (`true`) or stop (`false`) advertising.
    fn set_enabled(&mut self, enabled: bool) -> Result<(), EmitterError>;
}
