//! # linkflip-nfc
//!
//! Contactless broadcast of the active card's link.
//!
//! [`BroadcastController`] is the state machine the application talks to. It
//! never blocks: every hardware call is queued to a dedicated worker that owns
//! the [`EmissionSession`] and runs one command at a time, so at most one
//! emission is ever in flight.
//!
//! The payload format lives in [`ndef`] (NDEF URI records) and [`type4`] (the
//! read-only Type 4 Tag a phone reader talks to). [`soft::SoftEmitter`] serves
//! that tag in-process for hosts without a radio.

pub mod controller;
pub mod hardware;
pub mod ndef;
pub mod soft;
pub mod type4;

mod error;

pub use controller::{BroadcastController, BroadcastSession, BroadcastState, HardwareAvailability};
pub use error::{BroadcastError, EmitterError};
pub use hardware::{EmissionSession, HardwareEmitter};
pub use soft::SoftEmitter;
