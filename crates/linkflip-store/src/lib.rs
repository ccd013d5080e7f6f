//! # linkflip-store
//!
//! Local persistence for LinkFlip. The application keeps exactly two JSON
//! documents, the profile and the settings, each stored whole under a fixed
//! key. Documents live in a small SQLite key/value table; an in-memory
//! backend stands in for tests and for devices where the database cannot be
//! opened.
//!
//! Reads never fail: a missing or unreadable document yields the caller's
//! default and the problem is logged. Writes report [`StoreError::Write`].

pub mod backend;
pub mod database;
pub mod documents;
pub mod migrations;

mod error;

pub use backend::{DocumentBackend, MemoryBackend};
pub use database::Database;
pub use documents::{DocumentKey, DocumentStore};
pub use error::{Result, StoreError};
