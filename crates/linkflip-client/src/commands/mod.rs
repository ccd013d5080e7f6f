//! Command handlers for the presentation layer.
//!
//! Each sub-module groups related commands by domain. Handlers take the
//! [`crate::state::AppState`] directly and return `Result<T, String>` with a
//! message that can be shown to the user as-is. Saves started by a handler
//! run in the background; callers that need them on disk call
//! [`crate::state::AppState::flush`].

pub mod broadcast;
pub mod cards;
pub mod code;
pub mod profile;
pub mod settings;
