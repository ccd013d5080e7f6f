use serde::Serialize;
use tokio::sync::broadcast;

use linkflip_shared::Appearance;

pub const EVENT_PROFILE_CHANGED: &str = "profile-changed";
pub const EVENT_SETTINGS_CHANGED: &str = "settings-changed";
pub const EVENT_APPEARANCE_CHANGED: &str = "appearance-changed";
pub const EVENT_CODE_SHOWN: &str = "code-shown";
pub const EVENT_CODE_HIDDEN: &str = "code-hidden";
pub const EVENT_SAVE_FAILED: &str = "save-failed";

/// Capacity of the change channel. Slow subscribers skip ahead.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Change notifications published by [`crate::state::AppState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StateEvent {
    ProfileChanged,
    SettingsChanged,
    AppearanceChanged { appearance: Appearance },
    #[serde(rename_all = "camelCase")]
    CodeShown { card_id: String },
    #[serde(rename_all = "camelCase")]
    CodeHidden { card_id: String },
    SaveFailed { document: String, reason: String },
}

impl StateEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ProfileChanged => EVENT_PROFILE_CHANGED,
            Self::SettingsChanged => EVENT_SETTINGS_CHANGED,
            Self::AppearanceChanged { .. } => EVENT_APPEARANCE_CHANGED,
            Self::CodeShown { .. } => EVENT_CODE_SHOWN,
            Self::CodeHidden { .. } => EVENT_CODE_HIDDEN,
            Self::SaveFailed { .. } => EVENT_SAVE_FAILED,
        }
    }
}

/// Publish an event. Having no subscribers is not an error.
pub fn emit_event(tx: &broadcast::Sender<StateEvent>, event: StateEvent) {
    tracing::trace!(event = event.name(), "state event");
    let _ = tx.send(event);
}
