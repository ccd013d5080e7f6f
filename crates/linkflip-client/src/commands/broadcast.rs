use serde::Serialize;
use tracing::info;

use linkflip_nfc::{BroadcastSession, BroadcastState};

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastStatus {
    pub state: BroadcastState,
    pub session: BroadcastSession,
    /// Last hardware problem, for display only.
    pub error: Option<String>,
}

pub fn broadcast_status(state: &mut AppState) -> Result<BroadcastStatus, String> {
    state.poll_broadcast();
    Ok(BroadcastStatus {
        state: state.broadcast_state(),
        session: state.broadcast_session().clone(),
        error: state.broadcast_error().map(ToString::to_string),
    })
}

pub fn set_broadcast(state: &mut AppState, enabled: bool) -> Result<BroadcastStatus, String> {
    info!(enabled, "Setting broadcast");
    state.set_broadcast_enabled(enabled);
    broadcast_status(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_state;

    #[tokio::test]
    async fn without_hardware_is_unsupported() {
        let mut state = memory_state();
        let status = set_broadcast(&mut state, true).unwrap();
        assert_eq!(status.state, BroadcastState::Unsupported);
        assert!(status.session.user_enabled);
        assert!(status.error.is_some());
        assert!(state.settings().broadcast_enabled);
    }
}
