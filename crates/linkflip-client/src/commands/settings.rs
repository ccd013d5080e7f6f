use serde::Serialize;
use tracing::info;

use linkflip_shared::{Appearance, ColorScheme};

use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub color_scheme: ColorScheme,
    pub appearance: Appearance,
    pub broadcast_enabled: bool,
}

pub fn get_settings(state: &AppState) -> Result<SettingsView, String> {
    let settings = state.settings();
    Ok(SettingsView {
        color_scheme: settings.color_scheme_preference,
        appearance: state.appearance(),
        broadcast_enabled: settings.broadcast_enabled,
    })
}

/// Accepts `light`, `dark` or `system`.
pub fn set_color_scheme(state: &mut AppState, scheme: &str) -> Result<SettingsView, String> {
    let scheme: ColorScheme = scheme.parse()?;
    state.set_color_scheme(scheme);
    get_settings(state)
}

/// Erase the profile, every card and the settings.
pub async fn reset_all(state: &mut AppState) -> Result<(), String> {
    info!("Resetting all data");
    state.reset().await.map_err(|e| format!("Could not erase stored data: {e}"))
}
