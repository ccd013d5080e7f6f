use std::str::FromStr;

use tracing::{debug, warn};

use linkflip_qr::render::{to_png_data_uri, to_terminal};
use linkflip_qr::{encode, to_drawable, BitMatrix};
use linkflip_shared::constants::DEFAULT_CODE_SIZE_PX;

use crate::state::AppState;

const DARK: &str = "#000000";
const LIGHT: &str = "#ffffff";
const PNG_SCALE: u32 = 4;
const QUIET_ZONE: u32 = 4;

/// How a card's code is handed to the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeFormat {
    /// Standalone SVG document.
    #[default]
    Svg,
    /// `data:image/png;base64,...` for views without vector drawing.
    Png,
    /// Half-block text for a terminal.
    Terminal,
}

impl FromStr for CodeFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "text" | "terminal" => Ok(Self::Terminal),
            other => Err(format!("Unknown code format: {other}")),
        }
    }
}

fn card_matrix(state: &AppState, id: &str) -> Result<BitMatrix, String> {
    let card = state
        .card(id)
        .ok_or_else(|| format!("No card with id {id}"))?;
    encode(&card.url, state.code_level()).map_err(|e| {
        warn!(card = %id, error = %e, "Could not encode card link");
        e.to_string()
    })
}

/// Render the code for a card's link.
pub fn card_code(state: &AppState, id: &str, format: CodeFormat) -> Result<String, String> {
    let matrix = card_matrix(state, id)?;
    debug!(card = %id, version = matrix.version(), ?format, "Rendering card code");

    match format {
        CodeFormat::Svg => {
            let drawable = to_drawable(&matrix, f64::from(DEFAULT_CODE_SIZE_PX));
            Ok(drawable.to_svg(DARK, LIGHT))
        }
        CodeFormat::Png => to_png_data_uri(&matrix, PNG_SCALE, QUIET_ZONE).map_err(|e| e.to_string()),
        CodeFormat::Terminal => Ok(to_terminal(&matrix, QUIET_ZONE as usize)),
    }
}

/// Flip a card over: show its code and broadcast its link.
pub fn flip_card(state: &mut AppState, id: &str) -> Result<(), String> {
    state.show_code(id).map_err(|e| e.to_string())
}

/// Turn a card back. Returns whether it was showing its code.
pub fn unflip_card(state: &mut AppState, id: &str) -> Result<bool, String> {
    Ok(state.hide_code(id))
}
