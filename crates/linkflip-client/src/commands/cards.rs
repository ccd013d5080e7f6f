use tracing::{info, warn};

use linkflip_shared::recognize;

use crate::commands::profile::CardView;
use crate::state::{AppState, CardUpdate, NewCard};

pub fn list_cards(state: &AppState) -> Result<Vec<CardView>, String> {
    Ok(state
        .sorted_cards()
        .iter()
        .map(|card| CardView::new(card, state.active_card() == Some(card.id.as_str())))
        .collect())
}

/// Recognise a pasted link and append it as a new card.
pub fn add_card(state: &mut AppState, link: &str) -> Result<CardView, String> {
    let recognized = recognize(link).map_err(|e| {
        warn!(error = %e, "Rejected link");
        e.to_string()
    })?;

    let (card, _save) = state.add_card(NewCard {
        platform: recognized.platform,
        handle: recognized.handle,
        url: recognized.canonical_url,
        custom_image_ref: None,
        use_custom_image: false,
    });
    info!(card = %card.id, platform = %card.platform, "Added card");
    Ok(CardView::new(&card, false))
}

/// Point an existing card at a different link.
pub fn change_card_link(state: &mut AppState, id: &str, link: &str) -> Result<CardView, String> {
    let recognized = recognize(link).map_err(|e| e.to_string())?;
    state
        .update_card(
            id,
            CardUpdate {
                platform: Some(recognized.platform),
                handle: Some(recognized.handle),
                url: Some(recognized.canonical_url),
                ..CardUpdate::default()
            },
        )
        .map_err(|e| e.to_string())?;
    view_of(state, id)
}

pub fn set_card_image(
    state: &mut AppState,
    id: &str,
    image_ref: Option<String>,
) -> Result<CardView, String> {
    let use_custom = image_ref.is_some();
    state
        .update_card(
            id,
            CardUpdate {
                custom_image_ref: Some(image_ref),
                use_custom_image: Some(use_custom),
                ..CardUpdate::default()
            },
        )
        .map_err(|e| e.to_string())?;
    view_of(state, id)
}

pub fn remove_card(state: &mut AppState, id: &str) -> Result<(), String> {
    state.delete_card(id).map_err(|e| e.to_string())?;
    Ok(())
}

pub fn move_card(state: &mut AppState, id: &str, position: u32) -> Result<Vec<CardView>, String> {
    state.move_card(id, position).map_err(|e| e.to_string())?;
    list_cards(state)
}

pub fn reorder_cards(state: &mut AppState, ids: &[String]) -> Result<Vec<CardView>, String> {
    state.reorder_cards(ids).map_err(|e| e.to_string())?;
    list_cards(state)
}

fn view_of(state: &AppState, id: &str) -> Result<CardView, String> {
    state
        .card(id)
        .map(|card| CardView::new(card, state.active_card() == Some(id)))
        .ok_or_else(|| format!("No card with id {id}"))
}
