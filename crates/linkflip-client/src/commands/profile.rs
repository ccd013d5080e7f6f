use serde::Serialize;
use tracing::info;

use linkflip_shared::{format_handle, Appearance, Card, PlatformId};

use crate::state::{AppState, ProfileUpdate};

/// A card as the front end draws it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub id: String,
    pub platform: PlatformId,
    pub platform_name: String,
    /// Handle with its platform prefix, e.g. `@ada`.
    pub handle: String,
    pub url: String,
    pub order: u32,
    pub custom_image_ref: Option<String>,
    pub use_custom_image: bool,
    pub showing_code: bool,
}

impl CardView {
    pub fn new(card: &Card, showing_code: bool) -> Self {
        Self {
            id: card.id.clone(),
            platform: card.platform,
            platform_name: card.platform.display_name().to_string(),
            handle: format_handle(card.platform, &card.handle),
            url: card.url.clone(),
            order: card.order,
            custom_image_ref: card.custom_image_ref.clone(),
            use_custom_image: card.use_custom_image,
            showing_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: String,
    pub bio: String,
    pub profile_image_ref: Option<String>,
    pub cards: Vec<CardView>,
    pub appearance: Appearance,
}

pub fn get_profile(state: &AppState) -> Result<ProfileView, String> {
    let profile = state.profile();
    let cards = state
        .sorted_cards()
        .iter()
        .map(|card| CardView::new(card, state.active_card() == Some(card.id.as_str())))
        .collect();

    Ok(ProfileView {
        name: profile.name.clone(),
        bio: profile.bio.clone(),
        profile_image_ref: profile.profile_image_ref.clone(),
        cards,
        appearance: state.appearance(),
    })
}

pub fn set_name(state: &mut AppState, name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }
    info!(%name, "Setting profile name");
    state.update_profile(ProfileUpdate {
        name: Some(name.to_string()),
        ..ProfileUpdate::default()
    });
    Ok(())
}

pub fn set_bio(state: &mut AppState, bio: &str) -> Result<(), String> {
    state.update_profile(ProfileUpdate {
        bio: Some(bio.trim().to_string()),
        ..ProfileUpdate::default()
    });
    Ok(())
}

/// Set or clear (`None`) the profile picture reference.
pub fn set_profile_image(state: &mut AppState, image_ref: Option<String>) -> Result<(), String> {
    state.update_profile(ProfileUpdate {
        profile_image_ref: Some(image_ref.filter(|r| !r.trim().is_empty())),
        ..ProfileUpdate::default()
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cards::add_card;
    use crate::test_support::memory_state;

    #[tokio::test]
    async fn profile_view_formats_handles() {
        let mut state = memory_state();
        set_name(&mut state, "  Ada  ").unwrap();
        set_bio(&mut state, "Engines").unwrap();
        add_card(&mut state, "instagram.com/ada").unwrap();

        let view = get_profile(&state).unwrap();
        assert_eq!(view.name, "Ada");
        assert_eq!(view.bio, "Engines");
        assert_eq!(view.cards.len(), 1);
        assert_eq!(view.cards[0].handle, "@ada");
        assert_eq!(view.cards[0].platform_name, "Instagram");
        assert!(!view.cards[0].showing_code);
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let mut state = memory_state();
        assert!(set_name(&mut state, "   ").is_err());
        assert_eq!(state.profile().name, "Your Name");
    }

    #[tokio::test]
    async fn blank_image_clears_picture() {
        let mut state = memory_state();
        set_profile_image(&mut state, Some("file:///me.png".into())).unwrap();
        assert_eq!(state.profile().profile_image_ref.as_deref(), Some("file:///me.png"));
        set_profile_image(&mut state, Some(" ".into())).unwrap();
        assert_eq!(state.profile().profile_image_ref, None);
    }
}
