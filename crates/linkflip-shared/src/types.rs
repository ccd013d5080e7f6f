use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_BIO, DEFAULT_PROFILE_ID, DEFAULT_PROFILE_NAME};
use crate::platform::PlatformId;

/// Current time truncated to whole milliseconds, matching the stored format.
pub fn now_millis() -> DateTime<Utc> {
    let millis = Utc::now().timestamp_millis();
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or_else(Utc::now)
}

/// A single social link on the profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub platform: PlatformId,
    #[serde(alias = "username")]
    pub handle: String,
    pub url: String,
    #[serde(default)]
    pub order: u32,
    #[serde(with = "chrono::serde::ts_milliseconds", default = "now_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, alias = "customImage")]
    pub custom_image_ref: Option<String>,
    #[serde(default)]
    pub use_custom_image: bool,
}

impl Card {
    /// Fresh card with a random id, stamped now.
    pub fn new(platform: PlatformId, handle: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: new_card_id(),
            platform,
            handle: handle.into(),
            url: url.into(),
            order: 0,
            created_at: now_millis(),
            custom_image_ref: None,
            use_custom_image: false,
        }
    }
}

pub fn new_card_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// The single profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub bio: String,
    #[serde(alias = "profileImage")]
    pub profile_image_ref: Option<String>,
    #[serde(alias = "snsCards")]
    pub cards: Vec<Card>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            id: DEFAULT_PROFILE_ID.to_string(),
            name: DEFAULT_PROFILE_NAME.to_string(),
            bio: DEFAULT_BIO.to_string(),
            profile_image_ref: None,
            cards: Vec::new(),
            updated_at: now_millis(),
        }
    }
}

impl Profile {
    /// Advance `updated_at`. If the clock has not moved past the previous
    /// value it is bumped by one millisecond.
    pub fn touch(&mut self) {
        let now = now_millis();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::milliseconds(1)
        };
    }

    /// Sort by `(order, created_at)` and renumber 0..N-1.
    pub fn compact_order(&mut self) {
        self.cards
            .sort_by(|a, b| a.order.cmp(&b.order).then(a.created_at.cmp(&b.created_at)));
        self.renumber();
    }

    /// Assign orders from the current vector position.
    pub fn renumber(&mut self) {
        for (index, card) in self.cards.iter_mut().enumerate() {
            card.order = index as u32;
        }
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn card_mut(&mut self, id: &str) -> Option<&mut Card> {
        self.cards.iter_mut().find(|c| c.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.cards.iter().position(|c| c.id == id)
    }

    /// Cards in display order.
    pub fn sorted_cards(&self) -> Vec<Card> {
        let mut cards = self.cards.clone();
        cards.sort_by_key(|c| c.order);
        cards
    }

    /// True when orders are exactly 0..N-1 in vector order.
    pub fn is_compact(&self) -> bool {
        self.cards
            .iter()
            .enumerate()
            .all(|(index, card)| card.order as usize == index)
    }
}

/// User's colour scheme choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    System,
}

impl std::str::FromStr for ColorScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" | "auto" => Ok(Self::System),
            other => Err(format!("Unknown color scheme: {other}")),
        }
    }
}

impl std::fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        })
    }
}

/// Resolved light/dark appearance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    #[default]
    Light,
    Dark,
}

impl std::str::FromStr for Appearance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("Unknown appearance: {other}")),
        }
    }
}

/// The settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    #[serde(alias = "colorScheme")]
    pub color_scheme_preference: ColorScheme,
    #[serde(alias = "nfcEnabled")]
    pub broadcast_enabled: bool,
}
