//! Static table of supported social networks.
//!
//! Each [`PlatformId`] maps to exactly one [`PlatformDescriptor`]. Descriptors
//! are plain data; their URL patterns are compiled once, on first use, and
//! shared for the lifetime of the process.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// A supported social network.
///
/// Variant order is the recognition priority order and must match
/// [`PLATFORMS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    #[serde(alias = "x")]
    Twitter,
    Instagram,
    Linkedin,
    Youtube,
    Github,
    Tiktok,
    Facebook,
    Threads,
    Bluesky,
    Discord,
    Telegram,
    Whatsapp,
}

impl PlatformId {
    /// All platforms in recognition priority order.
    pub fn all() -> impl Iterator<Item = PlatformId> {
        PLATFORMS.iter().map(|d| d.id)
    }

    /// The descriptor for this platform.
    pub fn descriptor(self) -> &'static PlatformDescriptor {
        &PLATFORMS[self as usize]
    }

    /// Human-readable platform name.
    pub fn display_name(self) -> &'static str {
        self.descriptor().display_name
    }

    /// Stable lowercase tag, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        self.descriptor().tag
    }
}

impl std::fmt::Display for PlatformId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Static description of one network: how to recognise its profile links
/// and how to display a handle.
#[derive(Debug)]
pub struct PlatformDescriptor {
    pub id: PlatformId,
    tag: &'static str,
    pub display_name: &'static str,
    /// Prepended to a raw handle for display (`@alice`, `+15551234`).
    pub handle_prefix: &'static str,
    /// Canonical profile link with the handle appended.
    profile_base: &'static str,
    /// Ordered matchers; capture group 1 is the handle.
    url_patterns: &'static [&'static str],
}

// Every pattern is anchored at the scheme and host so that a domain merely
// ending in a platform's host (netflix.com vs x.com) never matches.
const HANDLE: &str = r"([^/?#\s]+)";

static PLATFORMS: [PlatformDescriptor; 12] = [
    PlatformDescriptor {
        id: PlatformId::Twitter,
        tag: "twitter",
        display_name: "Twitter",
        handle_prefix: "@",
        profile_base: "https://twitter.com/",
        url_patterns: &[
            r"^https?://(?:www\.|mobile\.)?twitter\.com/",
            r"^https?://(?:www\.|mobile\.)?x\.com/",
        ],
    },
    PlatformDescriptor {
        id: PlatformId::Instagram,
        tag: "instagram",
        display_name: "Instagram",
        handle_prefix: "@",
        profile_base: "https://instagram.com/",
        url_patterns: &[r"^https?://(?:www\.)?instagram\.com/"],
    },
    PlatformDescriptor {
        id: PlatformId::Linkedin,
        tag: "linkedin",
        display_name: "LinkedIn",
        handle_prefix: "",
        profile_base: "https://linkedin.com/in/",
        url_patterns: &[r"^https?://(?:www\.|[a-z]{2}\.)?linkedin\.com/in/"],
    },
    PlatformDescriptor {
        id: PlatformId::Youtube,
        tag: "youtube",
        display_name: "YouTube",
        handle_prefix: "@",
        profile_base: "https://youtube.com/@",
        url_patterns: &[
            r"^https?://(?:www\.|m\.)?youtube\.com/@",
            r"^https?://(?:www\.|m\.)?youtube\.com/channel/",
        ],
    },
    PlatformDescriptor {
        id: PlatformId::Github,
        tag: "github",
        display_name: "GitHub",
        handle_prefix: "",
        profile_base: "https://github.com/",
        url_patterns: &[r"^https?://(?:www\.)?github\.com/"],
    },
    PlatformDescriptor {
        id: PlatformId::Tiktok,
        tag: "tiktok",
        display_name: "TikTok",
        handle_prefix: "@",
        profile_base: "https://tiktok.com/@",
        url_patterns: &[r"^https?://(?:www\.|m\.)?tiktok\.com/@"],
    },
    PlatformDescriptor {
        id: PlatformId::Facebook,
        tag: "facebook",
        display_name: "Facebook",
        handle_prefix: "",
        profile_base: "https://facebook.com/",
        url_patterns: &[r"^https?://(?:www\.|m\.)?facebook\.com/"],
    },
    PlatformDescriptor {
        id: PlatformId::Threads,
        tag: "threads",
        display_name: "Threads",
        handle_prefix: "@",
        profile_base: "https://threads.net/@",
        url_patterns: &[r"^https?://(?:www\.)?threads\.net/@"],
    },
    PlatformDescriptor {
        id: PlatformId::Bluesky,
        tag: "bluesky",
        display_name: "Bluesky",
        handle_prefix: "@",
        profile_base: "https://bsky.app/profile/",
        url_patterns: &[r"^https?://(?:www\.)?bsky\.app/profile/"],
    },
    PlatformDescriptor {
        id: PlatformId::Discord,
        tag: "discord",
        display_name: "Discord",
        handle_prefix: "",
        profile_base: "https://discord.gg/",
        url_patterns: &[
            r"^https?://(?:www\.)?discord\.gg/",
            r"^https?://(?:www\.)?discord\.com/invite/",
        ],
    },
    PlatformDescriptor {
        id: PlatformId::Telegram,
        tag: "telegram",
        display_name: "Telegram",
        handle_prefix: "@",
        profile_base: "https://t.me/",
        url_patterns: &[r"^https?://(?:www\.)?t\.me/"],
    },
    PlatformDescriptor {
        id: PlatformId::Whatsapp,
        tag: "whatsapp",
        display_name: "WhatsApp",
        handle_prefix: "+",
        profile_base: "https://wa.me/",
        url_patterns: &[r"^https?://(?:www\.)?wa\.me/"],
    },
];

static COMPILED_PATTERNS: OnceLock<Vec<Vec<Regex>>> = OnceLock::new();

fn compiled_patterns() -> &'static [Vec<Regex>] {
    COMPILED_PATTERNS.get_or_init(|| {
        PLATFORMS
            .iter()
            .map(|descriptor| {
                descriptor
                    .url_patterns
                    .iter()
                    .map(|prefix| {
                        Regex::new(&format!("(?i){prefix}{HANDLE}"))
                            .expect("Failed to compile platform URL pattern")
                    })
                    .collect()
            })
            .collect()
    })
}

impl PlatformDescriptor {
    /// Compiled URL matchers, in priority order.
    pub fn patterns(&self) -> &'static [Regex] {
        &compiled_patterns()[self.id as usize]
    }

    /// Pull the handle out of a scheme-qualified link, trying each pattern in
    /// order. Returns `None` when no pattern captures a non-empty handle.
    pub fn extract(&self, url: &str) -> Option<String> {
        self.patterns()
            .iter()
            .filter_map(|re| re.captures(url))
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
            .find(|handle| !handle.is_empty())
    }

    /// Canonical profile link for a raw handle.
    pub fn profile_url(&self, handle: &str) -> String {
        format!("{}{}", self.profile_base, handle)
    }
}
