/// Application name
pub const APP_NAME: &str = "LinkFlip";

/// Identifier of the single local profile
pub const DEFAULT_PROFILE_ID: &str = "default";

/// Placeholder name shown until the user edits the profile
pub const DEFAULT_PROFILE_NAME: &str = "Your Name";

/// Placeholder bio shown until the user edits the profile
pub const DEFAULT_BIO: &str = "Add your bio here";

/// Storage key of the profile document
pub const PROFILE_DOCUMENT_KEY: &str = "profile";

/// Storage key of the settings document
pub const SETTINGS_DOCUMENT_KEY: &str = "settings";

/// Scheme prepended to links entered without one
pub const DEFAULT_SCHEME: &str = "https://";

/// Seconds a flipped card keeps showing its code before turning back
pub const AUTO_REVERT_SECS: u64 = 5;

/// Edge length in pixels of the code drawn on the back of a card
pub const DEFAULT_CODE_SIZE_PX: u32 = 120;
