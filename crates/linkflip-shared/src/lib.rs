// Domain model and link recognition shared by every LinkFlip crate.

pub mod constants;
pub mod detector;
pub mod error;
pub mod platform;
pub mod types;

pub use detector::{format_handle, is_valid_url, normalize_url, profile_url, recognize, Recognized};
pub use error::RecognizeError;
pub use platform::{PlatformDescriptor, PlatformId};
pub use types::{Appearance, Card, ColorScheme, Profile, Settings};
