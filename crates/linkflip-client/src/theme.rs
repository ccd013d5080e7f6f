use linkflip_shared::{Appearance, ColorScheme};

/// Effective appearance for a preference. `System` follows the platform and
/// falls back to light when the platform reports nothing.
pub fn resolve_appearance(preference: ColorScheme, system: Option<Appearance>) -> Appearance {
    match preference {
        ColorScheme::Light => Appearance::Light,
        ColorScheme::Dark => Appearance::Dark,
        ColorScheme::System => system.unwrap_or(Appearance::Light),
    }
}
