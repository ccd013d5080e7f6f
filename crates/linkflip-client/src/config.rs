//! Client configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the client can start with zero
//! configuration.

use std::path::PathBuf;
use std::time::Duration;

use linkflip_qr::ErrorTolerance;
use linkflip_shared::constants::AUTO_REVERT_SECS;
use linkflip_shared::Appearance;

/// Client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Directory holding `linkflip.db`.
    /// Env: `LINKFLIP_DATA_DIR`
    /// Default: the platform data directory.
    pub data_dir: Option<PathBuf>,

    /// Error correction level for card codes.
    /// Env: `LINKFLIP_CODE_LEVEL` (`L`, `M`, `Q`, `H`)
    /// Default: `M`
    pub code_level: ErrorTolerance,

    /// How long a flipped card shows its code.
    /// Env: `LINKFLIP_AUTO_REVERT_SECS`
    /// Default: `5`
    pub auto_revert: Duration,

    /// Serve links through the in-process emitter instead of real hardware.
    /// Env: `LINKFLIP_SOFT_NFC` (true/false)
    /// Default: `false`
    pub soft_nfc: bool,

    /// Appearance reported by the platform, used for the `system` scheme.
    /// Env: `LINKFLIP_APPEARANCE` (`light`, `dark`)
    /// Default: unset
    pub system_appearance: Option<Appearance>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            code_level: ErrorTolerance::Medium,
            auto_revert: Duration::from_secs(AUTO_REVERT_SECS),
            soft_nfc: false,
            system_appearance: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup("LINKFLIP_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(level) = lookup("LINKFLIP_CODE_LEVEL") {
            match level.parse::<ErrorTolerance>() {
                Ok(parsed) => config.code_level = parsed,
                Err(e) => {
                    tracing::warn!(value = %level, error = %e, "Invalid LINKFLIP_CODE_LEVEL, using default");
                }
            }
        }

        if let Some(secs) = lookup("LINKFLIP_AUTO_REVERT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(parsed) if parsed > 0 => config.auto_revert = Duration::from_secs(parsed),
                _ => {
                    tracing::warn!(value = %secs, "Invalid LINKFLIP_AUTO_REVERT_SECS, using default");
                }
            }
        }

        if let Some(flag) = lookup("LINKFLIP_SOFT_NFC") {
            config.soft_nfc = matches!(flag.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        if let Some(appearance) = lookup("LINKFLIP_APPEARANCE") {
            match appearance.parse::<Appearance>() {
                Ok(parsed) => config.system_appearance = Some(parsed),
                Err(e) => {
                    tracing::warn!(value = %appearance, error = %e, "Invalid LINKFLIP_APPEARANCE, ignoring");
                }
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from_pairs(pairs: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_variables() {
        assert_eq!(from_pairs(&[]), ClientConfig::default());
        assert_eq!(ClientConfig::default().auto_revert, Duration::from_secs(5));
    }

    #[test]
    fn reads_every_variable() {
        let config = from_pairs(&[
            ("LINKFLIP_DATA_DIR", "/tmp/linkflip"),
            ("LINKFLIP_CODE_LEVEL", "h"),
            ("LINKFLIP_AUTO_REVERT_SECS", "12"),
            ("LINKFLIP_SOFT_NFC", "1"),
            ("LINKFLIP_APPEARANCE", "dark"),
        ]);
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/linkflip")));
        assert_eq!(config.code_level, ErrorTolerance::High);
        assert_eq!(config.auto_revert, Duration::from_secs(12));
        assert!(config.soft_nfc);
        assert_eq!(config.system_appearance, Some(Appearance::Dark));
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let config = from_pairs(&[
            ("LINKFLIP_CODE_LEVEL", "Z"),
            ("LINKFLIP_AUTO_REVERT_SECS", "soon"),
            ("LINKFLIP_APPEARANCE", "sepia"),
        ]);
        assert_eq!(config, ClientConfig::default());
    }
}
