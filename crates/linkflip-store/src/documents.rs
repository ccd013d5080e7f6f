//! Typed access to the profile and settings documents.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use linkflip_shared::constants::{PROFILE_DOCUMENT_KEY, SETTINGS_DOCUMENT_KEY};
use linkflip_shared::{Profile, Settings};

use crate::backend::{DocumentBackend, MemoryBackend};
use crate::error::{Result, StoreError};

/// The fixed document slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKey {
    Profile,
    Settings,
}

impl DocumentKey {
    pub const ALL: [DocumentKey; 2] = [DocumentKey::Profile, DocumentKey::Settings];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Profile => PROFILE_DOCUMENT_KEY,
            Self::Settings => SETTINGS_DOCUMENT_KEY,
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cheaply cloneable handle over a [`DocumentBackend`].
///
/// Each document is replaced whole on save. The two slots are written
/// independently; there is no transaction spanning both.
#[derive(Clone)]
pub struct DocumentStore {
    backend: Arc<dyn DocumentBackend>,
}

impl DocumentStore {
    pub fn new(backend: Arc<dyn DocumentBackend>) -> Self {
        tracing::debug!(backend = %backend.describe(), "document store ready");
        Self { backend }
    }

    /// Store that forgets everything on exit.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn describe(&self) -> String {
        self.backend.describe()
    }

    /// Read a document, falling back to `default` when it is missing or
    /// cannot be read. Corruption is logged and never returned.
    pub fn load<T, F>(&self, key: DocumentKey, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        match self.try_load(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!(%key, "no stored document, using defaults");
                default()
            }
            Err(e) => {
                tracing::warn!(%key, error = %e, "discarding unreadable document");
                default()
            }
        }
    }

    fn try_load<T: DeserializeOwned>(&self, key: DocumentKey) -> Result<Option<T>> {
        let corrupt = |reason: String| StoreError::ReadCorrupt {
            key: key.to_string(),
            reason,
        };
        let Some(json) = self
            .backend
            .read(key.as_str())
            .map_err(|e| corrupt(e.to_string()))?
        else {
            return Ok(None);
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| corrupt(e.to_string()))
    }

    /// Replace a document.
    pub fn save<T: Serialize + ?Sized>(&self, key: DocumentKey, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.save_json(key, &json)
    }

    /// Replace a document with already-encoded JSON.
    pub fn save_json(&self, key: DocumentKey, json: &str) -> Result<()> {
        self.backend
            .write(key.as_str(), json)
            .map_err(|e| StoreError::Write {
                key: key.to_string(),
                reason: e.to_string(),
            })?;
        tracing::debug!(%key, bytes = json.len(), "document saved");
        Ok(())
    }

    /// Remove both documents so the next load yields defaults.
    pub fn clear_all(&self) -> Result<()> {
        for key in DocumentKey::ALL {
            self.backend
                .remove(key.as_str())
                .map_err(|e| StoreError::Write {
                    key: key.to_string(),
                    reason: e.to_string(),
                })?;
        }
        tracing::info!("stored documents cleared");
        Ok(())
    }

    /// Profile with its card order repaired.
    pub fn load_profile(&self) -> Profile {
        let mut profile: Profile = self.load(DocumentKey::Profile, Profile::default);
        if !profile.is_compact() {
            tracing::warn!(cards = profile.cards.len(), "repairing card order");
        }
        profile.compact_order();
        profile
    }

    pub fn load_settings(&self) -> Settings {
        self.load(DocumentKey::Settings, Settings::default)
    }
}

impl fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocumentStore")
            .field("backend", &self.backend.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use linkflip_shared::{Card, ColorScheme, PlatformId};

    /// Backend whose writes always fail.
    struct ReadOnlyBackend;

    impl DocumentBackend for ReadOnlyBackend {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Ok(None)
        }

        fn write(&self, _key: &str, _json: &str) -> Result<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only medium",
            )))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Ok(())
        }

        fn describe(&self) -> String {
            "read-only".to_string()
        }
    }

    #[test]
    fn missing_documents_use_defaults() {
        let store = DocumentStore::in_memory();
        assert_eq!(store.load_settings(), Settings::default());
        assert_eq!(store.load_profile().name, "Your Name");
    }

    #[test]
    fn corrupt_document_falls_back() {
        let backend = Arc::new(MemoryBackend::new());
        backend.write("settings", "{not json").unwrap();
        let store = DocumentStore::new(backend);
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn write_failure_is_reported() {
        let store = DocumentStore::new(Arc::new(ReadOnlyBackend));
        match store.save(DocumentKey::Settings, &Settings::default()) {
            Err(StoreError::Write { key, reason }) => {
                assert_eq!(key, "settings");
                assert!(reason.contains("read-only"));
            }
            other => panic!("expected write error, got {other:?}"),
        }
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut profile = Profile::default();
        profile.name = "Ada".into();
        profile
            .cards
            .push(Card::new(PlatformId::Github, "ada", "https://github.com/ada"));
        let settings = Settings {
            color_scheme_preference: ColorScheme::Dark,
            broadcast_enabled: true,
        };

        {
            let store = DocumentStore::new(Arc::new(Database::open_in(dir.path()).unwrap()));
            store.save(DocumentKey::Profile, &profile).unwrap();
            store.save(DocumentKey::Settings, &settings).unwrap();
        }

        let store = DocumentStore::new(Arc::new(Database::open_in(dir.path()).unwrap()));
        assert_eq!(store.load_profile(), profile);
        assert_eq!(store.load_settings(), settings);

        store.clear_all().unwrap();
        assert_eq!(store.load_settings(), Settings::default());
        assert!(store.load_profile().cards.is_empty());
    }

    #[test]
    fn load_repairs_card_order() {
        let store = DocumentStore::in_memory();
        let mut profile = Profile::default();
        for (i, order) in [4u32, 0, 9].into_iter().enumerate() {
            let mut card = Card::new(PlatformId::Github, format!("u{i}"), "https://github.com/u");
            card.order = order;
            profile.cards.push(card);
        }
        store.save(DocumentKey::Profile, &profile).unwrap();

        let loaded = store.load_profile();
        assert!(loaded.is_compact());
        let handles: Vec<_> = loaded.cards.iter().map(|c| c.handle.as_str()).collect();
        assert_eq!(handles, vec!["u1", "u0", "u2"]);
    }
}
