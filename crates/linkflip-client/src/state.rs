//! Application state owned by the front end.
//!
//! [`AppState`] holds the profile, the settings, the broadcast controller and
//! the flip timers. Every mutation updates memory first and then writes the
//! affected document on the blocking pool; the returned [`PendingSave`] can be
//! awaited for the outcome or dropped.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use linkflip_nfc::{BroadcastController, BroadcastError, BroadcastSession, BroadcastState};
use linkflip_qr::ErrorTolerance;
use linkflip_shared::{normalize_url, Appearance, Card, ColorScheme, PlatformId, Profile, Settings};
use linkflip_store::{DocumentKey, DocumentStore, StoreError};

use crate::config::ClientConfig;
use crate::error::StateError;
use crate::events::{emit_event, StateEvent, EVENT_CHANNEL_CAPACITY};
use crate::flip::FlipDeck;
use crate::theme::resolve_appearance;

/// Outcome of a background document write.
#[derive(Debug)]
pub struct PendingSave {
    rx: oneshot::Receiver<Result<(), StoreError>>,
}

impl PendingSave {
    fn ready(result: Result<(), StoreError>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Wait for the write to finish.
    pub async fn wait(self) -> Result<(), StoreError> {
        self.rx
            .await
            .unwrap_or_else(|_| Err(StoreError::Task("save task ended without a result".into())))
    }
}

/// Partial profile update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    /// `Some(None)` removes the picture.
    pub profile_image_ref: Option<Option<String>>,
}

/// Data for a new card.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub platform: PlatformId,
    pub handle: String,
    pub url: String,
    pub custom_image_ref: Option<String>,
    pub use_custom_image: bool,
}

/// Partial card update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct CardUpdate {
    pub platform: Option<PlatformId>,
    pub handle: Option<String>,
    pub url: Option<String>,
    /// Move the card to this position.
    pub order: Option<u32>,
    pub custom_image_ref: Option<Option<String>>,
    pub use_custom_image: Option<bool>,
}

/// Newest issued write per document. A write that has been overtaken by a
/// later one is skipped.
#[derive(Debug, Default)]
struct WriteLedger {
    profile: u64,
    settings: u64,
}

impl WriteLedger {
    fn slot(&mut self, key: DocumentKey) -> &mut u64 {
        match key {
            DocumentKey::Profile => &mut self.profile,
            DocumentKey::Settings => &mut self.settings,
        }
    }
}

/// Central application state. Owned by one task and mutated through
/// `&mut self`.
pub struct AppState {
    profile: Profile,
    settings: Settings,
    store: DocumentStore,
    broadcaster: BroadcastController,
    flips: FlipDeck,
    active_card: Option<String>,
    events: broadcast::Sender<StateEvent>,
    code_level: ErrorTolerance,
    system_appearance: Option<Appearance>,
    write_seq: u64,
    ledger: Arc<Mutex<WriteLedger>>,
    in_flight: Vec<JoinHandle<()>>,
}

impl AppState {
    /// Load both documents from `store` and hand the stored broadcast
    /// preference to `broadcaster`. Must be called inside a Tokio runtime.
    pub fn new(store: DocumentStore, broadcaster: BroadcastController, config: &ClientConfig) -> Self {
        let profile = store.load_profile();
        let settings = store.load_settings();
        info!(
            cards = profile.cards.len(),
            scheme = %settings.color_scheme_preference,
            broadcast = settings.broadcast_enabled,
            store = %store.describe(),
            "state loaded"
        );

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let mut state = Self {
            profile,
            settings,
            store,
            broadcaster,
            flips: FlipDeck::new(config.auto_revert),
            active_card: None,
            events,
            code_level: config.code_level,
            system_appearance: config.system_appearance,
            write_seq: 0,
            ledger: Arc::new(Mutex::new(WriteLedger::default())),
            in_flight: Vec::new(),
        };
        state.broadcaster.set_enabled(state.settings.broadcast_enabled);
        state
    }

    // -- accessors ----------------------------------------------------------

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn card(&self, id: &str) -> Option<&Card> {
        self.profile.card(id)
    }

    pub fn sorted_cards(&self) -> Vec<Card> {
        self.profile.sorted_cards()
    }

    pub fn appearance(&self) -> Appearance {
        resolve_appearance(self.settings.color_scheme_preference, self.system_appearance)
    }

    pub fn code_level(&self) -> ErrorTolerance {
        self.code_level
    }

    /// Card whose code is on screen and whose link is being broadcast.
    pub fn active_card(&self) -> Option<&str> {
        self.active_card.as_deref()
    }

    pub fn broadcast_session(&self) -> &BroadcastSession {
        self.broadcaster.session()
    }

    pub fn broadcast_state(&self) -> BroadcastState {
        self.broadcaster.state()
    }

    pub fn broadcast_error(&self) -> Option<&BroadcastError> {
        self.broadcaster.last_error()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateEvent> {
        self.events.subscribe()
    }

    // -- profile ------------------------------------------------------------

    pub fn update_profile(&mut self, update: ProfileUpdate) -> PendingSave {
        if let Some(name) = update.name {
            self.profile.name = name;
        }
        if let Some(bio) = update.bio {
            self.profile.bio = bio;
        }
        if let Some(image) = update.profile_image_ref {
            self.profile.profile_image_ref = image;
        }
        debug!("profile updated");
        self.profile_changed()
    }

    // -- cards --------------------------------------------------------------

    pub fn add_card(&mut self, new: NewCard) -> (Card, PendingSave) {
        let mut card = Card::new(new.platform, new.handle, normalize_url(&new.url));
        card.order = self.profile.cards.len() as u32;
        card.custom_image_ref = new.custom_image_ref;
        card.use_custom_image = new.use_custom_image;

        info!(card = %card.id, platform = %card.platform, "card added");
        self.profile.cards.push(card.clone());
        (card, self.profile_changed())
    }

    pub fn update_card(&mut self, id: &str, update: CardUpdate) -> Result<PendingSave, StateError> {
        let position = self
            .profile
            .position(id)
            .ok_or_else(|| StateError::CardNotFound(id.to_string()))?;

        let card = &mut self.profile.cards[position];
        let previous_url = card.url.clone();
        if let Some(platform) = update.platform {
            card.platform = platform;
        }
        if let Some(handle) = update.handle {
            card.handle = handle;
        }
        if let Some(url) = update.url {
            card.url = normalize_url(&url);
        }
        if let Some(image) = update.custom_image_ref {
            card.custom_image_ref = image;
        }
        if let Some(use_custom) = update.use_custom_image {
            card.use_custom_image = use_custom;
        }
        let url = card.url.clone();

        if let Some(order) = update.order {
            let card = self.profile.cards.remove(position);
            let target = (order as usize).min(self.profile.cards.len());
            self.profile.cards.insert(target, card);
            self.profile.renumber();
            debug!(card = %id, from = position, to = target, "card moved");
        }

        if url != previous_url && self.active_card.as_deref() == Some(id) {
            self.broadcaster.set_active_link(Some(url));
        }
        debug!(card = %id, "card updated");
        Ok(self.profile_changed())
    }

    /// Move a card to `position`, clamped to the end of the list.
    pub fn move_card(&mut self, id: &str, position: u32) -> Result<PendingSave, StateError> {
        self.update_card(
            id,
            CardUpdate {
                order: Some(position),
                ..CardUpdate::default()
            },
        )
    }

    pub fn delete_card(&mut self, id: &str) -> Result<PendingSave, StateError> {
        let position = self
            .profile
            .position(id)
            .ok_or_else(|| StateError::CardNotFound(id.to_string()))?;

        self.profile.cards.remove(position);
        self.profile.renumber();
        self.revert(id);

        info!(card = %id, remaining = self.profile.cards.len(), "card deleted");
        Ok(self.profile_changed())
    }

    /// Put the cards in the order given. `ids` must name every card exactly
    /// once.
    pub fn reorder_cards(&mut self, ids: &[String]) -> Result<PendingSave, StateError> {
        if ids.len() != self.profile.cards.len() {
            return Err(StateError::InvalidOrder(format!(
                "expected {} ids, got {}",
                self.profile.cards.len(),
                ids.len()
            )));
        }
        let mut seen = HashSet::new();
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(StateError::InvalidOrder(format!("{id} listed twice")));
            }
            if self.profile.card(id).is_none() {
                return Err(StateError::InvalidOrder(format!("unknown card {id}")));
            }
        }

        let mut remaining = std::mem::take(&mut self.profile.cards);
        for id in ids {
            if let Some(index) = remaining.iter().position(|c| &c.id == id) {
                self.profile.cards.push(remaining.swap_remove(index));
            }
        }
        self.profile.renumber();
        debug!(cards = ids.len(), "cards reordered");
        Ok(self.profile_changed())
    }

    // -- settings -----------------------------------------------------------

    pub fn set_color_scheme(&mut self, preference: ColorScheme) -> PendingSave {
        let before = self.appearance();
        self.settings.color_scheme_preference = preference;
        info!(scheme = %preference, "color scheme changed");
        self.appearance_check(before);
        self.settings_changed()
    }

    pub fn set_broadcast_enabled(&mut self, enabled: bool) -> PendingSave {
        self.settings.broadcast_enabled = enabled;
        self.broadcaster.set_enabled(enabled);
        info!(enabled, "broadcast preference changed");
        self.settings_changed()
    }

    /// Record the appearance the platform reports. Not persisted.
    pub fn set_system_appearance(&mut self, appearance: Option<Appearance>) {
        let before = self.appearance();
        self.system_appearance = appearance;
        self.appearance_check(before);
    }

    fn appearance_check(&self, before: Appearance) {
        let after = self.appearance();
        if after != before {
            emit_event(&self.events, StateEvent::AppearanceChanged { appearance: after });
        }
    }

    // -- codes and broadcast ------------------------------------------------

    /// Flip a card to its code and broadcast its link. Any other card that
    /// was showing its code turns back first.
    pub fn show_code(&mut self, id: &str) -> Result<(), StateError> {
        let url = self
            .profile
            .card(id)
            .map(|c| c.url.clone())
            .ok_or_else(|| StateError::CardNotFound(id.to_string()))?;

        if let Some(other) = self.active_card.clone().filter(|other| other != id) {
            self.revert(&other);
        }

        self.flips.show(id);
        self.active_card = Some(id.to_string());
        self.broadcaster.set_active_link(Some(url));
        emit_event(&self.events, StateEvent::CodeShown { card_id: id.to_string() });
        Ok(())
    }

    /// Turn a card back. Returns whether it was showing its code.
    pub fn hide_code(&mut self, id: &str) -> bool {
        self.revert(id)
    }

    /// Turn back every card whose timer has run out. Returns their ids.
    pub fn process_auto_revert(&mut self) -> Vec<String> {
        let expired = self.flips.take_expired();
        for id in &expired {
            self.clear_active(id);
        }
        expired
    }

    /// Wait for the next card to turn back on its own. `None` when no card
    /// is showing its code.
    pub async fn next_auto_revert(&mut self) -> Option<String> {
        let id = self.flips.next_expired().await?;
        self.clear_active(&id);
        Some(id)
    }

    fn revert(&mut self, id: &str) -> bool {
        let was_showing = self.flips.hide(id);
        let was_active = self.active_card.as_deref() == Some(id);
        if was_active {
            self.clear_active(id);
        } else if was_showing {
            emit_event(&self.events, StateEvent::CodeHidden { card_id: id.to_string() });
        }
        was_showing || was_active
    }

    fn clear_active(&mut self, id: &str) {
        if self.active_card.as_deref() == Some(id) {
            self.active_card = None;
            self.broadcaster.set_active_link(None);
        }
        debug!(card = %id, "code hidden");
        emit_event(&self.events, StateEvent::CodeHidden { card_id: id.to_string() });
    }

    /// Apply hardware notifications posted since the last call.
    pub fn poll_broadcast(&mut self) -> usize {
        self.broadcaster.poll_events()
    }

    /// Wait until the emitter has caught up with every request so far.
    pub async fn settle_broadcast(&mut self) {
        self.broadcaster.settle().await;
    }

    // -- persistence --------------------------------------------------------

    /// Wait for every write issued so far.
    pub async fn flush(&mut self) {
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "save task failed");
            }
        }
    }

    /// Erase both documents and return to defaults.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        self.flush().await;
        for id in self.flips.hide_all() {
            emit_event(&self.events, StateEvent::CodeHidden { card_id: id });
        }
        self.active_card = None;
        self.broadcaster.set_active_link(None);

        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.clear_all())
            .await
            .map_err(|e| StoreError::Task(e.to_string()))??;

        let before = self.appearance();
        self.profile = Profile::default();
        self.settings = Settings::default();
        self.broadcaster.set_enabled(self.settings.broadcast_enabled);
        info!("state reset to defaults");

        emit_event(&self.events, StateEvent::ProfileChanged);
        emit_event(&self.events, StateEvent::SettingsChanged);
        self.appearance_check(before);
        Ok(())
    }

    fn profile_changed(&mut self) -> PendingSave {
        self.profile.touch();
        emit_event(&self.events, StateEvent::ProfileChanged);
        self.persist(DocumentKey::Profile)
    }

    fn settings_changed(&mut self) -> PendingSave {
        emit_event(&self.events, StateEvent::SettingsChanged);
        self.persist(DocumentKey::Settings)
    }

    fn persist(&mut self, key: DocumentKey) -> PendingSave {
        let encoded = match key {
            DocumentKey::Profile => serde_json::to_string(&self.profile),
            DocumentKey::Settings => serde_json::to_string(&self.settings),
        };
        let json = match encoded {
            Ok(json) => json,
            Err(e) => {
                let err = StoreError::from(e);
                report_save_failure(&self.events, key, &err);
                return PendingSave::ready(Err(err));
            }
        };

        self.write_seq += 1;
        let seq = self.write_seq;
        let store = self.store.clone();
        let ledger = Arc::clone(&self.ledger);
        let events = self.events.clone();
        let (tx, rx) = oneshot::channel();

        self.in_flight.retain(|handle| !handle.is_finished());
        let handle = tokio::task::spawn_blocking(move || {
            let mut ledger = ledger.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            let newest = ledger.slot(key);
            let result = if seq < *newest {
                debug!(%key, seq, "skipping overtaken save");
                Ok(())
            } else {
                *newest = seq;
                store.save_json(key, &json)
            };
            drop(ledger);

            if let Err(e) = &result {
                report_save_failure(&events, key, e);
            }
            let _ = tx.send(result);
        });
        self.in_flight.push(handle);

        PendingSave { rx }
    }
}

fn report_save_failure(events: &broadcast::Sender<StateEvent>, key: DocumentKey, error: &StoreError) {
    warn!(%key, error = %error, "save failed, keeping in-memory change");
    emit_event(
        events,
        StateEvent::SaveFailed {
            document: key.to_string(),
            reason: error.to_string(),
        },
    );
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use linkflip_nfc::{HardwareEmitter, SoftEmitter};
    use linkflip_store::{Database, DocumentBackend, MemoryBackend};

    use super::*;

    /// Memory backend that counts writes and can be told to fail them.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        writes: AtomicUsize,
        fail: bool,
    }

    impl DocumentBackend for CountingBackend {
        fn read(&self, key: &str) -> linkflip_store::Result<Option<String>> {
            self.inner.read(key)
        }

        fn write(&self, key: &str, json: &str) -> linkflip_store::Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StoreError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    "disk full",
                )));
            }
            self.inner.write(key, json)
        }

        fn remove(&self, key: &str) -> linkflip_store::Result<()> {
            self.inner.remove(key)
        }

        fn describe(&self) -> String {
            "counting".to_string()
        }
    }

    fn github(handle: &str) -> NewCard {
        NewCard {
            platform: PlatformId::Github,
            handle: handle.to_string(),
            url: format!("github.com/{handle}"),
            custom_image_ref: None,
            use_custom_image: false,
        }
    }

    fn state_with(backend: Arc<dyn DocumentBackend>) -> AppState {
        AppState::new(
            DocumentStore::new(backend),
            BroadcastController::spawn(None),
            &ClientConfig::default(),
        )
    }

    fn handles(state: &AppState) -> Vec<String> {
        state.sorted_cards().into_iter().map(|c| c.handle).collect()
    }

    #[tokio::test]
    async fn starts_from_defaults() {
        let state = state_with(Arc::new(MemoryBackend::new()));
        assert_eq!(state.profile().name, "Your Name");
        assert!(state.sorted_cards().is_empty());
        assert_eq!(state.settings().color_scheme_preference, ColorScheme::System);
        assert_eq!(state.appearance(), Appearance::Light);
        assert_eq!(state.broadcast_state(), BroadcastState::Unsupported);
    }

    #[tokio::test]
    async fn mutations_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let open = || -> Arc<dyn DocumentBackend> { Arc::new(Database::open_in(dir.path()).unwrap()) };

        {
            let mut state = state_with(open());
            let (card, save) = state.add_card(github("ada"));
            save.wait().await.unwrap();
            assert_eq!(card.url, "https://github.com/ada");
            assert_eq!(card.order, 0);

            state.add_card(github("grace"));
            state.update_profile(ProfileUpdate {
                name: Some("Ada".into()),
                ..ProfileUpdate::default()
            });
            state.set_color_scheme(ColorScheme::Dark);
            state.flush().await;
        }

        let state = state_with(open());
        assert_eq!(state.profile().name, "Ada");
        assert_eq!(handles(&state), ["ada", "grace"]);
        assert_eq!(state.appearance(), Appearance::Dark);
    }

    #[tokio::test]
    async fn later_write_is_never_overwritten() {
        let backend = Arc::new(MemoryBackend::new());
        let mut state = state_with(backend.clone());
        for i in 0..20 {
            state.add_card(github(&format!("user{i}")));
        }
        state.flush().await;

        let reloaded = DocumentStore::new(backend).load_profile();
        assert_eq!(reloaded.cards.len(), 20);
    }

    #[tokio::test]
    async fn profile_timestamp_always_advances() {
        let mut state = state_with(Arc::new(MemoryBackend::new()));
        let first = state.profile().updated_at;
        state.update_profile(ProfileUpdate {
            bio: Some("hello".into()),
            ..ProfileUpdate::default()
        });
        let second = state.profile().updated_at;
        state.update_profile(ProfileUpdate::default());
        assert!(second > first);
        assert!(state.profile().updated_at > second);
    }

    #[tokio::test]
    async fn missing_card_changes_nothing() {
        let backend = Arc::new(CountingBackend::default());
        let mut state = state_with(backend.clone());
        let before = state.profile().clone();

        assert_eq!(
            state.update_card("nope", CardUpdate::default()).unwrap_err(),
            StateError::CardNotFound("nope".into())
        );
        assert!(matches!(state.delete_card("nope"), Err(StateError::CardNotFound(_))));
        assert!(matches!(state.show_code("nope"), Err(StateError::CardNotFound(_))));
        state.flush().await;

        assert_eq!(state.profile(), &before);
        assert_eq!(backend.writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn delete_compacts_order() {
        let mut state = state_with(Arc::new(MemoryBackend::new()));
        let ids: Vec<String> = ["a", "b", "c", "d"]
            .into_iter()
            .map(|h| state.add_card(github(h)).0.id)
            .collect();

        state.delete_card(&ids[1]).unwrap();
        let cards = state.sorted_cards();
        assert_eq!(handles(&state), ["a", "c", "d"]);
        assert_eq!(cards.iter().map(|c| c.order).collect::<Vec<_>>(), [0, 1, 2]);
    }

    #[tokio::test]
    async fn explicit_order_moves_card() {
        let mut state = state_with(Arc::new(MemoryBackend::new()));
        let ids: Vec<String> = ["a", "b", "c"]
            .into_iter()
            .map(|h| state.add_card(github(h)).0.id)
            .collect();

        state.move_card(&ids[2], 0).unwrap();
        assert_eq!(handles(&state), ["c", "a", "b"]);

        state.move_card(&ids[2], 99).unwrap();
        assert_eq!(handles(&state), ["a", "b", "c"]);
        assert!(state.profile().is_compact());
    }

    #[tokio::test]
    async fn update_card_normalizes_url() {
        let mut state = state_with(Arc::new(MemoryBackend::new()));
        let (card, _) = state.add_card(github("ada"));
        state
            .update_card(
                &card.id,
                CardUpdate {
                    url: Some("  github.com/Ada  ".into()),
                    use_custom_image: Some(true),
                    ..CardUpdate::default()
                },
            )
            .unwrap();

        let updated = state.card(&card.id).unwrap();
        assert_eq!(updated.url, "https://github.com/Ada");
        assert!(updated.use_custom_image);
        assert_eq!(updated.created_at, card.created_at);
    }

    #[tokio::test]
    async fn reorder_requires_permutation() {
        let mut state = state_with(Arc::new(MemoryBackend::new()));
        let a = state.add_card(github("a")).0.id;
        let b = state.add_card(github("b")).0.id;

        for bad in [vec![a.clone()], vec![a.clone(), a.clone()], vec![a.clone(), "x".into()]] {
            assert!(matches!(state.reorder_cards(&bad), Err(StateError::InvalidOrder(_))));
        }
        assert_eq!(handles(&state), ["a", "b"]);

        state.reorder_cards(&[b, a]).unwrap();
        assert_eq!(handles(&state), ["b", "a"]);
    }

    #[tokio::test]
    async fn failed_save_keeps_change_and_reports() {
        let backend = Arc::new(CountingBackend {
            fail: true,
            ..CountingBackend::default()
        });
        let mut state = state_with(backend);
        let mut events = state.subscribe();

        let (card, save) = state.add_card(github("ada"));
        match save.wait().await {
            Err(StoreError::Write { key, reason }) => {
                assert_eq!(key, "profile");
                assert!(reason.contains("disk full"));
            }
            other => panic!("expected write error, got {other:?}"),
        }
        assert!(state.card(&card.id).is_some());

        assert_eq!(events.recv().await.unwrap(), StateEvent::ProfileChanged);
        match events.recv().await.unwrap() {
            StateEvent::SaveFailed { document, .. } => assert_eq!(document, "profile"),
            other => panic!("expected SaveFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn color_scheme_drives_appearance() {
        let mut state = state_with(Arc::new(MemoryBackend::new()));
        let mut events = state.subscribe();

        state.set_system_appearance(Some(Appearance::Dark));
        assert_eq!(state.appearance(), Appearance::Dark);
        assert_eq!(
            events.try_recv().unwrap(),
            StateEvent::AppearanceChanged {
                appearance: Appearance::Dark
            }
        );

        // Explicit dark while the system is dark: no visible change.
        state.set_color_scheme(ColorScheme::Dark);
        assert_eq!(events.try_recv().unwrap(), StateEvent::SettingsChanged);

        state.set_color_scheme(ColorScheme::Light);
        assert_eq!(
            events.try_recv().unwrap(),
            StateEvent::AppearanceChanged {
                appearance: Appearance::Light
            }
        );
        assert_eq!(events.try_recv().unwrap(), StateEvent::SettingsChanged);
    }

    fn soft_state(emitter: &SoftEmitter, config: &ClientConfig) -> AppState {
        let hardware: Arc<dyn HardwareEmitter> = Arc::new(emitter.clone());
        AppState::new(
            DocumentStore::in_memory(),
            BroadcastController::spawn(Some(hardware)),
            config,
        )
    }

    #[tokio::test]
    async fn shown_code_is_broadcast() {
        let emitter = SoftEmitter::new();
        let mut state = soft_state(&emitter, &ClientConfig::default());
        state.settle_broadcast().await;
        assert_eq!(state.broadcast_state(), BroadcastState::Idle);

        state.set_broadcast_enabled(true);
        let a = state.add_card(github("ada")).0.id;
        let b = state.add_card(github("grace")).0.id;

        state.show_code(&a).unwrap();
        state.settle_broadcast().await;
        assert_eq!(state.broadcast_state(), BroadcastState::Emitting);
        assert_eq!(emitter.emitted_url().as_deref(), Some("https://github.com/ada"));

        // Only one card shows its code at a time.
        state.show_code(&b).unwrap();
        state.settle_broadcast().await;
        assert_eq!(state.active_card(), Some(b.as_str()));
        assert_eq!(emitter.emitted_url().as_deref(), Some("https://github.com/grace"));

        state.delete_card(&b).unwrap();
        state.settle_broadcast().await;
        assert_eq!(state.active_card(), None);
        assert_eq!(state.broadcast_state(), BroadcastState::Armed);
        assert_eq!(emitter.emitted_url(), None);
    }

    #[tokio::test]
    async fn code_turns_back_after_timeout() {
        let emitter = SoftEmitter::new();
        let config = ClientConfig {
            auto_revert: Duration::from_secs(5),
            ..ClientConfig::default()
        };
        let mut state = soft_state(&emitter, &config);
        state.set_broadcast_enabled(true);
        let a = state.add_card(github("ada")).0.id;

        state.show_code(&a).unwrap();
        state.settle_broadcast().await;
        assert_eq!(emitter.emitted_url().as_deref(), Some("https://github.com/ada"));

        assert_eq!(state.next_auto_revert().await, Some(a));
        state.settle_broadcast().await;
        assert_eq!(state.active_card(), None);
        assert_eq!(emitter.emitted_url(), None);
        assert_eq!(state.next_auto_revert().await, None);
    }

    #[tokio::test]
    async fn reset_restores_defaults() {
        let backend = Arc::new(MemoryBackend::new());
        let mut state = state_with(backend.clone());
        state.add_card(github("ada"));
        state.set_color_scheme(ColorScheme::Dark);
        state.flush().await;

        state.reset().await.unwrap();
        assert!(state.sorted_cards().is_empty());
        assert_eq!(state.settings(), &Settings::default());
        assert_eq!(backend.read("profile").unwrap(), None);
        assert_eq!(backend.read("settings").unwrap(), None);
    }
}
