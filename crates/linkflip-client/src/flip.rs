//! Auto-revert timers for flipped cards.
//!
//! Showing a card's code starts a timer task that reports back on a channel
//! when it runs out. Each timer carries a generation number, so a report from
//! a timer that was cancelled or replaced is ignored.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

struct FlipTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Cards currently showing their code, each with a pending auto-revert.
pub struct FlipDeck {
    duration: Duration,
    next_generation: u64,
    timers: HashMap<String, FlipTimer>,
    expired_tx: mpsc::UnboundedSender<(String, u64)>,
    expired_rx: mpsc::UnboundedReceiver<(String, u64)>,
}

impl FlipDeck {
    pub fn new(duration: Duration) -> Self {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        Self {
            duration,
            next_generation: 0,
            timers: HashMap::new(),
            expired_tx,
            expired_rx,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Start (or restart) the timer for `card_id`. Must be called inside a
    /// Tokio runtime.
    pub fn show(&mut self, card_id: &str) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let duration = self.duration;
        let tx = self.expired_tx.clone();
        let id = card_id.to_string();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send((id, generation));
        });

        if let Some(previous) = self.timers.insert(
            card_id.to_string(),
            FlipTimer { generation, handle },
        ) {
            previous.handle.abort();
        }
        debug!(card = %card_id, generation, "flip timer started");
    }

    /// Cancel the timer for `card_id`. Returns whether the card was showing.
    pub fn hide(&mut self, card_id: &str) -> bool {
        match self.timers.remove(card_id) {
            Some(timer) => {
                timer.handle.abort();
                debug!(card = %card_id, "flip timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancel every timer, returning the ids that were showing.
    pub fn hide_all(&mut self) -> Vec<String> {
        let ids: Vec<String> = self.timers.keys().cloned().collect();
        for id in &ids {
            self.hide(id);
        }
        ids
    }

    pub fn is_showing(&self, card_id: &str) -> bool {
        self.timers.contains_key(card_id)
    }

    pub fn showing(&self) -> impl Iterator<Item = &str> {
        self.timers.keys().map(String::as_str)
    }

    /// Cards whose timers have run out since the last call, without waiting.
    pub fn take_expired(&mut self) -> Vec<String> {
        let mut expired = Vec::new();
        while let Ok((id, generation)) = self.expired_rx.try_recv() {
            if self.claim(&id, generation) {
                expired.push(id);
            }
        }
        expired
    }

    /// Wait for the next timer to run out. `None` when nothing is showing.
    pub async fn next_expired(&mut self) -> Option<String> {
        loop {
            if self.timers.is_empty() {
                return None;
            }
            let (id, generation) = self.expired_rx.recv().await?;
            if self.claim(&id, generation) {
                return Some(id);
            }
        }
    }

    fn claim(&mut self, id: &str, generation: u64) -> bool {
        match self.timers.get(id) {
            Some(timer) if timer.generation == generation => {
                self.timers.remove(id);
                true
            }
            _ => {
                debug!(card = %id, generation, "ignoring stale flip timer");
                false
            }
        }
    }
}

impl Drop for FlipDeck {
    fn drop(&mut self) {
        for timer in self.timers.values() {
            timer.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn reverts_after_duration() {
        let mut deck = FlipDeck::new(Duration::from_secs(5));
        let started = Instant::now();
        deck.show("a");
        assert!(deck.is_showing("a"));

        assert_eq!(deck.next_expired().await.as_deref(), Some("a"));
        assert!(started.elapsed() >= Duration::from_secs(5));
        assert!(!deck.is_showing("a"));
        assert_eq!(deck.next_expired().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_hide_cancels_revert() {
        let mut deck = FlipDeck::new(Duration::from_secs(5));
        deck.show("a");
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(deck.hide("a"));
        assert!(!deck.hide("a"));

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(deck.take_expired().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn reshow_restarts_timer() {
        let mut deck = FlipDeck::new(Duration::from_secs(5));
        deck.show("a");
        tokio::time::sleep(Duration::from_secs(3)).await;
        deck.show("a");

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(deck.take_expired().is_empty());
        assert!(deck.is_showing("a"));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(deck.take_expired(), vec!["a".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn hide_all_clears_every_card() {
        let mut deck = FlipDeck::new(Duration::from_secs(5));
        deck.show("a");
        deck.show("b");
        let mut hidden = deck.hide_all();
        hidden.sort();
        assert_eq!(hidden, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(deck.showing().count(), 0);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(deck.take_expired().is_empty());
    }
}
