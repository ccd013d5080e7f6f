//! In-process emitter that serves the Type 4 tag to simulated readers.
//!
//! Used on hosts without a contactless radio (desktop builds, the headless
//! CLI, tests). Clones share state, so one handle can be given to the
//! controller while another plays the reader through [`SoftEmitter::transceive`].

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::EmitterError;
use crate::hardware::{EmissionSession, HardwareEmitter};
use crate::type4::Type4Tag;

#[derive(Debug, Default)]
struct SoftState {
    payload: Option<String>,
    enabled: bool,
    tag: Option<Type4Tag>,
    sessions_created: usize,
    enable_calls: usize,
    disable_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct SoftEmitter {
    state: Arc<Mutex<SoftState>>,
}

impl SoftEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SoftState> {
        // Plain data; a poisoned lock is still usable.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Deliver one reader APDU. `None` when nothing is being emitted, as if
    /// no tag were in the field.
    pub fn transceive(&self, apdu: &[u8]) -> Option<Vec<u8>> {
        let mut state = self.lock();
        if !state.enabled {
            return None;
        }
        state.tag.as_mut().map(|tag| tag.process(apdu))
    }

    /// Link currently advertised, if emitting.
    pub fn emitted_url(&self) -> Option<String> {
        let state = self.lock();
        state.enabled.then(|| state.payload.clone()).flatten()
    }

    /// `(sessions created, enable calls, disable calls)`.
    pub fn call_counts(&self) -> (usize, usize, usize) {
        let state = self.lock();
        (state.sessions_created, state.enable_calls, state.disable_calls)
    }
}

impl HardwareEmitter for SoftEmitter {
    fn probe_available(&self) -> bool {
        true
    }

    fn create_session(&self) -> Result<Box<dyn EmissionSession>, EmitterError> {
        self.lock().sessions_created += 1;
        Ok(Box::new(SoftSession {
            emitter: self.clone(),
        }))
    }
}

struct SoftSession {
    emitter: SoftEmitter,
}

impl EmissionSession for SoftSession {
    fn set_payload(&mut self, url: &str) -> Result<(), EmitterError> {
        let tag = Type4Tag::for_uri(url)?;
        let mut state = self.emitter.lock();
        state.payload = Some(url.to_string());
        state.tag = Some(tag);
        Ok(())
    }

    fn set_enabled(&mut self, enabled: bool) -> Result<(), EmitterError> {
        let mut state = self.emitter.lock();
        if enabled && state.tag.is_none() {
            return Err(EmitterError::new("no payload installed"));
        }
        if enabled {
            state.enable_calls += 1;
        } else {
            state.disable_calls += 1;
            if let Some(tag) = state.tag.as_mut() {
                tag.reset();
            }
        }
        state.enabled = enabled;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ndef;
    use crate::type4::{CC_FILE_ID, NDEF_AID, NDEF_FILE_ID, SW_OK};

    /// Minimal reader: the standard Type 4 read sequence.
    fn read_tag(emitter: &SoftEmitter) -> Option<String> {
        let mut select_app = vec![0x00, 0xA4, 0x04, 0x00, 0x07];
        select_app.extend_from_slice(&NDEF_AID);
        select_app.push(0x00);

        let ok = |response: Vec<u8>| -> Option<Vec<u8>> {
            let (data, sw) = response.split_at(response.len().checked_sub(2)?);
            (sw == SW_OK).then(|| data.to_vec())
        };

        ok(emitter.transceive(&select_app)?)?;
        ok(emitter.transceive(&[0x00, 0xA4, 0x00, 0x0C, 0x02, CC_FILE_ID[0], CC_FILE_ID[1]])?)?;
        ok(emitter.transceive(&[0x00, 0xB0, 0x00, 0x00, 0x0F])?)?;
        ok(emitter.transceive(&[0x00, 0xA4, 0x00, 0x0C, 0x02, NDEF_FILE_ID[0], NDEF_FILE_ID[1]])?)?;
        let nlen = ok(emitter.transceive(&[0x00, 0xB0, 0x00, 0x00, 0x02])?)?;
        let nlen = u8::try_from(u16::from_be_bytes([nlen[0], nlen[1]])).ok()?;
        let message = ok(emitter.transceive(&[0x00, 0xB0, 0x00, 0x02, nlen])?)?;
        ndef::parse_uri_record(&message)
    }

    #[test]
    fn serves_tag_only_while_enabled() {
        let emitter = SoftEmitter::new();
        assert!(emitter.probe_available());
        let mut session = emitter.create_session().unwrap();

        assert!(session.set_enabled(true).is_err());
        session.set_payload("https://t.me/alice").unwrap();
        assert_eq!(read_tag(&emitter), None);

        session.set_enabled(true).unwrap();
        assert_eq!(read_tag(&emitter).as_deref(), Some("https://t.me/alice"));
        assert_eq!(emitter.emitted_url().as_deref(), Some("https://t.me/alice"));

        session.set_enabled(false).unwrap();
        assert_eq!(read_tag(&emitter), None);
        assert_eq!(emitter.call_counts(), (1, 1, 1));
    }
}
