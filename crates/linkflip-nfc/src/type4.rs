//! Read-only NFC Forum Type 4 Tag responder.
//!
//! Answers the command APDUs a phone sends when it reads a tag: select the
//! NDEF application, select and read the capability container, then select
//! and read the NDEF file. Writes are refused.

use tracing::trace;

use crate::error::EmitterError;
use crate::ndef;

/// NDEF tag application identifier.
pub const NDEF_AID: [u8; 7] = [0xD2, 0x76, 0x00, 0x00, 0x85, 0x01, 0x01];
/// Capability container file identifier.
pub const CC_FILE_ID: [u8; 2] = [0xE1, 0x03];
/// NDEF file identifier.
pub const NDEF_FILE_ID: [u8; 2] = [0xE1, 0x04];

/// Largest response data the reader is told to ask for.
const MAX_LE: u16 = 0x003B;
/// Largest command data the reader is told to send.
const MAX_LC: u16 = 0x0034;

pub const SW_OK: [u8; 2] = [0x90, 0x00];
pub const SW_WRONG_LENGTH: [u8; 2] = [0x67, 0x00];
pub const SW_SECURITY_NOT_SATISFIED: [u8; 2] = [0x69, 0x82];
pub const SW_NO_FILE_SELECTED: [u8; 2] = [0x69, 0x86];
pub const SW_NOT_FOUND: [u8; 2] = [0x6A, 0x82];
pub const SW_WRONG_OFFSET: [u8; 2] = [0x6B, 0x00];
pub const SW_INS_NOT_SUPPORTED: [u8; 2] = [0x6D, 0x00];
pub const SW_CLA_NOT_SUPPORTED: [u8; 2] = [0x6E, 0x00];

const INS_SELECT: u8 = 0xA4;
const INS_READ_BINARY: u8 = 0xB0;
const INS_UPDATE_BINARY: u8 = 0xD6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectedFile {
    CapabilityContainer,
    Ndef,
}

/// Tag state for one emitted NDEF message.
#[derive(Debug, Clone)]
pub struct Type4Tag {
    capability_container: Vec<u8>,
    ndef_file: Vec<u8>,
    application_selected: bool,
    selected: Option<SelectedFile>,
}

impl Type4Tag {
    /// Tag serving an already-encoded NDEF message. The NDEF file (message
    /// plus its two-byte length) must fit the 16-bit sizes of the
    /// capability container.
    pub fn new(ndef_message: &[u8]) -> Result<Self, EmitterError> {
        let file_len = ndef_message
            .len()
            .checked_add(2)
            .and_then(|len| u16::try_from(len).ok())
            .ok_or_else(|| {
                EmitterError::new(format!(
                    "NDEF message of {} bytes does not fit a Type 4 tag",
                    ndef_message.len()
                ))
            })?;

        let mut ndef_file = Vec::with_capacity(usize::from(file_len));
        ndef_file.extend_from_slice(&(file_len - 2).to_be_bytes());
        ndef_file.extend_from_slice(ndef_message);

        let mut cc = Vec::with_capacity(15);
        cc.extend_from_slice(&15u16.to_be_bytes());
        cc.push(0x20); // mapping version 2.0
        cc.extend_from_slice(&MAX_LE.to_be_bytes());
        cc.extend_from_slice(&MAX_LC.to_be_bytes());
        cc.extend_from_slice(&[0x04, 0x06]);
        cc.extend_from_slice(&NDEF_FILE_ID);
        cc.extend_from_slice(&file_len.to_be_bytes());
        cc.push(0x00); // read access granted
        cc.push(0xFF); // no write access

        Ok(Self {
            capability_container: cc,
            ndef_file,
            application_selected: false,
            selected: None,
        })
    }

    /// Tag serving a single URI record.
    pub fn for_uri(uri: &str) -> Result<Self, EmitterError> {
        Self::new(&ndef::uri_record(uri))
    }

    /// Forget any selection, as when the reader leaves the field.
    pub fn reset(&mut self) {
        self.application_selected = false;
        self.selected = None;
    }

    /// Handle one command APDU and return the response APDU.
    pub fn process(&mut self, apdu: &[u8]) -> Vec<u8> {
        let response = self.respond(apdu);
        trace!(
            command = %hex::encode(apdu),
            response = %hex::encode(&response),
            "tag exchange"
        );
        response
    }

    fn respond(&mut self, apdu: &[u8]) -> Vec<u8> {
        let [cla, ins, p1, p2, body @ ..] = apdu else {
            return SW_WRONG_LENGTH.to_vec();
        };
        if *cla != 0x00 {
            return SW_CLA_NOT_SUPPORTED.to_vec();
        }

        match *ins {
            INS_SELECT => self.select(*p1, command_data(body)),
            INS_READ_BINARY => self.read_binary(*p1, *p2, body),
            INS_UPDATE_BINARY => SW_SECURITY_NOT_SATISFIED.to_vec(),
            _ => SW_INS_NOT_SUPPORTED.to_vec(),
        }
    }

    fn select(&mut self, p1: u8, data: Option<&[u8]>) -> Vec<u8> {
        let Some(data) = data else {
            return SW_WRONG_LENGTH.to_vec();
        };
        match p1 {
            // By name.
            0x04 if data == NDEF_AID => {
                self.application_selected = true;
                self.selected = None;
                SW_OK.to_vec()
            }
            // By file identifier, only inside the application.
            0x00 if self.application_selected => {
                let file = if data == CC_FILE_ID {
                    SelectedFile::CapabilityContainer
                } else if data == NDEF_FILE_ID {
                    SelectedFile::Ndef
                } else {
                    return SW_NOT_FOUND.to_vec();
                };
                self.selected = Some(file);
                SW_OK.to_vec()
            }
            _ => SW_NOT_FOUND.to_vec(),
        }
    }

    fn read_binary(&self, p1: u8, p2: u8, body: &[u8]) -> Vec<u8> {
        let file = match self.selected {
            Some(SelectedFile::CapabilityContainer) => &self.capability_container,
            Some(SelectedFile::Ndef) => &self.ndef_file,
            None => return SW_NO_FILE_SELECTED.to_vec(),
        };
        let offset = usize::from(u16::from_be_bytes([p1 & 0x7F, p2]));
        if offset > file.len() {
            return SW_WRONG_OFFSET.to_vec();
        }
        let le = match body {
            [] => 256,
            [0] => 256,
            [le] => usize::from(*le),
            _ => return SW_WRONG_LENGTH.to_vec(),
        };
        let end = (offset + le).min(file.len());

        let mut response = file[offset..end].to_vec();
        response.extend_from_slice(&SW_OK);
        response
    }
}

/// Data field of a case-3/4 short APDU body (`Lc data [Le]`).
fn command_data(body: &[u8]) -> Option<&[u8]> {
    let (&lc, rest) = body.split_first()?;
    rest.get(..usize::from(lc))
}
