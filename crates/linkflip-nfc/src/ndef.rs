//! NDEF URI records (NFC Forum well-known type `U`).

/// URI identifier codes. The index is the code byte.
const URI_PREFIXES: [&str; 36] = [
    "",
    "http://www.",
    "https://www.",
    "http://",
    "https://",
    "tel:",
    "mailto:",
    "ftp://anonymous:anonymous@",
    "ftp://ftp.",
    "ftps://",
    "sftp://",
    "smb://",
    "nfs://",
    "ftp://",
    "dav://",
    "news:",
    "telnet://",
    "imap:",
    "rtsp://",
    "urn:",
    "pop:",
    "sip:",
    "sips:",
    "tftp:",
    "btspp://",
    "btl2cap://",
    "btgoep://",
    "tcpobex://",
    "irdaobex://",
    "file://",
    "urn:epc:id:",
    "urn:epc:tag:",
    "urn:epc:pat:",
    "urn:epc:raw:",
    "urn:epc:",
    "urn:nfc:",
];

const FLAG_MB: u8 = 0x80;
const FLAG_ME: u8 = 0x40;
const FLAG_SR: u8 = 0x10;
const TNF_WELL_KNOWN: u8 = 0x01;
const TYPE_URI: u8 = b'U';

/// Longest prefix from the identifier table that starts `uri`, as
/// `(code, remainder)`.
pub fn compress_uri(uri: &str) -> (u8, &str) {
    URI_PREFIXES
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, prefix)| uri.starts_with(**prefix))
        .max_by_key(|(_, prefix)| prefix.len())
        .map(|(code, prefix)| (code as u8, &uri[prefix.len()..]))
        .unwrap_or((0, uri))
}

/// A single-record NDEF message carrying `uri`. Payloads up to 255 bytes use
/// the short record form.
pub fn uri_record(uri: &str) -> Vec<u8> {
    let (code, rest) = compress_uri(uri);
    let payload_len = rest.len() + 1;

    let mut record = Vec::with_capacity(payload_len + 7);
    if payload_len <= usize::from(u8::MAX) {
        record.push(FLAG_MB | FLAG_ME | FLAG_SR | TNF_WELL_KNOWN);
        record.push(1);
        record.push(payload_len as u8);
    } else {
        record.push(FLAG_MB | FLAG_ME | TNF_WELL_KNOWN);
        record.push(1);
        record.extend_from_slice(&(payload_len as u32).to_be_bytes());
    }
    record.push(TYPE_URI);
    record.push(code);
    record.extend_from_slice(rest.as_bytes());
    record
}

/// Parse a message produced by [`uri_record`] back into the URI.
pub fn parse_uri_record(message: &[u8]) -> Option<String> {
    let header = *message.first()?;
    if header & 0x07 != TNF_WELL_KNOWN || message.get(1) != Some(&1) {
        return None;
    }
    let (payload_len, type_at) = if header & FLAG_SR != 0 {
        (usize::from(*message.get(2)?), 3)
    } else {
        let bytes: [u8; 4] = message.get(2..6)?.try_into().ok()?;
        (u32::from_be_bytes(bytes) as usize, 6)
    };
    if message.get(type_at) != Some(&TYPE_URI) {
        return None;
    }
    let payload = message.get(type_at + 1..type_at + 1 + payload_len)?;
    let (&code, rest) = payload.split_first()?;
    let prefix = URI_PREFIXES.get(usize::from(code))?;
    let rest = std::str::from_utf8(rest).ok()?;
    Some(format!("{prefix}{rest}"))
}
