//! Data segments and mode selection.

use crate::bits::BitBuffer;

const ALPHANUMERIC_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";

/// How the characters of a segment are packed into bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Numeric,
    Alphanumeric,
    Byte,
}

impl Mode {
    fn mode_bits(self) -> u32 {
        match self {
            Self::Numeric => 0x1,
            Self::Alphanumeric => 0x2,
            Self::Byte => 0x4,
        }
    }

    /// Width of the character count field for a version.
    pub fn char_count_bits(self, version: u8) -> u8 {
        let widths = match self {
            Self::Numeric => [10, 12, 14],
            Self::Alphanumeric => [9, 11, 13],
            Self::Byte => [8, 16, 16],
        };
        widths[usize::from((version + 7) / 17)]
    }
}

/// A run of text in a single mode.
#[derive(Debug, Clone)]
pub struct Segment {
    mode: Mode,
    num_chars: usize,
    data: BitBuffer,
}

impl Segment {
    /// Choose the densest single mode that can represent the whole text.
    pub fn for_text(text: &str) -> Self {
        if is_numeric(text) {
            Self::numeric(text)
        } else if is_alphanumeric(text) {
            Self::alphanumeric(text)
        } else {
            Self::bytes(text.as_bytes())
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn num_chars(&self) -> usize {
        self.num_chars
    }

    fn numeric(text: &str) -> Self {
        let mut data = BitBuffer::new();
        for chunk in text.as_bytes().chunks(3) {
            let value = chunk
                .iter()
                .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'));
            // 1 digit -> 4 bits, 2 -> 7, 3 -> 10.
            data.append_bits(value, (chunk.len() * 3 + 1) as u8);
        }
        Self {
            mode: Mode::Numeric,
            num_chars: text.len(),
            data,
        }
    }

    fn alphanumeric(text: &str) -> Self {
        let values: Vec<u32> = text
            .chars()
            .filter_map(|c| ALPHANUMERIC_CHARSET.find(c).map(|i| i as u32))
            .collect();
        let mut data = BitBuffer::new();
        for pair in values.chunks(2) {
            match pair {
                [a, b] => data.append_bits(a * 45 + b, 11),
                [a] => data.append_bits(*a, 6),
                _ => {}
            }
        }
        Self {
            mode: Mode::Alphanumeric,
            num_chars: values.len(),
            data,
        }
    }

    fn bytes(bytes: &[u8]) -> Self {
        let mut data = BitBuffer::new();
        for &b in bytes {
            data.append_bits(u32::from(b), 8);
        }
        Self {
            mode: Mode::Byte,
            num_chars: bytes.len(),
            data,
        }
    }

    /// Bits this segment occupies at a version, header included. `None` when
    /// the character count overflows its field.
    pub(crate) fn encoded_len(&self, version: u8) -> Option<usize> {
        let cc_bits = self.mode.char_count_bits(version);
        if self.num_chars >= 1usize << cc_bits {
            return None;
        }
        Some(4 + usize::from(cc_bits) + self.data.len())
    }

    pub(crate) fn write_to(&self, buffer: &mut BitBuffer, version: u8) {
        buffer.append_bits(self.mode.mode_bits(), 4);
        buffer.append_bits(self.num_chars as u32, self.mode.char_count_bits(version));
        buffer.extend(&self.data);
    }
}

pub fn is_numeric(text: &str) -> bool {
    text.bytes().all(|b| b.is_ascii_digit())
}

pub fn is_alphanumeric(text: &str) -> bool {
    text.chars().all(|c| ALPHANUMERIC_CHARSET.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_selection() {
        assert_eq!(Segment::for_text("0123456789").mode(), Mode::Numeric);
        assert_eq!(Segment::for_text("HTTPS://T.ME/ABC").mode(), Mode::Alphanumeric);
        assert_eq!(Segment::for_text("https://t.me/abc").mode(), Mode::Byte);
        assert_eq!(Segment::for_text("héllo").num_chars(), 6);
    }

    #[test]
    fn numeric_and_alphanumeric_lengths() {
        // 8 digits: 10 + 10 + 7 data bits.
        assert_eq!(Segment::for_text("01234567").encoded_len(1), Some(4 + 10 + 27));
        // "AC-42": two pairs and a single.
        assert_eq!(Segment::for_text("AC-42").encoded_len(1), Some(4 + 9 + 11 + 11 + 6));
    }

    #[test]
    fn count_field_widths() {
        assert_eq!(Mode::Byte.char_count_bits(9), 8);
        assert_eq!(Mode::Byte.char_count_bits(10), 16);
        assert_eq!(Mode::Numeric.char_count_bits(26), 12);
        assert_eq!(Mode::Numeric.char_count_bits(27), 14);
    }
}
