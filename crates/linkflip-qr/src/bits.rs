/// Append-only sequence of bits, most significant first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BitBuffer(Vec<bool>);

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Append the low `len` bits of `value`.
    pub fn append_bits(&mut self, value: u32, len: u8) {
        debug_assert!(len <= 31 && value >> len == 0);
        self.0.extend((0..len).rev().map(|i| (value >> i) & 1 != 0));
    }

    pub fn extend(&mut self, other: &BitBuffer) {
        self.0.extend_from_slice(&other.0);
    }

    /// Pack into bytes. The length must be a multiple of 8.
    pub fn to_bytes(&self) -> Vec<u8> {
        debug_assert_eq!(self.0.len() % 8, 0);
        self.0
            .chunks(8)
            .map(|chunk| chunk.iter().fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit)))
            .collect()
    }
}
