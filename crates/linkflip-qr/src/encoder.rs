use crate::bits::BitBuffer;
use crate::ecc::{
    ecc_codewords_per_block, num_blocks, num_data_codewords, num_raw_data_modules, ErrorTolerance,
    MAX_VERSION, MIN_VERSION,
};
use crate::error::{EncodeError, Result};
use crate::matrix::{BitMatrix, Canvas};
use crate::reed_solomon;
use crate::segment::{Mode, Segment};

/// Encode `text` at the given error tolerance.
///
/// The smallest version that fits is chosen and the level is never raised or
/// lowered. Text that does not fit in version 40 is rejected rather than
/// truncated.
pub fn encode(text: &str, level: ErrorTolerance) -> Result<BitMatrix> {
    let segment = Segment::for_text(text);

    let (version, used_bits) = (MIN_VERSION..=MAX_VERSION)
        .find_map(|version| {
            let capacity = num_data_codewords(version, level) * 8;
            segment
                .encoded_len(version)
                .filter(|&used| used <= capacity)
                .map(|used| (version, used))
        })
        .ok_or_else(|| EncodeError::PayloadTooLarge {
            length: text.len(),
            capacity: max_capacity(segment.mode(), level),
            level,
        })?;

    let capacity_bits = num_data_codewords(version, level) * 8;
    let mut buffer = BitBuffer::new();
    segment.write_to(&mut buffer, version);
    debug_assert_eq!(buffer.len(), used_bits);

    // Terminator, byte alignment, then alternating pad bytes.
    let terminator = (capacity_bits - buffer.len()).min(4);
    buffer.append_bits(0, terminator as u8);
    let align = (8 - buffer.len() % 8) % 8;
    buffer.append_bits(0, align as u8);
    for pad in [0xEC, 0x11].into_iter().cycle() {
        if buffer.len() >= capacity_bits {
            break;
        }
        buffer.append_bits(pad, 8);
    }

    let data = buffer.to_bytes();
    let codewords = add_ecc_and_interleave(&data, version, level);

    let mut canvas = Canvas::new(version, level);
    canvas.draw_codewords(&codewords);
    let matrix = canvas.finish();

    tracing::debug!(
        version,
        level = %level,
        mode = ?segment.mode(),
        chars = segment.num_chars(),
        "Encoded code"
    );
    Ok(matrix)
}

/// Most characters of a mode that fit in version 40 at a level.
pub fn max_capacity(mode: Mode, level: ErrorTolerance) -> usize {
    let bits = num_data_codewords(MAX_VERSION, level) * 8
        - 4
        - usize::from(mode.char_count_bits(MAX_VERSION));
    match mode {
        // 10 bits per three digits; a trailing one or two take 4 or 7.
        Mode::Numeric => {
            let tail = match bits % 10 {
                7..=9 => 2,
                4..=6 => 1,
                _ => 0,
            };
            bits / 10 * 3 + tail
        }
        // 11 bits per pair; a trailing single takes 6.
        Mode::Alphanumeric => bits / 11 * 2 + usize::from(bits % 11 >= 6),
        Mode::Byte => bits / 8,
    }
}

/// Longest byte-mode text that fits in version 40 at a level.
pub fn max_byte_capacity(level: ErrorTolerance) -> usize {
    max_capacity(Mode::Byte, level)
}

/// Split data into blocks, append each block's ECC, and interleave.
fn add_ecc_and_interleave(data: &[u8], version: u8, level: ErrorTolerance) -> Vec<u8> {
    let blocks_count = num_blocks(version, level);
    let ecc_len = ecc_codewords_per_block(version, level);
    let raw_codewords = num_raw_data_modules(version) / 8;
    debug_assert_eq!(data.len(), num_data_codewords(version, level));

    // Short blocks come first and carry one data codeword less.
    let short_blocks = blocks_count - raw_codewords % blocks_count;
    let short_len = raw_codewords / blocks_count;
    let divisor = reed_solomon::compute_divisor(ecc_len);

    let mut blocks: Vec<Vec<u8>> = Vec::with_capacity(blocks_count);
    let mut offset = 0;
    for i in 0..blocks_count {
        let data_len = short_len - ecc_len + usize::from(i >= short_blocks);
        let mut block = data[offset..offset + data_len].to_vec();
        offset += data_len;
        let ecc = reed_solomon::compute_remainder(&block, &divisor);
        if i < short_blocks {
            // Placeholder, skipped while interleaving.
            block.push(0);
        }
        block.extend_from_slice(&ecc);
        blocks.push(block);
    }

    let mut result = Vec::with_capacity(raw_codewords);
    for i in 0..=short_len {
        for (j, block) in blocks.iter().enumerate() {
            if i != short_len - ecc_len || j >= short_blocks {
                result.push(block[i]);
            }
        }
    }
    debug_assert_eq!(result.len(), raw_codewords);
    result
}
