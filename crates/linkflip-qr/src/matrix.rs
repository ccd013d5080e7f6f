//! Module grid construction: function patterns, codeword placement, masking
//! and penalty scoring.
//!
//! The builder works in `(x, y)` screen coordinates (x is the column, y the
//! row), the convention of the symbol standard's mask formulas. The finished
//! [`BitMatrix`] is addressed as `(row, col)`.

use crate::ecc::{symbol_size, ErrorTolerance};

const PENALTY_N1: i32 = 3;
const PENALTY_N2: i32 = 3;
const PENALTY_N3: i32 = 40;
const PENALTY_N4: i32 = 10;

/// A finished, square QR symbol. `true` is a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    size: usize,
    version: u8,
    level: ErrorTolerance,
    mask: u8,
    modules: Vec<bool>,
}

impl BitMatrix {
    /// Modules per side (21 for version 1, up to 177).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn error_tolerance(&self) -> ErrorTolerance {
        self.level
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Colour of the module at `(row, col)`. Out of range reads as light.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.modules[row * self.size + col]
    }

    /// Rows top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.modules.chunks(self.size)
    }

    /// `(row, col)` of every dark module, row-major.
    pub fn dark_modules(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let size = self.size;
        self.modules
            .iter()
            .enumerate()
            .filter(|&(_, &dark)| dark)
            .map(move |(i, _)| (i / size, i % size))
    }
}

/// Mutable grid used while a symbol is being built.
pub(crate) struct Canvas {
    size: i32,
    version: u8,
    level: ErrorTolerance,
    modules: Vec<bool>,
    is_function: Vec<bool>,
}

impl Canvas {
    pub fn new(version: u8, level: ErrorTolerance) -> Self {
        let size = symbol_size(version);
        let mut canvas = Self {
            size: size as i32,
            version,
            level,
            modules: vec![false; size * size],
            is_function: vec![false; size * size],
        };
        canvas.draw_function_patterns();
        canvas
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.size + x) as usize
    }

    fn module(&self, x: i32, y: i32) -> bool {
        self.modules[self.index(x, y)]
    }

    fn set_function_module(&mut self, x: i32, y: i32, dark: bool) {
        let i = self.index(x, y);
        self.modules[i] = dark;
        self.is_function[i] = true;
    }

    fn draw_function_patterns(&mut self) {
        let size = self.size;

        for i in 0..size {
            self.set_function_module(6, i, i % 2 == 0);
            self.set_function_module(i, 6, i % 2 == 0);
        }

        self.draw_finder_pattern(3, 3);
        self.draw_finder_pattern(size - 4, 3);
        self.draw_finder_pattern(3, size - 4);

        // Skip the three corners occupied by finders.
        let positions = alignment_pattern_positions(self.version);
        let n = positions.len();
        for i in 0..n {
            for j in 0..n {
                let on_finder =
                    (i == 0 && j == 0) || (i == 0 && j == n - 1) || (i == n - 1 && j == 0);
                if !on_finder {
                    self.draw_alignment_pattern(positions[i], positions[j]);
                }
            }
        }

        // Reserve the format area; real bits are drawn once the mask is known.
        self.draw_format_bits(0);
        self.draw_version();
    }

    /// 9x9 finder with its separator, clipped at the symbol edge.
    fn draw_finder_pattern(&mut self, x: i32, y: i32) {
        for dy in -4..=4 {
            for dx in -4..=4 {
                let (xx, yy) = (x + dx, y + dy);
                if (0..self.size).contains(&xx) && (0..self.size).contains(&yy) {
                    let dist = dx.abs().max(dy.abs());
                    self.set_function_module(xx, yy, dist != 2 && dist != 4);
                }
            }
        }
    }

    fn draw_alignment_pattern(&mut self, x: i32, y: i32) {
        for dy in -2..=2 {
            for dx in -2..=2 {
                self.set_function_module(x + dx, y + dy, dx.abs().max(dy.abs()) != 1);
            }
        }
    }

    fn draw_format_bits(&mut self, mask: u8) {
        let data = (self.level.format_bits() << 3) | u32::from(mask);
        let mut rem = data;
        for _ in 0..10 {
            rem = (rem << 1) ^ ((rem >> 9) * 0x537);
        }
        let bits = ((data << 10) | rem) ^ 0x5412;
        let size = self.size;

        // Copy around the top-left finder.
        for i in 0..6 {
            self.set_function_module(8, i, bit(bits, i));
        }
        self.set_function_module(8, 7, bit(bits, 6));
        self.set_function_module(8, 8, bit(bits, 7));
        self.set_function_module(7, 8, bit(bits, 8));
        for i in 9..15 {
            self.set_function_module(14 - i, 8, bit(bits, i));
        }

        // Split copy along the other two finders.
        for i in 0..8 {
            self.set_function_module(size - 1 - i, 8, bit(bits, i));
        }
        for i in 8..15 {
            self.set_function_module(8, size - 15 + i, bit(bits, i));
        }
        self.set_function_module(8, size - 8, true);
    }

    fn draw_version(&mut self) {
        if self.version < 7 {
            return;
        }
        let version = u32::from(self.version);
        let mut rem = version;
        for _ in 0..12 {
            rem = (rem << 1) ^ ((rem >> 11) * 0x1F25);
        }
        let bits = (version << 12) | rem;

        for i in 0..18 {
            let dark = bit(bits, i);
            let a = self.size - 11 + i % 3;
            let b = i / 3;
            self.set_function_module(a, b, dark);
            self.set_function_module(b, a, dark);
        }
    }

    /// Place interleaved codewords in the zig-zag column pairs, right to
    /// left, skipping the vertical timing column.
    pub fn draw_codewords(&mut self, data: &[u8]) {
        let total_bits = data.len() * 8;
        let mut i = 0usize;
        let mut right = self.size - 1;
        while right >= 1 {
            if right == 6 {
                right = 5;
            }
            for vert in 0..self.size {
                for j in 0..2 {
                    let x = right - j;
                    let upward = (right + 1) & 2 == 0;
                    let y = if upward { self.size - 1 - vert } else { vert };
                    let idx = self.index(x, y);
                    if !self.is_function[idx] && i < total_bits {
                        self.modules[idx] = (data[i >> 3] >> (7 - (i & 7))) & 1 != 0;
                        i += 1;
                    }
                }
            }
            right -= 2;
        }
    }

    /// XOR a mask pattern over the data modules. Applying it twice undoes it.
    fn apply_mask(&mut self, mask: u8) {
        for y in 0..self.size {
            for x in 0..self.size {
                let invert = match mask {
                    0 => (x + y) % 2 == 0,
                    1 => y % 2 == 0,
                    2 => x % 3 == 0,
                    3 => (x + y) % 3 == 0,
                    4 => (x / 3 + y / 2) % 2 == 0,
                    5 => x * y % 2 + x * y % 3 == 0,
                    6 => (x * y % 2 + x * y % 3) % 2 == 0,
                    _ => ((x + y) % 2 + x * y % 3) % 2 == 0,
                };
                let idx = self.index(x, y);
                if invert && !self.is_function[idx] {
                    self.modules[idx] = !self.modules[idx];
                }
            }
        }
    }

    /// Try all eight masks and keep the one with the lowest penalty.
    pub fn finish(mut self) -> BitMatrix {
        let mut best_mask = 0u8;
        let mut best_penalty = i32::MAX;
        for mask in 0..8u8 {
            self.apply_mask(mask);
            self.draw_format_bits(mask);
            let penalty = self.penalty_score();
            if penalty < best_penalty {
                best_mask = mask;
                best_penalty = penalty;
            }
            self.apply_mask(mask);
        }

        self.apply_mask(best_mask);
        self.draw_format_bits(best_mask);
        tracing::trace!(
            version = self.version,
            mask = best_mask,
            penalty = best_penalty,
            "Selected mask"
        );

        BitMatrix {
            size: self.size as usize,
            version: self.version,
            level: self.level,
            mask: best_mask,
            modules: self.modules,
        }
    }

    fn penalty_score(&self) -> i32 {
        let size = self.size;
        let mut result = 0;

        // Runs and finder-like patterns, rows then columns.
        for horizontal in [true, false] {
            for a in 0..size {
                let mut run_color = false;
                let mut run_len = 0;
                let mut history = FinderPenalty::new(size);
                for b in 0..size {
                    let color = if horizontal { self.module(b, a) } else { self.module(a, b) };
                    if color == run_color {
                        run_len += 1;
                        if run_len == 5 {
                            result += PENALTY_N1;
                        } else if run_len > 5 {
                            result += 1;
                        }
                    } else {
                        history.add_history(run_len);
                        if !run_color {
                            result += history.count_patterns() * PENALTY_N3;
                        }
                        run_color = color;
                        run_len = 1;
                    }
                }
                result += history.terminate_and_count(run_color, run_len) * PENALTY_N3;
            }
        }

        // 2x2 blocks of one colour.
        for y in 0..size - 1 {
            for x in 0..size - 1 {
                let color = self.module(x, y);
                if color == self.module(x + 1, y)
                    && color == self.module(x, y + 1)
                    && color == self.module(x + 1, y + 1)
                {
                    result += PENALTY_N2;
                }
            }
        }

        // Dark/light balance, in 5% steps away from 50%.
        let dark = self.modules.iter().filter(|&&m| m).count() as i32;
        let total = size * size;
        let k = ((dark * 20 - total * 10).abs() + total - 1) / total - 1;
        result += k * PENALTY_N4;

        result
    }
}

/// Centre coordinates of alignment patterns, ascending.
fn alignment_pattern_positions(version: u8) -> Vec<i32> {
    if version == 1 {
        return Vec::new();
    }
    let v = i32::from(version);
    let num_align = v / 7 + 2;
    let step = (v * 8 + num_align * 3 + 5) / (num_align * 4 - 4) * 2;
    let size = symbol_size(version) as i32;
    let mut positions: Vec<i32> = (0..num_align - 1).map(|i| size - 7 - i * step).collect();
    positions.push(6);
    positions.reverse();
    positions
}

fn bit(value: u32, i: i32) -> bool {
    (value >> i) & 1 != 0
}

/// Rolling window of the last seven run lengths, used to spot 1:1:3:1:1
/// finder-like patterns with light borders.
struct FinderPenalty {
    size: i32,
    history: [i32; 7],
}

impl FinderPenalty {
    fn new(size: i32) -> Self {
        Self {
            size,
            history: [0; 7],
        }
    }

    fn count_patterns(&self) -> i32 {
        let h = &self.history;
        let n = h[1];
        let core = n > 0 && h[2] == n && h[3] == n * 3 && h[4] == n && h[5] == n;
        i32::from(core && h[0] >= n * 4 && h[6] >= n) + i32::from(core && h[6] >= n * 4 && h[0] >= n)
    }

    fn terminate_and_count(mut self, run_color: bool, mut run_len: i32) -> i32 {
        if run_color {
            self.add_history(run_len);
            run_len = 0;
        }
        // Treat the quiet zone past the edge as light.
        run_len += self.size;
        self.add_history(run_len);
        self.count_patterns()
    }

    fn add_history(&mut self, mut run_len: i32) {
        if self.history[0] == 0 {
            run_len += self.size;
        }
        self.history.copy_within(0..6, 1);
        self.history[0] = run_len;
    }
}
