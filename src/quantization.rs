use crate::error::Error;
use crate::Result;

pub mod presets;

pub const BLOCK_SIZE: usize = 64;

/// Natural (row-major) index of the coefficient at each zig-zag position.
#[rustfmt::skip]
pub const ZIG_ZAG_ORDERED_BLOCK_INDEXES: [usize; BLOCK_SIZE] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
];

/// Arai-Agui-Nakajima column/row scale factors, `cos(k*pi/16) * sqrt(2)` for k > 0.
pub const AAN_SCALE_FACTORS: [f32; 8] = [
    1.0,
    1.387_039_845,
    1.306_562_965,
    1.175_875_602,
    1.0,
    0.785_694_958,
    0.541_196_100,
    0.275_899_379,
];

/// 64 divisors in natural order. Every entry is at least 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuantizationTable {
    entries: [u8; BLOCK_SIZE],
}

impl QuantizationTable {
    /// The all-ones table: lossless apart from rounding, largest output.
    pub const fn baseline() -> Self {
        Self {
            entries: [1; BLOCK_SIZE],
        }
    }

    pub fn new(entries: [u8; BLOCK_SIZE]) -> Result<Self> {
        match entries.iter().position(|&entry| entry == 0) {
            Some(index) => Err(Error::InvalidQuantizationTableEntry(index)),
            None => Ok(Self { entries }),
        }
    }

    pub fn entries(&self) -> &[u8; BLOCK_SIZE] {
        &self.entries
    }

    pub fn entry(&self, index: usize) -> u8 {
        self.entries[index]
    }

    pub fn iter_zig_zag(&self) -> impl Iterator<Item = u8> + '_ {
        ZIG_ZAG_ORDERED_BLOCK_INDEXES
            .iter()
            .map(|&index| self.entries[index])
    }
}

/// Per-coefficient multipliers that fold the AAN output scaling and the
/// quantizer divide into one product.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessedQuantTable {
    scales: [f32; BLOCK_SIZE],
}

impl ProcessedQuantTable {
    pub fn scale(&self, index: usize) -> f32 {
        self.scales[index]
    }
}

impl From<&QuantizationTable> for ProcessedQuantTable {
    fn from(table: &QuantizationTable) -> Self {
        let mut scales = [0_f32; BLOCK_SIZE];
        for y in 0..8 {
            for x in 0..8 {
                let index = y * 8 + x;
                scales[index] = 1.0
                    / (8.0
                        * AAN_SCALE_FACTORS[x]
                        * AAN_SCALE_FACTORS[y]
                        * table.entries[index] as f32);
            }
        }
        ProcessedQuantTable { scales }
    }
}
