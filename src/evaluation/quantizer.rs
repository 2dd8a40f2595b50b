use crate::cosine_transform::{arai::AraiDiscrete8x8CosineTransformer, Discrete8x8CosineTransformer};
use crate::image::blocks::DataUnit;
use crate::quantization::{ProcessedQuantTable, BLOCK_SIZE, ZIG_ZAG_ORDERED_BLOCK_INDEXES};

/// Quantized coefficients in zig-zag order; index 0 is DC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantizedCoefficients([i16; BLOCK_SIZE]);

impl QuantizedCoefficients {
    pub fn new(values: [i16; BLOCK_SIZE]) -> Self {
        QuantizedCoefficients(values)
    }

    pub fn values(&self) -> &[i16; BLOCK_SIZE] {
        &self.0
    }

    pub fn dc(&self) -> i16 {
        self.0[0]
    }

    /// Zig-zag position of the last non-zero AC coefficient, 0 if there is none.
    pub fn last_non_zero_ac(&self) -> usize {
        (1..BLOCK_SIZE).rev().find(|&i| self.0[i] != 0).unwrap_or(0)
    }
}

/// Rounds half up by flooring with a bias that keeps the argument
/// positive; transform outputs stay within [-1024, 1024).
fn round_half_up(value: f32) -> i16 {
    ((value + 1024.0 + 0.5).floor() - 1024.0) as i16
}

pub fn quantize(unit: &DataUnit, processed: &ProcessedQuantTable) -> QuantizedCoefficients {
    let transformed = AraiDiscrete8x8CosineTransformer::transform(unit.samples());
    let mut values = [0_i16; BLOCK_SIZE];
    for (value, &index) in values.iter_mut().zip(ZIG_ZAG_ORDERED_BLOCK_INDEXES.iter()) {
        *value = round_half_up(transformed[index] * processed.scale(index));
    }
    QuantizedCoefficients(values)
}
