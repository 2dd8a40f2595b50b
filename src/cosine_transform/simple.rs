use std::f32::consts::{FRAC_1_SQRT_2, PI};

use super::Discrete8x8CosineTransformer;

const SQUARE_SIZE: usize = 8;
const NUMBER_OF_VALUES: usize = SQUARE_SIZE * SQUARE_SIZE;

fn cosine_argument(position: usize, frequency: usize) -> f32 {
    ((2 * position + 1) as f32 * frequency as f32 * PI) / (2 * SQUARE_SIZE) as f32
}

fn factor_c(frequency: usize) -> f32 {
    if frequency == 0 {
        FRAC_1_SQRT_2
    } else {
        1.0
    }
}

/// Direct evaluation of the orthonormal 2D DCT-II. Slow; used to check
/// the scaling of the fast transform.
pub struct SimpleDiscrete8x8CosineTransformer;

impl SimpleDiscrete8x8CosineTransformer {
    fn coefficient(u: usize, v: usize, values: &[f32; NUMBER_OF_VALUES]) -> f32 {
        let sum: f32 = values
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                let x = index % SQUARE_SIZE;
                let y = index / SQUARE_SIZE;
                value * cosine_argument(x, u).cos() * cosine_argument(y, v).cos()
            })
            .sum();
        0.25 * factor_c(u) * factor_c(v) * sum
    }
}

impl Discrete8x8CosineTransformer for SimpleDiscrete8x8CosineTransformer {
    fn transform(values: &[f32; NUMBER_OF_VALUES]) -> [f32; NUMBER_OF_VALUES] {
        let mut output = [0_f32; NUMBER_OF_VALUES];
        for (index, coefficient) in output.iter_mut().enumerate() {
            *coefficient =
                Self::coefficient(index % SQUARE_SIZE, index / SQUARE_SIZE, values);
        }
        output
    }
}
