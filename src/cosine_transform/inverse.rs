/// Separable integer inverse DCT with 12 fractional bits, the "islow"
/// variant used by common baseline decoders.
///
/// Input is 64 dequantized coefficients in natural order, output is 64
/// samples with the +128 level shift already applied and clamped to 0..=255.
pub struct FixedPointInverseTransformer;

const FIX_0_298631336: i32 = 1223;
const FIX_0_390180644: i32 = 1597;
const FIX_0_541196100: i32 = 2217;
const FIX_0_765366865: i32 = 3135;
const FIX_0_899976223: i32 = 3685;
const FIX_1_175875602: i32 = 4816;
const FIX_1_501321110: i32 = 6149;
const FIX_1_847759065: i32 = 7567;
const FIX_1_961570560: i32 = 8034;
const FIX_2_053119869: i32 = 8410;
const FIX_2_562915447: i32 = 10497;
const FIX_3_072711026: i32 = 12586;

const FRACTION_BITS: u32 = 12;
const COLUMN_PASS_SHIFT: u32 = 10;
const ROW_PASS_SHIFT: u32 = 17;
const COLUMN_PASS_ROUNDING: i32 = 1 << (COLUMN_PASS_SHIFT - 1);
const ROW_PASS_ROUNDING_AND_LEVEL_SHIFT: i32 = (1 << (ROW_PASS_SHIFT - 1)) + (128 << ROW_PASS_SHIFT);

/// Even part `x` and odd part `t` of one 1D pass.
struct Butterfly {
    x: [i32; 4],
    t: [i32; 4],
}

impl Butterfly {
    fn new(s: [i32; 8]) -> Self {
        let p1 = (s[2] + s[6]) * FIX_0_541196100;
        let t2 = p1 - s[6] * FIX_1_847759065;
        let t3 = p1 + s[2] * FIX_0_765366865;
        let t0 = (s[0] + s[4]) << FRACTION_BITS;
        let t1 = (s[0] - s[4]) << FRACTION_BITS;
        let x = [t0 + t3, t1 + t2, t1 - t2, t0 - t3];

        let (mut t0, mut t1, mut t2, mut t3) = (s[7], s[5], s[3], s[1]);
        let p3 = t0 + t2;
        let p4 = t1 + t3;
        let p1 = t0 + t3;
        let p2 = t1 + t2;
        let p5 = (p3 + p4) * FIX_1_175875602;
        t0 *= FIX_0_298631336;
        t1 *= FIX_2_053119869;
        t2 *= FIX_3_072711026;
        t3 *= FIX_1_501321110;
        let p1 = p5 - p1 * FIX_0_899976223;
        let p2 = p5 - p2 * FIX_2_562915447;
        let p3 = -p3 * FIX_1_961570560;
        let p4 = -p4 * FIX_0_390180644;
        t3 += p1 + p4;
        t2 += p2 + p3;
        t1 += p2 + p4;
        t0 += p1 + p3;

        Butterfly {
            x,
            t: [t0, t1, t2, t3],
        }
    }

    fn biased(mut self, bias: i32) -> Self {
        self.x.iter_mut().for_each(|x| *x += bias);
        self
    }

    /// Outputs in spatial order 0..8, arithmetically shifted right.
    fn outputs(&self, shift: u32) -> [i32; 8] {
        let [x0, x1, x2, x3] = self.x;
        let [t0, t1, t2, t3] = self.t;
        [
            (x0 + t3) >> shift,
            (x1 + t2) >> shift,
            (x2 + t1) >> shift,
            (x3 + t0) >> shift,
            (x3 - t0) >> shift,
            (x2 - t1) >> shift,
            (x1 - t2) >> shift,
            (x0 - t3) >> shift,
        ]
    }
}

fn clamp_to_sample(value: i32) -> u8 {
    value.clamp(0, u8::MAX as i32) as u8
}

impl FixedPointInverseTransformer {
    pub fn transform(coefficients: &[i32; 64]) -> [u8; 64] {
        let mut intermediate = [0_i32; 64];
        for column in 0..8 {
            let mut s = [0_i32; 8];
            (0..8).for_each(|row| s[row] = coefficients[row * 8 + column]);
            let values = if s[1..].iter().all(|&value| value == 0) {
                // a column without AC terms is flat; keep the 2 extra precision bits
                [s[0] << 2; 8]
            } else {
                Butterfly::new(s)
                    .biased(COLUMN_PASS_ROUNDING)
                    .outputs(COLUMN_PASS_SHIFT)
            };
            (0..8).for_each(|row| intermediate[row * 8 + column] = values[row]);
        }

        let mut samples = [0_u8; 64];
        for (row, output) in intermediate
            .chunks_exact(8)
            .zip(samples.chunks_exact_mut(8))
        {
            let mut s = [0_i32; 8];
            s.copy_from_slice(row);
            let values = Butterfly::new(s)
                .biased(ROW_PASS_ROUNDING_AND_LEVEL_SHIFT)
                .outputs(ROW_PASS_SHIFT);
            for (sample, value) in output.iter_mut().zip(values) {
                *sample = clamp_to_sample(value);
            }
        }
        samples
    }
}

#[cfg(test)]
mod test {
    use super::FixedPointInverseTransformer;
    use crate::cosine_transform::{simple::SimpleDiscrete8x8CosineTransformer, Discrete8x8CosineTransformer};

    #[test]
    fn zero_coefficients_decode_to_mid_gray() {
        let samples = FixedPointInverseTransformer::transform(&[0; 64]);
        assert!(samples.iter().all(|&sample| sample == 128));
    }

    #[test]
    fn dc_only_block_is_flat() {
        let mut coefficients = [0; 64];
        coefficients[0] = 8;
        let samples = FixedPointInverseTransformer::transform(&coefficients);
        assert!(samples.iter().all(|&sample| sample == 129), "{:?}", samples);
    }

    #[test]
    fn extreme_dc_is_clamped() {
        let mut coefficients = [0; 64];
        coefficients[0] = 2000;
        let samples = FixedPointInverseTransformer::transform(&coefficients);
        assert!(samples.iter().all(|&sample| sample == 255));
        coefficients[0] = -2000;
        let samples = FixedPointInverseTransformer::transform(&coefficients);
        assert!(samples.iter().all(|&sample| sample == 0));
    }

    #[test]
    fn inverts_reference_transform() {
        let mut block = [0_f32; 64];
        for (index, value) in block.iter_mut().enumerate() {
            *value = (((index * 53 + 17) % 200) as f32) - 100.0;
        }
        let frequencies = SimpleDiscrete8x8CosineTransformer::transform(&block);
        let mut coefficients = [0_i32; 64];
        for (coefficient, frequency) in coefficients.iter_mut().zip(frequencies) {
            *coefficient = frequency.round() as i32;
        }
        let samples = FixedPointInverseTransformer::transform(&coefficients);
        for (index, (&sample, &original)) in samples.iter().zip(block.iter()).enumerate() {
            let expected = original as i32 + 128;
            assert!(
                (sample as i32 - expected).abs() <= 2,
                "sample {} at index {} too far from {}",
                sample,
                index,
                expected
            );
        }
    }
}
