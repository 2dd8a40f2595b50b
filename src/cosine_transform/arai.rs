use super::Discrete8x8CosineTransformer;

/// Scaled Arai-Agui-Nakajima DCT (Pennebaker & Mitchell, figure 4-8).
///
/// Outputs are left multiplied by `8 * s[u] * s[v]` with `s` the AAN scale
/// factors; [`crate::quantization::ProcessedQuantTable`] removes that
/// factor together with the quantizer divide.
pub struct AraiDiscrete8x8CosineTransformer;

type Row = [f32; 8];

impl AraiDiscrete8x8CosineTransformer {
    const A1: f32 = 0.707_106_781;
    const A2: f32 = 0.382_683_433;
    const A3: f32 = 0.541_196_100;
    const A4: f32 = 1.306_562_965;

    fn fast_arai(d: &mut Row) {
        let tmp0 = d[0] + d[7];
        let tmp7 = d[0] - d[7];
        let tmp1 = d[1] + d[6];
        let tmp6 = d[1] - d[6];
        let tmp2 = d[2] + d[5];
        let tmp5 = d[2] - d[5];
        let tmp3 = d[3] + d[4];
        let tmp4 = d[3] - d[4];

        // even part
        let tmp10 = tmp0 + tmp3;
        let tmp13 = tmp0 - tmp3;
        let tmp11 = tmp1 + tmp2;
        let tmp12 = tmp1 - tmp2;

        d[0] = tmp10 + tmp11;
        d[4] = tmp10 - tmp11;

        let z1 = (tmp12 + tmp13) * Self::A1;
        d[2] = tmp13 + z1;
        d[6] = tmp13 - z1;

        // odd part
        let tmp10 = tmp4 + tmp5;
        let tmp11 = tmp5 + tmp6;
        let tmp12 = tmp6 + tmp7;

        let z5 = (tmp10 - tmp12) * Self::A2;
        let z2 = Self::A3 * tmp10 + z5;
        let z4 = Self::A4 * tmp12 + z5;
        let z3 = tmp11 * Self::A1;

        let z11 = tmp7 + z3;
        let z13 = tmp7 - z3;

        d[5] = z13 + z2;
        d[3] = z13 - z2;
        d[1] = z11 + z4;
        d[7] = z11 - z4;
    }
}

impl Discrete8x8CosineTransformer for AraiDiscrete8x8CosineTransformer {
    fn transform(values: &[f32; 64]) -> [f32; 64] {
        let mut output = *values;
        for row in output.chunks_exact_mut(8) {
            let mut group: Row = [0.0; 8];
            group.copy_from_slice(row);
            Self::fast_arai(&mut group);
            row.copy_from_slice(&group);
        }
        for column in 0..8 {
            let mut group: Row = [0.0; 8];
            (0..8).for_each(|row| group[row] = output[row * 8 + column]);
            Self::fast_arai(&mut group);
            (0..8).for_each(|row| output[row * 8 + column] = group[row]);
        }
        output
    }
}

#[cfg(test)]
mod test {
    use super::super::simple::SimpleDiscrete8x8CosineTransformer;
    use super::super::Discrete8x8CosineTransformer;
    use super::AraiDiscrete8x8CosineTransformer;
    use crate::quantization::AAN_SCALE_FACTORS;

    fn test_block() -> [f32; 64] {
        let mut block = [0_f32; 64];
        for (index, value) in block.iter_mut().enumerate() {
            let x = (index % 8) as f32;
            let y = (index / 8) as f32;
            *value = ((x * 37.0 + y * 91.0 + x * y * 13.0) % 255.0) - 128.0;
        }
        block
    }

    fn assert_eq_with_deviation(actual: f32, expected: f32, deviation: f32, index: usize) {
        assert!(
            (actual - expected).abs() <= deviation,
            "Value {} at index {} differs from {} by more than {}",
            actual,
            index,
            expected,
            deviation
        );
    }

    #[test]
    fn constant_block_has_only_dc() {
        let output = AraiDiscrete8x8CosineTransformer::transform(&[10.0; 64]);
        assert_eq_with_deviation(output[0], 640.0, 1e-3, 0);
        for (index, &value) in output.iter().enumerate().skip(1) {
            assert_eq_with_deviation(value, 0.0, 1e-3, index);
        }
    }

    #[test]
    fn unscaled_output_matches_reference_transform() {
        let block = test_block();
        let fast = AraiDiscrete8x8CosineTransformer::transform(&block);
        let reference = SimpleDiscrete8x8CosineTransformer::transform(&block);
        for index in 0..64 {
            let u = index % 8;
            let v = index / 8;
            let unscaled = fast[index] / (8.0 * AAN_SCALE_FACTORS[u] * AAN_SCALE_FACTORS[v]);
            assert_eq_with_deviation(unscaled, reference[index], 5e-2, index);
        }
    }
}
