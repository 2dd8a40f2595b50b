use super::quantizer::QuantizedCoefficients;
use crate::cosine_transform::inverse::FixedPointInverseTransformer;
use crate::image::blocks::DataUnit;
use crate::quantization::{QuantizationTable, BLOCK_SIZE, ZIG_ZAG_ORDERED_BLOCK_INDEXES};

/// Decodes the block the way a baseline decoder would (dequantize, integer
/// inverse DCT) and returns the sum of absolute differences to the source,
/// not a squared error.
pub fn reconstruction_error(
    coefficients: &QuantizedCoefficients,
    table: &QuantizationTable,
    original: &DataUnit,
) -> u64 {
    let mut dequantized = [0_i32; BLOCK_SIZE];
    for (&value, &index) in coefficients
        .values()
        .iter()
        .zip(ZIG_ZAG_ORDERED_BLOCK_INDEXES.iter())
    {
        dequantized[index] = value as i32 * table.entry(index) as i32;
    }
    let reconstructed = FixedPointInverseTransformer::transform(&dequantized);
    reconstructed
        .iter()
        .zip(original.samples())
        .map(|(&sample, &source)| (sample as i32 - (source + 128.0) as i32).unsigned_abs() as u64)
        .sum()
}

#[cfg(test)]
mod test {
    use super::reconstruction_error;
    use crate::evaluation::quantizer::{quantize, QuantizedCoefficients};
    use crate::image::blocks::DataUnit;
    use crate::quantization::{ProcessedQuantTable, QuantizationTable};

    #[test]
    fn exact_reconstruction_has_no_error() {
        let mut values = [0_i16; 64];
        values[0] = -80;
        let unit = DataUnit::new([-10.0; 64]);
        let error = reconstruction_error(
            &QuantizedCoefficients::new(values),
            &QuantizationTable::baseline(),
            &unit,
        );
        assert_eq!(error, 0);
    }

    #[test]
    fn error_is_sum_of_absolute_differences() {
        // every sample reconstructs to 128 while the source is 128 + 3
        let unit = DataUnit::new([3.0; 64]);
        let error = reconstruction_error(
            &QuantizedCoefficients::new([0; 64]),
            &QuantizationTable::baseline(),
            &unit,
        );
        assert_eq!(error, 3 * 64);
    }

    #[test]
    fn table_entries_dequantize() {
        let table = QuantizationTable::new([10; 64]).unwrap();
        let unit = DataUnit::new([-50.0; 64]);
        let coefficients = quantize(&unit, &ProcessedQuantTable::from(&table));
        assert_eq!(coefficients.dc(), -40);
        assert_eq!(reconstruction_error(&coefficients, &table, &unit), 0);
    }
}
