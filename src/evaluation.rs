//! The dummy encoder: everything a baseline JPEG encoder does to one luma
//! block except writing bits, plus the decode needed to measure the damage.

use crate::huffman::HuffmanTable;
use crate::image::blocks::DataUnit;
use crate::quantization::{ProcessedQuantTable, QuantizationTable};

pub mod batch;
pub mod device;
pub mod entropy;
pub mod quantizer;
pub mod reconstruction;
pub mod reduce;
pub mod worker_pool;

/// A table under evaluation together with its derived multipliers. Built
/// once per candidate and shared read-only by every block of the dispatch.
#[derive(Clone, Debug)]
pub struct CandidateTable {
    table: QuantizationTable,
    processed: ProcessedQuantTable,
}

impl CandidateTable {
    pub fn table(&self) -> &QuantizationTable {
        &self.table
    }

    pub fn processed(&self) -> &ProcessedQuantTable {
        &self.processed
    }
}

impl From<&QuantizationTable> for CandidateTable {
    fn from(table: &QuantizationTable) -> Self {
        CandidateTable {
            table: *table,
            processed: ProcessedQuantTable::from(table),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockResult {
    pub bits: u32,
    /// Sum of absolute sample differences.
    pub error: u64,
}

/// Totals over all blocks of an image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EvaluationResult {
    pub bits: u64,
    pub error: u64,
}

impl EvaluationResult {
    /// Whole bytes of entropy-coded output.
    pub fn bytes(&self) -> u64 {
        self.bits / 8
    }
}

pub fn evaluate_block(
    unit: &DataUnit,
    candidate: &CandidateTable,
    ac_table: &HuffmanTable,
) -> BlockResult {
    let coefficients = quantizer::quantize(unit, candidate.processed());
    BlockResult {
        bits: entropy::estimate_bits(&coefficients, ac_table),
        error: reconstruction::reconstruction_error(&coefficients, candidate.table(), unit),
    }
}

#[cfg(test)]
mod test {
    use super::{evaluate_block, CandidateTable};
    use crate::huffman::{HuffmanSpec, END_OF_BLOCK};
    use crate::image::blocks::DataUnit;
    use crate::quantization::QuantizationTable;

    #[test]
    fn flat_block_costs_one_end_of_block() {
        let candidate = CandidateTable::from(&QuantizationTable::baseline());
        let luma_ac = &HuffmanSpec::standard().luma_ac;
        let result = evaluate_block(&DataUnit::new([0.0; 64]), &candidate, luma_ac);
        assert_eq!(result.bits, luma_ac.code_length(END_OF_BLOCK) as u32);
        assert_eq!(result.error, 0);
    }

    #[test]
    fn coarse_table_loses_detail() {
        let mut samples = [0_f32; 64];
        for (index, sample) in samples.iter_mut().enumerate() {
            *sample = if (index / 8 + index % 8) % 2 == 0 { 60.0 } else { -60.0 };
        }
        let unit = DataUnit::new(samples);
        let luma_ac = &HuffmanSpec::standard().luma_ac;
        let fine = evaluate_block(&unit, &CandidateTable::from(&QuantizationTable::baseline()), luma_ac);
        let coarse_table = QuantizationTable::new([255; 64]).unwrap();
        let coarse = evaluate_block(&unit, &CandidateTable::from(&coarse_table), luma_ac);
        assert!(coarse.bits < fine.bits);
        assert!(coarse.error > fine.error);
    }
}
