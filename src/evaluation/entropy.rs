use super::quantizer::QuantizedCoefficients;
use crate::huffman::categorize::{run_length_symbol, CategoryEncodedInteger};
use crate::huffman::{HuffmanTable, END_OF_BLOCK, ZERO_RUN_LENGTH};

/// Largest category an AC symbol can carry in a baseline table.
const MAX_AC_CATEGORY: u8 = 10;

/// Bits a baseline encoder would spend on the AC coefficients of one block.
///
/// DC is left out on purpose: its delta coding would make every block
/// depend on its predecessor. Coefficients whose symbol the table cannot
/// express are skipped.
pub fn estimate_bits(coefficients: &QuantizedCoefficients, ac_table: &HuffmanTable) -> u32 {
    let values = coefficients.values();
    let last_non_zero = coefficients.last_non_zero_ac();
    let mut bits = 0_u32;
    let mut zeros_before = 0_u8;
    for &value in &values[1..=last_non_zero] {
        if value == 0 {
            zeros_before += 1;
            if zeros_before == 16 {
                bits += ac_table.code_length(ZERO_RUN_LENGTH) as u32;
                zeros_before = 0;
            }
            continue;
        }
        let category = CategoryEncodedInteger::category_of(value as i32);
        let run = zeros_before;
        zeros_before = 0;
        if category > MAX_AC_CATEGORY {
            log::trace!("Skipping coefficient {} outside of AC category range", value);
            continue;
        }
        let code_length = ac_table.code_length(run_length_symbol(run, category));
        if code_length == 0 {
            log::trace!("Skipping run {} category {} without code", run, category);
            continue;
        }
        bits += code_length as u32 + category as u32;
    }
    if last_non_zero != values.len() - 1 {
        bits += ac_table.code_length(END_OF_BLOCK) as u32;
    }
    bits
}
