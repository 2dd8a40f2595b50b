use std::sync::OnceLock;

pub mod categorize;
pub mod specification;

use specification::{HuffmanSpecification, CHROMA_AC, CHROMA_DC, LUMA_AC, LUMA_DC};

pub const END_OF_BLOCK: u8 = 0x00;
pub const ZERO_RUN_LENGTH: u8 = 0xF0;

const MAX_SYMBOLS: usize = 256;

/// A right-aligned code of `length` bits. `length == 0` marks a symbol the
/// table does not contain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodeWord {
    pub code: u16,
    pub length: u8,
}

/// Symbol-indexed lookup of canonical code words.
#[derive(Clone, Debug)]
pub struct HuffmanTable {
    code_words: [CodeWord; MAX_SYMBOLS],
}

impl HuffmanTable {
    /// Derives the canonical code (JPEG Annex C.2) of a specification.
    ///
    /// Panics if the specification declares more than 256 symbols; the
    /// built-in tables never do.
    pub fn build(specification: &HuffmanSpecification) -> Self {
        let sizes = Self::expand_code_sizes(&specification.lengths);
        let codes = Self::generate_codes(&sizes);
        let mut code_words = [CodeWord::default(); MAX_SYMBOLS];
        for ((&symbol, &length), &code) in specification.values.iter().zip(&sizes).zip(&codes) {
            code_words[symbol as usize] = CodeWord { code, length };
        }
        HuffmanTable { code_words }
    }

    /// One entry per symbol holding its code length, followed by a 0 sentinel.
    fn expand_code_sizes(lengths: &[u8; 16]) -> Vec<u8> {
        let mut sizes: Vec<u8> = lengths
            .iter()
            .enumerate()
            .flat_map(|(index, &count)| std::iter::repeat(index as u8 + 1).take(count as usize))
            .collect();
        assert!(
            sizes.len() <= MAX_SYMBOLS,
            "Huffman specification declares {} symbols, at most {} are possible",
            sizes.len(),
            MAX_SYMBOLS
        );
        sizes.push(0);
        sizes
    }

    fn generate_codes(sizes: &[u8]) -> Vec<u16> {
        let mut codes = Vec::with_capacity(sizes.len());
        // u32 because the shift after the last 16 bit code leaves u16 range
        let mut code: u32 = 0;
        let mut current_size = sizes[0];
        let mut k = 0;
        while sizes[k] != 0 {
            while sizes[k] == current_size {
                codes.push(code as u16);
                code += 1;
                k += 1;
            }
            code <<= 1;
            current_size += 1;
        }
        codes
    }

    pub fn code_word(&self, symbol: u8) -> CodeWord {
        self.code_words[symbol as usize]
    }

    pub fn code_length(&self, symbol: u8) -> u8 {
        self.code_words[symbol as usize].length
    }
}

/// The four Annex K tables, derived once per process.
#[derive(Debug)]
pub struct HuffmanSpec {
    pub luma_dc: HuffmanTable,
    pub luma_ac: HuffmanTable,
    pub chroma_dc: HuffmanTable,
    pub chroma_ac: HuffmanTable,
}

impl HuffmanSpec {
    pub fn standard() -> &'static HuffmanSpec {
        static STANDARD: OnceLock<HuffmanSpec> = OnceLock::new();
        STANDARD.get_or_init(|| {
            log::debug!("Deriving Huffman tables from Annex K specification");
            HuffmanSpec {
                luma_dc: HuffmanTable::build(&LUMA_DC),
                luma_ac: HuffmanTable::build(&LUMA_AC),
                chroma_dc: HuffmanTable::build(&CHROMA_DC),
                chroma_ac: HuffmanTable::build(&CHROMA_AC),
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::specification::HuffmanSpecification;
    use super::{CodeWord, HuffmanSpec, HuffmanTable, END_OF_BLOCK, ZERO_RUN_LENGTH};

    #[test]
    fn luma_dc_codes() {
        let table = &HuffmanSpec::standard().luma_dc;
        assert_eq!(table.code_word(0), CodeWord { code: 0b00, length: 2 });
        assert_eq!(table.code_word(1), CodeWord { code: 0b010, length: 3 });
        assert_eq!(table.code_word(5), CodeWord { code: 0b110, length: 3 });
        assert_eq!(table.code_word(6), CodeWord { code: 0b1110, length: 4 });
        assert_eq!(
            table.code_word(11),
            CodeWord {
                code: 0b1_1111_1110,
                length: 9
            }
        );
    }

    #[test]
    fn luma_ac_special_symbols() {
        let table = &HuffmanSpec::standard().luma_ac;
        assert_eq!(table.code_word(END_OF_BLOCK), CodeWord { code: 0b1010, length: 4 });
        assert_eq!(
            table.code_word(ZERO_RUN_LENGTH),
            CodeWord {
                code: 0b111_1111_1001,
                length: 11
            }
        );
        assert_eq!(table.code_word(0x01), CodeWord { code: 0b00, length: 2 });
        assert_eq!(
            table.code_word(0xFA),
            CodeWord {
                code: 0xFFFE,
                length: 16
            }
        );
    }

    #[test]
    fn chroma_ac_special_symbols() {
        let table = &HuffmanSpec::standard().chroma_ac;
        assert_eq!(table.code_length(END_OF_BLOCK), 2);
        assert_eq!(table.code_length(ZERO_RUN_LENGTH), 10);
    }

    #[test]
    fn symbols_outside_table_have_no_code() {
        let table = &HuffmanSpec::standard().luma_dc;
        assert_eq!(table.code_length(12), 0);
        // category 11 with a run of 0 is not an AC symbol
        assert_eq!(HuffmanSpec::standard().luma_ac.code_length(0x0B), 0);
    }

    #[test]
    fn codes_are_prefix_free() {
        let table = &HuffmanSpec::standard().luma_ac;
        let words: Vec<CodeWord> = (0..=255u8)
            .map(|symbol| table.code_word(symbol))
            .filter(|word| word.length > 0)
            .collect();
        for a in &words {
            for b in &words {
                if a == b || a.length > b.length {
                    continue;
                }
                let prefix = b.code >> (b.length - a.length);
                assert!(
                    prefix != a.code || a.length == b.length,
                    "{:?} is a prefix of {:?}",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    #[should_panic]
    fn too_many_symbols() {
        static VALUES: [u8; 0] = [];
        HuffmanTable::build(&HuffmanSpecification {
            lengths: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 255],
            values: &VALUES,
        });
    }
}
