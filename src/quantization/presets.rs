use clap::{builder::PossibleValue, ValueEnum};

use super::QuantizationTable;

// JPEG Annex K
#[rustfmt::skip]
pub const SPECIFICATION_LUMINANCE_QUANTIZATION_TABLE: [u8; 64] = [
    16,  11,  10,  16,  24,  40,  51,  61,
    12,  12,  14,  19,  26,  58,  60,  55,
    14,  13,  16,  24,  40,  57,  69,  56,
    14,  17,  22,  29,  51,  87,  80,  62,
    18,  22,  37,  56,  68, 109, 103,  77,
    24,  35,  55,  64,  81, 104, 113,  92,
    49,  64,  78,  87, 103, 121, 120, 101,
    72,  92,  95,  98, 112, 100, 103,  99,
];

pub const FLAT_LUMINANCE_QUANTIZATION_TABLE: [u8; 64] = [16; 64];

// Tuned for MSSIM on the Kodak image set
#[rustfmt::skip]
pub const MSSIM_KODAK_TUNED_LUMINANCE_QUANTIZATION_TABLE: [u8; 64] = [
    12,  17,  20,  21,  30,  34,  56,  63,
    18,  20,  20,  26,  28,  51,  61,  55,
    19,  20,  21,  26,  33,  58,  69,  55,
    26,  26,  26,  30,  46,  87,  86,  66,
    31,  33,  36,  40,  46,  96, 100,  73,
    40,  35,  46,  62,  81, 100, 111,  91,
    46,  66,  76,  86, 102, 121, 120, 101,
    68,  90,  90,  96, 113, 102, 105, 103,
];

// Tuned for PSNR-HVS-M on the Kodak image set
#[rustfmt::skip]
pub const PSNRHVSNI_KODAK_TUNED_LUMINANCE_QUANTIZATION_TABLE: [u8; 64] = [
     9,  10,  12,  14,  27,  32,  51,  62,
    11,  12,  14,  19,  27,  44,  59,  73,
    12,  14,  18,  25,  42,  59,  79,  78,
    17,  18,  25,  42,  61,  92,  87,  92,
    23,  28,  42,  75,  79, 112, 112,  99,
    40,  42,  59,  84,  88, 124, 132, 111,
    42,  64,  78,  95, 105, 126, 125,  99,
    70,  75, 100, 102, 116, 100, 107,  98,
];

// DCTune Perceptual Optimization of Compressed Dental X-Rays (1997) Watson, Taylor, Borthwick
#[rustfmt::skip]
pub const DC_TUNE_PERCEPTUAL_OPTIMIZATION_LUMINANCE_QUANTIZATION_TABLE: [u8; 64] = [
      7,   8,  10,  14,  23,  44,  95, 241,
      8,   8,  11,  15,  25,  47, 102, 255,
     10,  11,  13,  19,  31,  58, 127, 255,
     14,  15,  19,  27,  44,  83, 181, 255,
     23,  25,  31,  44,  72, 136, 255, 255,
     44,  47,  58,  83, 136, 255, 255, 255,
     95, 102, 127, 181, 255, 255, 255, 255,
    241, 255, 255, 255, 255, 255, 255, 255,
];

// An Improved Detection Model for DCT Coefficient Quantization (1993) Peterson, Ahumada and Watson
#[rustfmt::skip]
pub const AN_IMPROVED_DETECTION_MODEL_LUMINANCE_QUANTIZATION_TABLE: [u8; 64] = [
    14,  10,  11,  14,  19,  25,  34,  45,
    10,  11,  11,  12,  15,  20,  26,  33,
    11,  11,  15,  18,  21,  25,  31,  38,
    14,  12,  18,  24,  28,  33,  39,  47,
    19,  15,  21,  28,  36,  43,  51,  59,
    25,  20,  25,  33,  43,  54,  64,  74,
    34,  26,  31,  39,  51,  64,  77,  91,
    45,  33,  38,  47,  59,  74,  91, 108,
];

/// Published luma tables that may be planted into the first generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuantizationTablePreset {
    Specification,
    Flat,
    MSSIMKodakTuned,
    PSNRHVSNKodakTuned,
    DCTunePerceptualOptimization,
    AnImprovedDetectionModel,
}

impl ValueEnum for QuantizationTablePreset {
    fn value_variants<'a>() -> &'a [Self] {
        &[
            Self::Specification,
            Self::Flat,
            Self::MSSIMKodakTuned,
            Self::PSNRHVSNKodakTuned,
            Self::DCTunePerceptualOptimization,
            Self::AnImprovedDetectionModel,
        ]
    }

    fn to_possible_value(&self) -> Option<PossibleValue> {
        let return_value = match self {
            Self::Specification => {
                PossibleValue::new("Specification").aliases(["Spec", "Default", "0"])
            }
            Self::Flat => PossibleValue::new("Flat").alias("1"),
            Self::MSSIMKodakTuned => PossibleValue::new("MSSIM-Kodak-Tuned").alias("2"),
            Self::PSNRHVSNKodakTuned => PossibleValue::new("PSNR-HVS-N-Kodak-Tuned").alias("3"),
            Self::DCTunePerceptualOptimization => {
                PossibleValue::new("DCTune-Perceptual-Optimization").alias("4")
            }
            Self::AnImprovedDetectionModel => {
                PossibleValue::new("An-improved-detection-model").alias("5")
            }
        };
        Some(return_value)
    }
}

impl QuantizationTablePreset {
    fn entries(self) -> &'static [u8; 64] {
        match self {
            Self::Specification => &SPECIFICATION_LUMINANCE_QUANTIZATION_TABLE,
            Self::Flat => &FLAT_LUMINANCE_QUANTIZATION_TABLE,
            Self::MSSIMKodakTuned => &MSSIM_KODAK_TUNED_LUMINANCE_QUANTIZATION_TABLE,
            Self::PSNRHVSNKodakTuned => &PSNRHVSNI_KODAK_TUNED_LUMINANCE_QUANTIZATION_TABLE,
            Self::DCTunePerceptualOptimization => {
                &DC_TUNE_PERCEPTUAL_OPTIMIZATION_LUMINANCE_QUANTIZATION_TABLE
            }
            Self::AnImprovedDetectionModel => {
                &AN_IMPROVED_DETECTION_MODEL_LUMINANCE_QUANTIZATION_TABLE
            }
        }
    }

    pub fn table(self) -> QuantizationTable {
        // presets are compile-time constants without zero entries
        QuantizationTable::new(*self.entries())
            .unwrap_or_else(|_| panic!("Preset {:?} contains a zero entry", self))
    }
}

#[cfg(test)]
mod test {
    use clap::ValueEnum;

    use super::QuantizationTablePreset;

    #[test]
    fn every_preset_is_a_valid_table() {
        for preset in QuantizationTablePreset::value_variants() {
            let table = preset.table();
            assert!(table.entries().iter().all(|&entry| entry >= 1));
        }
    }

    #[test]
    fn parse_preset_alias() {
        let preset = QuantizationTablePreset::from_str("Spec", true).unwrap();
        assert_eq!(preset, QuantizationTablePreset::Specification);
        assert_eq!(preset.table().entry(0), 16);
    }
}
