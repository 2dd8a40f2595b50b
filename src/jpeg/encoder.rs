use std::fmt::Display;
use std::io;
use std::io::Write;

use super::segment_marker_injector::SegmentMarkerInjector;
use crate::binary_stream::BitWriter;
use crate::color::YCbCrColorFormat;
use crate::error::Error;
use crate::evaluation::quantizer::{quantize, QuantizedCoefficients};
use crate::huffman::categorize::{run_length_symbol, CategoryEncodedInteger};
use crate::huffman::specification::{HuffmanSpecification, CHROMA_AC, CHROMA_DC, LUMA_AC, LUMA_DC};
use crate::huffman::{HuffmanSpec, HuffmanTable, END_OF_BLOCK, ZERO_RUN_LENGTH};
use crate::image::blocks::{extract_blocks, DataUnit};
use crate::image::Image;
use crate::logger;
use crate::quantization::{ProcessedQuantTable, QuantizationTable};
use crate::Result;

const START_OF_FILE_MARKER: [u8; 2] = [0xFF, 0xD8];
const END_OF_FILE_MARKER: [u8; 2] = [0xFF, 0xD9];
const HUFFMAN_TABLE_MARKER: [u8; 2] = [0xFF, 0xC4];
const QUANTIZATION_TABLE_MARKER: [u8; 2] = [0xFF, 0xDB];
const START_OF_FRAME_MARKER: [u8; 2] = [0xFF, 0xC0];
const START_OF_SCAN_MARKER: [u8; 2] = [0xFF, 0xDA];
const JFIF_APPLICATION_MARKER: [u8; 2] = [0xFF, 0xE0];

/// Largest AC magnitude a baseline table can express (category 10).
const MAX_AC_MAGNITUDE: i32 = 1023;

enum ControlMarker {
    StartOfFile,
    EndOfFile,
}

enum SegmentMarker {
    HuffmanTable,
    QuantizationTable,
    JfifApplication,
    StartOfFrame,
    StartOfScan,
}

trait AsBinaryRef {
    fn as_binary_ref(&self) -> &'static [u8];
}

impl AsBinaryRef for ControlMarker {
    fn as_binary_ref(&self) -> &'static [u8] {
        match self {
            Self::StartOfFile => &START_OF_FILE_MARKER,
            Self::EndOfFile => &END_OF_FILE_MARKER,
        }
    }
}

impl AsBinaryRef for SegmentMarker {
    fn as_binary_ref(&self) -> &'static [u8] {
        match self {
            Self::HuffmanTable => &HUFFMAN_TABLE_MARKER,
            Self::QuantizationTable => &QUANTIZATION_TABLE_MARKER,
            Self::JfifApplication => &JFIF_APPLICATION_MARKER,
            Self::StartOfFrame => &START_OF_FRAME_MARKER,
            Self::StartOfScan => &START_OF_SCAN_MARKER,
        }
    }
}

impl Display for SegmentMarker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HuffmanTable => write!(f, "Huffman Table"),
            Self::QuantizationTable => write!(f, "Quantization Table"),
            Self::JfifApplication => write!(f, "Jfif Application"),
            Self::StartOfFrame => write!(f, "Start of Frame"),
            Self::StartOfScan => write!(f, "Start of Scan"),
        }
    }
}

#[derive(Copy, Clone)]
enum TableKind {
    LumaDC = 0b0000_0000,
    LumaAC = 0b0001_0000,
    ChromaDC = 0b0000_0001,
    ChromaAC = 0b0001_0001,
}

impl TableKind {
    fn value(&self) -> u8 {
        *self as u8
    }
}

/// Entropy tables and DC predictor of one scan component.
struct ComponentCoder<'t> {
    dc_table: &'t HuffmanTable,
    ac_table: &'t HuffmanTable,
    name: &'static str,
    previous_dc: i32,
}

impl<'t> ComponentCoder<'t> {
    fn new(dc_table: &'t HuffmanTable, ac_table: &'t HuffmanTable, name: &'static str) -> Self {
        ComponentCoder {
            dc_table,
            ac_table,
            name,
            previous_dc: 0,
        }
    }

    fn write_code<W: Write>(
        bit_writer: &mut BitWriter<'_, W>,
        table: &HuffmanTable,
        symbol: u8,
        name: &'static str,
    ) -> Result<()> {
        let code_word = table.code_word(symbol);
        if code_word.length == 0 {
            return Err(Error::HuffmanSymbolNotPresentInTable(symbol, name));
        }
        bit_writer
            .write_bits(code_word.code, code_word.length)
            .map_err(|_| Error::FailedToWriteImageData)
    }

    fn write_value<W: Write>(bit_writer: &mut BitWriter<'_, W>, value: &CategoryEncodedInteger) -> Result<()> {
        bit_writer
            .write_bits(value.pattern, value.category)
            .map_err(|_| Error::FailedToWriteImageData)
    }

    fn write_block<W: Write>(
        &mut self,
        bit_writer: &mut BitWriter<'_, W>,
        coefficients: &QuantizedCoefficients,
    ) -> Result<()> {
        let dc = coefficients.dc() as i32;
        let difference = CategoryEncodedInteger::from(dc - self.previous_dc);
        self.previous_dc = dc;
        Self::write_code(bit_writer, self.dc_table, difference.category, self.name)?;
        Self::write_value(bit_writer, &difference)?;

        let values = coefficients.values();
        let last_non_zero = coefficients.last_non_zero_ac();
        let mut zeros_before = 0_u8;
        for &value in &values[1..=last_non_zero] {
            if value == 0 {
                zeros_before += 1;
                continue;
            }
            while zeros_before >= 16 {
                Self::write_code(bit_writer, self.ac_table, ZERO_RUN_LENGTH, self.name)?;
                zeros_before -= 16;
            }
            let value = (value as i32).clamp(-MAX_AC_MAGNITUDE, MAX_AC_MAGNITUDE);
            let encoded = CategoryEncodedInteger::from(value);
            let symbol = run_length_symbol(zeros_before, encoded.category);
            Self::write_code(bit_writer, self.ac_table, symbol, self.name)?;
            Self::write_value(bit_writer, &encoded)?;
            zeros_before = 0;
        }
        if last_non_zero != values.len() - 1 {
            Self::write_code(bit_writer, self.ac_table, END_OF_BLOCK, self.name)?;
        }
        Ok(())
    }
}

pub struct Encoder<'a, T> {
    writer: &'a mut T,
    table: &'a QuantizationTable,
    image: &'a Image,
}

impl<'a, T: Write> Encoder<'a, T> {
    pub fn new(writer: &'a mut T, table: &'a QuantizationTable, image: &'a Image) -> Encoder<'a, T> {
        Encoder {
            writer,
            table,
            image,
        }
    }

    pub fn encode(&mut self) -> Result<()> {
        self.write_start_of_file()?;
        self.write_jfif_application_header()?;
        self.write_all_quantization_tables()?;
        self.write_start_of_frame()?;
        self.write_all_huffman_tables()?;
        self.write_start_of_scan()?;
        self.write_image_data()?;
        self.write_end_of_file()?;
        Ok(())
    }

    fn write_segment(&mut self, marker: SegmentMarker, content: &[u8]) -> io::Result<()> {
        log::debug!("Writing {}", marker);
        let marker_binary_ref = marker.as_binary_ref();
        // the length field counts itself
        let segment_len = 2 + content.len();
        if segment_len > u16::MAX as usize {
            panic!(
                "The length of the segment '{}' is greater than u16::MAX",
                marker
            );
        }
        let segment_length = (segment_len as u16).to_be_bytes();
        logger::log_segment(marker_binary_ref, content, &segment_length);
        self.writer.write_all(marker_binary_ref)?;
        self.writer.write_all(&segment_length)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    fn write_control_marker(&mut self, marker: ControlMarker) -> io::Result<()> {
        self.writer.write_all(marker.as_binary_ref())
    }

    fn write_start_of_file(&mut self) -> Result<()> {
        self.write_control_marker(ControlMarker::StartOfFile)
            .map_err(|_| Error::FailedToWriteStartOfFile)
    }

    fn write_end_of_file(&mut self) -> Result<()> {
        self.write_control_marker(ControlMarker::EndOfFile)
            .map_err(|_| Error::FailedToWriteEndOfFile)
    }

    fn write_jfif_application_header(&mut self) -> Result<()> {
        #[rustfmt::skip]
        let content = &[
            b'J', b'F', b'I', b'F', b'\0', // Identifier
            0x01, 0x02,             // Version
            0x00,                   // Density unit
            0x00, 0x48, 0x00, 0x48, // Density (72/0x48 common used value)
            0,                      // X Thumbnail
            0                       // Y Thumbnail
        ];
        self.write_segment(SegmentMarker::JfifApplication, content)
            .map_err(|_| Error::FailedToWriteJfifApplicationHeader)
    }

    fn write_all_quantization_tables(&mut self) -> Result<()> {
        self.write_quantization_table(0)?;
        self.write_quantization_table(1)
    }

    fn write_quantization_table(&mut self, number: u8) -> Result<()> {
        let mut content: Vec<u8> = Vec::with_capacity(65);
        // 8 bit precision in the high nibble
        content.push(number);
        content.extend(self.table.iter_zig_zag());
        self.write_segment(SegmentMarker::QuantizationTable, &content)
            .map_err(|_| Error::FailedToWriteQuantizationTable)
    }

    fn write_start_of_frame(&mut self) -> Result<()> {
        let width_bytes = self.image.width().to_be_bytes();
        let height_bytes = self.image.height().to_be_bytes();
        #[rustfmt::skip]
        let content = &[
            0x08,                             // bits per sample
            height_bytes[0], height_bytes[1], // image height
            width_bytes[0], width_bytes[1],   // image width
            0x03,                             // components
            0x01, 0x11, 0x00,                 // Y, 1x1 sampling, quantization table 0
            0x02, 0x11, 0x01,                 // Cb, 1x1 sampling, quantization table 1
            0x03, 0x11, 0x01,                 // Cr, 1x1 sampling, quantization table 1
        ];
        self.write_segment(SegmentMarker::StartOfFrame, content)
            .map_err(|_| Error::FailedToWriteStartOfFrame)
    }

    fn write_huffman_table(
        &mut self,
        table_kind: TableKind,
        specification: &HuffmanSpecification,
    ) -> Result<()> {
        let mut content: Vec<u8> = Vec::with_capacity(17 + specification.values.len());
        content.push(table_kind.value());
        content.extend_from_slice(&specification.lengths);
        content.extend_from_slice(specification.values);
        self.write_segment(SegmentMarker::HuffmanTable, &content)
            .map_err(|_| Error::FailedToWriteHuffmanTables)
    }

    fn write_all_huffman_tables(&mut self) -> Result<()> {
        self.write_huffman_table(TableKind::LumaDC, &LUMA_DC)?;
        self.write_huffman_table(TableKind::LumaAC, &LUMA_AC)?;
        self.write_huffman_table(TableKind::ChromaDC, &CHROMA_DC)?;
        self.write_huffman_table(TableKind::ChromaAC, &CHROMA_AC)
    }

    fn write_start_of_scan(&mut self) -> Result<()> {
        let data = [
            0x03, // number of components
            0x01,
            0b0000_0000, // Y: dc table 0, ac table 0
            0x02,
            0b0001_0001, // Cb: dc table 1, ac table 1
            0x03,
            0b0001_0001, // Cr: dc table 1, ac table 1
            0x00, // start of spectral selection
            0x3F, // end of spectral selection
            0x00, // successive approximation
        ];
        self.write_segment(SegmentMarker::StartOfScan, &data)
            .map_err(|_| Error::FailedToWriteStartOfScan)
    }

    fn component_blocks(&self) -> [Vec<DataUnit>; 3] {
        [
            extract_blocks(self.image, |pixel| YCbCrColorFormat::from(pixel).luma),
            extract_blocks(self.image, |pixel| YCbCrColorFormat::from(pixel).chroma_blue),
            extract_blocks(self.image, |pixel| YCbCrColorFormat::from(pixel).chroma_red),
        ]
    }

    fn write_image_data(&mut self) -> Result<()> {
        let processed = ProcessedQuantTable::from(self.table);
        let huffman = HuffmanSpec::standard();
        let mut coders = [
            ComponentCoder::new(&huffman.luma_dc, &huffman.luma_ac, "luma"),
            ComponentCoder::new(&huffman.chroma_dc, &huffman.chroma_ac, "chroma blue"),
            ComponentCoder::new(&huffman.chroma_dc, &huffman.chroma_ac, "chroma red"),
        ];
        let [luma, chroma_blue, chroma_red] = self.component_blocks();

        let mut buffer: Vec<u8> = Vec::new();
        let mut segment_marker_injector = SegmentMarkerInjector::new(&mut buffer);
        let mut bit_writer = BitWriter::new(&mut segment_marker_injector);
        // 4:4:4, so one minimum coded unit is one block per component
        for ((y, cb), cr) in luma.iter().zip(&chroma_blue).zip(&chroma_red) {
            for (coder, unit) in coders.iter_mut().zip([y, cb, cr]) {
                coder.write_block(&mut bit_writer, &quantize(unit, &processed))?;
            }
        }
        bit_writer
            .flush()
            .map_err(|_| Error::FailedToWriteImageData)?;
        log::debug!("{} bytes of entropy-coded data", buffer.len());
        self.writer
            .write_all(&buffer)
            .map_err(|_| Error::FailedToWriteImageData)
    }
}

#[cfg(test)]
mod tests {
    use super::{Encoder, TableKind};
    use crate::huffman::specification::LUMA_DC;
    use crate::image::Image;
    use crate::quantization::presets::SPECIFICATION_LUMINANCE_QUANTIZATION_TABLE;
    use crate::quantization::QuantizationTable;

    fn create_test_image() -> Image {
        Image::new(3, 2, 3, vec![0; 18]).unwrap()
    }

    fn specification_table() -> QuantizationTable {
        QuantizationTable::new(SPECIFICATION_LUMINANCE_QUANTIZATION_TABLE).unwrap()
    }

    #[test]
    fn test_write_jfif() {
        let mut output = Vec::new();
        let image = create_test_image();
        let table = specification_table();
        let mut encoder = Encoder::new(&mut output, &table, &image);
        encoder.write_jfif_application_header().unwrap();
        assert_eq!(
            output,
            [
                0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', b'\0', 0x01, 0x02, 0x00, 0x00,
                0x48, 0x00, 0x48, 0, 0
            ]
        )
    }

    #[test]
    fn test_write_huffman_table() {
        let mut output = Vec::new();
        let image = create_test_image();
        let table = specification_table();
        let mut encoder = Encoder::new(&mut output, &table, &image);
        encoder
            .write_huffman_table(TableKind::LumaDC, &LUMA_DC)
            .unwrap();
        assert_eq!(&output[..5], &[0xFF, 0xC4, 0x00, 0x1F, 0x00]);
        assert_eq!(&output[5..21], &[0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(&output[21..], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
    }

    #[test]
    fn test_write_start_of_frame() {
        let mut output = Vec::new();
        let image = create_test_image();
        let table = specification_table();
        let mut encoder = Encoder::new(&mut output, &table, &image);
        encoder.write_start_of_frame().unwrap();
        assert_eq!(
            output,
            [
                0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x02, 0x00, 0x03, 0x03, 0x01, 0x11, 0x00,
                0x02, 0x11, 0x01, 0x03, 0x11, 0x01,
            ]
        )
    }

    #[test]
    fn test_write_quantization() {
        let mut output = Vec::new();
        let image = create_test_image();
        let table = specification_table();
        let mut encoder = Encoder::new(&mut output, &table, &image);
        encoder.write_quantization_table(1).unwrap();

        assert_eq!(
            output,
            [
                0xFF, 0xDB, 0x00, 0x43, 0x01, 16, 11, 12, 14, 12, 10, 16, 14, 13, 14, 18, 17, 16,
                19, 24, 40, 26, 24, 22, 22, 24, 49, 35, 37, 29, 40, 58, 51, 61, 60, 57, 51, 56,
                55, 64, 72, 92, 78, 64, 68, 87, 69, 55, 56, 80, 109, 81, 87, 95, 98, 103, 104,
                103, 62, 77, 113, 121, 112, 100, 120, 92, 101, 103, 99
            ]
        )
    }

    #[test]
    fn test_write_start_of_scan() {
        let mut output = Vec::new();
        let image = create_test_image();
        let table = specification_table();
        let mut encoder = Encoder::new(&mut output, &table, &image);
        encoder.write_start_of_scan().unwrap();

        assert_eq!(
            output,
            [0xFF, 0xDA, 0x00, 0x0C, 0x03, 0x01, 0x00, 0x02, 0x11, 0x03, 0x11, 0x00, 0x3F, 0x00]
        )
    }
}
