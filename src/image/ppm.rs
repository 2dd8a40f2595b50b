use std::io::Read;

use super::{Image, ImageReader, MAX_DIMENSION};
use crate::error::Error;

const MAGIC_NUMBER_TOKEN_NAME: &str = "Magic Number";
const WIDTH_HEADER_TOKEN_NAME: &str = "Width Header";
const HEIGHT_HEADER_TOKEN_NAME: &str = "Height Header";
const MAX_VALUE_HEADER_TOKEN_NAME: &str = "Max Value Header";
const COLOR_COMPONENT_VALUE_TOKEN_NAME: &str = "Color Component Value";

const CHANNELS: usize = 3;

/// Reads ASCII (P3) and binary (P6) portable pixmaps.
pub struct PPMImageReader<T: Read> {
    reader: T,
}

impl<T: Read> PPMImageReader<T> {
    pub fn new(reader: T) -> Self {
        Self { reader }
    }
}

impl<T: Read> ImageReader for PPMImageReader<T> {
    fn read_image(&mut self) -> crate::Result<Image> {
        let mut parser = PPMParser::new(PPMTokenizer::new(&mut self.reader));
        parser.parse()
    }
}

struct PPMTokenizer<'a, R: Read> {
    reader: &'a mut R,
    buffer: Vec<u8>,
}

impl<'a, R: Read> PPMTokenizer<'a, R> {
    fn new(reader: &'a mut R) -> Self {
        PPMTokenizer {
            reader,
            buffer: Vec::new(),
        }
    }
}

impl<R: Read> Iterator for PPMTokenizer<'_, R> {
    type Item = String;

    /// Next whitespace separated token. Exactly one whitespace byte after
    /// the token is consumed, which is where a P6 raster starts.
    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        let mut byte = [0; 1];
        let mut in_comment = false;

        while self.reader.read(&mut byte).unwrap_or(0) > 0 {
            if in_comment {
                if byte[0] == b'\n' {
                    in_comment = false;
                }
                continue;
            }
            if byte[0] == b'#' {
                in_comment = true;
                continue;
            }
            if byte[0].is_ascii_whitespace() {
                if !self.buffer.is_empty() {
                    break;
                }
            } else {
                self.buffer.push(byte[0]);
            }
        }

        if self.buffer.is_empty() {
            return None;
        }
        Some(String::from_utf8_lossy(&self.buffer).into_owned())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Format {
    Ascii,
    Binary,
}

struct PPMParser<'a, R: Read> {
    tokenizer: PPMTokenizer<'a, R>,
}

impl<'a, R: Read> PPMParser<'a, R> {
    fn new(tokenizer: PPMTokenizer<'a, R>) -> Self {
        Self { tokenizer }
    }

    fn parse(&mut self) -> crate::Result<Image> {
        let format = self.parse_magic_number()?;
        let width = self.parse_header_value::<usize>(WIDTH_HEADER_TOKEN_NAME)?;
        let height = self.parse_header_value::<usize>(HEIGHT_HEADER_TOKEN_NAME)?;
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Error::ImageDimensionsTooLarge(width, height));
        }
        let max_value = self.parse_max_value()?;
        let number_of_components = width * height * CHANNELS;
        let components = match format {
            Format::Ascii => self.parse_ascii_components(max_value)?,
            Format::Binary => self.read_binary_components(max_value, number_of_components)?,
        };
        if components.len() != number_of_components {
            return Err(Error::MismatchOfSizeBetweenHeaderAndValues);
        }
        let samples = components
            .into_iter()
            .map(|component| scale_to_eight_bits(component, max_value))
            .collect();
        Image::new(width, height, CHANNELS, samples)
    }

    fn parse_magic_number(&mut self) -> crate::Result<Format> {
        let magic_number = self
            .tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(
                MAGIC_NUMBER_TOKEN_NAME,
            ))?;
        match magic_number.as_str() {
            "P3" => Ok(Format::Ascii),
            "P6" => Ok(Format::Binary),
            _ => Err(Error::UnsupportedPPMFormat(magic_number)),
        }
    }

    fn parse_header_value<V: std::str::FromStr>(
        &mut self,
        token_name: &'static str,
    ) -> crate::Result<V> {
        self.tokenizer
            .next()
            .ok_or(Error::PPMFileDoesNotContainRequiredToken(token_name))?
            .parse()
            .map_err(|_| Error::ParsingOfTokenFailed(token_name))
    }

    fn parse_max_value(&mut self) -> crate::Result<u16> {
        let max_value = self.parse_header_value::<u16>(MAX_VALUE_HEADER_TOKEN_NAME)?;
        if max_value == 0 {
            return Err(Error::ParsingOfTokenFailed(MAX_VALUE_HEADER_TOKEN_NAME));
        }
        Ok(max_value)
    }

    fn parse_ascii_components(&mut self, max_value: u16) -> crate::Result<Vec<u16>> {
        let mut components = Vec::new();
        for token in self.tokenizer.by_ref() {
            let component: u16 = token
                .parse()
                .map_err(|_| Error::ParsingOfTokenFailed(COLOR_COMPONENT_VALUE_TOKEN_NAME))?;
            if component > max_value {
                return Err(Error::ParsingOfTokenFailed(
                    COLOR_COMPONENT_VALUE_TOKEN_NAME,
                ));
            }
            components.push(component);
        }
        let incomplete = components.len() % CHANNELS;
        if incomplete != 0 {
            return Err(Error::IncompletePixelParsed(incomplete));
        }
        Ok(components)
    }

    fn read_binary_components(
        &mut self,
        max_value: u16,
        number_of_components: usize,
    ) -> crate::Result<Vec<u16>> {
        let bytes_per_component = if max_value > u8::MAX as u16 { 2 } else { 1 };
        let mut raster = vec![0_u8; number_of_components * bytes_per_component];
        self.tokenizer
            .reader
            .read_exact(&mut raster)
            .map_err(|_| Error::MismatchOfSizeBetweenHeaderAndValues)?;
        let components = raster
            .chunks_exact(bytes_per_component)
            .map(|bytes| match bytes {
                [high, low] => u16::from_be_bytes([*high, *low]),
                [value] => *value as u16,
                _ => unreachable!(),
            })
            .map(|component| component.min(max_value))
            .collect();
        Ok(components)
    }
}

fn scale_to_eight_bits(component: u16, max_value: u16) -> u8 {
    if max_value == u8::MAX as u16 {
        return component as u8;
    }
    let max_value = max_value as u32;
    ((component as u32 * 255 + max_value / 2) / max_value) as u8
}

#[cfg(test)]
mod test {
    use super::{PPMImageReader, scale_to_eight_bits};
    use crate::{
        error::Error,
        image::{Image, ImageReader},
        Result,
    };

    fn parse_ppm_bytes(mut bytes: &[u8]) -> Result<Image> {
        PPMImageReader::new(&mut bytes).read_image()
    }

    #[test]
    fn read_string() {
        let string = "P3\n# Example PPM image string\n3 2\n255\n255 0 0   0 255 0   0 0 255\n255 255 0  255 0 255  0 255 255";
        let image = parse_ppm_bytes(string.as_bytes()).unwrap();
        assert_eq!(image.height(), 2);
        assert_eq!(image.width(), 3);
        assert_eq!(&image.samples()[..6], &[255, 0, 0, 0, 255, 0]);
    }

    #[test]
    fn read_newline_string() {
        let string = "P3\n# Example PPM image newlines\n3\n2\n255\n255\n0\n0\n0\n255\n0\n0\n0\n255\n255\n255\n0\n255\n0\n255\n0\n255\n255";
        let image = parse_ppm_bytes(string.as_bytes()).unwrap();
        assert_eq!(image.height(), 2);
    }

    #[test]
    fn read_binary() {
        let mut bytes = b"P6\n# binary\n2 1\n255\n".to_vec();
        bytes.extend_from_slice(&[10, 20, 30, 0xFF, 0x0A, 0x20]);
        let image = parse_ppm_bytes(&bytes).unwrap();
        assert_eq!(image.samples(), &[10, 20, 30, 0xFF, 0x0A, 0x20]);
    }

    #[test]
    fn read_binary_sixteen_bit() {
        let mut bytes = b"P6 1 1 65535\n".to_vec();
        bytes.extend_from_slice(&[0xFF, 0xFF, 0x00, 0x00, 0x80, 0x00]);
        let image = parse_ppm_bytes(&bytes).unwrap();
        assert_eq!(image.samples(), &[255, 0, 128]);
    }

    #[test]
    fn scale_components() {
        assert_eq!(scale_to_eight_bits(15, 15), 255);
        assert_eq!(scale_to_eight_bits(0, 15), 0);
        assert_eq!(scale_to_eight_bits(200, 255), 200);
    }

    #[test]
    fn incomplete_pixel() {
        let string = "P3\n3 2 255 0 0 255 0 0";
        match parse_ppm_bytes(string.as_bytes()) {
            Err(Error::IncompletePixelParsed(2)) => {}
            _ => panic!("Incomplete pixel not detected"),
        }
    }

    #[test]
    fn wrong_size() {
        let string = "P3\n3 2 255 0 0 255";
        match parse_ppm_bytes(string.as_bytes()) {
            Err(Error::MismatchOfSizeBetweenHeaderAndValues) => {}
            _ => panic!("Mismatch of size in header and actual pixels was not detected!"),
        }
    }

    #[test]
    fn truncated_binary_raster() {
        let mut bytes = b"P6 2 2 255\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 3]);
        assert!(matches!(
            parse_ppm_bytes(&bytes),
            Err(Error::MismatchOfSizeBetweenHeaderAndValues)
        ));
    }

    #[test]
    fn unsupported_format() {
        match parse_ppm_bytes(b"P5 1 1 255 0") {
            Err(Error::UnsupportedPPMFormat(magic)) => assert_eq!(magic, "P5"),
            _ => panic!("P5 must be rejected"),
        }
    }

    #[test]
    fn value_above_max() {
        let string = "P3 1 1 15 16 0 0";
        assert!(matches!(
            parse_ppm_bytes(string.as_bytes()),
            Err(Error::ParsingOfTokenFailed(_))
        ));
    }
}
