use std::cmp;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::color::RGBColorFormat;
use crate::error::Error;
use crate::{open_input_file, Result};

pub mod blocks;
pub mod ppm;

use ppm::PPMImageReader;

pub const MAX_DIMENSION: usize = u16::MAX as usize;

pub trait ImageReader {
    fn read_image(&mut self) -> Result<Image>;
}

/// Interleaved 8 bit samples with 3 (RGB) or 4 (RGBA) channels.
#[derive(Clone, Debug)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    samples: Vec<u8>,
}

impl Image {
    pub fn new(width: usize, height: usize, channels: usize, samples: Vec<u8>) -> Result<Self> {
        if channels != 3 && channels != 4 {
            return Err(Error::UnsupportedChannelCount(channels));
        }
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(Error::ImageDimensionsTooLarge(width, height));
        }
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }
        if samples.len() != width * height * channels {
            return Err(Error::MismatchOfSizeBetweenHeaderAndValues);
        }
        Ok(Image {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn width(&self) -> u16 {
        self.width as u16
    }

    pub fn height(&self) -> u16 {
        self.height as u16
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Pixel at `(x, y)`; coordinates past the right or bottom edge are
    /// clamped to the last column or row.
    pub fn clamped_pixel(&self, x: usize, y: usize) -> RGBColorFormat {
        let x = cmp::min(x, self.width - 1);
        let y = cmp::min(y, self.height - 1);
        let offset = (y * self.width + x) * self.channels;
        RGBColorFormat::from_samples(&self.samples[offset..offset + self.channels])
    }

    pub fn horizontal_blocks(&self) -> usize {
        self.width.div_ceil(8)
    }

    pub fn vertical_blocks(&self) -> usize {
        self.height.div_ceil(8)
    }
}

pub fn load_image(path: &Path) -> Result<Image> {
    let input_file: File = open_input_file(path)?;
    let image = PPMImageReader::new(BufReader::new(input_file)).read_image()?;
    log::info!(
        "Loaded {} ({}x{}, {} channels)",
        path.display(),
        image.width,
        image.height,
        image.channels
    );
    Ok(image)
}

#[cfg(test)]
mod test {
    use super::Image;
    use crate::color::RGBColorFormat;
    use crate::error::Error;

    #[test]
    fn reject_unsupported_channel_count() {
        match Image::new(1, 1, 2, vec![0, 0]) {
            Err(Error::UnsupportedChannelCount(2)) => {}
            _ => panic!("two channel image was accepted"),
        }
    }

    #[test]
    fn reject_too_wide_image() {
        match Image::new(65536, 1, 3, Vec::new()) {
            Err(Error::ImageDimensionsTooLarge(65536, 1)) => {}
            _ => panic!("oversized image was accepted"),
        }
    }

    #[test]
    fn reject_sample_count_mismatch() {
        match Image::new(2, 2, 3, vec![0; 11]) {
            Err(Error::MismatchOfSizeBetweenHeaderAndValues) => {}
            _ => panic!("short sample buffer was accepted"),
        }
    }

    #[test]
    fn reject_empty_image() {
        assert!(matches!(
            Image::new(0, 4, 3, Vec::new()),
            Err(Error::EmptyImage)
        ));
    }

    #[test]
    fn clamped_pixel_replicates_edges() {
        #[rustfmt::skip]
        let samples = vec![
            1, 1, 1, 255,   2, 2, 2, 255,
            3, 3, 3, 255,   4, 4, 4, 255,
        ];
        let image = Image::new(2, 2, 4, samples).unwrap();
        assert_eq!(image.clamped_pixel(7, 0), RGBColorFormat::new(2, 2, 2));
        assert_eq!(image.clamped_pixel(0, 9), RGBColorFormat::new(3, 3, 3));
        assert_eq!(image.clamped_pixel(5, 5), RGBColorFormat::new(4, 4, 4));
        assert_eq!(image.horizontal_blocks(), 1);
    }
}
