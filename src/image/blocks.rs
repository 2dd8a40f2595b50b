use super::Image;
use crate::color::RGBColorFormat;
use crate::quantization::BLOCK_SIZE;

/// 64 samples of one 8x8 tile in natural order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DataUnit {
    samples: [f32; BLOCK_SIZE],
}

impl DataUnit {
    pub fn new(samples: [f32; BLOCK_SIZE]) -> Self {
        DataUnit { samples }
    }

    pub fn samples(&self) -> &[f32; BLOCK_SIZE] {
        &self.samples
    }
}

/// Tiles the image into 8x8 data units in row-major tile order, mapping
/// every pixel through `component`. Tiles overhanging the right or bottom
/// edge repeat the last column or row.
pub fn extract_blocks<F>(image: &Image, component: F) -> Vec<DataUnit>
where
    F: Fn(&RGBColorFormat) -> f32,
{
    let mut blocks = Vec::with_capacity(image.horizontal_blocks() * image.vertical_blocks());
    for block_row in 0..image.vertical_blocks() {
        for block_column in 0..image.horizontal_blocks() {
            let mut samples = [0_f32; BLOCK_SIZE];
            for (index, sample) in samples.iter_mut().enumerate() {
                let x = block_column * 8 + index % 8;
                let y = block_row * 8 + index / 8;
                *sample = component(&image.clamped_pixel(x, y));
            }
            blocks.push(DataUnit::new(samples));
        }
    }
    blocks
}

/// Level-shifted luma data units, computed once per image.
pub fn extract_luma_blocks(image: &Image) -> Vec<DataUnit> {
    let blocks = extract_blocks(image, RGBColorFormat::level_shifted_luma);
    log::debug!("Extracted {} luma data units", blocks.len());
    blocks
}
