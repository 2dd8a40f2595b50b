//! Baseline JPEG output for the winning table.

use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Error;
use crate::image::Image;
use crate::quantization::QuantizationTable;
use crate::{open_output_file, Result};

mod encoder;
mod segment_marker_injector;

use encoder::Encoder;

/// Encodes `image` as a 4:4:4 baseline JPEG whose luma and chroma
/// quantization tables are both `table`.
pub fn write_jpeg(path: &Path, table: &QuantizationTable, image: &Image) -> Result<()> {
    let output_file = open_output_file(path)?;
    let mut writer = BufWriter::new(output_file);
    encode_jpeg(&mut writer, table, image)?;
    writer.flush().map_err(|_| Error::FailedToWriteEndOfFile)?;
    log::info!("Wrote {}", path.display());
    Ok(())
}

pub fn encode_jpeg<W: Write>(writer: &mut W, table: &QuantizationTable, image: &Image) -> Result<()> {
    Encoder::new(writer, table, image).encode()
}
