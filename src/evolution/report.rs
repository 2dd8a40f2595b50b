use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Error;
use crate::{open_output_file, Result};

/// Progress of one generation, taken right after sorting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationReport {
    pub generation: usize,
    pub best: f64,
    /// Worst fitness among members without the penalty.
    pub worst: f64,
    /// Absolute change of the best fitness against the previous
    /// generation; infinite for the first one.
    pub diff: f64,
}

/// One `generation best worst` line per report.
pub fn write_plot<W: Write>(writer: &mut W, reports: &[GenerationReport]) -> std::io::Result<()> {
    for report in reports {
        writeln!(writer, "{} {:.6} {:.6}", report.generation, report.best, report.worst)?;
    }
    writer.flush()
}

pub fn write_plot_file(path: &Path, reports: &[GenerationReport]) -> Result<()> {
    let file: File = open_output_file(path)?;
    write_plot(&mut BufWriter::new(file), reports).map_err(Error::FailedToWritePlotFile)?;
    log::info!("Wrote {} generations to {}", reports.len(), path.display());
    Ok(())
}
