use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

pub use cli::CLIParser;
use error::Error;
use evaluation::batch::{Backend, BatchEvaluator};
use evolution::operators::OperatorWeights;
use evolution::{EvolutionConfig, EvolutionOutcome, GeneticDriver};
use quantization::presets::QuantizationTablePreset;
use quantization::QuantizationTable;

pub mod arena;
pub mod binary_stream;
mod cli;
pub mod color;
pub mod cosine_transform;
pub mod error;
pub mod evaluation;
pub mod evolution;
pub mod huffman;
pub mod image;
pub mod jpeg;
mod logger;
pub mod quantization;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub plot_file: Option<PathBuf>,
    pub population: usize,
    pub elites: usize,
    pub initial_max: u8,
    pub presets: Vec<QuantizationTablePreset>,
    pub mutation: u32,
    pub crossover: u32,
    pub reproduction: u32,
    pub mutation_rate: f32,
    pub wiggle: u8,
    pub fitness_weight: f64,
    pub epsilon: f64,
    pub convergence_limit: usize,
    pub generations: usize,
    pub backend: Backend,
    pub number_of_threads: usize,
    pub seed: u64,
}

impl From<&Arguments> for EvolutionConfig {
    fn from(arguments: &Arguments) -> Self {
        EvolutionConfig {
            population_size: arguments.population,
            elites: arguments.elites,
            weights: OperatorWeights {
                mutation: arguments.mutation,
                crossover: arguments.crossover,
                reproduction: arguments.reproduction,
            },
            mutation_rate: arguments.mutation_rate,
            wiggle: arguments.wiggle,
            initial_max: arguments.initial_max,
            fitness_weight: arguments.fitness_weight,
            epsilon: arguments.epsilon,
            convergence_limit: arguments.convergence_limit,
            max_generations: arguments.generations,
            seed: arguments.seed,
            seed_tables: arguments.presets.iter().map(|preset| preset.table()).collect(),
        }
    }
}

/// What a finished run produced.
pub struct RunSummary {
    pub outcome: EvolutionOutcome,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn table(&self) -> &QuantizationTable {
        &self.outcome.table
    }
}

fn open_input_file(file_path: &Path) -> Result<File> {
    File::open(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| {
            Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e)
        })
}

/// Loads the image, evolves a luma table for it and writes the image
/// with the winning table.
pub fn evolve_quantization_table(arguments: &Arguments) -> Result<RunSummary> {
    let started = Instant::now();
    let config = EvolutionConfig::from(arguments);
    config.validate()?;

    let image = image::load_image(&arguments.input_file)?;
    let blocks = image::blocks::extract_luma_blocks(&image);
    let mut evaluator =
        BatchEvaluator::new(blocks, arguments.backend, arguments.number_of_threads)?;
    let outcome = GeneticDriver::new(config, &mut evaluator)?.run()?;

    if let Some(plot_file) = &arguments.plot_file {
        evolution::report::write_plot_file(plot_file, &outcome.reports)?;
    }
    jpeg::write_jpeg(&arguments.output_file, &outcome.table, &image)?;

    let elapsed = started.elapsed();
    log::info!(
        "Finished after {} generations in {:.2?}, best fitness {:.6}",
        outcome.reports.len(),
        elapsed,
        outcome.fitness
    );
    log::info!(
        "Best table: {} bits ({} bytes), error {}; baseline {} bits, error {}",
        outcome.result.bits,
        outcome.result.bytes(),
        outcome.result.error,
        outcome.baseline.bits,
        outcome.baseline.error
    );
    logger::log_table("Evolved luma quantization table:", outcome.table.entries());
    Ok(RunSummary { outcome, elapsed })
}
