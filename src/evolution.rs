//! Genetic search for a luma quantization table. Every candidate is scored
//! by the [`BatchEvaluator`] against the all-ones table, lower is better.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::error::Error;
use crate::evaluation::batch::BatchEvaluator;
use crate::evaluation::EvaluationResult;
use crate::quantization::QuantizationTable;
use crate::Result;

pub mod fitness;
pub mod operators;
pub mod population;
pub mod report;

use fitness::FitnessFunction;
use operators::{Operator, OperatorWeights};
use population::Population;
use report::GenerationReport;

pub const DEFAULT_SEED: u64 = 0xDEADBEEF;

#[derive(Clone, Debug, PartialEq)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub elites: usize,
    pub weights: OperatorWeights,
    /// Probability of perturbing each entry during mutation.
    pub mutation_rate: f32,
    pub wiggle: u8,
    pub initial_max: u8,
    /// Weight `k` of the compression term.
    pub fitness_weight: f64,
    pub epsilon: f64,
    /// Consecutive generations below `epsilon` that end the run.
    pub convergence_limit: usize,
    pub max_generations: usize,
    pub seed: u64,
    /// Extra tables for the initial population.
    pub seed_tables: Vec<QuantizationTable>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        EvolutionConfig {
            population_size: 48,
            elites: 2,
            weights: OperatorWeights {
                mutation: 80,
                crossover: 15,
                reproduction: 5,
            },
            mutation_rate: 1.0 / 32.0,
            wiggle: 4,
            initial_max: 64,
            fitness_weight: 2.0,
            epsilon: 1e-4,
            convergence_limit: 10,
            max_generations: 500,
            seed: DEFAULT_SEED,
            seed_tables: Vec::new(),
        }
    }
}

impl EvolutionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(Error::InvalidConfiguration("population needs at least two members"));
        }
        if self.elites == 0 {
            return Err(Error::InvalidConfiguration("at least one elite is required"));
        }
        if self.elites >= self.population_size {
            return Err(Error::InvalidConfiguration("elites must be fewer than the population"));
        }
        if self.weights.total() == 0 {
            return Err(Error::InvalidConfiguration("operator weights must not all be zero"));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidConfiguration("mutation rate must be within 0 and 1"));
        }
        if self.wiggle == 0 {
            return Err(Error::InvalidConfiguration("wiggle must be positive"));
        }
        if self.initial_max == 0 {
            return Err(Error::InvalidConfiguration("initial maximum must be positive"));
        }
        if self.max_generations == 0 {
            return Err(Error::InvalidConfiguration("at least one generation is required"));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(Error::InvalidConfiguration("epsilon must be a non-negative number"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DriverState {
    Init,
    Evaluate,
    Select,
    Breed,
    Done,
}

#[derive(Clone, Debug)]
pub struct EvolutionOutcome {
    pub table: QuantizationTable,
    pub fitness: f64,
    pub result: EvaluationResult,
    pub baseline: EvaluationResult,
    pub reports: Vec<GenerationReport>,
}

pub struct GeneticDriver<'a> {
    config: EvolutionConfig,
    evaluator: &'a mut BatchEvaluator,
    rng: Pcg32,
    state: DriverState,
    population: Population,
    reports: Vec<GenerationReport>,
    convergence_hits: usize,
}

impl<'a> GeneticDriver<'a> {
    pub fn new(config: EvolutionConfig, evaluator: &'a mut BatchEvaluator) -> Result<Self> {
        config.validate()?;
        let rng = Pcg32::seed_from_u64(config.seed);
        Ok(GeneticDriver {
            config,
            evaluator,
            rng,
            state: DriverState::Init,
            population: Population::new(Vec::new()),
            reports: Vec::new(),
            convergence_hits: 0,
        })
    }

    pub fn run(mut self) -> Result<EvolutionOutcome> {
        let baseline = self.evaluator.evaluate(&QuantizationTable::baseline())?;
        log::info!(
            "Baseline: {} bits, error {} over {} blocks",
            baseline.bits,
            baseline.error,
            self.evaluator.block_count()
        );
        let fitness = FitnessFunction::new(baseline, self.config.fitness_weight);

        let mut generation = 1;

        loop {
            match self.state {
                DriverState::Init => {
                    self.population = Population::initial(
                        self.config.population_size,
                        &self.config.seed_tables,
                        self.config.initial_max,
                        &mut self.rng,
                    );
                    self.state = DriverState::Evaluate;
                }
                DriverState::Evaluate => {
                    self.evaluate_population(&fitness)?;
                    self.state = DriverState::Select;
                }
                DriverState::Select => {
                    self.population.sort();
                    let report = self.report(generation);
                    log::info!(
                        "Generation {}: best {:.6}, worst {:.6}, diff {:.6}",
                        report.generation,
                        report.best,
                        report.worst,
                        report.diff
                    );
                    self.reports.push(report);
                    self.state = if self.is_finished(&report) {
                        DriverState::Done
                    } else {
                        DriverState::Breed
                    };
                }
                DriverState::Breed => {
                    self.breed();
                    generation += 1;
                    self.state = DriverState::Evaluate;
                }
                DriverState::Done => break,
            }
        }

        let best = *self
            .population
            .best()
            .ok_or(Error::InvalidConfiguration("population is empty"))?;
        let result = self.evaluator.evaluate(&best.table)?;
        Ok(EvolutionOutcome {
            table: best.table,
            fitness: best.fitness,
            result,
            baseline,
            reports: self.reports,
        })
    }

    fn evaluate_population(&mut self, fitness: &FitnessFunction) -> Result<()> {
        for member in self.population.members_mut() {
            let result = self.evaluator.evaluate(&member.table)?;
            member.fitness = fitness.score(&result);
        }
        Ok(())
    }

    fn report(&self, generation: usize) -> GenerationReport {
        let best = self.population.best().map_or(f64::INFINITY, |m| m.fitness);
        let worst = self.population.worst_unpenalized().map_or(best, |m| m.fitness);
        let diff = self
            .reports
            .last()
            .map_or(f64::INFINITY, |previous| (best - previous.best).abs());
        GenerationReport {
            generation,
            best,
            worst,
            diff,
        }
    }

    fn is_finished(&mut self, report: &GenerationReport) -> bool {
        if report.diff < self.config.epsilon {
            self.convergence_hits += 1;
        } else {
            self.convergence_hits = 0;
        }
        if self.convergence_hits >= self.config.convergence_limit {
            log::info!("Converged after {} generations", report.generation);
            return true;
        }
        report.generation >= self.config.max_generations
    }

    fn breed(&mut self) {
        let members = self.population.members();
        let elites = self.population.elites(self.config.elites);
        let mut next: Vec<QuantizationTable> = elites.iter().map(|elite| elite.table).collect();
        while next.len() < self.config.population_size {
            let genes = match self.config.weights.choose(&mut self.rng) {
                Operator::Mutation => {
                    let parent = &elites[self.rng.random_range(0..elites.len())].table;
                    operators::mutate(parent, self.config.mutation_rate, self.config.wiggle, &mut self.rng)
                }
                Operator::Crossover => {
                    let (first, second) =
                        operators::pick_parents(members, self.config.elites, &mut self.rng);
                    operators::crossover(first, second, &mut self.rng)
                }
                Operator::Reproduction => {
                    let parent = &elites[self.rng.random_range(0..elites.len())].table;
                    operators::genes_of(parent)
                }
            };
            next.push(operators::repair(genes, self.config.wiggle, &mut self.rng));
        }
        self.population = Population::new(next);
    }
}
