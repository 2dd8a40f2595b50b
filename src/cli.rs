use crate::evaluation::batch::Backend;
use crate::evolution::DEFAULT_SEED;
use crate::quantization::presets::QuantizationTablePreset;
use crate::Arguments;
use clap::{
    arg, crate_authors, crate_description, crate_name, crate_version, value_parser, Arg,
    ArgAction, ArgMatches, Command,
};
use std::ffi::OsString;
use std::path::PathBuf;
use std::{io, thread};

const DEFAULT_OUTPUT_FILE: &str = "out_evolved.jpg";

pub struct CLIParser {
    command: Command,
}

impl CLIParser {
    pub fn new() -> Self {
        let command = Self::create_base_command();
        let command = Self::register_arguments(command);
        CLIParser { command }
    }

    pub fn parse<I, T>(&mut self, itr: I) -> Arguments
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self
            .command
            .try_get_matches_from_mut(itr)
            .unwrap_or_else(|e| e.exit());
        Self::extract_arguments(&matches)
    }

    fn register_arguments(command: Command) -> Command {
        let command = Self::register_file_arguments(command);
        let command = Self::register_population_arguments(command);
        let command = Self::register_operator_arguments(command);
        let command = Self::register_fitness_arguments(command);
        let command = Self::register_termination_arguments(command);
        Self::register_runtime_arguments(command)
    }

    fn register_file_arguments(command: Command) -> Command {
        command
            .arg(Self::create_input_file_argument())
            .arg(Self::create_output_file_argument())
            .arg(Self::create_plot_file_argument())
    }

    fn register_population_arguments(command: Command) -> Command {
        command
            .arg(Self::create_population_argument())
            .arg(Self::create_elites_argument())
            .arg(Self::create_initial_max_argument())
            .arg(Self::create_preset_argument())
    }

    fn register_operator_arguments(command: Command) -> Command {
        command
            .arg(Self::create_weight_argument("mutation", "80", "Weight of the mutation operator"))
            .arg(Self::create_weight_argument("crossover", "15", "Weight of the crossover operator"))
            .arg(Self::create_weight_argument(
                "reproduction",
                "5",
                "Weight of the reproduction operator",
            ))
            .arg(Self::create_mutation_rate_argument())
            .arg(Self::create_wiggle_argument())
    }

    fn register_fitness_arguments(command: Command) -> Command {
        command.arg(Self::create_fitness_weight_argument())
    }

    fn register_termination_arguments(command: Command) -> Command {
        command
            .arg(Self::create_epsilon_argument())
            .arg(Self::create_convergence_limit_argument())
            .arg(Self::create_generations_argument())
    }

    fn register_runtime_arguments(command: Command) -> Command {
        command
            .arg(Self::create_backend_argument())
            .arg(Self::create_threads_argument())
            .arg(Self::create_seed_argument())
    }

    fn create_base_command() -> Command {
        Command::new(crate_name!())
            .version(crate_version!())
            .author(crate_authors!())
            .about(crate_description!())
    }

    fn create_input_file_argument() -> Arg {
        Arg::new("input_file")
            .help("Path to PPM input file")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    }

    fn create_output_file_argument() -> Arg {
        Arg::new("output_file")
            .help("Path of the JPEG written with the evolved table")
            .value_parser(value_parser!(PathBuf))
            .default_value(DEFAULT_OUTPUT_FILE)
    }

    fn create_plot_file_argument() -> Arg {
        arg!(plot_file: --plot_file <PATH> "Write 'generation best worst' lines to this file")
            .required(false)
            .value_parser(value_parser!(PathBuf))
    }

    fn create_population_argument() -> Arg {
        arg!(population: -p --population <SIZE> "Number of tables per generation")
            .default_value("48")
            .value_parser(value_parser!(usize))
    }

    fn create_elites_argument() -> Arg {
        arg!(elites: -e --elites <COUNT> "Best tables carried over unchanged")
            .default_value("2")
            .value_parser(value_parser!(usize))
    }

    fn create_initial_max_argument() -> Arg {
        arg!(initial_max: --initial_max <VALUE> "Upper bound of random initial entries")
            .default_value("64")
            .value_parser(value_parser!(u8).range(1..))
    }

    fn create_preset_argument() -> Arg {
        arg!(preset: --preset <TABLE> "Preset table added to the first generation")
            .required(false)
            .action(ArgAction::Append)
            .value_parser(value_parser!(QuantizationTablePreset))
    }

    fn create_weight_argument(name: &'static str, default: &'static str, help: &'static str) -> Arg {
        Arg::new(name)
            .long(name)
            .value_name("WEIGHT")
            .help(help)
            .default_value(default)
            .value_parser(value_parser!(u32))
    }

    fn create_mutation_rate_argument() -> Arg {
        arg!(mutation_rate: --mutation_rate <RATE> "Probability of perturbing each entry")
            .default_value("0.03125")
            .value_parser(value_parser!(f32))
    }

    fn create_wiggle_argument() -> Arg {
        arg!(wiggle: -w --wiggle <DELTA> "Largest mutation step")
            .default_value("4")
            .value_parser(value_parser!(u8).range(1..))
    }

    fn create_fitness_weight_argument() -> Arg {
        arg!(fitness_weight: --fitness_weight <K> "Weight of the compression term")
            .default_value("2.0")
            .value_parser(value_parser!(f64))
    }

    fn create_epsilon_argument() -> Arg {
        arg!(epsilon: --epsilon <EPSILON> "Change of the best fitness counted as no change")
            .default_value("0.0001")
            .value_parser(value_parser!(f64))
    }

    fn create_convergence_limit_argument() -> Arg {
        arg!(convergence_limit: --convergence_limit <COUNT> "Unchanged generations before stopping")
            .default_value("10")
            .value_parser(value_parser!(usize))
    }

    fn create_generations_argument() -> Arg {
        arg!(generations: -g --generations <COUNT> "Maximum number of generations")
            .default_value("500")
            .value_parser(value_parser!(usize))
    }

    fn create_backend_argument() -> Arg {
        arg!(backend: -b --backend <BACKEND> "Where candidate tables are evaluated")
            .default_value("cpu")
            .value_parser(value_parser!(Backend))
    }

    fn create_threads_argument() -> Arg {
        arg!(-t --threads <THREADS> "Number of evaluation threads")
            .default_value(get_number_of_threads().unwrap_or(1).to_string())
            .required(false)
            .value_parser(value_parser!(usize))
    }

    fn create_seed_argument() -> Arg {
        arg!(seed: -s --seed <SEED> "Seed of the random generator, decimal or 0x hex")
            .default_value(format!("{:#X}", DEFAULT_SEED))
            .value_parser(parse_seed)
    }

    fn extract_arguments(matches: &ArgMatches) -> Arguments {
        Arguments {
            input_file: Self::extract_input_file_argument(matches),
            output_file: Self::extract_output_file_argument(matches),
            plot_file: matches.get_one::<PathBuf>("plot_file").cloned(),
            population: Self::extract_value(matches, "population"),
            elites: Self::extract_value(matches, "elites"),
            initial_max: Self::extract_value(matches, "initial_max"),
            presets: Self::extract_preset_arguments(matches),
            mutation: Self::extract_value(matches, "mutation"),
            crossover: Self::extract_value(matches, "crossover"),
            reproduction: Self::extract_value(matches, "reproduction"),
            mutation_rate: Self::extract_value(matches, "mutation_rate"),
            wiggle: Self::extract_value(matches, "wiggle"),
            fitness_weight: Self::extract_value(matches, "fitness_weight"),
            epsilon: Self::extract_value(matches, "epsilon"),
            convergence_limit: Self::extract_value(matches, "convergence_limit"),
            generations: Self::extract_value(matches, "generations"),
            backend: Self::extract_value(matches, "backend"),
            number_of_threads: Self::extract_value(matches, "threads"),
            seed: Self::extract_value(matches, "seed"),
        }
    }

    fn extract_input_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("input_file")
            .expect("Required argument input_file not provided")
            .clone()
    }

    fn extract_output_file_argument(matches: &ArgMatches) -> PathBuf {
        matches
            .get_one::<PathBuf>("output_file")
            .expect("Argument output_file has a default value")
            .clone()
    }

    fn extract_preset_arguments(matches: &ArgMatches) -> Vec<QuantizationTablePreset> {
        matches
            .get_many::<QuantizationTablePreset>("preset")
            .map(|presets| presets.copied().collect())
            .unwrap_or_default()
    }

    /// Every argument read through here has a default value.
    fn extract_value<V: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> V {
        matches
            .get_one::<V>(id)
            .unwrap_or_else(|| panic!("Argument {} must be provided, but was unset", id))
            .clone()
    }
}

impl Default for CLIParser {
    fn default() -> Self {
        Self::new()
    }
}

fn get_number_of_threads() -> io::Result<usize> {
    Ok(thread::available_parallelism()?.get())
}

fn parse_seed(value: &str) -> Result<u64, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("'{}' is not a valid seed: {}", value, e))
}
