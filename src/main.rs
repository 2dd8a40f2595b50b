use std::env::args_os;
use std::process::exit;

use jpeg_qt_evolver::{evolve_quantization_table, CLIParser};

fn main() {
    let mut cli_parser = CLIParser::default();
    let arguments = cli_parser.parse(args_os());
    match evolve_quantization_table(&arguments) {
        Ok(summary) => {
            println!(
                "Evolution successful after {:.2?}, fitness {:.6}",
                summary.elapsed, summary.outcome.fitness
            );
            for row in summary.table().entries().chunks_exact(8) {
                let line: Vec<String> = row.iter().map(|entry| format!("{:3}", entry)).collect();
                println!("{}", line.join(" "));
            }
        }
        Err(e) => {
            eprintln!("Evolution failed because of: {}", e);
            exit(1);
        }
    }
}
