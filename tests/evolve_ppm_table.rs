use jpeg_qt_evolver::{evolve_quantization_table, CLIParser};
use std::path::PathBuf;
use std::{env, fs};

const INPUT_IMAGE_PATH: &str = "tests/image.ppm";
const RESULT_IMAGE_PATH: &str = "tests/result_evolved.jpg";
const PLOT_FILE_PATH: &str = "tests/result_plot.txt";

fn get_project_root_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn get_path(relative: &str) -> PathBuf {
    let mut root_path = get_project_root_path();
    root_path.push(relative);
    root_path
}

fn cleanup() {
    for path in [get_path(RESULT_IMAGE_PATH), get_path(PLOT_FILE_PATH)] {
        if path.exists() && path.is_file() {
            fs::remove_file(path).expect("Deletion of output file failed");
        }
    }
}

#[test]
fn test_evolve_ppm_table() {
    cleanup();
    let result_image_path = get_path(RESULT_IMAGE_PATH);
    let plot_file_path = get_path(PLOT_FILE_PATH);
    let mut cli_parser = CLIParser::new();
    let arguments = cli_parser.parse(vec![
        "test",
        get_path(INPUT_IMAGE_PATH).to_str().unwrap(),
        result_image_path.to_str().unwrap(),
        "--population",
        "10",
        "--generations",
        "3",
        "--threads",
        "2",
        "--preset",
        "Specification",
        "--plot_file",
        plot_file_path.to_str().unwrap(),
    ]);
    let summary = evolve_quantization_table(&arguments).expect("Evolution failed");
    assert!(summary.table().entries().iter().all(|&entry| entry >= 1));
    assert_eq!(summary.outcome.reports.len(), 3);

    let jpeg = fs::read(&result_image_path).expect("Output file was not created");
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(&jpeg[jpeg.len() - 2..], &[0xFF, 0xD9]);

    let plot = fs::read_to_string(&plot_file_path).expect("Plot file was not created");
    assert_eq!(plot.lines().count(), 3);
    assert!(plot.starts_with("1 "));
    cleanup();
}

#[test]
fn test_missing_input_file() {
    let mut cli_parser = CLIParser::new();
    let arguments = cli_parser.parse(vec!["test", "tests/does_not_exist.ppm"]);
    assert!(evolve_quantization_table(&arguments).is_err());
}
