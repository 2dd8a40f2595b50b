use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    Config,
};

const CONFIG_FILE: &str = "log4rs.yaml";
const FALLBACK_PATTERN: &str = "{d(%H:%M:%S%.3f)} {l:<5} {t} - {m}{n}";

#[ctor::ctor]
fn init() {
    if log4rs::init_file(CONFIG_FILE, Default::default()).is_err() {
        init_console_fallback();
    }
}

/// Console logging at info level, used when no `log4rs.yaml` is found in
/// the working directory.
fn init_console_fallback() {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(FALLBACK_PATTERN)))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .build(Root::builder().appender("stdout").build(LevelFilter::Info));
    if let Ok(config) = config {
        // a logger may already be installed by the embedding program
        let _ = log4rs::init_config(config);
    }
}

pub fn log_segment(marker: &[u8], content: &[u8], segment_length: &[u8]) {
    fn get_byte_array(bytes: &[u8]) -> Vec<String> {
        bytes.iter().map(|byte| format!("{:02X}", byte)).collect()
    }
    log::debug!(
        "{:?} {:?}\n{:?}",
        get_byte_array(marker),
        get_byte_array(segment_length),
        get_byte_array(content)
    );
}

/// Prints an 8x8 table row by row.
pub fn log_table(title: &str, entries: &[u8; 64]) {
    log::info!("{}", title);
    for row in entries.chunks_exact(8) {
        let line: Vec<String> = row.iter().map(|entry| format!("{:3}", entry)).collect();
        log::info!("{}", line.join(" "));
    }
}
