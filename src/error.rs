use std::fmt::Display;

#[derive(Debug)]
pub enum Error {
    PPMFileDoesNotContainRequiredToken(&'static str),
    ParsingOfTokenFailed(&'static str),
    UnsupportedPPMFormat(String),
    IncompletePixelParsed(usize),
    MismatchOfSizeBetweenHeaderAndValues,
    UnableToOpenInputFileForReading(String, std::io::Error),
    UnableToOpenOutputFileForWriting(String, std::io::Error),
    UnsupportedChannelCount(usize),
    ImageDimensionsTooLarge(usize, usize),
    EmptyImage,
    InvalidQuantizationTableEntry(usize),
    InvalidConfiguration(&'static str),
    ScratchArenaExhausted { requested: usize, available: usize },
    DeviceSetupFailed(&'static str),
    DeviceDispatchFailed(&'static str),
    WorkerPanicked(usize),
    FailedToWriteStartOfFile,
    FailedToWriteEndOfFile,
    FailedToWriteJfifApplicationHeader,
    FailedToWriteQuantizationTable,
    FailedToWriteStartOfFrame,
    FailedToWriteHuffmanTables,
    FailedToWriteStartOfScan,
    FailedToWriteImageData,
    HuffmanSymbolNotPresentInTable(u8, &'static str),
    FailedToWritePlotFile(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PPMFileDoesNotContainRequiredToken(token_name) => {
                write!(f, "Expected token '{}' not found in PPM file", token_name)
            }
            Self::ParsingOfTokenFailed(token_name) => {
                write!(f, "Parsing of token '{}' failed", token_name)
            }
            Self::UnsupportedPPMFormat(magic) => {
                write!(f, "PPM format '{}' is not supported, expected P3 or P6", magic)
            }
            Self::IncompletePixelParsed(number_of_tokens_parsed) => {
                write!(
                    f,
                    "Incomplete pixel parsed. Expected 3 components, but got {}.",
                    number_of_tokens_parsed
                )
            }
            Self::MismatchOfSizeBetweenHeaderAndValues => {
                write!(
                    f,
                    "Number of pixels does not match the size provided in header"
                )
            }
            Self::UnableToOpenInputFileForReading(path, error) => {
                write!(
                    f,
                    "Unable to open input file '{}' for reading: {}",
                    path, error
                )
            }
            Self::UnableToOpenOutputFileForWriting(path, error) => {
                write!(
                    f,
                    "Unable to open output file '{}' for writing: {}",
                    path, error
                )
            }
            Self::UnsupportedChannelCount(channels) => {
                write!(
                    f,
                    "Images with {} channels are not supported, expected 3 or 4",
                    channels
                )
            }
            Self::ImageDimensionsTooLarge(width, height) => {
                write!(
                    f,
                    "Image of {}x{} exceeds the maximum of 65535 in either dimension",
                    width, height
                )
            }
            Self::EmptyImage => write!(f, "Image has no pixels"),
            Self::InvalidQuantizationTableEntry(index) => {
                write!(f, "Quantization table entry {} must not be zero", index)
            }
            Self::InvalidConfiguration(reason) => {
                write!(f, "Invalid configuration: {}", reason)
            }
            Self::ScratchArenaExhausted {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Scratch arena exhausted: {} result slots requested, {} available",
                    requested, available
                )
            }
            Self::DeviceSetupFailed(reason) => {
                write!(f, "Compute device setup failed: {}", reason)
            }
            Self::DeviceDispatchFailed(reason) => {
                write!(f, "Compute device dispatch failed: {}", reason)
            }
            Self::WorkerPanicked(count) => {
                write!(f, "{} evaluation worker(s) panicked", count)
            }
            Self::FailedToWriteStartOfFile => {
                write!(f, "Failed to write start of file control marker")
            }
            Self::FailedToWriteEndOfFile => {
                write!(f, "Failed to write end of file control marker")
            }
            Self::FailedToWriteJfifApplicationHeader => {
                write!(f, "Failed to write JFIF application header")
            }
            Self::FailedToWriteQuantizationTable => {
                write!(f, "Failed to write quantization table")
            }
            Self::FailedToWriteStartOfFrame => write!(f, "Failed to write start of frame segment"),
            Self::FailedToWriteHuffmanTables => write!(f, "Failed to write huffman tables"),
            Self::FailedToWriteStartOfScan => write!(f, "Failed to write start of scan segment"),
            Self::FailedToWriteImageData => write!(f, "Failed to write image data"),
            Self::HuffmanSymbolNotPresentInTable(symbol, table) => {
                write!(
                    f,
                    "Huffman symbol '{:#04X}' not present in {} table",
                    symbol, table
                )
            }
            Self::FailedToWritePlotFile(error) => {
                write!(f, "Failed to write evolution plot file: {}", error)
            }
        }
    }
}

impl std::error::Error for Error {}
