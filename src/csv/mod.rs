//! CSV utilities for tokenizing and encoding

mod encoder;
mod parser;

pub use encoder::CsvEncoder;
pub use parser::{CsvParser, LineOutcome, ParseState};

// Re-export CompressionMethod from s-zip for convenience
pub use s_zip::CompressionMethod;
