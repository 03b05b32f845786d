//! # csvstream
//!
//! Streaming CSV tokenizer and writer with configurable dialects.
//!
//! - **Dialects**: separator, quote and escape characters plus behavior
//!   flags, validated once by [`DialectBuilder`]. Two escaping strategies:
//!   lenient (optional escape character, forgiving about stray quotes) and
//!   RFC 4180 (doubled quotes only, malformed quoting is an error).
//! - **Multiline records**: quoted fields may embed newlines and span
//!   several physical lines; a per-dialect limit bounds the buffering.
//! - **Round trip**: [`CsvEncoder`] output parses back to the same fields
//!   under the same dialect.
//! - **Compressed files**: `.csv.zst` and `.csv.gz` on both the reading and
//!   writing side.
//!
//! ## Quick Start
//!
//! ```
//! use csvstream::{CsvEncoder, CsvParser, DialectConfig};
//!
//! let dialect = DialectConfig::rfc4180();
//! let line = CsvEncoder::new(dialect).to_line(["a", r#"he said "hi""#]);
//! assert_eq!(line, r#"a,"he said ""hi""""#);
//!
//! let record = CsvParser::new(dialect).parse_line(&line).unwrap();
//! assert_eq!(record.get(1), Some(r#"he said "hi""#));
//! ```

pub mod csv;
pub mod csv_reader;
pub mod csv_writer;
pub mod dialect;
pub mod error;
pub mod header;
pub mod source;
pub mod types;

pub use csv::{CompressionMethod, CsvEncoder, CsvParser, LineOutcome, ParseState};
pub use csv_reader::{CsvReader, CsvRowIterator, FileCsvReader};
pub use csv_writer::{CsvWriter, RecordSink};
pub use dialect::{DialectBuilder, DialectConfig, Escaping};
pub use error::{CsvError, DialectConflict, ParseFault, Result};
pub use header::{HeaderAwareReader, RecordMap};
pub use source::{IterLines, LineReader, LineSource};
pub use types::{NullFieldIndicator, Record};
