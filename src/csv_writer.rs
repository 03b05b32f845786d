//! CSV writing with streaming support and compression

use crate::csv::{CompressionMethod, CsvEncoder};
use crate::dialect::DialectConfig;
use crate::error::{CsvError, Result};
use crate::types::Record;
use log::debug;
use s_zip::StreamingZipWriter;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Accepts records one at a time
pub trait RecordSink {
    fn write_record(&mut self, record: &Record) -> Result<()>;
}

enum Output<W> {
    Direct(W),
    Zip(StreamingZipWriter<File>),
}

/// CSV writer with streaming capabilities and compression support
///
/// Each record is encoded into one line and handed to the output right away;
/// no records are held back.
///
/// # Examples
///
/// ```no_run
/// use csvstream::CsvWriter;
///
/// let mut writer = CsvWriter::new("output.csv").unwrap();
/// writer.write_row(["Name", "Age", "City"]).unwrap();
/// writer.write_row(["Alice", "30", "NYC"]).unwrap();
/// writer.save().unwrap();
/// ```
///
/// # Compression
///
/// Auto-detects compression from file extension:
/// - `.csv` → Uncompressed
/// - `.csv.zst` or `.csv.zip` → Zstd compression (level 3)
/// - `.csv.gz` → Deflate/Gzip compression (level 6)
pub struct CsvWriter<W: Write = BufWriter<File>> {
    output: Output<W>,

    // State
    row_count: u64,
    buffer: String,

    // Configuration
    encoder: CsvEncoder,
    line_ending: String,
}

impl CsvWriter<BufWriter<File>> {
    /// Create a new CSV writer - auto-detects compression from file extension
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_str().unwrap_or("");

        if path_str.ends_with(".csv.zst") || path_str.ends_with(".csv.zip") {
            Self::with_compression(path_ref, CompressionMethod::Zstd, 3)
        } else if path_str.ends_with(".csv.gz") {
            Self::with_compression(path_ref, CompressionMethod::Deflate, 6)
        } else {
            let file = File::create(path_ref)?;
            debug!("Created CSV file {}", path_ref.display());
            Ok(Self::with_output(Output::Direct(BufWriter::new(file))))
        }
    }

    /// Create a writer with explicit compression method and level
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `method` - Compression method (Zstd or Deflate)
    /// * `level` - Zstd: 1-21, Deflate: 0-9
    pub fn with_compression<P: AsRef<Path>>(
        path: P,
        method: CompressionMethod,
        level: u32,
    ) -> Result<Self> {
        let path_ref = path.as_ref();

        let mut zip = StreamingZipWriter::with_method(path_ref, method, level)
            .map_err(|e| CsvError::Compression(format!("Failed to create ZIP writer: {}", e)))?;

        // Entry name: extract from path or use "data.csv"
        let entry_name = path_ref
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| {
                let clean = s
                    .trim_end_matches(".csv")
                    .trim_end_matches(".zst")
                    .trim_end_matches(".gz");
                format!("{}.csv", clean)
            })
            .unwrap_or_else(|| "data.csv".to_string());

        zip.start_entry(&entry_name)
            .map_err(|e| CsvError::Compression(format!("Failed to start ZIP entry: {}", e)))?;

        debug!(
            "Writing CSV entry {} into {}",
            entry_name,
            path_ref.display()
        );
        Ok(Self::with_output(Output::Zip(zip)))
    }
}

impl<W: Write> CsvWriter<W> {
    /// Write to any `Write` implementation, uncompressed
    pub fn from_writer(writer: W) -> Self {
        Self::with_output(Output::Direct(writer))
    }

    fn with_output(output: Output<W>) -> Self {
        CsvWriter {
            output,
            row_count: 0,
            buffer: String::with_capacity(4096),
            encoder: CsvEncoder::default(),
            line_ending: "\n".to_string(),
        }
    }

    /// Set the dialect (builder pattern)
    pub fn dialect(mut self, dialect: DialectConfig) -> Self {
        self.encoder = CsvEncoder::new(dialect)
            .apply_quotes_to_all(self.encoder.quotes_all());
        self
    }

    /// Quote every field (builder pattern)
    pub fn apply_quotes_to_all(mut self, all: bool) -> Self {
        self.encoder = self.encoder.apply_quotes_to_all(all);
        self
    }

    /// Set the line terminator, `"\n"` by default (builder pattern)
    pub fn line_ending(mut self, ending: &str) -> Self {
        self.line_ending = ending.to_string();
        self
    }

    /// Write a row of strings
    pub fn write_row<I, S>(&mut self, data: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.buffer.clear();
        self.encoder.encode_row(data, &mut self.buffer);
        self.flush_line()
    }

    /// Write multiple rows at once
    pub fn write_rows_batch<I, R, S>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for row_data in rows {
            self.write_row(row_data)?;
        }
        Ok(())
    }

    /// Get the number of rows written
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Flush buffered output of an uncompressed writer
    pub fn flush(&mut self) -> Result<()> {
        if let Output::Direct(ref mut writer) = self.output {
            writer.flush()?;
        }
        Ok(())
    }

    /// Finalize the output
    ///
    /// Must be called to finish a compressed archive. Consumes the writer.
    pub fn save(self) -> Result<()> {
        let rows = self.row_count;
        match self.output {
            Output::Zip(zip) => {
                zip.finish()
                    .map_err(|e| CsvError::Compression(format!("Failed to finish ZIP: {}", e)))?;
            }
            Output::Direct(mut writer) => writer.flush()?,
        }
        debug!("Finished CSV output after {} rows", rows);
        Ok(())
    }

    fn flush_line(&mut self) -> Result<()> {
        self.buffer.push_str(&self.line_ending);

        match self.output {
            Output::Zip(ref mut zip) => {
                zip.write_data(self.buffer.as_bytes())
                    .map_err(|e| CsvError::Compression(format!("Failed to write to ZIP: {}", e)))?;
            }
            Output::Direct(ref mut writer) => {
                writer.write_all(self.buffer.as_bytes())?;
            }
        }

        self.row_count += 1;
        Ok(())
    }
}

impl<W: Write> RecordSink for CsvWriter<W> {
    /// Write a record, null fields included
    fn write_record(&mut self, record: &Record) -> Result<()> {
        self.buffer.clear();
        self.encoder.encode_record(record, &mut self.buffer);
        self.flush_line()
    }
}
