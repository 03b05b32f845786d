//! CSV reading: physical lines in, logical records out
//!
//! [`CsvReader`] pulls physical lines from a [`LineSource`], feeds them to
//! the tokenizer and yields one [`Record`] per logical row. Quoted fields may
//! span several physical lines; the dialect's multiline limit bounds how many.

use crate::csv::{CsvParser, LineOutcome, ParseState};
use crate::dialect::DialectConfig;
use crate::error::{CsvError, Result};
use crate::source::{LineReader, LineSource};
use crate::types::Record;
use log::debug;
use s_zip::StreamingZipReader;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

/// Reader over a plain or compressed CSV file
pub type FileCsvReader = CsvReader<LineReader<Box<dyn BufRead + Send>>>;

/// CSV reader assembling logical records from physical lines
///
/// Record-level errors ([`CsvError::MultilineLimitExceeded`],
/// [`CsvError::UnterminatedQuotedField`], [`CsvError::Malformed`]) only fail
/// the record being assembled. The reader drops what it buffered and the next
/// call starts a fresh record from the following physical line.
///
/// # Examples
///
/// ```
/// use csvstream::{CsvReader, DialectConfig};
///
/// let data = "a,\"123\n4567\",c\nd,e,f\n";
/// let mut reader = CsvReader::from_reader(data.as_bytes(), DialectConfig::default());
///
/// let record = reader.read_record().unwrap().unwrap();
/// assert_eq!(record.to_strings(), vec!["a", "123\n4567", "c"]);
/// assert_eq!(reader.lines_read(), 2);
///
/// for row_result in reader.rows() {
///     let row = row_result.unwrap();
///     assert_eq!(row.to_strings(), vec!["d", "e", "f"]);
/// }
/// ```
pub struct CsvReader<S> {
    source: S,
    parser: CsvParser,
    state: ParseState,

    // Counters
    lines_read: u64,
    row: u64,
    records_read: u64,

    // Configuration
    skip_lines: usize,
    skipped: usize,
    has_header: bool,
    header_read: bool,
    headers: Vec<String>,

    peeked: Option<Record>,
}

impl FileCsvReader {
    /// Open CSV file with the default dialect
    ///
    /// # File Extensions
    /// - `.csv` → Uncompressed, direct read
    /// - `.csv.zst`, `.csv.zip` → Zstd decompression
    /// - `.csv.gz` → Deflate/Gzip decompression
    ///
    /// ```no_run
    /// use csvstream::CsvReader;
    ///
    /// // Plain CSV
    /// let reader = CsvReader::open("data.csv").unwrap();
    ///
    /// // Compressed CSV (auto-detected)
    /// let reader = CsvReader::open("data.csv.zst").unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_dialect(path, DialectConfig::default())
    }

    /// Open CSV file with a custom dialect
    pub fn open_with_dialect<P: AsRef<Path>>(path: P, dialect: DialectConfig) -> Result<Self> {
        let path_ref = path.as_ref();
        let path_str = path_ref.to_str().unwrap_or("");

        let reader: Box<dyn BufRead + Send> = if path_str.ends_with(".csv.zst")
            || path_str.ends_with(".csv.zip")
            || path_str.ends_with(".csv.gz")
        {
            let mut zip = StreamingZipReader::open(path_ref)
                .map_err(|e| CsvError::Compression(format!("Failed to open ZIP: {}", e)))?;

            // Find first .csv entry
            let entry_name = zip
                .entries()
                .iter()
                .find(|e| e.name.ends_with(".csv"))
                .or_else(|| zip.entries().first())
                .ok_or_else(|| CsvError::Compression("No CSV entry found in archive".to_string()))?
                .name
                .clone();

            let data = zip.read_entry_by_name(&entry_name).map_err(|e| {
                CsvError::Compression(format!("Failed to read ZIP entry: {}", e))
            })?;

            debug!(
                "Read CSV entry {} ({} bytes) from {}",
                entry_name,
                data.len(),
                path_ref.display()
            );
            Box::new(Cursor::new(data))
        } else {
            let file = File::open(path_ref)?;
            debug!("Opened CSV file {}", path_ref.display());
            Box::new(BufReader::new(file))
        };

        Ok(CsvReader::from_reader(reader, dialect))
    }
}

impl<R: BufRead> CsvReader<LineReader<R>> {
    /// Read from any buffered reader; `keep_carriage_return` comes from the dialect
    pub fn from_reader(reader: R, dialect: DialectConfig) -> Self {
        let source = LineReader::new(reader, dialect.keep_carriage_return());
        CsvReader::with_source(source, dialect)
    }
}

impl<S: LineSource> CsvReader<S> {
    /// Read from a custom line source
    pub fn with_source(source: S, dialect: DialectConfig) -> Self {
        CsvReader {
            source,
            parser: CsvParser::new(dialect),
            state: ParseState::new(),
            lines_read: 0,
            row: 0,
            records_read: 0,
            skip_lines: 0,
            skipped: 0,
            has_header: false,
            header_read: false,
            headers: Vec::new(),
            peeked: None,
        }
    }

    /// Skip physical lines before the first record (builder pattern)
    pub fn skip_lines(mut self, lines: usize) -> Self {
        self.skip_lines = lines;
        self
    }

    /// Indicate that the first record holds headers (builder pattern)
    ///
    /// The header record is read on first access and never returned by
    /// [`read_record`](Self::read_record).
    pub fn has_header(mut self, has: bool) -> Self {
        self.has_header = has;
        self
    }

    pub fn dialect(&self) -> &DialectConfig {
        self.parser.dialect()
    }

    /// Header record, reading it if needed
    ///
    /// Returns `None` without a header configured or for empty input.
    pub fn headers(&mut self) -> Result<Option<&[String]>> {
        self.ensure_header()?;
        Ok((!self.headers.is_empty()).then_some(self.headers.as_slice()))
    }

    /// Read the next logical record
    ///
    /// Returns `Ok(None)` when the source is exhausted.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        if let Some(record) = self.peeked.take() {
            return Ok(Some(record));
        }
        self.ensure_header()?;
        self.next_record()
    }

    /// Look at the next record without consuming it
    pub fn peek_record(&mut self) -> Result<Option<&Record>> {
        if self.peeked.is_none() {
            self.peeked = self.read_record()?;
        }
        Ok(self.peeked.as_ref())
    }

    /// Read every remaining record, stopping at the first error
    pub fn read_all(&mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_record()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Get iterator over records
    ///
    /// Record-level errors are yielded and iteration continues with the next
    /// record; an I/O error ends the iteration.
    pub fn rows(&mut self) -> CsvRowIterator<'_, S> {
        CsvRowIterator {
            reader: self,
            done: false,
        }
    }

    /// Physical lines consumed so far, skipped lines included
    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Logical records read so far, header included
    pub fn row_count(&self) -> u64 {
        self.records_read
    }

    /// Logical row of the last record attempted, failed ones included
    ///
    /// This is the row number carried by record-level errors.
    pub fn position(&self) -> u64 {
        self.row
    }

    fn ensure_header(&mut self) -> Result<()> {
        if self.has_header && !self.header_read {
            self.header_read = true;
            if let Some(header) = self.next_record()? {
                self.headers = header.to_strings();
            }
        }
        Ok(())
    }

    fn skip_leading_lines(&mut self) -> Result<()> {
        while self.skipped < self.skip_lines {
            if self.source.next_line()?.is_none() {
                self.skipped = self.skip_lines;
                break;
            }
            self.skipped += 1;
            self.lines_read += 1;
        }
        Ok(())
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        self.skip_leading_lines()?;
        self.state.reset();

        loop {
            let Some(line) = self.source.next_line()? else {
                return self.finish_at_eof();
            };
            self.lines_read += 1;

            if self.state.lines() == 0 {
                self.row += 1;
            } else if let Some(limit) = self.parser.dialect().multiline_limit() {
                if self.state.lines() >= limit {
                    let context = self.state.pending_text().to_string();
                    self.state.reset();
                    return Err(CsvError::MultilineLimitExceeded {
                        row: self.row,
                        context,
                        limit,
                    });
                }
            }

            match self.parser.feed_line(&mut self.state, line) {
                Ok(LineOutcome::Complete(record)) => {
                    self.records_read += 1;
                    return Ok(Some(record));
                }
                Ok(LineOutcome::Continue) => {}
                Err(fault) => {
                    let context = self.state.pending_text().to_string();
                    self.state.reset();
                    return Err(CsvError::Malformed {
                        row: self.row,
                        fault,
                        context,
                    });
                }
            }
        }
    }

    fn finish_at_eof(&mut self) -> Result<Option<Record>> {
        if self.state.lines() == 0 {
            return Ok(None);
        }

        let context = self.state.pending_text().to_string();
        match self.parser.finish(&mut self.state) {
            Some(record) => {
                self.records_read += 1;
                Ok(Some(record))
            }
            None => {
                self.state.reset();
                Err(CsvError::UnterminatedQuotedField {
                    row: self.row,
                    context,
                })
            }
        }
    }
}

/// Iterator over CSV records
pub struct CsvRowIterator<'a, S> {
    reader: &'a mut CsvReader<S>,
    done: bool,
}

impl<'a, S: LineSource> Iterator for CsvRowIterator<'a, S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                if matches!(e, CsvError::Io(_)) {
                    self.done = true;
                }
                Some(Err(e))
            }
        }
    }
}
