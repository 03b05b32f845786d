//! Header-aware reading
//!
//! Wraps a [`CsvReader`] whose first record names the columns and yields
//! every following record as an ordered column → value map.

use crate::csv_reader::CsvReader;
use crate::error::{CsvError, Result};
use crate::source::LineSource;
use indexmap::IndexMap;

/// One record keyed by column name, in header order
pub type RecordMap = IndexMap<String, Option<String>>;

/// Reader that maps records onto the header row
///
/// # Examples
///
/// ```
/// use csvstream::{CsvReader, DialectConfig, HeaderAwareReader};
///
/// let data = "id,name\n1,Alice\n";
/// let reader = CsvReader::from_reader(data.as_bytes(), DialectConfig::default());
/// let mut reader = HeaderAwareReader::new(reader).unwrap();
///
/// let row = reader.read_map().unwrap().unwrap();
/// assert_eq!(row["name"].as_deref(), Some("Alice"));
/// ```
pub struct HeaderAwareReader<S> {
    reader: CsvReader<S>,
    columns: IndexMap<String, usize>,
}

impl<S: LineSource> HeaderAwareReader<S> {
    /// Read the header row right away
    ///
    /// Duplicate column names keep their first position.
    pub fn new(reader: CsvReader<S>) -> Result<Self> {
        let mut reader = reader.has_header(true);
        let mut columns = IndexMap::new();
        if let Some(headers) = reader.headers()? {
            for (index, name) in headers.iter().enumerate() {
                columns.entry(name.clone()).or_insert(index);
            }
        }
        Ok(HeaderAwareReader { reader, columns })
    }

    /// Column names in header order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Position of a column in the header
    pub fn header_index(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Read the next record as a column map
    ///
    /// A record with a different number of fields than the header is
    /// rejected with [`CsvError::FieldCountMismatch`].
    pub fn read_map(&mut self) -> Result<Option<RecordMap>> {
        let Some(record) = self.reader.read_record()? else {
            return Ok(None);
        };

        let expected = self.reader.headers()?.map_or(0, <[String]>::len);
        if record.len() != expected {
            return Err(CsvError::FieldCountMismatch {
                row: self.reader.position(),
                expected,
                found: record.len(),
            });
        }

        let mut fields = record.into_fields();
        let map = self
            .columns
            .iter()
            .map(|(name, &index)| (name.clone(), fields[index].take()))
            .collect();
        Ok(Some(map))
    }

    /// Underlying record reader
    pub fn into_inner(self) -> CsvReader<S> {
        self.reader
    }
}
