//! Error types for CSV tokenizing, assembling and writing
//!
//! Every record-level error carries the logical row it was raised for and,
//! where it makes sense, the partial field content buffered so far. The
//! `Display` output is a short diagnostic; callers that need localized
//! messages should match on the variants instead.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CsvError>;

/// The main error type for csvstream.
///
/// # Error Categories
///
/// - **Configuration**: [`CsvError::InvalidDialect`] is raised by
///   [`DialectBuilder::build`](crate::DialectBuilder::build) before any parsing starts
/// - **Record errors**: multiline limit, unterminated quotes and malformed
///   input are fatal for one record only; the reader can continue with the next
/// - **I/O**: failures of the underlying line source, output or archive
#[derive(Error, Debug)]
pub enum CsvError {
    /// Separator, quote and escape characters collide or are unusable.
    #[error("Invalid dialect: {0}")]
    InvalidDialect(DialectConflict),

    /// A single logical record spans more physical lines than allowed.
    ///
    /// `context` holds the field content buffered when the limit was hit.
    #[error("Row {row} spans more than {limit} lines")]
    MultilineLimitExceeded {
        row: u64,
        context: String,
        limit: usize,
    },

    /// The line source ran out while a quoted field was still open.
    #[error("Unterminated quoted field at row {row}")]
    UnterminatedQuotedField { row: u64, context: String },

    /// Quoting that the RFC 4180 dialect does not accept.
    #[error("Malformed field at row {row}: {fault}")]
    Malformed {
        row: u64,
        fault: ParseFault,
        context: String,
    },

    /// A record's width differs from the header's.
    #[error("Row {row} has {found} fields, header has {expected}")]
    FieldCountMismatch {
        row: u64,
        expected: usize,
        found: usize,
    },

    /// General I/O error from the line source or output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compressed archive could not be opened, read or finished.
    #[error("Compression error: {0}")]
    Compression(String),
}

impl CsvError {
    /// Logical row number for record-level errors
    pub fn row(&self) -> Option<u64> {
        match self {
            CsvError::MultilineLimitExceeded { row, .. }
            | CsvError::UnterminatedQuotedField { row, .. }
            | CsvError::Malformed { row, .. }
            | CsvError::FieldCountMismatch { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// Partial field content buffered when the error was raised
    pub fn context(&self) -> Option<&str> {
        match self {
            CsvError::MultilineLimitExceeded { context, .. }
            | CsvError::UnterminatedQuotedField { context, .. }
            | CsvError::Malformed { context, .. } => Some(context),
            _ => None,
        }
    }
}

/// Why a dialect was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectConflict {
    #[error("separator and quote are both {0:?}")]
    SeparatorIsQuote(char),
    #[error("separator and escape are both {0:?}")]
    SeparatorIsEscape(char),
    #[error("quote and escape are both {0:?}")]
    QuoteIsEscape(char),
    /// `\r` or `\n` used as separator, quote or escape
    #[error("{role} cannot be a line terminator ({ch:?})")]
    LineTerminator { role: &'static str, ch: char },
    /// The RFC 4180 dialect only escapes by doubling the quote
    #[error("RFC 4180 dialect has no escape character (got {0:?})")]
    EscapeInRfc4180(char),
    /// Strict quotes keep only quoted content, so quoting must be available
    #[error("strict quotes need an active quote character")]
    StrictQuotesWithoutQuoting,
}

/// Quoting faults rejected by the RFC 4180 dialect
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFault {
    /// Quote character inside an unquoted field
    #[error("quote character inside an unquoted field")]
    StrayQuote,
    /// Characters between a closing quote and the next separator
    #[error("text after closing quote")]
    TextAfterClosingQuote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_limit_display() {
        let error = CsvError::MultilineLimitExceeded {
            row: 7,
            context: "abc".to_string(),
            limit: 3,
        };
        assert_eq!(error.to_string(), "Row 7 spans more than 3 lines");
        assert_eq!(error.row(), Some(7));
        assert_eq!(error.context(), Some("abc"));
    }

    #[test]
    fn test_invalid_dialect_display() {
        let error = CsvError::InvalidDialect(DialectConflict::SeparatorIsQuote(','));
        assert_eq!(
            error.to_string(),
            "Invalid dialect: separator and quote are both ','"
        );
        assert_eq!(error.row(), None);
    }

    #[test]
    fn test_malformed_display() {
        let error = CsvError::Malformed {
            row: 2,
            fault: ParseFault::TextAfterClosingQuote,
            context: "abc".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Malformed field at row 2: text after closing quote"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: CsvError = io_error.into();
        assert!(matches!(error, CsvError::Io(_)));
        assert!(error.to_string().contains("IO error"));
        assert_eq!(error.context(), None);
    }
}
