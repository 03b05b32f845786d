//! CSV encoding: one record in, one correctly quoted line out

use crate::dialect::DialectConfig;
use crate::types::{NullFieldIndicator, Record};

/// CSV encoder for writing properly formatted CSV data
///
/// Output parsed back with the same dialect reproduces the input fields,
/// as long as no field carries a raw `\r` right before a line break.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvEncoder {
    dialect: DialectConfig,
    apply_quotes_to_all: bool,
}

impl CsvEncoder {
    /// Create a new CSV encoder for a dialect
    pub fn new(dialect: DialectConfig) -> Self {
        Self {
            dialect,
            apply_quotes_to_all: false,
        }
    }

    /// Quote every field, not only the ones that need it
    pub fn apply_quotes_to_all(mut self, all: bool) -> Self {
        self.apply_quotes_to_all = all;
        self
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    pub fn quotes_all(&self) -> bool {
        self.apply_quotes_to_all
    }

    /// Encode a row of non-null fields into buffer
    pub fn encode_row<I, S>(&self, fields: I, buffer: &mut String)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (i, field) in fields.into_iter().enumerate() {
            if i > 0 {
                buffer.push(self.dialect.separator());
            }
            self.encode_field(Some(field.as_ref()), buffer);
        }
    }

    /// Encode a record, honoring null fields
    pub fn encode_record(&self, record: &Record, buffer: &mut String) {
        for (i, field) in record.iter().enumerate() {
            if i > 0 {
                buffer.push(self.dialect.separator());
            }
            self.encode_field(field, buffer);
        }
    }

    /// Encode a row into a fresh line, without line terminator
    pub fn to_line<I, S>(&self, fields: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut line = String::new();
        self.encode_row(fields, &mut line);
        line
    }

    /// Encode single field with proper quoting/escaping
    fn encode_field(&self, field: Option<&str>, buffer: &mut String) {
        let d = &self.dialect;
        let nulls = d.null_field_indicator();

        let Some(field) = field else {
            // Null reads back as null only from the matching empty form
            if nulls == NullFieldIndicator::EmptyQuotes {
                if let Some(q) = d.quote().filter(|_| d.quoting_enabled()) {
                    buffer.push(q);
                    buffer.push(q);
                }
            }
            return;
        };

        let Some(quote) = d.quote().filter(|_| d.quoting_enabled()) else {
            self.encode_unquotable(field, buffer);
            return;
        };

        if self.needs_quoting(field) {
            buffer.push(quote);
            for c in field.chars() {
                if c == quote || d.is_escape(c) {
                    // Escape with the escape character, or double: " -> ""
                    buffer.push(d.escape().unwrap_or(quote));
                }
                buffer.push(c);
            }
            buffer.push(quote);
        } else {
            buffer.push_str(field);
        }
    }

    /// Check if field requires quoting
    fn needs_quoting(&self, field: &str) -> bool {
        let d = &self.dialect;
        let nulls = d.null_field_indicator();

        if field.is_empty() {
            // Keep "" apart from null where the indicator distinguishes them
            return match nulls {
                NullFieldIndicator::EmptySeparators => true,
                NullFieldIndicator::EmptyQuotes => false,
                _ => self.apply_quotes_to_all || d.strict_quotes(),
            };
        }

        self.apply_quotes_to_all
            || d.strict_quotes()
            || (d.ignore_leading_whitespace() && field.starts_with(char::is_whitespace))
            || field.chars().any(|c| {
                c == d.separator() || c == '\n' || c == '\r' || d.is_quote(c) || d.is_escape(c)
            })
    }

    /// Without quoting, the escape character is the only protection left
    fn encode_unquotable(&self, field: &str, buffer: &mut String) {
        let d = &self.dialect;
        let Some(escape) = d.escape() else {
            buffer.push_str(field);
            return;
        };

        for (i, c) in field.chars().enumerate() {
            let leading_ws = i == 0 && d.ignore_leading_whitespace() && c.is_whitespace();
            if c == d.separator() || c == escape || c == '\n' || c == '\r' || leading_ws {
                buffer.push(escape);
            }
            buffer.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::CsvParser;
    use crate::dialect::DialectBuilder;

    fn rfc() -> CsvEncoder {
        CsvEncoder::new(DialectConfig::rfc4180())
    }

    fn lenient() -> CsvEncoder {
        CsvEncoder::new(DialectConfig::lenient())
    }

    #[test]
    fn test_simple_fields() {
        assert_eq!(rfc().to_line(["a", "b", "c"]), "a,b,c");
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(rfc().to_line(["a,b", "c"]), r#""a,b",c"#);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            rfc().to_line([r#"he said "hi""#]),
            r#""he said ""hi""""#
        );
        assert_eq!(
            lenient().to_line([r#"he said "hi""#]),
            r#""he said \"hi\"""#
        );
    }

    #[test]
    fn test_escape_character_is_escaped() {
        assert_eq!(lenient().to_line([r"C:\temp", "x"]), r#""C:\\temp",x"#);
        // Plain content in RFC 4180
        assert_eq!(rfc().to_line([r"C:\temp"]), r"C:\temp");
    }

    #[test]
    fn test_newlines() {
        assert_eq!(
            rfc().to_line(["Line 1\nLine 2", "normal"]),
            "\"Line 1\nLine 2\",normal"
        );
        assert_eq!(rfc().to_line(["abc\r"]), "\"abc\r\"");
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(rfc().to_line(["a", "", "c"]), "a,,c");
        assert_eq!(rfc().to_line(["", "", ""]), ",,");
    }

    #[test]
    fn test_custom_separator() {
        let encoder = CsvEncoder::new(DialectBuilder::new().separator(';').build().unwrap());
        assert_eq!(encoder.to_line(["a", "b;c", "d"]), r#"a;"b;c";d"#);
    }

    #[test]
    fn test_apply_quotes_to_all() {
        let encoder = lenient().apply_quotes_to_all(true);
        assert_eq!(encoder.to_line(["a", "b", "abc\r"]), "\"a\",\"b\",\"abc\r\"");
        assert_eq!(encoder.to_line(["", "x"]), r#""","x""#);
    }

    #[test]
    fn test_leading_whitespace_quoted_when_ignored() {
        assert_eq!(lenient().to_line([" a", "b "]), r#"" a",b "#);
        assert_eq!(rfc().to_line([" a"]), " a");
    }

    #[test]
    fn test_strict_quotes_always_quotes() {
        let encoder = CsvEncoder::new(DialectBuilder::new().strict_quotes(true).build().unwrap());
        assert_eq!(encoder.to_line(["a", ""]), r#""a","""#);
    }

    #[test]
    fn test_null_fields() {
        let record = Record::new(vec![None, Some(String::new()), Some("x".to_string())]);
        let encode = |indicator| {
            let encoder = CsvEncoder::new(
                DialectBuilder::new()
                    .null_field_indicator(indicator)
                    .build()
                    .unwrap(),
            );
            let mut line = String::new();
            encoder.encode_record(&record, &mut line);
            line
        };

        assert_eq!(encode(NullFieldIndicator::Neither), ",,x");
        assert_eq!(encode(NullFieldIndicator::EmptySeparators), r#","",x"#);
        assert_eq!(encode(NullFieldIndicator::EmptyQuotes), r#""",,x"#);
        assert_eq!(encode(NullFieldIndicator::Both), ",,x");
    }

    #[test]
    fn test_null_fields_read_back() {
        let record = Record::new(vec![None, Some(String::new()), Some("x".to_string())]);
        for indicator in [
            NullFieldIndicator::EmptySeparators,
            NullFieldIndicator::EmptyQuotes,
        ] {
            let dialect = DialectBuilder::new()
                .null_field_indicator(indicator)
                .build()
                .unwrap();
            let mut line = String::new();
            CsvEncoder::new(dialect).encode_record(&record, &mut line);
            assert_eq!(CsvParser::new(dialect).parse_line(&line).unwrap(), record);
        }
    }

    #[test]
    fn test_without_quote_character_escapes() {
        let encoder = CsvEncoder::new(DialectBuilder::new().no_quote().build().unwrap());
        let line = encoder.to_line(["a,b", r#"say "x""#, " lead"]);
        assert_eq!(line, r#"a\,b,say "x",\ lead"#);

        let parser = CsvParser::new(*encoder.dialect());
        assert_eq!(
            parser.parse_line(&line).unwrap().to_strings(),
            vec!["a,b", r#"say "x""#, " lead"]
        );
    }

    #[test]
    fn test_without_quote_or_escape_is_verbatim() {
        let encoder = CsvEncoder::new(DialectBuilder::rfc4180().no_quote().build().unwrap());
        assert_eq!(encoder.to_line(["a,b", "c"]), "a,b,c");
    }

    #[test]
    fn test_quote_doubling_count() {
        let field = r#"""a"b""#;
        let line = rfc().to_line([field]);
        let inner = &line[1..line.len() - 1];
        assert_eq!(inner.matches('"').count(), 2 * field.matches('"').count());
    }
}
