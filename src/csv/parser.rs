//! Character-level CSV tokenizer
//!
//! [`CsvParser`] consumes one physical line at a time against a
//! [`ParseState`]. A line either completes a record or leaves the state
//! inside a quoted field (or after a trailing escape character), in which
//! case the caller feeds the next physical line. The newline between the two
//! lines is added to the field when the continuation line arrives.

use crate::dialect::DialectConfig;
use crate::error::{CsvError, ParseFault, Result};
use crate::types::Record;

/// Tokenizer position within the current field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    /// Nothing consumed for the current field
    #[default]
    FieldStart,
    InUnquotedField,
    InQuotedField,
    /// Quote seen inside a quoted field; the next character decides
    /// between a doubled quote and the end of the span
    QuoteSeenInQuoted,
    EscapeInQuoted,
    EscapeInUnquoted,
}

/// Outcome of feeding one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line ended the logical record
    Complete(Record),
    /// The record continues on the next physical line
    Continue,
}

/// Live tokenizer state for one logical record
///
/// Create one per parsing session and never share it between sessions.
/// It is reset after every completed record.
#[derive(Debug, Clone, Default)]
pub struct ParseState {
    state: State,
    field: String,
    record: Record,
    quoted: bool,
    lines: usize,
}

impl ParseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a record is waiting for its next physical line
    pub fn is_pending(&self) -> bool {
        matches!(
            self.state,
            State::InQuotedField | State::EscapeInQuoted | State::EscapeInUnquoted
        )
    }

    /// Content of the field being assembled
    pub fn pending_text(&self) -> &str {
        &self.field
    }

    /// Physical lines consumed for the current record
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Fields completed so far in the current record
    pub fn completed_fields(&self) -> usize {
        self.record.len()
    }

    /// Drop everything buffered for the current record
    pub fn reset(&mut self) {
        self.state = State::FieldStart;
        self.field.clear();
        self.record = Record::default();
        self.quoted = false;
        self.lines = 0;
    }

    fn end_field(&mut self, dialect: &DialectConfig) {
        let value = std::mem::take(&mut self.field);
        let value = if value.is_empty() && dialect.null_field_indicator().is_null(self.quoted) {
            None
        } else {
            Some(value)
        };
        self.record.push(value);
        self.quoted = false;
        self.state = State::FieldStart;
    }

    fn take_record(&mut self) -> Record {
        let record = std::mem::take(&mut self.record);
        self.reset();
        record
    }
}

/// CSV tokenizer for one dialect
///
/// The parser itself holds no mutable state and can be shared freely; all
/// progress lives in the [`ParseState`] passed to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser {
    dialect: DialectConfig,
}

impl CsvParser {
    /// Create a parser for a validated dialect
    pub fn new(dialect: DialectConfig) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &DialectConfig {
        &self.dialect
    }

    /// Parse a single line that must hold a complete record
    ///
    /// An open quoted field at the end of the line is reported as
    /// [`CsvError::UnterminatedQuotedField`].
    pub fn parse_line(&self, line: &str) -> Result<Record> {
        let mut state = ParseState::new();

        match self.feed_line(&mut state, line) {
            Ok(LineOutcome::Complete(record)) => Ok(record),
            Ok(LineOutcome::Continue) => {
                let context = state.pending_text().to_string();
                self.finish(&mut state)
                    .ok_or(CsvError::UnterminatedQuotedField { row: 1, context })
            }
            Err(fault) => Err(CsvError::Malformed {
                row: 1,
                fault,
                context: state.pending_text().to_string(),
            }),
        }
    }

    /// Consume one physical line (terminator already stripped)
    ///
    /// On error the state still holds the partial record so the caller can
    /// report it; reset it before parsing the next record.
    pub fn feed_line(
        &self,
        st: &mut ParseState,
        line: &str,
    ) -> std::result::Result<LineOutcome, ParseFault> {
        let d = &self.dialect;

        // Line break between the previous physical line and this one
        match st.state {
            State::InQuotedField => st.field.push('\n'),
            State::EscapeInQuoted => {
                st.field.push('\n');
                st.state = State::InQuotedField;
            }
            State::EscapeInUnquoted => {
                if !d.strict_quotes() {
                    st.field.push('\n');
                }
                st.state = State::InUnquotedField;
            }
            _ => {}
        }
        st.lines += 1;

        for c in line.chars() {
            match st.state {
                State::FieldStart => {
                    if c == d.separator() {
                        st.end_field(d);
                    } else if d.is_escape(c) {
                        st.state = State::EscapeInUnquoted;
                    } else if d.is_quote(c) {
                        st.quoted = true;
                        st.state = State::InQuotedField;
                    } else if d.ignore_leading_whitespace() && c.is_whitespace() {
                        // skip
                    } else {
                        if !d.strict_quotes() {
                            st.field.push(c);
                        }
                        st.state = State::InUnquotedField;
                    }
                }
                State::InUnquotedField => self.unquoted_char(st, c)?,
                State::InQuotedField => {
                    if d.is_quote(c) {
                        st.state = State::QuoteSeenInQuoted;
                    } else if d.is_escape(c) {
                        st.state = State::EscapeInQuoted;
                    } else {
                        st.field.push(c);
                    }
                }
                State::QuoteSeenInQuoted => {
                    if d.is_quote(c) {
                        st.field.push(c);
                        st.state = State::InQuotedField;
                    } else if c == d.separator() {
                        st.end_field(d);
                    } else if d.strict_quotes() {
                        // Span closed; trailing text is outside quotes
                        st.state = State::InUnquotedField;
                        self.unquoted_char(st, c)?;
                    } else if d.is_rfc4180() {
                        return Err(ParseFault::TextAfterClosingQuote);
                    } else {
                        // Lenient: the quote was literal, keep going unquoted
                        if let Some(q) = d.quote() {
                            st.field.push(q);
                        }
                        st.state = State::InUnquotedField;
                        self.unquoted_char(st, c)?;
                    }
                }
                State::EscapeInQuoted => {
                    st.field.push(c);
                    st.state = State::InQuotedField;
                }
                State::EscapeInUnquoted => {
                    if !d.strict_quotes() {
                        st.field.push(c);
                    }
                    st.state = State::InUnquotedField;
                }
            }
        }

        match st.state {
            State::InQuotedField | State::EscapeInQuoted | State::EscapeInUnquoted => {
                Ok(LineOutcome::Continue)
            }
            State::FieldStart | State::InUnquotedField | State::QuoteSeenInQuoted => {
                st.end_field(d);
                Ok(LineOutcome::Complete(st.take_record()))
            }
        }
    }

    /// Close the record when the line source is exhausted
    ///
    /// Returns `None` if a quoted field is still open. A trailing escape in
    /// an unquoted field just ends the field.
    pub fn finish(&self, st: &mut ParseState) -> Option<Record> {
        match st.state {
            State::InQuotedField | State::EscapeInQuoted => None,
            _ => {
                st.end_field(&self.dialect);
                Some(st.take_record())
            }
        }
    }

    fn unquoted_char(&self, st: &mut ParseState, c: char) -> std::result::Result<(), ParseFault> {
        let d = &self.dialect;
        if c == d.separator() {
            st.end_field(d);
        } else if d.is_escape(c) {
            st.state = State::EscapeInUnquoted;
        } else if d.is_quote(c) {
            if d.strict_quotes() {
                st.quoted = true;
                st.state = State::InQuotedField;
            } else if d.is_rfc4180() {
                return Err(ParseFault::StrayQuote);
            } else {
                st.field.push(c);
            }
        } else if !d.strict_quotes() {
            st.field.push(c);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::DialectBuilder;
    use crate::types::NullFieldIndicator;

    fn lenient() -> CsvParser {
        CsvParser::new(DialectConfig::lenient())
    }

    fn rfc() -> CsvParser {
        CsvParser::new(DialectConfig::rfc4180())
    }

    fn strings(parser: &CsvParser, line: &str) -> Vec<String> {
        parser.parse_line(line).unwrap().to_strings()
    }

    #[test]
    fn test_simple() {
        assert_eq!(strings(&lenient(), "a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted() {
        assert_eq!(strings(&lenient(), r#""a,b",c"#), vec!["a,b", "c"]);
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            strings(&rfc(), r#""Say ""Hello""",world"#),
            vec![r#"Say "Hello""#, "world"]
        );
        assert_eq!(
            strings(&lenient(), r#""Say ""Hello""",world"#),
            vec![r#"Say "Hello""#, "world"]
        );
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(strings(&lenient(), "a,,c"), vec!["a", "", "c"]);
        assert_eq!(strings(&rfc(), "a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_all_empty() {
        assert_eq!(strings(&lenient(), ",,"), vec!["", "", ""]);
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(strings(&lenient(), ""), vec![""]);
    }

    #[test]
    fn test_quoted_empty() {
        assert_eq!(strings(&lenient(), r#""","""#), vec!["", ""]);
    }

    #[test]
    fn test_custom_separator() {
        let parser = CsvParser::new(DialectBuilder::new().separator(';').build().unwrap());
        assert_eq!(strings(&parser, r#"a;"b;c";d"#), vec!["a", "b;c", "d"]);
    }

    #[test]
    fn test_tab_separator_not_skipped_as_whitespace() {
        let parser = CsvParser::new(DialectBuilder::new().separator('\t').build().unwrap());
        assert_eq!(strings(&parser, "a\t\tb"), vec!["a", "", "b"]);
    }

    #[test]
    fn test_leading_whitespace() {
        assert_eq!(strings(&lenient(), r#"a,  "b c",  d"#), vec!["a", "b c", "d"]);
        let keep = CsvParser::new(
            DialectBuilder::new()
                .ignore_leading_whitespace(false)
                .build()
                .unwrap(),
        );
        assert_eq!(strings(&keep, "a, b"), vec!["a", " b"]);
        // Quote after kept whitespace is literal in the lenient dialect
        assert_eq!(strings(&keep, r#"a, "b""#), vec!["a", r#" "b""#]);
    }

    #[test]
    fn test_escape_character() {
        assert_eq!(
            strings(&lenient(), r#""a\"b",c\,d,e\\f"#),
            vec![r#"a"b"#, "c,d", r#"e\f"#]
        );
        // The character after an escape is always literal
        assert_eq!(strings(&lenient(), r#"\q"#), vec!["q"]);
    }

    #[test]
    fn test_backslash_is_plain_in_rfc4180() {
        assert_eq!(strings(&rfc(), r#"a\b,"c\""#), vec![r#"a\b"#, r#"c\"#]);
    }

    #[test]
    fn test_text_after_closing_quote_lenient() {
        assert_eq!(strings(&lenient(), r#""abc"def,g"#), vec![r#"abc"def"#, "g"]);
        assert_eq!(strings(&lenient(), r#""abc" ,g"#), vec![r#"abc" "#, "g"]);
    }

    #[test]
    fn test_text_after_closing_quote_rfc4180() {
        let err = rfc().parse_line(r#""abc"def,g"#).unwrap_err();
        assert!(matches!(
            err,
            CsvError::Malformed {
                fault: ParseFault::TextAfterClosingQuote,
                ..
            }
        ));
    }

    #[test]
    fn test_stray_quote() {
        assert_eq!(strings(&lenient(), r#"ab"c,d"#), vec![r#"ab"c"#, "d"]);
        let err = rfc().parse_line(r#"ab"c,d"#).unwrap_err();
        assert!(matches!(
            err,
            CsvError::Malformed {
                fault: ParseFault::StrayQuote,
                ..
            }
        ));
    }

    #[test]
    fn test_strict_quotes_discards_outside_text() {
        let parser = CsvParser::new(DialectBuilder::new().strict_quotes(true).build().unwrap());
        assert_eq!(
            strings(&parser, r#"x"abc"y,"d"e"f",g"#),
            vec!["abc", "df", ""]
        );
    }

    #[test]
    fn test_ignore_quotations() {
        let parser = CsvParser::new(
            DialectBuilder::new()
                .ignore_quotations(true)
                .build()
                .unwrap(),
        );
        assert_eq!(strings(&parser, r#""a,b",c"#), vec![r#""a"#, r#"b""#, "c"]);
    }

    #[test]
    fn test_no_quote_character() {
        let parser = CsvParser::new(DialectBuilder::rfc4180().no_quote().build().unwrap());
        assert_eq!(strings(&parser, r#""a",b"#), vec![r#""a""#, "b"]);
    }

    #[test]
    fn test_null_field_indicator() {
        let parse = |indicator| {
            let parser = CsvParser::new(
                DialectBuilder::new()
                    .null_field_indicator(indicator)
                    .build()
                    .unwrap(),
            );
            parser.parse_line(r#"a,,"",b"#).unwrap().into_fields()
        };
        let s = |v: &str| Some(v.to_string());

        assert_eq!(parse(NullFieldIndicator::Neither), vec![s("a"), s(""), s(""), s("b")]);
        assert_eq!(
            parse(NullFieldIndicator::EmptySeparators),
            vec![s("a"), None, s(""), s("b")]
        );
        assert_eq!(
            parse(NullFieldIndicator::EmptyQuotes),
            vec![s("a"), s(""), None, s("b")]
        );
        assert_eq!(parse(NullFieldIndicator::Both), vec![s("a"), None, None, s("b")]);
    }

    #[test]
    fn test_multiline_continuation() {
        let parser = lenient();
        let mut state = ParseState::new();

        assert_eq!(
            parser.feed_line(&mut state, r#"a,"123"#).unwrap(),
            LineOutcome::Continue
        );
        assert!(state.is_pending());
        assert_eq!(state.pending_text(), "123");
        assert_eq!(state.completed_fields(), 1);

        let outcome = parser.feed_line(&mut state, r#"4567",c"#).unwrap();
        assert_eq!(
            outcome,
            LineOutcome::Complete(Record::from(vec!["a", "123\n4567", "c"]))
        );
        assert!(!state.is_pending());
        assert_eq!(state.lines(), 0);
    }

    #[test]
    fn test_escape_at_end_of_line_continues_unquoted() {
        let parser = lenient();
        let mut state = ParseState::new();

        assert_eq!(
            parser.feed_line(&mut state, r"a,b\").unwrap(),
            LineOutcome::Continue
        );
        let outcome = parser.feed_line(&mut state, "c,d").unwrap();
        assert_eq!(outcome, LineOutcome::Complete(Record::from(vec!["a", "b\nc", "d"])));
    }

    #[test]
    fn test_escape_at_end_of_input() {
        let parser = lenient();
        assert_eq!(strings(&parser, r"a,b\"), vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_single_line() {
        let err = lenient().parse_line(r#"a,"bc"#).unwrap_err();
        match err {
            CsvError::UnterminatedQuotedField { row, context } => {
                assert_eq!(row, 1);
                assert_eq!(context, "bc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_multibyte_separator_and_content() {
        let parser = CsvParser::new(DialectBuilder::new().separator('¦').build().unwrap());
        assert_eq!(strings(&parser, "héllo¦\"wörld¦x\""), vec!["héllo", "wörld¦x"]);
    }
}
