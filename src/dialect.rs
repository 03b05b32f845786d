//! CSV dialect configuration
//!
//! A [`DialectConfig`] is built once through [`DialectBuilder`], validated,
//! and then shared read-only by every parser, reader and writer. It is `Copy`,
//! so handing it to several concurrent sessions costs nothing.
//!
//! # Examples
//!
//! ```
//! use csvstream::{DialectBuilder, NullFieldIndicator};
//!
//! let dialect = DialectBuilder::new()
//!     .separator(';')
//!     .multiline_limit(10)
//!     .null_field_indicator(NullFieldIndicator::EmptySeparators)
//!     .build()
//!     .unwrap();
//! assert_eq!(dialect.separator(), ';');
//!
//! // Same separator and quote is rejected up front
//! assert!(DialectBuilder::new().separator('"').build().is_err());
//! ```

use crate::error::{CsvError, DialectConflict, Result};
use crate::types::NullFieldIndicator;

/// Default field separator
pub const DEFAULT_SEPARATOR: char = ',';
/// Default quote character
pub const DEFAULT_QUOTE: char = '"';
/// Default escape character of the lenient dialect
pub const DEFAULT_ESCAPE: char = '\\';

/// Escaping strategy, fixed when the dialect is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Escaping {
    /// Forgiving parsing; an optional escape character makes the next
    /// character literal, inside or outside quotes
    Lenient { escape: Option<char> },
    /// RFC 4180: a doubled quote is the only escape, malformed quoting is an error
    Rfc4180,
}

impl Escaping {
    /// Escape character, if the strategy has one
    pub fn escape(&self) -> Option<char> {
        match self {
            Escaping::Lenient { escape } => *escape,
            Escaping::Rfc4180 => None,
        }
    }
}

/// Immutable, validated dialect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectConfig {
    separator: char,
    quote: Option<char>,
    escaping: Escaping,
    strict_quotes: bool,
    ignore_leading_whitespace: bool,
    ignore_quotations: bool,
    keep_carriage_return: bool,
    multiline_limit: usize,
    null_field_indicator: NullFieldIndicator,
}

impl DialectConfig {
    /// Lenient dialect with all defaults
    pub fn lenient() -> Self {
        DialectConfig {
            separator: DEFAULT_SEPARATOR,
            quote: Some(DEFAULT_QUOTE),
            escaping: Escaping::Lenient {
                escape: Some(DEFAULT_ESCAPE),
            },
            strict_quotes: false,
            ignore_leading_whitespace: true,
            ignore_quotations: false,
            keep_carriage_return: false,
            multiline_limit: 0,
            null_field_indicator: NullFieldIndicator::Neither,
        }
    }

    /// RFC 4180 dialect with all defaults
    pub fn rfc4180() -> Self {
        DialectConfig {
            escaping: Escaping::Rfc4180,
            ignore_leading_whitespace: false,
            ..Self::lenient()
        }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Quote character; `None` when quoting is disabled
    pub fn quote(&self) -> Option<char> {
        self.quote
    }

    /// Escape character; always `None` for RFC 4180
    pub fn escape(&self) -> Option<char> {
        self.escaping.escape()
    }

    pub fn escaping(&self) -> Escaping {
        self.escaping
    }

    pub fn is_rfc4180(&self) -> bool {
        self.escaping == Escaping::Rfc4180
    }

    pub fn strict_quotes(&self) -> bool {
        self.strict_quotes
    }

    pub fn ignore_leading_whitespace(&self) -> bool {
        self.ignore_leading_whitespace
    }

    pub fn ignore_quotations(&self) -> bool {
        self.ignore_quotations
    }

    pub fn keep_carriage_return(&self) -> bool {
        self.keep_carriage_return
    }

    /// Maximum physical lines per record, `None` when unbounded
    pub fn multiline_limit(&self) -> Option<usize> {
        (self.multiline_limit > 0).then_some(self.multiline_limit)
    }

    pub fn null_field_indicator(&self) -> NullFieldIndicator {
        self.null_field_indicator
    }

    /// Whether quoting is in effect at all
    pub fn quoting_enabled(&self) -> bool {
        self.quote.is_some() && !self.ignore_quotations
    }

    /// True if `c` opens or closes a quoted span
    #[inline]
    pub(crate) fn is_quote(&self, c: char) -> bool {
        !self.ignore_quotations && self.quote == Some(c)
    }

    /// True if `c` is the active escape character
    #[inline]
    pub(crate) fn is_escape(&self, c: char) -> bool {
        self.escaping.escape() == Some(c)
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::lenient()
    }
}

/// Builder for [`DialectConfig`]
///
/// With the `serde` feature the builder can be deserialized from a config
/// file; [`build`](DialectBuilder::build) still validates the result.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DialectBuilder {
    separator: char,
    quote: Option<char>,
    escape: Option<char>,
    rfc4180: bool,
    strict_quotes: bool,
    ignore_leading_whitespace: bool,
    ignore_quotations: bool,
    keep_carriage_return: bool,
    multiline_limit: usize,
    null_field_indicator: NullFieldIndicator,
}

impl DialectBuilder {
    /// Start from the lenient defaults: `,` `"` `\`, leading whitespace ignored
    pub fn new() -> Self {
        DialectBuilder {
            separator: DEFAULT_SEPARATOR,
            quote: Some(DEFAULT_QUOTE),
            escape: Some(DEFAULT_ESCAPE),
            rfc4180: false,
            strict_quotes: false,
            ignore_leading_whitespace: true,
            ignore_quotations: false,
            keep_carriage_return: false,
            multiline_limit: 0,
            null_field_indicator: NullFieldIndicator::Neither,
        }
    }

    /// Start from the RFC 4180 defaults: no escape character, whitespace kept
    pub fn rfc4180() -> Self {
        DialectBuilder {
            escape: None,
            rfc4180: true,
            ignore_leading_whitespace: false,
            ..Self::new()
        }
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Disable quoting entirely
    pub fn no_quote(mut self) -> Self {
        self.quote = None;
        self
    }

    /// Set the escape character (lenient dialect only)
    pub fn escape(mut self, escape: char) -> Self {
        self.escape = Some(escape);
        self
    }

    /// Disable backslash-style escaping
    pub fn no_escape(mut self) -> Self {
        self.escape = None;
        self
    }

    /// Discard characters outside quoted spans
    pub fn strict_quotes(mut self, strict: bool) -> Self {
        self.strict_quotes = strict;
        self
    }

    /// Skip whitespace before a field or its opening quote
    pub fn ignore_leading_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_leading_whitespace = ignore;
        self
    }

    /// Treat the quote character as ordinary content
    pub fn ignore_quotations(mut self, ignore: bool) -> Self {
        self.ignore_quotations = ignore;
        self
    }

    /// Keep a trailing `\r` before the line terminator
    pub fn keep_carriage_return(mut self, keep: bool) -> Self {
        self.keep_carriage_return = keep;
        self
    }

    /// Maximum physical lines per record, 0 for unbounded
    pub fn multiline_limit(mut self, limit: usize) -> Self {
        self.multiline_limit = limit;
        self
    }

    pub fn null_field_indicator(mut self, indicator: NullFieldIndicator) -> Self {
        self.null_field_indicator = indicator;
        self
    }

    /// Validate and freeze the configuration
    pub fn build(&self) -> Result<DialectConfig> {
        self.validate().map_err(CsvError::InvalidDialect)?;

        let escaping = if self.rfc4180 {
            Escaping::Rfc4180
        } else {
            Escaping::Lenient {
                escape: self.escape,
            }
        };

        Ok(DialectConfig {
            separator: self.separator,
            quote: self.quote,
            escaping,
            strict_quotes: self.strict_quotes,
            ignore_leading_whitespace: self.ignore_leading_whitespace,
            ignore_quotations: self.ignore_quotations,
            keep_carriage_return: self.keep_carriage_return,
            multiline_limit: self.multiline_limit,
            null_field_indicator: self.null_field_indicator,
        })
    }

    fn validate(&self) -> std::result::Result<(), DialectConflict> {
        if let (true, Some(e)) = (self.rfc4180, self.escape) {
            return Err(DialectConflict::EscapeInRfc4180(e));
        }

        let quote = self.quote.filter(|_| !self.ignore_quotations);
        let roles = [
            ("separator", Some(self.separator)),
            ("quote", quote),
            ("escape", self.escape),
        ];
        for (role, ch) in roles {
            if let Some(ch @ ('\r' | '\n')) = ch {
                return Err(DialectConflict::LineTerminator { role, ch });
            }
        }

        if self.strict_quotes && quote.is_none() {
            return Err(DialectConflict::StrictQuotesWithoutQuoting);
        }

        if quote == Some(self.separator) {
            return Err(DialectConflict::SeparatorIsQuote(self.separator));
        }
        if self.escape == Some(self.separator) {
            return Err(DialectConflict::SeparatorIsEscape(self.separator));
        }
        if let (Some(q), Some(e)) = (quote, self.escape) {
            if q == e {
                return Err(DialectConflict::QuoteIsEscape(q));
            }
        }
        Ok(())
    }
}

impl Default for DialectBuilder {
    fn default() -> Self {
        Self::new()
    }
}
