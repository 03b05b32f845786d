//! Type definitions for CSV records

use std::fmt;

/// How empty fields map to null
///
/// An empty field can come from nothing between two separators (`a,,c`) or
/// from an explicitly quoted empty span (`a,"",c`). The indicator decides
/// which of the two are read as null (`None`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum NullFieldIndicator {
    /// Empty fields are always empty strings
    #[default]
    Neither,
    /// `a,,c` yields null, `a,"",c` yields an empty string
    EmptySeparators,
    /// `a,"",c` yields null, `a,,c` yields an empty string
    EmptyQuotes,
    /// Both kinds of empty field are null
    Both,
}

impl NullFieldIndicator {
    /// Whether an empty field of the given origin becomes null
    pub fn is_null(&self, quoted: bool) -> bool {
        match self {
            NullFieldIndicator::Neither => false,
            NullFieldIndicator::EmptySeparators => !quoted,
            NullFieldIndicator::EmptyQuotes => quoted,
            NullFieldIndicator::Both => true,
        }
    }
}

/// One logical CSV row
///
/// Fields are kept in order; a field is `None` when the dialect's
/// [`NullFieldIndicator`] mapped an empty field to null.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    fields: Vec<Option<String>>,
}

impl Record {
    /// Create a record from raw, possibly null, fields
    pub fn new(fields: Vec<Option<String>>) -> Self {
        Record { fields }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get field content; `None` for null fields and out-of-range indexes
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|f| f.as_deref())
    }

    /// Check if the field at `index` is null
    pub fn is_null(&self, index: usize) -> bool {
        matches!(self.fields.get(index), Some(None))
    }

    /// Iterate fields in order
    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.fields.iter().map(|f| f.as_deref())
    }

    /// Convert to strings, null fields become empty strings
    pub fn to_strings(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.clone().unwrap_or_default())
            .collect()
    }

    /// Consume the record and return its fields
    pub fn into_fields(self) -> Vec<Option<String>> {
        self.fields
    }

    pub(crate) fn push(&mut self, field: Option<String>) {
        self.fields.push(field);
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match field {
                Some(s) => write!(f, "{:?}", s)?,
                None => write!(f, "null")?,
            }
        }
        write!(f, "]")
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().map(|s| Some(s.into())).collect(),
        }
    }
}

impl From<Vec<String>> for Record {
    fn from(fields: Vec<String>) -> Self {
        fields.into_iter().collect()
    }
}

impl From<Vec<&str>> for Record {
    fn from(fields: Vec<&str>) -> Self {
        fields.into_iter().collect()
    }
}

impl From<Vec<Option<String>>> for Record {
    fn from(fields: Vec<Option<String>>) -> Self {
        Record::new(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_indicator() {
        assert!(!NullFieldIndicator::Neither.is_null(true));
        assert!(!NullFieldIndicator::Neither.is_null(false));
        assert!(NullFieldIndicator::EmptySeparators.is_null(false));
        assert!(!NullFieldIndicator::EmptySeparators.is_null(true));
        assert!(NullFieldIndicator::EmptyQuotes.is_null(true));
        assert!(!NullFieldIndicator::EmptyQuotes.is_null(false));
        assert!(NullFieldIndicator::Both.is_null(true));
        assert!(NullFieldIndicator::Both.is_null(false));
    }

    #[test]
    fn test_record_access() {
        let record = Record::new(vec![Some("a".to_string()), None, Some(String::new())]);
        assert_eq!(record.len(), 3);
        assert_eq!(record.get(0), Some("a"));
        assert_eq!(record.get(1), None);
        assert!(record.is_null(1));
        assert!(!record.is_null(2));
        assert!(!record.is_null(9));
        assert_eq!(record.to_strings(), vec!["a", "", ""]);
    }

    #[test]
    fn test_record_display() {
        let record = Record::new(vec![Some("a,b".to_string()), None]);
        assert_eq!(record.to_string(), r#"["a,b", null]"#);
    }

    #[test]
    fn test_record_from_strs() {
        let record = Record::from(vec!["x", "y"]);
        assert_eq!(record.iter().collect::<Vec<_>>(), vec![Some("x"), Some("y")]);
    }
}
