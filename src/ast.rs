//! Textual model of a dump script.
//!
//! A dump is a sequence of lines; the only lines the migration cares about
//! are `LOCK TABLES`, bulk `INSERT INTO ... VALUES (...),(...);` and
//! `UNLOCK TABLES`. Inserts are tokenized into [`InsertStatement`]s whose
//! values keep their literal text so they can be written back unchanged.

use std::fmt;

/// Kind of a dump line, decided by the marker it contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Lock,
    Insert,
    Unlock,
    Other,
}

impl StatementKind {
    /// Classify a single dump line.
    pub fn of(line: &str) -> Self {
        if line.contains("UNLOCK TABLES") {
            StatementKind::Unlock
        } else if line.contains("LOCK TABLES") {
            StatementKind::Lock
        } else if line.contains("INSERT INTO") {
            StatementKind::Insert
        } else {
            StatementKind::Other
        }
    }

    /// Whether the line survives the statement filter.
    pub fn is_kept(self) -> bool {
        !matches!(self, StatementKind::Other)
    }
}

/// One value inside a row tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    /// The `NULL` marker.
    Null,
    /// A single-quoted literal; holds the inner text exactly as written.
    Quoted(String),
    /// Anything unquoted: numbers, hex literals, keywords.
    Bare(String),
}

impl SqlValue {
    /// Build a bare value.
    pub fn bare(raw: impl Into<String>) -> Self {
        SqlValue::Bare(raw.into())
    }

    /// Build a quoted value from already-escaped inner text.
    pub fn quoted_raw(raw: impl Into<String>) -> Self {
        SqlValue::Quoted(raw.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Text used as a key in value dictionaries.
    pub fn lookup_key(&self) -> &str {
        match self {
            SqlValue::Null => "NULL",
            SqlValue::Quoted(s) | SqlValue::Bare(s) => s,
        }
    }

    /// Force a string literal. `NULL` stays `NULL`.
    pub fn quoted(self) -> Self {
        match self {
            SqlValue::Bare(s) => SqlValue::Quoted(s),
            other => other,
        }
    }

    /// Drop the quotes of a literal.
    pub fn unquoted(self) -> Self {
        match self {
            SqlValue::Quoted(s) => SqlValue::Bare(s),
            other => other,
        }
    }

    /// Replace `NULL` or an empty literal with a bare default.
    pub fn or_default(self, default: &str) -> Self {
        let blank = match &self {
            SqlValue::Null => true,
            SqlValue::Quoted(s) | SqlValue::Bare(s) => s.trim().is_empty(),
        };
        if blank { SqlValue::bare(default) } else { self }
    }

    /// Remove every occurrence of a unit suffix such as `%`.
    pub fn without(self, unit: &str) -> Self {
        match self {
            SqlValue::Quoted(s) => SqlValue::Quoted(s.replace(unit, "").trim().to_string()),
            SqlValue::Bare(s) => SqlValue::Bare(s.replace(unit, "").trim().to_string()),
            SqlValue::Null => SqlValue::Null,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Quoted(s) => write!(f, "'{}'", s),
            SqlValue::Bare(s) => write!(f, "{}", s),
        }
    }
}

/// One parenthesized group of values.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowTuple {
    pub values: Vec<SqlValue>,
}

impl RowTuple {
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Vec<SqlValue>> for RowTuple {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}

/// A bulk insert: `INSERT INTO <table> [(<columns>)] VALUES <rows>;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<RowTuple>,
}

impl InsertStatement {
    pub fn new(table: impl Into<String>, columns: Vec<String>, rows: Vec<RowTuple>) -> Self {
        Self {
            table: table.into(),
            columns,
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_lines() {
        assert_eq!(StatementKind::of("LOCK TABLES `activos` WRITE;"), StatementKind::Lock);
        assert_eq!(StatementKind::of("UNLOCK TABLES;"), StatementKind::Unlock);
        assert_eq!(
            StatementKind::of("INSERT INTO `activos` VALUES (1);"),
            StatementKind::Insert
        );
        assert_eq!(StatementKind::of("-- Dump completed"), StatementKind::Other);
        assert!(!StatementKind::of("/*!40101 SET NAMES utf8 */;").is_kept());
    }

    #[test]
    fn test_value_edits() {
        assert_eq!(SqlValue::bare("5").quoted(), SqlValue::quoted_raw("5"));
        assert_eq!(SqlValue::Null.quoted(), SqlValue::Null);
        assert_eq!(SqlValue::quoted_raw("7").unquoted(), SqlValue::bare("7"));
        assert_eq!(SqlValue::Null.or_default("0"), SqlValue::bare("0"));
        assert_eq!(SqlValue::quoted_raw("").or_default("0"), SqlValue::bare("0"));
        assert_eq!(SqlValue::bare("3").or_default("0"), SqlValue::bare("3"));
        assert_eq!(
            SqlValue::quoted_raw("50%").without("%").unquoted(),
            SqlValue::bare("50")
        );
    }

    #[test]
    fn test_lookup_key() {
        assert_eq!(SqlValue::Null.lookup_key(), "NULL");
        assert_eq!(SqlValue::quoted_raw("MC").lookup_key(), "MC");
        assert_eq!(SqlValue::bare("14").lookup_key(), "14");
    }

    #[test]
    fn test_display() {
        assert_eq!(SqlValue::quoted_raw("it\\'s").to_string(), "'it\\'s'");
        assert_eq!(SqlValue::Null.to_string(), "NULL");
    }
}
