//! SQL rendering for the dump AST.
//!
//! Converts rewritten statements back into script text.

use crate::ast::*;

/// Trait for converting AST nodes to SQL.
pub trait ToSql {
    /// Convert this node to a SQL string.
    fn to_sql(&self) -> String;
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> String {
        self.to_string()
    }
}

impl ToSql for RowTuple {
    fn to_sql(&self) -> String {
        let values: Vec<String> = self.values.iter().map(|v| v.to_sql()).collect();
        format!("({})", values.join(","))
    }
}

impl ToSql for InsertStatement {
    fn to_sql(&self) -> String {
        let mut sql = String::from("INSERT INTO `");
        sql.push_str(&self.table);
        sql.push('`');

        if !self.columns.is_empty() {
            sql.push_str(" (");
            sql.push_str(&self.columns.join(", "));
            sql.push(')');
        }

        sql.push_str(" VALUES ");
        let rows: Vec<String> = self.rows.iter().map(|r| r.to_sql()).collect();
        sql.push_str(&rows.join(","));
        sql.push(';');
        sql
    }
}

/// Replace the first backtick-quoted identifier of a line.
///
/// `replacement` is written verbatim, so it may carry a column list after
/// the new identifier. Lines without a complete identifier are returned as-is.
pub fn replace_first_identifier(line: &str, replacement: &str) -> String {
    let Some(start) = line.find('`') else {
        return line.to_string();
    };
    let Some(len) = line[start + 1..].find('`') else {
        return line.to_string();
    };
    let end = start + 1 + len + 1;

    let mut out = String::with_capacity(line.len() + replacement.len());
    out.push_str(&line[..start]);
    out.push_str(replacement);
    out.push_str(&line[end..]);
    out
}

/// `` `table` `` or `` `table` (a, b, c) ``
pub fn qualified_identifier(table: &str, columns: &[&str]) -> String {
    if columns.is_empty() {
        format!("`{}`", table)
    } else {
        format!("`{}` ({})", table, columns.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_to_sql() {
        let stmt = InsertStatement::new(
            "resoluciones",
            vec!["Id".into(), "DescripcionES".into()],
            vec![
                RowTuple::new(vec![SqlValue::bare("1"), SqlValue::quoted_raw("Ajuste")]),
                RowTuple::new(vec![SqlValue::bare("2"), SqlValue::Null]),
            ],
        );
        assert_eq!(
            stmt.to_sql(),
            "INSERT INTO `resoluciones` (Id, DescripcionES) VALUES (1,'Ajuste'),(2,NULL);"
        );
    }

    #[test]
    fn test_insert_without_columns() {
        let stmt = InsertStatement::new("t", vec![], vec![RowTuple::new(vec![SqlValue::bare("1")])]);
        assert_eq!(stmt.to_sql(), "INSERT INTO `t` VALUES (1);");
    }

    #[test]
    fn test_replace_first_identifier_only() {
        let line = "INSERT INTO `plantas` VALUES (1,'`quoted`');";
        assert_eq!(
            replace_first_identifier(line, "`plantas` (Id)"),
            "INSERT INTO `plantas` (Id) VALUES (1,'`quoted`');"
        );
    }

    #[test]
    fn test_replace_without_identifier() {
        assert_eq!(replace_first_identifier("UNLOCK TABLES;", "`x`"), "UNLOCK TABLES;");
    }

    #[test]
    fn test_qualified_identifier() {
        assert_eq!(qualified_identifier("estadosorden", &[]), "`estadosorden`");
        assert_eq!(qualified_identifier("r", &["Id", "A"]), "`r` (Id, A)");
    }
}
