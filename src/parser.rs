//! Bulk INSERT tokenizer using nom.
//!
//! Parses one dump line into an [`InsertStatement`]:
//!
//! ```text
//! INSERT INTO `activos` VALUES (1,'A, B',NULL),(2,'C',3);
//! ─────┬───── ────┬──── ───┬── ──────────┬──────────────
//!      │          │        │             └── Row tuples
//!      │          │        └── Keyword
//!      │          └── Table identifier (optionally followed by a column list)
//!      └── Statement head
//! ```
//!
//! Quoted literals honour backslash escapes and doubled quotes, so commas
//! and parentheses inside strings never split a value.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{map, opt},
    error::{Error, ErrorKind},
    multi::{separated_list0, separated_list1},
    sequence::{delimited, pair},
    IResult,
};

use crate::ast::*;
use crate::error::{MigrateError, MigrateResult};

/// Parse a complete `INSERT INTO` line.
pub fn parse_insert(line: &str) -> MigrateResult<InsertStatement> {
    let input = line.trim();

    match insert_statement(input) {
        Ok((remaining, stmt)) if remaining.trim().is_empty() => Ok(stmt),
        Ok((remaining, _)) => Err(MigrateError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", preview(remaining)),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(MigrateError::parse(
            input.len() - e.input.len(),
            format!("Expected {:?} near '{}'", e.code, preview(e.input)),
        )),
        Err(nom::Err::Incomplete(_)) => Err(MigrateError::parse(input.len(), "Incomplete statement")),
    }
}

/// Parse only the row tuples of a `VALUES` list.
pub fn parse_rows(input: &str) -> MigrateResult<Vec<RowTuple>> {
    let trimmed = input.trim();
    match row_list(trimmed) {
        Ok((remaining, rows)) if remaining.trim().trim_end_matches(';').is_empty() => Ok(rows),
        Ok((remaining, _)) => Err(MigrateError::parse(
            trimmed.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", preview(remaining)),
        )),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(MigrateError::parse(
            trimmed.len() - e.input.len(),
            format!("Expected {:?} near '{}'", e.code, preview(e.input)),
        )),
        Err(nom::Err::Incomplete(_)) => Err(MigrateError::parse(trimmed.len(), "Incomplete row list")),
    }
}

fn preview(input: &str) -> &str {
    match input.char_indices().nth(40) {
        Some((i, _)) => &input[..i],
        None => input,
    }
}

/// `INSERT INTO <ident> [(<cols>)] VALUES <rows> [;]`
fn insert_statement(input: &str) -> IResult<&str, InsertStatement> {
    let (input, _) = tag_no_case("INSERT")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, _) = tag_no_case("INTO")(input)?;
    let (input, _) = multispace1(input)?;
    let (input, table) = identifier(input)?;
    let (input, _) = multispace0(input)?;
    let (input, columns) = opt(column_list)(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag_no_case("VALUES")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, rows) = row_list(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(char(';'))(input)?;

    Ok((
        input,
        InsertStatement {
            table: table.to_string(),
            columns: columns.unwrap_or_default(),
            rows,
        },
    ))
}

/// A backtick-quoted or plain identifier.
fn identifier(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('`'), take_while1(|c| c != '`'), char('`')),
        take_while1(|c: char| c.is_alphanumeric() || c == '_'),
    ))(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0)(input)
}

/// `(a, b, c)`
fn column_list(input: &str) -> IResult<&str, Vec<String>> {
    delimited(
        pair(char('('), multispace0),
        separated_list1(comma, map(identifier, String::from)),
        pair(multispace0, char(')')),
    )(input)
}

fn row_list(input: &str) -> IResult<&str, Vec<RowTuple>> {
    separated_list1(comma, row_tuple)(input)
}

/// `(v1,v2,...)`
fn row_tuple(input: &str) -> IResult<&str, RowTuple> {
    map(
        delimited(
            pair(char('('), multispace0),
            separated_list0(comma, sql_value),
            pair(multispace0, char(')')),
        ),
        RowTuple::new,
    )(input)
}

fn sql_value(input: &str) -> IResult<&str, SqlValue> {
    alt((
        map(quoted_literal, |s: &str| SqlValue::Quoted(s.to_string())),
        map(bare_token, |s: &str| {
            if s.eq_ignore_ascii_case("NULL") {
                SqlValue::Null
            } else {
                SqlValue::Bare(s.to_string())
            }
        }),
    ))(input)
}

fn bare_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !matches!(c, ',' | '(' | ')' | '\'') && !c.is_whitespace())(input)
}

/// A single-quoted literal. Returns the inner text with escapes untouched.
fn quoted_literal(input: &str) -> IResult<&str, &str> {
    let Some(body) = input.strip_prefix('\'') else {
        return Err(nom::Err::Error(Error::new(input, ErrorKind::Char)));
    };

    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\'' if body[i + 1..].starts_with('\'') => {
                chars.next();
            }
            '\'' => return Ok((&body[i + 1..], &body[..i])),
            _ => {}
        }
    }

    // Unterminated literal
    Err(nom::Err::Failure(Error::new(input, ErrorKind::Escaped)))
}
