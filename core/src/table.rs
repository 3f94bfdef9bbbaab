//! Rectangular tables of strings
//!
//! A [`Table`] is a list of [`Row`]s that all share the same, identically
//! ordered keys, and whose values are all strings. An empty string means
//! "no value". Tables are stored on disk as TSV.
//!
//! A *concise* table has no `_label` columns. A *labelled* table pairs every
//! `_id` column with a `_label` column; [`label_table`] and
//! [`unlabel_table`] convert between the two shapes.

use crate::error::{Result, SubmissionError};
use crate::names::{id_key_to_label_key, is_id_key, is_label_key, label_key_to_id_key};
use csv::{ReaderBuilder, Terminator, WriterBuilder};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;

/// One record: an ordered map from column key to string value
pub type Row = IndexMap<String, String>;

/// Map from identifier to label
pub type LabelMap = IndexMap<String, String>;

/// An ordered list of rows with identical keys
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Row>", into = "Vec<Row>")]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Build a table, checking that every row has the keys of the first row
    /// in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InvalidTable`] naming the first row whose
    /// keys differ.
    pub fn new(rows: Vec<Row>) -> Result<Self> {
        if let Some(first) = rows.first() {
            for (i, row) in rows.iter().enumerate().skip(1) {
                if !row.keys().eq(first.keys()) {
                    return Err(SubmissionError::invalid_table_row(
                        i,
                        format!("Keys for row 0 do not match keys for row {i}"),
                    ));
                }
            }
        }
        Ok(Self { rows })
    }

    /// The empty table
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a table from a header and rows of values.
    ///
    /// # Errors
    ///
    /// Returns an error when a row does not have one value per header, or
    /// when the header repeats a key.
    pub fn from_lists(header: &[String], values: Vec<Vec<String>>) -> Result<Self> {
        let mut rows = Vec::with_capacity(values.len());
        for (i, record) in values.into_iter().enumerate() {
            if record.len() != header.len() {
                return Err(SubmissionError::invalid_table_row(
                    i,
                    format!(
                        "Row {i} has {} values but the header has {} columns",
                        record.len(),
                        header.len()
                    ),
                ));
            }
            let row: Row = header.iter().cloned().zip(record).collect();
            if row.len() != header.len() {
                return Err(SubmissionError::invalid_table("Header contains duplicate keys"));
            }
            rows.push(row);
        }
        Ok(Self { rows })
    }

    /// Rows that are already known to share keys
    pub(crate) fn from_rows_unchecked(rows: Vec<Row>) -> Self {
        debug_assert!(Self::new(rows.clone()).is_ok());
        Self { rows }
    }

    /// Column keys, in order. Empty for the empty table.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.rows
            .first()
            .into_iter()
            .flat_map(|row| row.keys().map(String::as_str))
    }

    /// Whether the table has a column with this key
    #[must_use]
    pub fn has_column(&self, key: &str) -> bool {
        self.rows.first().is_some_and(|row| row.contains_key(key))
    }

    /// The rows of the table
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Iterate over the rows
    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Consume the table, returning its rows
    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at an index
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// A copy of this table without rows whose values all trim to empty
    #[must_use]
    pub fn without_blank_rows(&self) -> Self {
        Self {
            rows: self
                .rows
                .iter()
                .filter(|row| !is_blank_row(row))
                .cloned()
                .collect(),
        }
    }

    /// Header row followed by value rows. The empty table gives no lists.
    #[must_use]
    pub fn to_lists(&self) -> Vec<Vec<String>> {
        let mut lists = Vec::with_capacity(self.rows.len() + 1);
        if let Some(first) = self.rows.first() {
            lists.push(first.keys().cloned().collect());
        }
        for row in &self.rows {
            lists.push(row.values().cloned().collect());
        }
        lists
    }
}

impl TryFrom<Vec<Row>> for Table {
    type Error = SubmissionError;

    fn try_from(rows: Vec<Row>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<Table> for Vec<Row> {
    fn from(table: Table) -> Self {
        table.rows
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Whether every value in the row trims to the empty string
#[must_use]
pub fn is_blank_row(row: &Row) -> bool {
    row.values().all(|value| value.trim().is_empty())
}

// TSV

/// Read a TSV table from a reader. The first line is the header.
///
/// Short lines are padded with empty strings and extra trailing fields are
/// dropped, so the result is always rectangular.
///
/// # Errors
///
/// Returns an error if the input is not readable as TSV.
pub fn read_tsv_from<R: Read>(reader: R) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = header
            .iter()
            .enumerate()
            .map(|(i, key)| (key.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        rows.push(row);
    }
    Table::new(rows)
}

/// Read a TSV table from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or parsed.
pub fn read_tsv(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        SubmissionError::parse_at(format!("Failed to open TSV: {e}"), path.display().to_string())
    })?;
    read_tsv_from(file)
}

/// Write a table as TSV with `\n` line endings.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tsv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);
    for list in table.to_lists() {
        writer.write_record(&list)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a table to a TSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_tsv_path(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_tsv(table, file)
}

/// Render a table as a TSV string
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn table_to_tsv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_tsv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| SubmissionError::Serialization(e.to_string()))
}

// Concise and labelled tables

/// `None` if the table is concise, otherwise a message naming the first
/// `_label` key.
#[must_use]
pub fn validate_concise_table(table: &Table) -> Option<String> {
    table
        .columns()
        .find(|key| is_label_key(key))
        .map(|key| format!("Key {key} not allowed in concise table"))
}

/// Whether the table has no `_label` columns
#[must_use]
pub fn is_concise_table(table: &Table) -> bool {
    validate_concise_table(table).is_none()
}

/// `None` if every `_id` column has a `_label` column and vice versa,
/// otherwise a message naming the unpaired key.
#[must_use]
pub fn validate_labelled_table(table: &Table) -> Option<String> {
    for key in table.columns() {
        if is_id_key(key) {
            let label_key = id_key_to_label_key(key);
            if !table.has_column(&label_key) {
                return Some(format!(
                    "ID key {key} does not have corresponding label key {label_key}"
                ));
            }
        } else if is_label_key(key) {
            let id_key = label_key_to_id_key(key);
            if !table.has_column(&id_key) {
                return Some(format!(
                    "Label key {key} does not have corresponding id key {id_key}"
                ));
            }
        }
    }
    None
}

/// Whether every identifier column is paired with a label column
#[must_use]
pub fn is_labelled_table(table: &Table) -> bool {
    validate_labelled_table(table).is_none()
}

/// Insert a `_label` column after every `_id` column that lacks one.
///
/// Labels are looked up in `labels`; unknown identifiers get an empty
/// label. Existing `_label` columns are never overwritten.
#[must_use]
pub fn label_table(labels: &LabelMap, table: &Table) -> Table {
    let rows = table
        .iter()
        .map(|row| {
            let mut labelled = Row::with_capacity(row.len() * 2);
            for (key, value) in row {
                labelled.insert(key.clone(), value.clone());
                if is_id_key(key) {
                    let label_key = id_key_to_label_key(key);
                    if !row.contains_key(&label_key) {
                        let label = labels.get(value).cloned().unwrap_or_default();
                        labelled.insert(label_key, label);
                    }
                }
            }
            labelled
        })
        .collect();
    Table::from_rows_unchecked(rows)
}

/// Remove every `_label` column.
///
/// Only keys with the full `_label` suffix are removed; a key such as
/// `relabel` is kept.
#[must_use]
pub fn unlabel_table(table: &Table) -> Table {
    let rows = table
        .iter()
        .map(|row| {
            row.iter()
                .filter(|(key, _)| !is_label_key(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
        .collect();
    Table::from_rows_unchecked(rows)
}
