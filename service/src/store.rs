//! Persistence boundary for accepted submissions
//!
//! Accepted tables are handed to a [`SubmissionStore`] keyed by value keys
//! rather than display labels. The store assigns identifiers and keeps an
//! append-only log.

use indexmap::IndexMap;
use std::collections::HashMap;
use submission_core::error::{Result, SubmissionError};
use submission_core::names::increment_id;
use submission_core::schema::FieldSchema;
use submission_core::table::{Row, Table, is_blank_row};
use tracing::info;

/// Key of the identifier column added to stored rows
pub const ID_COLUMN: &str = "id";

/// Rows keyed by the schema's value keys, in schema order, with values
/// trimmed and blank rows removed.
///
/// # Errors
///
/// Returns a table error if the result is not rectangular, which cannot
/// happen for rows built from one schema.
pub fn to_store_table(schema: &FieldSchema, table: &Table) -> Result<Table> {
    let rows = table
        .iter()
        .filter(|row| !is_blank_row(row))
        .map(|row| {
            schema
                .fields
                .iter()
                .map(|field| {
                    let value = row.get(&field.label).map_or("", |v| v.trim());
                    (field.value.clone(), value.to_string())
                })
                .collect::<Row>()
        })
        .collect();
    Table::new(rows)
}

/// Append-only storage of accepted submissions
pub trait SubmissionStore {
    /// Append the rows of a store table for a submission type, returning
    /// them with assigned identifiers.
    ///
    /// # Errors
    ///
    /// Returns a store error if the rows cannot be stored.
    fn append(&mut self, kind: &str, table: &Table) -> Result<Table>;

    /// Every row stored for a submission type, in append order
    fn rows(&self, kind: &str) -> Table;
}

/// One append to the log
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    /// Sequence number, starting at 1
    pub sequence: usize,
    /// Submission type
    pub kind: String,
    /// Stored rows, with identifiers
    pub table: Table,
}

/// A store that keeps its log in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    prefixes: IndexMap<String, String>,
    last_ids: HashMap<String, String>,
    log: Vec<Commit>,
}

impl MemoryStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `prefix` for identifiers of a submission type. Types without a
    /// registered prefix use their upper-cased name.
    #[must_use]
    pub fn with_prefix(mut self, kind: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.prefixes.insert(kind.into(), prefix.into());
        self
    }

    /// A store using each schema's `id_prefix`, where it has one
    #[must_use]
    pub fn for_schemas<'a>(schemas: impl IntoIterator<Item = &'a FieldSchema>) -> Self {
        schemas
            .into_iter()
            .fold(Self::new(), |store, schema| match &schema.id_prefix {
                Some(prefix) => store.with_prefix(&schema.name, prefix),
                None => store,
            })
    }

    /// The commits so far, oldest first
    #[must_use]
    pub fn log(&self) -> &[Commit] {
        &self.log
    }

    fn prefix(&self, kind: &str) -> String {
        self.prefixes
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_uppercase())
    }
}

impl SubmissionStore for MemoryStore {
    fn append(&mut self, kind: &str, table: &Table) -> Result<Table> {
        if table.is_empty() {
            return Err(SubmissionError::store(format!("No {kind} rows to store")));
        }
        if table.has_column(ID_COLUMN) {
            return Err(SubmissionError::store(format!(
                "Rows already have an '{ID_COLUMN}' column"
            )));
        }

        let mut last = self
            .last_ids
            .get(kind)
            .cloned()
            .unwrap_or_else(|| format!("{}:0", self.prefix(kind)));

        let mut rows = Vec::with_capacity(table.len());
        for row in table {
            last = increment_id(&last).map_err(|e| SubmissionError::store(e.to_string()))?;
            let mut stored = Row::with_capacity(row.len() + 1);
            stored.insert(ID_COLUMN.to_string(), last.clone());
            stored.extend(row.iter().map(|(k, v)| (k.clone(), v.clone())));
            rows.push(stored);
        }
        let stored = Table::new(rows)?;

        self.last_ids.insert(kind.to_string(), last);
        self.log.push(Commit {
            sequence: self.log.len() + 1,
            kind: kind.to_string(),
            table: stored.clone(),
        });
        info!(kind, rows = stored.len(), commit = self.log.len(), "Stored submission");
        Ok(stored)
    }

    fn rows(&self, kind: &str) -> Table {
        let rows: Vec<Row> = self
            .log
            .iter()
            .filter(|commit| commit.kind == kind)
            .flat_map(|commit| commit.table.iter().cloned())
            .collect();
        Table::new(rows).unwrap_or_default()
    }
}
