//! Grids of cells
//!
//! A [`Grid`] is the presentation form shared by spreadsheet rendering, the
//! HTML preview and validation results: optional header rows and data rows
//! of [`Cell`]s, plus per-sheet display settings.

use crate::error::{Result, SubmissionError};
use crate::names::{PrefixMap, id_key_to_label_key, is_id_key, is_label_key, label_key_to_id_key};
use crate::table::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status flag carried by a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CellStatus {
    /// The cell failed validation; its comment explains why
    Error,
}

/// A value and its display label, with optional link, status and styling
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// The underlying value
    pub value: String,

    /// What is displayed for the value
    pub label: String,

    /// IRI that the value links to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iri: Option<String>,

    /// Validation status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CellStatus>,

    /// Explanatory note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Render in bold
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub bold: bool,

    /// Column width hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// Header cells only: protect this column's header from edits
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,

    /// Header cells only: source range of a dropdown list for the column,
    /// e.g. `=Terminology!$A$2:$A$4`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
}

/// A row of cells
pub type CellRow = Vec<Cell>;

/// `{value: v, label: v}`
#[must_use]
pub fn value_cell(value: impl Into<String>) -> Cell {
    let value = value.into();
    Cell {
        label: value.clone(),
        value,
        ..Cell::default()
    }
}

/// A value cell for each value
#[must_use]
pub fn value_cells<S: Into<String>>(values: impl IntoIterator<Item = S>) -> CellRow {
    values.into_iter().map(value_cell).collect()
}

/// A value cell carrying a note
#[must_use]
pub fn comment_cell(value: impl Into<String>, comment: impl Into<String>) -> Cell {
    Cell {
        comment: Some(comment.into()),
        ..value_cell(value)
    }
}

/// A value cell marked as an error, with the reason as its note
#[must_use]
pub fn error_cell(value: impl Into<String>, comment: impl Into<String>) -> Cell {
    Cell {
        status: Some(CellStatus::Error),
        ..comment_cell(value, comment)
    }
}

impl Cell {
    /// Whether the cell is marked as an error
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == Some(CellStatus::Error)
    }

    /// Set the IRI
    #[must_use]
    pub fn with_iri(mut self, iri: impl Into<String>) -> Self {
        self.iri = Some(iri.into());
        self
    }

    /// Set the bold flag
    #[must_use]
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the column width hint
    #[must_use]
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// `None` if the cell is well formed, otherwise a message
    #[must_use]
    pub fn validate(&self) -> Option<&'static str> {
        if self.is_error() && self.comment.is_none() {
            return Some("Cell has ERROR status but no comment");
        }
        None
    }
}

/// Header rows and data rows of cells, plus sheet display settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grid {
    /// Sheet title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Whether this sheet is the active sheet
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub active: bool,

    /// Selected cell in A1 notation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_cell: Option<String>,

    /// Whether the whole sheet is protected
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,

    /// Header rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<CellRow>>,

    /// Data rows
    #[serde(default)]
    pub rows: Vec<CellRow>,
}

impl Grid {
    /// A grid with data rows only
    #[must_use]
    pub fn new(rows: Vec<CellRow>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    /// A grid with one header row
    #[must_use]
    pub fn with_header(header: CellRow, rows: Vec<CellRow>) -> Self {
        Self {
            headers: Some(vec![header]),
            rows,
            ..Self::default()
        }
    }

    /// Set the sheet title
    #[must_use]
    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Number of header rows
    #[must_use]
    pub fn header_count(&self) -> usize {
        self.headers.as_ref().map_or(0, Vec::len)
    }

    /// Whether any data cell is marked as an error
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.rows.iter().flatten().any(Cell::is_error)
    }

    /// Check the grid invariants.
    ///
    /// Headers, when present, are a non-empty list of equal-length rows.
    /// Rows are a non-empty list of rows with that same length, so a grid
    /// without data rows is invalid. Every cell must be well formed.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InvalidGrid`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let mut width = None;

        if let Some(headers) = &self.headers {
            if headers.is_empty() {
                return Err(SubmissionError::invalid_grid("Grid 'headers' has no rows"));
            }
            check_rows("headers", headers, &mut width)?;
        }

        if self.rows.is_empty() {
            return Err(SubmissionError::invalid_grid("Grid 'rows' has no rows"));
        }
        check_rows("rows", &self.rows, &mut width)
    }

    /// Whether the grid satisfies [`Grid::validate`]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

fn check_rows(section: &str, rows: &[CellRow], width: &mut Option<usize>) -> Result<()> {
    for (i, row) in rows.iter().enumerate() {
        match width {
            Some(expected) if *expected != row.len() => {
                return Err(SubmissionError::invalid_grid(format!(
                    "Row {i} in '{section}' has {} cells, expected {expected}",
                    row.len()
                )));
            }
            Some(_) => {}
            None => *width = Some(row.len()),
        }
        for (j, cell) in row.iter().enumerate() {
            if let Some(problem) = cell.validate() {
                return Err(SubmissionError::invalid_grid(format!(
                    "Cell in '{section}' at row {i} column {j} is not valid: {problem}"
                )));
            }
        }
    }
    Ok(())
}

/// Build a grid from a (usually labelled) table.
///
/// One header row is derived from the columns, using `field_labels` for
/// display names. A `_label` column whose `_id` sibling is present gets no
/// column of its own: its value becomes the label of the `_id` cell, which
/// also links to the identifier's IRI.
#[must_use]
pub fn table_to_grid(
    prefixes: &PrefixMap,
    field_labels: &IndexMap<String, String>,
    table: &Table,
) -> Grid {
    if table.is_empty() {
        return Grid::default();
    }

    let folded = |key: &str| is_label_key(key) && table.has_column(&label_key_to_id_key(key));

    let header = table
        .columns()
        .filter(|key| !folded(key))
        .map(|key| {
            let label = field_labels.get(key).map_or(key, String::as_str);
            Cell {
                value: key.to_string(),
                label: label.to_string(),
                ..Cell::default()
            }
        })
        .collect();

    let rows = table
        .iter()
        .map(|row| {
            row.iter()
                .filter(|(key, _)| !folded(key))
                .map(|(key, value)| {
                    if is_id_key(key) {
                        let label = row
                            .get(&id_key_to_label_key(key))
                            .filter(|label| !label.trim().is_empty())
                            .unwrap_or(value);
                        Cell {
                            value: value.clone(),
                            label: label.clone(),
                            iri: Some(prefixes.id_to_iri(value)),
                            ..Cell::default()
                        }
                    } else {
                        value_cell(value.clone())
                    }
                })
                .collect()
        })
        .collect();

    Grid::with_header(header, rows)
}
