//! # Submission Core
//!
//! Data model for validating and round-tripping CoVIC-DB submissions.
//!
//! This crate holds the parts that need no spreadsheet library: rectangular
//! string tables and their TSV form, the `_id`/`_label` column convention,
//! grids of cells, field schemas, configuration and response envelopes.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Error types for submission handling
pub mod error;

/// Prefixes, identifiers and column-key conventions
pub mod names;

/// Rectangular tables of strings
pub mod table;

/// Cells and grids
pub mod grid;

/// HTML rendering of grids
pub mod html;

/// Field schemas for submission types
pub mod schema;

/// Submission configuration
pub mod configuration;

/// Response envelopes
pub mod response;

pub use configuration::SubmissionConfig;
pub use error::{Result, SubmissionError};
pub use grid::{Cell, CellStatus, Grid};
pub use names::PrefixMap;
pub use response::Response;
pub use schema::{Field, FieldSchema, FieldType};
pub use table::{Row, Table};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::configuration::SubmissionConfig;
    pub use crate::error::{Result, SubmissionError};
    pub use crate::grid::{Cell, CellStatus, Grid, error_cell, table_to_grid, value_cell};
    pub use crate::names::PrefixMap;
    pub use crate::response::Response;
    pub use crate::schema::{Field, FieldSchema, FieldType};
    pub use crate::table::{Row, Table, label_table, unlabel_table};
}
