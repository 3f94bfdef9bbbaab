//! Submission operations returning response envelopes
//!
//! Every operation that can fail on user input returns a [`Response`]; a
//! failure becomes a status 400 envelope with a message rather than an
//! error.

use crate::store::{SubmissionStore, to_store_table};
use crate::template::{restore_blank_rows, schema_rows, template_grids};
use crate::validator::{Outcome, References, ValidationEngine};
use crate::workbook::{WorkbookConfig, WorkbookWriter, read_xlsx, read_xlsx_path};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use submission_core::configuration::SubmissionConfig;
use submission_core::error::{Result, SubmissionError};
use submission_core::grid::table_to_grid;
use submission_core::html::grid_to_html;
use submission_core::response::{self, Response};
use submission_core::schema::FieldSchema;
use submission_core::table::{Table, label_table, read_tsv, table_to_tsv_string};
use tracing::{debug, info, warn};

/// Formats a table can be converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertFormat {
    /// Tab-separated values
    Tsv,
    /// HTML table
    Html,
}

impl ConvertFormat {
    /// MIME type of converted content
    #[must_use]
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Tsv => response::TSV,
            Self::Html => response::HTML,
        }
    }
}

impl FromStr for ConvertFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(Self::Tsv),
            "html" => Ok(Self::Html),
            other => Err(format!("Unsupported format '{other}'")),
        }
    }
}

impl fmt::Display for ConvertFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tsv => write!(f, "tsv"),
            Self::Html => write!(f, "html"),
        }
    }
}

/// Read a table from an `.xlsx` or `.tsv` file.
///
/// # Errors
///
/// Returns a parse error for other extensions, otherwise whatever the
/// reader returns.
pub fn read_path(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Table> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);
    debug!(path = %path.display(), "Reading submission");
    match extension.as_deref() {
        Some("xlsx") => read_xlsx_path(path, sheet),
        Some("tsv" | "tab") => read_tsv(path),
        _ => Err(SubmissionError::parse_at(
            "Unsupported file type; expected .xlsx or .tsv",
            path.display().to_string(),
        )),
    }
}

/// Read a table from uploaded workbook bytes.
///
/// # Errors
///
/// See [`read_xlsx`].
pub fn read_bytes(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Table> {
    read_xlsx(bytes, sheet)
}

/// Submission operations over one configuration
#[derive(Debug, Clone)]
pub struct SubmissionService {
    config: SubmissionConfig,
    writer: WorkbookWriter,
}

impl SubmissionService {
    /// Create a service with default workbook styling
    #[must_use]
    pub fn new(config: SubmissionConfig) -> Self {
        Self::with_workbook_config(config, WorkbookConfig::default())
    }

    /// Create a service with the given workbook styling
    #[must_use]
    pub fn with_workbook_config(config: SubmissionConfig, workbook: WorkbookConfig) -> Self {
        Self {
            config,
            writer: WorkbookWriter::with_config(workbook),
        }
    }

    /// The submission configuration
    #[must_use]
    pub fn config(&self) -> &SubmissionConfig {
        &self.config
    }

    /// A blank submission template as workbook content
    #[must_use]
    pub fn template(&self, kind: &str) -> Response {
        self.fill(kind, &Table::empty())
    }

    /// A submission template pre-filled with the rows of a table, as
    /// workbook content
    #[must_use]
    pub fn fill(&self, kind: &str, table: &Table) -> Response {
        let result = self.config.schema(kind).and_then(|schema| {
            let grids = template_grids(schema, schema_rows(schema, table));
            self.writer.write_buffer(&grids)
        });
        match result {
            Ok(bytes) => Response::success().content(response::XLSX, bytes),
            Err(e) => failure(&e),
        }
    }

    /// Validate a table. A rejected table comes back with a highlighted
    /// workbook for the submitter to correct.
    #[must_use]
    pub fn validate(&self, kind: &str, table: &Table, references: &References) -> Response {
        match self.config.schema(kind) {
            Ok(schema) => {
                let outcome = self.run(schema, table, references);
                self.respond(schema, table, outcome)
            }
            Err(e) => failure(&e),
        }
    }

    /// Read a file and validate its table
    #[must_use]
    pub fn validate_path(
        &self,
        kind: &str,
        path: impl AsRef<Path>,
        references: &References,
    ) -> Response {
        let sheet = self.config.schema(kind).ok().map(|schema| schema.sheet.as_str());
        match read_path(path, sheet) {
            Ok(table) => self.validate(kind, &table, references),
            Err(e) => failure(&e),
        }
    }

    /// Validate uploaded workbook bytes
    #[must_use]
    pub fn validate_bytes(&self, kind: &str, bytes: Vec<u8>, references: &References) -> Response {
        let sheet = self.config.schema(kind).ok().map(|schema| schema.sheet.as_str());
        match read_bytes(bytes, sheet) {
            Ok(table) => self.validate(kind, &table, references),
            Err(e) => failure(&e),
        }
    }

    /// Add a label column for every identifier column
    #[must_use]
    pub fn expand(&self, table: &Table) -> Response {
        let labelled = label_table(&self.config.labels, table);
        let grid = table_to_grid(&self.config.prefixes, &self.config.fields, &labelled);
        Response::success().table(labelled).grid(grid)
    }

    /// Convert a table to TSV or HTML content
    #[must_use]
    pub fn convert(&self, table: &Table, format: ConvertFormat) -> Response {
        let bytes = match format {
            ConvertFormat::Tsv => match table_to_tsv_string(table) {
                Ok(tsv) => tsv.into_bytes(),
                Err(e) => return failure(&e),
            },
            ConvertFormat::Html => {
                let grid = table_to_grid(&self.config.prefixes, &self.config.fields, table);
                grid_to_html(&grid).into_bytes()
            }
        };
        Response::success()
            .table(table.clone())
            .content(format.content_type(), bytes)
    }

    /// Validate a table and, if accepted, append it to a store
    pub fn submit(
        &self,
        kind: &str,
        table: &Table,
        references: &References,
        store: &mut impl SubmissionStore,
    ) -> Response {
        let schema = match self.config.schema(kind) {
            Ok(schema) => schema,
            Err(e) => return failure(&e),
        };

        let outcome = self.run(schema, table, references);
        let Some(accepted) = outcome.accepted_table() else {
            return self.respond(schema, table, outcome);
        };

        let stored = to_store_table(schema, accepted)
            .and_then(|rows| store.append(&schema.name, &rows));
        match stored {
            Ok(stored) => {
                info!(kind = %schema.name, rows = stored.len(), "Accepted submission");
                Response::success()
                    .message(format!("Submitted {} {} rows", stored.len(), schema.name))
                    .table(stored)
            }
            Err(e) => failure(&e),
        }
    }

    fn run(&self, schema: &FieldSchema, table: &Table, references: &References) -> Outcome {
        ValidationEngine::new(&self.config.prefixes).validate(schema, table, references)
    }

    fn respond(&self, schema: &FieldSchema, table: &Table, outcome: Outcome) -> Response {
        if outcome.is_accepted() {
            return outcome.into_response();
        }

        let rows = restore_blank_rows(schema, table, &outcome.grid().rows);
        let grids = template_grids(schema, rows);
        let workbook = self.writer.write_buffer(&grids);
        let rejected = outcome.into_response();
        match workbook {
            Ok(bytes) => rejected.content(response::XLSX, bytes),
            Err(e) => {
                warn!(error = %e, "Could not render highlighted workbook");
                rejected
            }
        }
    }
}

fn failure(error: &SubmissionError) -> Response {
    debug!(%error, "Request failed");
    Response::failure(error.to_string())
}
