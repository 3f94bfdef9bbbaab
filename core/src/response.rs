//! Response envelopes
//!
//! Every operation exposed to callers returns a [`Response`]: an HTTP-like
//! status with a message, and optionally validation errors, a table, a grid
//! and rendered content.

use crate::grid::{Grid, table_to_grid};
use crate::html::{escape_html, grid_to_html};
use crate::names::PrefixMap;
use crate::table::Table;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Status of a successful response
pub const STATUS_OK: u16 = 200;

/// Status of a failed response
pub const STATUS_BAD_REQUEST: u16 = 400;

/// MIME type of XLSX workbooks
pub const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of TSV tables
pub const TSV: &str = "text/tab-separated-values";

/// MIME type of HTML documents
pub const HTML: &str = "text/html";

/// Rendered output and its MIME type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// MIME type
    #[serde(rename = "content type")]
    pub content_type: String,

    /// Rendered bytes, base64 encoded in JSON
    #[serde(rename = "content", with = "base64_bytes")]
    pub bytes: Vec<u8>,
}

/// Status, message and optional payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// 200 on success, 400 on failure
    pub status: u16,

    /// Human-readable summary
    pub message: String,

    /// Validation errors; never present on success
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// Table payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,

    /// Grid payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,

    /// Rendered content; the content type is present iff the content is
    #[serde(flatten)]
    pub content: Option<Content>,
}

impl Response {
    /// A 200 response with message "Success"
    #[must_use]
    pub fn success() -> Self {
        Self::with_status(STATUS_OK, "Success")
    }

    /// A 400 response with a message
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::with_status(STATUS_BAD_REQUEST, message)
    }

    fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            errors: Vec::new(),
            table: None,
            grid: None,
            content: None,
        }
    }

    /// Whether the status is 200
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == STATUS_OK
    }

    /// Whether the status is not 200
    #[must_use]
    pub fn failed(&self) -> bool {
        !self.succeeded()
    }

    /// Replace the message
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach validation errors. Ignored on success responses.
    #[must_use]
    pub fn errors(mut self, errors: Vec<String>) -> Self {
        if self.failed() {
            self.errors = errors;
        }
        self
    }

    /// Attach a table
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.table = Some(table);
        self
    }

    /// Attach a grid
    #[must_use]
    pub fn grid(mut self, grid: Grid) -> Self {
        self.grid = Some(grid);
        self
    }

    /// Attach rendered content
    #[must_use]
    pub fn content(mut self, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.content = Some(Content {
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    /// MIME type of the content, if any
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content.as_ref().map(|c| c.content_type.as_str())
    }

    /// Render as an HTML fragment: message, errors, then the grid, or a
    /// grid built from the table when there is no grid.
    #[must_use]
    pub fn to_html(&self, prefixes: &PrefixMap, fields: &IndexMap<String, String>) -> String {
        let mut lines = vec!["<div>".to_string()];
        lines.push(format!("  <p>{}</p>", escape_html(&self.message)));
        if !self.errors.is_empty() {
            lines.push("  <p>Errors</p>".to_string());
            lines.push("  <ul>".to_string());
            for error in &self.errors {
                lines.push(format!("    <li>{}</li>", escape_html(error)));
            }
            lines.push("  </ul>".to_string());
        }
        if let Some(grid) = &self.grid {
            lines.push(grid_to_html(grid));
        } else if let Some(table) = &self.table {
            lines.push(grid_to_html(&table_to_grid(prefixes, fields, table)));
        }
        lines.push("</div>".to_string());
        lines.join("\n")
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
