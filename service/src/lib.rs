//! # Submission Service
//!
//! Schema-driven validation and spreadsheet round-tripping for CoVIC-DB
//! submissions.
//!
//! ## Overview
//!
//! A submitter downloads a template workbook for a submission type, fills
//! it in and uploads it. The service reads the data sheet back into a
//! table, checks every cell against the type's field schema and either
//! accepts the table or returns a copy of the workbook with the invalid
//! cells highlighted and annotated, so nothing valid has to be entered
//! twice.
//!
//! - **Validation**: required, unique, terminology, typed and reference
//!   columns, with errors numbered by spreadsheet row
//! - **Workbooks**: templates with dropdowns, notes and protection, and a
//!   reader that turns a sheet back into a table
//! - **Envelopes**: every operation answers with a status 200 or 400
//!   [`Response`](submission_core::response::Response)
//!
//! ## Quick Start
//!
//! ```rust
//! use submission_service::prelude::*;
//!
//! let schema = FieldSchema::new(
//!     "antibodies",
//!     "Antibodies",
//!     vec![Field::new("ab_label", "Antibody name").required().unique()],
//! )?;
//! let table = Table::from_lists(
//!     &["Antibody name".to_string()],
//!     vec![vec!["Ab1".to_string()], vec!["Ab1".to_string()]],
//! )?;
//!
//! let prefixes = PrefixMap::new();
//! let outcome = ValidationEngine::new(&prefixes).validate(&schema, &table, &References::new());
//! assert_eq!(
//!     outcome.errors(),
//!     ["Error in row 3: Duplicate value 'Ab1' is not allowed in column 'Antibody name'"]
//! );
//! # Ok::<(), SubmissionError>(())
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Table validation against field schemas
pub mod validator;

/// XLSX rendering and reading
pub mod workbook;

/// Submission template grids
pub mod template;

/// Persistence boundary
pub mod store;

/// Operations returning response envelopes
pub mod api;

/// Command-line interface
pub mod cli;

pub use api::{ConvertFormat, SubmissionService};
pub use store::{MemoryStore, SubmissionStore};
pub use validator::{Outcome, References, ValidationEngine};
pub use workbook::{WorkbookConfig, WorkbookFeatures, WorkbookWriter};

/// Prelude module for convenient imports
pub mod prelude {
    pub use submission_core::prelude::*;

    pub use crate::api::{ConvertFormat, SubmissionService, read_bytes, read_path};
    pub use crate::store::{MemoryStore, SubmissionStore, to_store_table};
    pub use crate::template::template_grids;
    pub use crate::validator::{Outcome, References, ValidationEngine};
    pub use crate::workbook::{WorkbookConfig, WorkbookFeatures, WorkbookWriter, read_xlsx};
}
