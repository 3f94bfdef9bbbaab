//! XLSX rendering and reading for grids and tables

pub mod address;
pub(crate) mod cast;
pub mod config;
pub mod features;
pub mod reader;
pub mod writer;

pub use address::{column_letter, parse_cell_ref};
pub use config::WorkbookConfig;
pub use features::WorkbookFeatures;
pub use reader::{active_sheet, data_to_string, read_xlsx, read_xlsx_path};
pub use writer::WorkbookWriter;

use std::path::Path;
use submission_core::error::Result;
use submission_core::grid::Grid;

/// Render grids to workbook bytes with the given configuration.
///
/// # Errors
///
/// Returns a workbook error if rendering fails.
pub fn render(grids: &[Grid], config: &WorkbookConfig) -> Result<Vec<u8>> {
    WorkbookWriter::with_config(config.clone()).write_buffer(grids)
}

/// Render grids to a workbook file with the given configuration.
///
/// # Errors
///
/// Returns a workbook error if rendering or saving fails.
pub fn render_to_path(
    grids: &[Grid],
    config: &WorkbookConfig,
    path: impl AsRef<Path>,
) -> Result<()> {
    WorkbookWriter::with_config(config.clone()).write_path(grids, path)
}
