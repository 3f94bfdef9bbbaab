//! Render grids to an XLSX workbook
//!
//! One worksheet per grid, in order. Header cells are bold and size their
//! column; data cells carry error fills and notes. Sheet settings (active
//! sheet, selection, protection) are applied from the grid flags.

use super::address::parse_cell_ref;
use super::cast::{usize_to_u16_column, usize_to_u32_row};
use super::config::WorkbookConfig;
use super::features::WorkbookFeatures;
use rust_xlsxwriter::{
    Color, DataValidation, Format, Formula, Note, ProtectionOptions, Workbook, Worksheet,
    XlsxError,
};
use std::path::Path;
use submission_core::error::{Result, SubmissionError};
use submission_core::grid::{Cell, Grid};
use tracing::debug;

fn xlsx_error(err: XlsxError) -> SubmissionError {
    SubmissionError::workbook(err.to_string())
}

fn text_width(text: &str) -> f64 {
    f64::from(u32::try_from(text.chars().count()).unwrap_or(u32::MAX))
}

/// Writes grids to XLSX workbooks
#[derive(Debug, Clone, Default)]
pub struct WorkbookWriter {
    config: WorkbookConfig,
}

impl WorkbookWriter {
    /// Create a writer with default styling
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with the given configuration
    #[must_use]
    pub fn with_config(config: WorkbookConfig) -> Self {
        Self { config }
    }

    /// The writer configuration
    #[must_use]
    pub fn config(&self) -> &WorkbookConfig {
        &self.config
    }

    /// Render grids to workbook bytes.
    ///
    /// # Errors
    ///
    /// Returns a workbook error if a sheet cannot be built or saved.
    pub fn write_buffer(&self, grids: &[Grid]) -> Result<Vec<u8>> {
        self.build(grids)?.save_to_buffer().map_err(xlsx_error)
    }

    /// Render grids to a workbook file.
    ///
    /// # Errors
    ///
    /// Returns a workbook error if a sheet cannot be built or the file
    /// cannot be written.
    pub fn write_path(&self, grids: &[Grid], path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.build(grids)?.save(path).map_err(|e| {
            SubmissionError::workbook(format!("Failed to save {}: {e}", path.display()))
        })
    }

    fn build(&self, grids: &[Grid]) -> Result<Workbook> {
        let mut workbook = Workbook::new();
        let mut active_set = false;

        for (index, grid) in grids.iter().enumerate() {
            let mut worksheet = self.render_sheet(grid)?;
            let name = grid
                .title
                .clone()
                .unwrap_or_else(|| format!("Sheet{}", index + 1));
            worksheet.set_name(&name).map_err(xlsx_error)?;

            if grid.active && !active_set {
                worksheet.set_active(true);
                active_set = true;
            }
            debug!(sheet = %name, rows = grid.rows.len(), "Rendered sheet");
            workbook.push_worksheet(worksheet);
        }

        Ok(workbook)
    }

    fn render_sheet(&self, grid: &Grid) -> Result<Worksheet> {
        let mut worksheet = Worksheet::new();
        let protect = self.config.has(WorkbookFeatures::PROTECTION);
        let locked_headers = grid
            .headers
            .iter()
            .flatten()
            .flatten()
            .any(|cell| cell.locked);
        // Data stays editable when only the header cells are protected
        let unlock_data = protect && locked_headers && !grid.locked;

        let mut row_index = 0;
        if let Some(headers) = &grid.headers {
            for (i, header) in headers.iter().enumerate() {
                let row = usize_to_u32_row(row_index)?;
                for (j, cell) in header.iter().enumerate() {
                    let col = usize_to_u16_column(j)?;
                    self.write_header_cell(&mut worksheet, grid, row, col, cell, unlock_data)?;
                    if i == 0 {
                        let width = text_width(&cell.label).max(self.config.min_column_width);
                        worksheet.set_column_width(col, width).map_err(xlsx_error)?;
                        if unlock_data {
                            worksheet
                                .set_column_format(col, &Format::new().set_unlocked())
                                .map_err(xlsx_error)?;
                        }
                    }
                }
                row_index += 1;
            }
            if self.config.has(WorkbookFeatures::FREEZE_HEADERS) && row_index > 0 {
                worksheet
                    .set_freeze_panes(usize_to_u32_row(row_index)?, 0)
                    .map_err(xlsx_error)?;
            }
        }

        for cells in &grid.rows {
            let row = usize_to_u32_row(row_index)?;
            for (j, cell) in cells.iter().enumerate() {
                let col = usize_to_u16_column(j)?;
                self.write_data_cell(&mut worksheet, row, col, cell, unlock_data)?;
            }
            row_index += 1;
        }

        if let Some(reference) = &grid.active_cell {
            let (row, col) = parse_cell_ref(reference)?;
            worksheet
                .set_selection(row, col, row, col)
                .map_err(xlsx_error)?;
        }

        if protect {
            if grid.locked {
                worksheet.protect();
            } else if locked_headers {
                let mut options = ProtectionOptions::new();
                options.insert_rows = true;
                options.delete_rows = true;
                options.format_columns = true;
                worksheet.protect_with_options(&options);
            }
        }

        Ok(worksheet)
    }

    fn write_header_cell(
        &self,
        worksheet: &mut Worksheet,
        grid: &Grid,
        row: u32,
        col: u16,
        cell: &Cell,
        unlock_data: bool,
    ) -> Result<()> {
        let mut format = Format::new().set_bold();
        if unlock_data && !cell.locked {
            format = format.set_unlocked();
        }
        worksheet
            .write_string_with_format(row, col, &cell.label, &format)
            .map_err(xlsx_error)?;

        if self.config.has(WorkbookFeatures::NOTES)
            && let Some(comment) = &cell.comment
        {
            self.insert_note(worksheet, row, col, comment)?;
        }

        if self.config.has(WorkbookFeatures::DATA_VALIDATION)
            && let Some(source) = &cell.validation
        {
            let first_row = usize_to_u32_row(grid.header_count())?;
            let last_row = self.config.validation_rows.saturating_sub(1).max(first_row);
            let validation = DataValidation::new().allow_list_formula(Formula::new(source));
            worksheet
                .add_data_validation(first_row, col, last_row, col, &validation)
                .map_err(xlsx_error)?;
        }
        Ok(())
    }

    fn write_data_cell(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        col: u16,
        cell: &Cell,
        unlock_data: bool,
    ) -> Result<()> {
        let mut format = Format::new();
        let mut styled = false;
        if cell.is_error() {
            format = format.set_background_color(Color::RGB(self.config.error_fill_rgb()));
            styled = true;
        }
        if cell.bold {
            format = format.set_bold();
            styled = true;
        }
        if unlock_data {
            format = format.set_unlocked();
            styled = true;
        }

        let written = if styled {
            worksheet.write_string_with_format(row, col, &cell.label, &format)
        } else {
            worksheet.write_string(row, col, &cell.label)
        };
        written.map_err(xlsx_error)?;

        if self.config.has(WorkbookFeatures::NOTES)
            && let Some(comment) = &cell.comment
        {
            self.insert_note(worksheet, row, col, comment)?;
        }

        if let Some(width) = cell.width {
            worksheet.set_column_width(col, width).map_err(xlsx_error)?;
        }
        Ok(())
    }

    fn insert_note(&self, worksheet: &mut Worksheet, row: u32, col: u16, text: &str) -> Result<()> {
        let note = Note::new(text)
            .set_author(&self.config.note_author)
            .add_author_prefix(false);
        worksheet.insert_note(row, col, &note).map_err(xlsx_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use submission_core::grid::{error_cell, value_cells};

    #[test]
    fn test_write_buffer_is_zip() {
        let grid = Grid::with_header(value_cells(["X"]), vec![value_cells(["5"])]).titled("Data");
        let bytes = WorkbookWriter::new().write_buffer(&[grid]).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_full_template_renders() {
        let header = vec![
            Cell {
                locked: true,
                ..value_cells(["Name"]).remove(0)
            },
            Cell {
                validation: Some("=Terminology!$A$2:$A$3".to_string()),
                ..value_cells(["Host"]).remove(0)
            },
        ];
        let data = Grid {
            active: true,
            active_cell: Some("A2".to_string()),
            ..Grid::with_header(header, vec![vec![error_cell("", "Missing"), value_cells(["x"]).remove(0)]])
                .titled("Antibodies")
        };
        let terminology = Grid {
            locked: true,
            ..Grid::with_header(value_cells(["Host"]), vec![value_cells(["a"]), value_cells(["b"])])
                .titled("Terminology")
        };
        assert!(WorkbookWriter::new().write_buffer(&[data, terminology]).is_ok());
    }

    #[test]
    fn test_bad_active_cell() {
        let grid = Grid {
            active_cell: Some("nowhere".to_string()),
            ..Grid::new(vec![value_cells(["1"])])
        };
        assert!(WorkbookWriter::new().write_buffer(&[grid]).is_err());
    }
}
