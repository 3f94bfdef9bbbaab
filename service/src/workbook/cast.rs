use submission_core::error::{Result, SubmissionError};

/// Maximum number of columns in a worksheet
pub const MAX_COLUMNS: usize = 16_384;

/// Maximum number of rows in a worksheet
pub const MAX_ROWS: usize = 1_048_576;

/// Safely cast usize to u16 for worksheet column indices.
pub(crate) fn usize_to_u16_column(value: usize) -> Result<u16> {
    if value >= MAX_COLUMNS {
        return Err(SubmissionError::workbook(format!(
            "Too many columns for a worksheet: {value} (max: {MAX_COLUMNS})"
        )));
    }

    u16::try_from(value)
        .map_err(|_| SubmissionError::workbook(format!("Column index {value} cannot fit in u16")))
}

/// Safely cast usize to u32 for worksheet row indices.
pub(crate) fn usize_to_u32_row(value: usize) -> Result<u32> {
    if value >= MAX_ROWS {
        return Err(SubmissionError::workbook(format!(
            "Too many rows for a worksheet: {value} (max: {MAX_ROWS})"
        )));
    }

    u32::try_from(value)
        .map_err(|_| SubmissionError::workbook(format!("Row index {value} cannot fit in u32")))
}
