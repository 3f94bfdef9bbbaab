//! Read a worksheet back into a table
//!
//! The first row of the sheet is the header; it ends at the first blank
//! cell. Missing cells read as empty strings and values keep their
//! surrounding whitespace. Without a sheet name the workbook's active sheet
//! is read.

use calamine::{Data, Range, Reader, Xlsx};
use quick_xml::events::Event;
use std::io::{Cursor, Read};
use std::path::Path;
use submission_core::error::{Result, SubmissionError};
use submission_core::table::Table;
use tracing::debug;
use zip::ZipArchive;

const WORKBOOK_PART: &str = "xl/workbook.xml";

/// String form of a spreadsheet cell
#[must_use]
pub fn data_to_string(data: &Data) -> String {
    match data {
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        // Serial day number, as Excel stores it
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(dt) => dt.clone(),
        Data::DurationIso(d) => d.clone(),
        Data::Error(e) => format!("ERROR: {e:?}"),
        Data::Empty => String::new(),
    }
}

/// Read a sheet of an XLSX workbook held in memory.
///
/// Without a sheet name the active sheet is read, or the first sheet if the
/// workbook does not record one.
///
/// # Errors
///
/// Returns a workbook error if the bytes are not a workbook or the sheet
/// does not exist, and a table error if the header repeats a column.
pub fn read_xlsx(bytes: Vec<u8>, sheet: Option<&str>) -> Result<Table> {
    let active = match sheet {
        Some(_) => None,
        None => active_sheet(&bytes)?,
    };
    let mut workbook = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| SubmissionError::workbook(format!("Failed to open workbook: {e}")))?;

    let sheet_names = workbook.sheet_names();
    let name = match sheet {
        Some(name) if sheet_names.iter().any(|n| n == name) => name.to_string(),
        Some(name) => {
            return Err(SubmissionError::workbook(format!(
                "Sheet '{name}' not found in workbook"
            )));
        }
        None => active
            .filter(|name| sheet_names.contains(name))
            .or_else(|| sheet_names.first().cloned())
            .ok_or_else(|| SubmissionError::workbook("Workbook has no sheets"))?,
    };

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| SubmissionError::workbook(format!("Failed to read sheet '{name}': {e}")))?;
    let table = range_to_table(&range)?;
    debug!(sheet = %name, rows = table.len(), "Read sheet");
    Ok(table)
}

/// Read a sheet of an XLSX workbook on disk.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read, otherwise as
/// [`read_xlsx`].
pub fn read_xlsx_path(path: impl AsRef<Path>, sheet: Option<&str>) -> Result<Table> {
    let bytes = std::fs::read(path.as_ref())?;
    read_xlsx(bytes, sheet)
}

/// Name of the sheet a workbook opens on.
///
/// The `activeTab` of the first workbook view indexes the sheet list; a
/// workbook without one opens on its first sheet.
///
/// # Errors
///
/// Returns a workbook error if the bytes are not a zip archive or the
/// workbook part is missing or malformed.
pub fn active_sheet(bytes: &[u8]) -> Result<Option<String>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SubmissionError::workbook(format!("Failed to open workbook: {e}")))?;
    let mut part = archive
        .by_name(WORKBOOK_PART)
        .map_err(|e| SubmissionError::workbook(format!("{WORKBOOK_PART} not found: {e}")))?;
    let mut content = String::new();
    part.read_to_string(&mut content)?;

    let mut reader = quick_xml::Reader::from_str(&content);
    let mut sheets = Vec::new();
    let mut active_tab = 0;
    let mut seen_view = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.local_name().as_ref() {
                b"workbookView" if !seen_view => {
                    seen_view = true;
                    if let Some(attr) = e.try_get_attribute("activeTab").map_err(xml_error)? {
                        active_tab = attr
                            .decode_and_unescape_value(reader.decoder())
                            .map_err(xml_error)?
                            .parse::<usize>()
                            .map_err(xml_error)?;
                    }
                }
                b"sheet" => {
                    if let Some(attr) = e.try_get_attribute("name").map_err(xml_error)? {
                        sheets.push(attr.decode_and_unescape_value(reader.decoder()).map_err(xml_error)?.into_owned());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(xml_error(e)),
        }
    }
    Ok(sheets.into_iter().nth(active_tab))
}

fn xml_error(err: impl std::fmt::Display) -> SubmissionError {
    SubmissionError::workbook(format!("Malformed {WORKBOOK_PART}: {err}"))
}

fn range_to_table(range: &Range<Data>) -> Result<Table> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Table::empty());
    };

    let header: Vec<String> = header_row
        .iter()
        .map(|cell| data_to_string(cell).trim().to_string())
        .take_while(|label| !label.is_empty())
        .collect();
    if header.is_empty() {
        return Ok(Table::empty());
    }

    let values = rows
        .map(|row| {
            (0..header.len())
                .map(|i| row.get(i).map(data_to_string).unwrap_or_default())
                .collect()
        })
        .collect();
    Table::from_lists(&header, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::writer::WorkbookWriter;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use pretty_assertions::assert_eq;
    use submission_core::grid::{Grid, value_cells};

    fn workbook(grids: &[Grid]) -> Vec<u8> {
        WorkbookWriter::new().write_buffer(grids).unwrap()
    }

    #[test]
    fn test_reads_first_sheet() {
        let bytes = workbook(&[Grid::with_header(
            value_cells(["X", "Y"]),
            vec![value_cells(["5", ""]), value_cells(["", " b "])],
        )
        .titled("Data")]);
        let table = read_xlsx(bytes, None).unwrap();
        assert_eq!(
            table.to_lists(),
            vec![
                vec!["X".to_string(), "Y".to_string()],
                vec!["5".to_string(), String::new()],
                vec![String::new(), " b ".to_string()],
            ]
        );
    }

    #[test]
    fn test_named_sheet() {
        let bytes = workbook(&[
            Grid::new(vec![value_cells(["Read me"])]).titled("Instructions"),
            Grid::with_header(value_cells(["Name"]), vec![value_cells(["Ab1"])]).titled("Antibodies"),
        ]);
        let table = read_xlsx(bytes.clone(), Some("Antibodies")).unwrap();
        assert_eq!(table.get(0).unwrap()["Name"], "Ab1");

        let err = read_xlsx(bytes, Some("Missing")).unwrap_err();
        assert!(err.to_string().contains("Sheet 'Missing' not found"));
    }

    #[test]
    fn test_reads_active_sheet_by_default() {
        let data = Grid {
            active: true,
            ..Grid::with_header(value_cells(["Name"]), vec![value_cells(["Ab1"])]).titled("Antibodies")
        };
        let bytes = workbook(&[
            Grid::new(vec![value_cells(["Read me"])]).titled("Instructions"),
            data,
            Grid::with_header(value_cells(["Host"]), vec![value_cells(["Mouse"])]).titled("Terminology"),
        ]);
        assert_eq!(active_sheet(&bytes).unwrap().as_deref(), Some("Antibodies"));

        let table = read_xlsx(bytes, None).unwrap();
        assert_eq!(
            table.to_lists(),
            vec![vec!["Name".to_string()], vec!["Ab1".to_string()]]
        );
    }

    #[test]
    fn test_no_active_flag_opens_first_sheet() {
        let bytes = workbook(&[
            Grid::new(vec![value_cells(["Read me"])]).titled("Instructions"),
            Grid::with_header(value_cells(["Name"]), vec![value_cells(["Ab1"])]).titled("Antibodies"),
        ]);
        assert_eq!(active_sheet(&bytes).unwrap().as_deref(), Some("Instructions"));
    }

    #[test]
    fn test_not_a_workbook() {
        assert!(read_xlsx(b"not a zip".to_vec(), None).is_err());
        assert!(active_sheet(b"not a zip").is_err());
    }

    #[test]
    fn test_data_to_string() {
        assert_eq!(data_to_string(&Data::Float(5.0)), "5");
        assert_eq!(data_to_string(&Data::Int(-2)), "-2");
        assert_eq!(data_to_string(&Data::Empty), "");
        let date = ExcelDateTime::new(45_000.0, ExcelDateTimeType::DateTime, false);
        assert_eq!(data_to_string(&Data::DateTime(date)), "45000");
    }
}
