//! Submission templates
//!
//! A template is three grids: instructions, the data sheet and the
//! terminology lists that back the data sheet's dropdowns.

use crate::workbook::column_letter;
use indexmap::IndexMap;
use submission_core::grid::{Cell, CellRow, Grid, table_to_grid, value_cell};
use submission_core::names::PrefixMap;
use submission_core::schema::FieldSchema;
use submission_core::table::{Table, is_blank_row};

/// Title of the instructions sheet
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

/// Title of the terminology sheet
pub const TERMINOLOGY_SHEET: &str = "Terminology";

/// Header row of the data sheet.
///
/// Terminology fields get a dropdown sourced from their column of the
/// terminology sheet, in the order the fields appear.
#[must_use]
pub fn data_header(schema: &FieldSchema) -> CellRow {
    let mut terminology_column: u16 = 0;
    schema
        .fields
        .iter()
        .map(|field| {
            let validation = field.terminology.as_ref().map(|terms| {
                let column = column_letter(terminology_column);
                terminology_column = terminology_column.saturating_add(1);
                format!(
                    "={TERMINOLOGY_SHEET}!${column}$2:${column}${}",
                    terms.len() + 1
                )
            });
            Cell {
                value: field.value.clone(),
                label: field.label.clone(),
                locked: field.locked,
                validation,
                ..Cell::default()
            }
        })
        .collect()
}

/// The data sheet, with optional pre-filled rows
#[must_use]
pub fn data_grid(schema: &FieldSchema, rows: Vec<CellRow>) -> Grid {
    Grid {
        active: true,
        active_cell: Some("A2".to_string()),
        ..Grid::with_header(data_header(schema), rows).titled(&schema.sheet)
    }
}

/// The instructions sheet: a bold heading, then one line per column
#[must_use]
pub fn instructions_grid(schema: &FieldSchema) -> Grid {
    let heading = schema
        .title
        .clone()
        .unwrap_or_else(|| format!("CoVIC-DB {} Submission", schema.sheet));

    let mut lines = vec![
        heading,
        String::new(),
        format!(
            "Add your data to the '{}' sheet. Do not edit the other sheets.",
            schema.sheet
        ),
        String::new(),
        "Columns:".to_string(),
    ];
    for field in &schema.fields {
        match &field.description {
            Some(description) => lines.push(format!("- {}: {description}", field.label)),
            None => lines.push(format!("- {}", field.label)),
        }
    }

    let mut rows: Vec<CellRow> = lines.into_iter().map(|line| vec![value_cell(line)]).collect();
    if let Some(first) = rows.first_mut().and_then(|row| row.first_mut()) {
        first.bold = true;
    }

    Grid {
        locked: true,
        ..Grid::new(rows).titled(INSTRUCTIONS_SHEET)
    }
}

/// The terminology sheet, or `None` when no field has a terminology
#[must_use]
pub fn terminology_grid(schema: &FieldSchema) -> Option<Grid> {
    let table = schema.terminology_table();
    if table.is_empty() {
        return None;
    }
    let grid = table_to_grid(&PrefixMap::new(), &IndexMap::new(), &table);
    Some(Grid {
        locked: true,
        ..grid.titled(TERMINOLOGY_SHEET)
    })
}

/// All template grids for a schema, with optional pre-filled data rows
#[must_use]
pub fn template_grids(schema: &FieldSchema, rows: Vec<CellRow>) -> Vec<Grid> {
    let mut grids = vec![instructions_grid(schema), data_grid(schema, rows)];
    grids.extend(terminology_grid(schema));
    grids
}

/// Data rows in schema column order. Columns the table lacks are empty.
#[must_use]
pub fn schema_rows(schema: &FieldSchema, table: &Table) -> Vec<CellRow> {
    table
        .iter()
        .map(|row| {
            schema
                .labels()
                .map(|label| value_cell(row.get(label).cloned().unwrap_or_default()))
                .collect()
        })
        .collect()
}

/// Checked data rows with the input's blank rows put back in place, so each
/// row sits on the sheet row that its error messages name
#[must_use]
pub fn restore_blank_rows(schema: &FieldSchema, table: &Table, checked: &[CellRow]) -> Vec<CellRow> {
    let mut checked = checked.iter();
    table
        .iter()
        .filter_map(|row| {
            if is_blank_row(row) {
                Some(schema.labels().map(|_| value_cell("")).collect())
            } else {
                checked.next().cloned()
            }
        })
        .collect()
}
