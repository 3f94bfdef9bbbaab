//! Main validation engine
//!
//! Rows are validated in input order. Blank rows are dropped. Every other
//! row is checked for structure, then each schema column is checked with
//! the first matching rule of: reference, required, unique, terminology,
//! type. All problems are collected; nothing short-circuits.

use super::type_validators::{TypeCheck, TypeValidator};
use super::unique_key_validator::UniqueKeyValidator;
use crate::template::data_grid;
use std::collections::{HashMap, HashSet};
use submission_core::grid::{CellRow, Grid, error_cell, value_cell};
use submission_core::names::PrefixMap;
use submission_core::response::Response;
use submission_core::schema::{Field, FieldSchema, FieldType};
use submission_core::table::{Row, Table, is_blank_row};
use tracing::{debug, info};

/// Error rows are numbered as spreadsheet rows: the header is row 1
const FIRST_DATA_ROW: usize = 2;

/// A named set of valid values, such as the current antibody labels
#[derive(Debug, Clone, Default)]
pub struct ReferenceSet {
    /// What a value of the set is, used in messages
    pub description: String,
    /// The valid values
    pub values: HashSet<String>,
}

/// Reference sets supplied by the caller for one validation call
#[derive(Debug, Clone, Default)]
pub struct References {
    sets: HashMap<String, ReferenceSet>,
}

impl References {
    /// No reference sets
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reference set
    pub fn insert<S: Into<String>>(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        values: impl IntoIterator<Item = S>,
    ) {
        self.sets.insert(
            name.into(),
            ReferenceSet {
                description: description.into(),
                values: values.into_iter().map(Into::into).collect(),
            },
        );
    }

    /// Reference set by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ReferenceSet> {
        self.sets.get(name)
    }
}

/// Result of validating a table
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// No problems were found
    Accepted {
        /// Input without blank rows
        table: Table,
        /// Data sheet with no error cells
        grid: Grid,
    },
    /// At least one problem was found
    Rejected {
        /// De-duplicated messages in the order they were found
        errors: Vec<String>,
        /// Input without blank rows
        table: Table,
        /// Data sheet with error cells
        grid: Grid,
    },
}

impl Outcome {
    /// Whether the table was accepted
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }

    /// Error messages; empty when accepted
    #[must_use]
    pub fn errors(&self) -> &[String] {
        match self {
            Self::Accepted { .. } => &[],
            Self::Rejected { errors, .. } => errors,
        }
    }

    /// The input table without blank rows
    #[must_use]
    pub fn table(&self) -> &Table {
        match self {
            Self::Accepted { table, .. } | Self::Rejected { table, .. } => table,
        }
    }

    /// The accepted table, if there were no problems
    #[must_use]
    pub fn accepted_table(&self) -> Option<&Table> {
        match self {
            Self::Accepted { table, .. } => Some(table),
            Self::Rejected { .. } => None,
        }
    }

    /// The data sheet grid
    #[must_use]
    pub fn grid(&self) -> &Grid {
        match self {
            Self::Accepted { grid, .. } | Self::Rejected { grid, .. } => grid,
        }
    }

    /// Convert into a response envelope
    #[must_use]
    pub fn into_response(self) -> Response {
        match self {
            Self::Accepted { table, grid } => Response::success().table(table).grid(grid),
            Self::Rejected {
                errors,
                table,
                grid,
            } => Response::failure("Submitted table contains errors.")
                .errors(errors)
                .table(table)
                .grid(grid),
        }
    }
}

/// Validates tables against field schemas
pub struct ValidationEngine<'a> {
    types: TypeValidator<'a>,
}

impl<'a> ValidationEngine<'a> {
    /// Create an engine that resolves identifiers against `prefixes`
    #[must_use]
    pub fn new(prefixes: &'a PrefixMap) -> Self {
        Self {
            types: TypeValidator::new(prefixes),
        }
    }

    /// Validate every row of a table against a schema
    #[must_use]
    pub fn validate(&self, schema: &FieldSchema, table: &Table, references: &References) -> Outcome {
        let mut errors = Vec::new();
        let mut rows = Vec::new();
        let mut kept = Vec::new();
        let mut unique = UniqueKeyValidator::from_schema(schema);

        // Columns whose rule cannot be evaluated are reported once, up front
        let column_problems: Vec<Option<String>> = schema
            .fields
            .iter()
            .map(|field| column_problem(field, references))
            .collect();
        errors.extend(column_problems.iter().flatten().cloned());

        for (index, row) in table.iter().enumerate() {
            if is_blank_row(row) {
                debug!(row = index + FIRST_DATA_ROW, "Skipping blank row");
                continue;
            }
            let row_number = index + FIRST_DATA_ROW;
            let mut row_errors = structural_errors(schema, row);

            let cells: CellRow = schema
                .fields
                .iter()
                .zip(&column_problems)
                .map(|(field, problem)| {
                    let Some(raw) = row.get(&field.label) else {
                        return value_cell("");
                    };
                    if let Some(problem) = problem {
                        return error_cell(raw.clone(), problem.clone());
                    }
                    let value = raw.trim();
                    let error = self.check_cell(field, value, &unique, references);
                    if field.unique {
                        unique.record(&field.label, value);
                    }
                    match error {
                        Some(message) => {
                            debug!(row = row_number, column = %field.label, %message, "Invalid cell");
                            row_errors.push(message.clone());
                            error_cell(raw.clone(), message)
                        }
                        None => value_cell(value),
                    }
                })
                .collect();

            errors.extend(
                row_errors
                    .into_iter()
                    .map(|message| format!("Error in row {row_number}: {message}")),
            );
            rows.push(cells);
            kept.push(row.clone());
        }

        let errors = dedupe(errors);
        let table = Table::new(kept).unwrap_or_default();
        let grid = data_grid(schema, rows);

        info!(
            schema = %schema.name,
            rows = table.len(),
            errors = errors.len(),
            "Validated submission"
        );

        if errors.is_empty() {
            Outcome::Accepted { table, grid }
        } else {
            Outcome::Rejected {
                errors,
                table,
                grid,
            }
        }
    }

    /// The message of the first rule the trimmed value breaks, if any
    fn check_cell(
        &self,
        field: &Field,
        value: &str,
        unique: &UniqueKeyValidator,
        references: &References,
    ) -> Option<String> {
        let column = &field.label;

        if let Some(set) = field.reference.as_deref().and_then(|name| references.get(name))
            && !value.is_empty()
        {
            if set.values.contains(value) {
                return None;
            }
            return Some(format!(
                "'{value}' is not a valid {} in column '{column}'",
                set.description
            ));
        }

        if field.required && value.is_empty() {
            return Some(format!("Missing required value in column '{column}'"));
        }

        if field.unique && unique.is_duplicate(column, value) {
            return Some(format!(
                "Duplicate value '{value}' is not allowed in column '{column}'"
            ));
        }

        if let Some(terms) = &field.terminology
            && !value.is_empty()
            && !terms.iter().any(|term| term == value)
        {
            return Some(format!("'{value}' is not a valid term in column '{column}'"));
        }

        if let Some(field_type) = &field.field_type
            && !value.is_empty()
            && let TypeCheck::Invalid(reason) = self.types.validate(field_type, value)
        {
            let message = format!("'{value}' is not of type '{field_type}' in column '{column}'");
            return Some(match reason {
                Some(reason) => format!("{message}: {reason}"),
                None => message,
            });
        }

        None
    }
}

/// A problem with the field definition itself that prevents checking values
fn column_problem(field: &Field, references: &References) -> Option<String> {
    if let Some(FieldType::Unknown(name)) = &field.field_type {
        return Some(format!(
            "Unrecognized type '{name}' for column '{}'",
            field.label
        ));
    }
    if let Some(name) = &field.reference
        && references.get(name).is_none()
    {
        return Some(format!(
            "No reference set '{name}' for column '{}'",
            field.label
        ));
    }
    None
}

/// Extra and missing column messages for one row
fn structural_errors(schema: &FieldSchema, row: &Row) -> Vec<String> {
    let mut errors = Vec::new();

    let extra: Vec<String> = row
        .keys()
        .filter(|key| schema.field(key).is_none())
        .map(|key| format!("'{key}'"))
        .collect();
    if !extra.is_empty() {
        errors.push(format!("Extra columns: {}", extra.join(", ")));
    }

    let missing: Vec<String> = schema
        .labels()
        .filter(|label| !row.contains_key(*label))
        .map(|label| format!("'{label}'"))
        .collect();
    if !missing.is_empty() {
        errors.push(format!("Missing columns: {}", missing.join(", ")));
    }

    errors
}

fn dedupe(errors: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    errors
        .into_iter()
        .filter(|error| seen.insert(error.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use submission_core::schema::Field;

    fn table(header: &[&str], rows: &[&[&str]]) -> Table {
        let header: Vec<String> = header.iter().map(ToString::to_string).collect();
        let values = rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect())
            .collect();
        Table::from_lists(&header, values).unwrap()
    }

    fn schema(fields: Vec<Field>) -> FieldSchema {
        FieldSchema::new("test", "Data", fields).unwrap()
    }

    #[test]
    fn test_rule_precedence() {
        let schema = schema(vec![
            Field::new("name", "Name")
                .required()
                .unique()
                .terms(["1", "2", "9"])
                .typed("score-0-5"),
        ]);
        let input = table(&["Name"], &[&["1"], &["1"], &[""], &["3"], &["9"]]);
        let prefixes = PrefixMap::new();
        let outcome = ValidationEngine::new(&prefixes).validate(&schema, &input, &References::new());

        assert_eq!(
            outcome.errors(),
            [
                "Error in row 3: Duplicate value '1' is not allowed in column 'Name'",
                "Error in row 4: Missing required value in column 'Name'",
                "Error in row 5: '3' is not a valid term in column 'Name'",
                "Error in row 6: '9' is not of type 'score-0-5' in column 'Name'",
            ]
        );
    }

    #[test]
    fn test_repeated_empty_value_in_unique_column() {
        let schema = schema(vec![
            Field::new("a", "A").required(),
            Field::new("code", "Code").unique(),
        ]);
        let input = table(&["A", "Code"], &[&["1", ""], &["2", " "], &["3", "B"]]);
        let prefixes = PrefixMap::new();
        let outcome = ValidationEngine::new(&prefixes).validate(&schema, &input, &References::new());

        assert_eq!(
            outcome.errors(),
            ["Error in row 3: Duplicate value '' is not allowed in column 'Code'"]
        );
        assert!(outcome.grid().rows[1][1].is_error());
        assert!(!outcome.grid().rows[2][1].is_error());
    }

    #[test]
    fn test_reference_rule_comes_first() {
        let schema = schema(vec![
            Field::new("ab_label", "Antibody label")
                .required()
                .references("antibodies"),
        ]);
        let mut references = References::new();
        references.insert("antibodies", "COVIC antibody label", ["COVIC 1"]);
        let input = table(&["Antibody label"], &[&["COVIC 1"], &["COVIC 9"], &[""]]);
        let prefixes = PrefixMap::new();
        let outcome = ValidationEngine::new(&prefixes).validate(&schema, &input, &references);

        assert_eq!(
            outcome.errors(),
            [
                "Error in row 3: 'COVIC 9' is not a valid COVIC antibody label in column 'Antibody label'",
                "Error in row 4: Missing required value in column 'Antibody label'",
            ]
        );
    }

    #[test]
    fn test_unknown_type_is_reported_once() {
        let schema = schema(vec![
            Field::new("n", "N").typed("colour"),
            Field::new("m", "M").required(),
        ]);
        let input = table(&["N", "M"], &[&["red", "x"], &["blue", ""]]);
        let prefixes = PrefixMap::new();
        let outcome = ValidationEngine::new(&prefixes).validate(&schema, &input, &References::new());

        assert_eq!(
            outcome.errors(),
            [
                "Unrecognized type 'colour' for column 'N'",
                "Error in row 3: Missing required value in column 'M'",
            ]
        );
        assert!(outcome.grid().rows.iter().all(|row| row[0].is_error()));
    }

    #[test]
    fn test_structural_errors() {
        let schema = schema(vec![Field::new("a", "A").required(), Field::new("b", "B")]);
        let input = table(&["A", "C"], &[&["1", "2"]]);
        let prefixes = PrefixMap::new();
        let outcome = ValidationEngine::new(&prefixes).validate(&schema, &input, &References::new());

        assert_eq!(
            outcome.errors(),
            [
                "Error in row 2: Extra columns: 'C'",
                "Error in row 2: Missing columns: 'B'",
            ]
        );
        let cells = &outcome.grid().rows[0];
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], value_cell("1"));
        assert_eq!(cells[1], value_cell(""));
    }

    #[test]
    fn test_error_cells_keep_raw_value() {
        let schema = schema(vec![Field::new("n", "N").typed("integer")]);
        let input = table(&["N"], &[&[" 7 "], &[" x "]]);
        let prefixes = PrefixMap::new();
        let outcome = ValidationEngine::new(&prefixes).validate(&schema, &input, &References::new());

        let rows = &outcome.grid().rows;
        assert_eq!(rows[0][0], value_cell("7"));
        assert!(rows[1][0].is_error());
        assert_eq!(rows[1][0].value, " x ");
        assert!(outcome.accepted_table().is_none());
        assert_eq!(outcome.table().len(), 2);
    }

    #[test]
    fn test_outcome_response() {
        let schema = schema(vec![Field::new("n", "N").required()]);
        let prefixes = PrefixMap::new();
        let engine = ValidationEngine::new(&prefixes);

        let ok = engine
            .validate(&schema, &table(&["N"], &[&["1"]]), &References::new())
            .into_response();
        assert_eq!(ok.status, 200);
        assert!(ok.errors.is_empty());

        let blank = engine
            .validate(&schema, &table(&["N"], &[&[""], &["1"], &[" "]]), &References::new())
            .into_response();
        assert_eq!(blank.status, 200);
        assert_eq!(blank.table.map(|t| t.len()), Some(1));

        let schema = self::schema(vec![
            Field::new("n", "N").required(),
            Field::new("m", "M"),
        ]);
        let bad = ValidationEngine::new(&prefixes)
            .validate(&schema, &table(&["N", "M"], &[&["", "x"]]), &References::new())
            .into_response();
        assert_eq!(bad.status, 400);
        assert_eq!(bad.errors.len(), 1);
        assert!(bad.grid.is_some_and(|grid| grid.has_errors()));
    }
}
