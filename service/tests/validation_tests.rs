//! Validation scenarios for antibody and dataset submissions

use pretty_assertions::assert_eq;
use submission_service::prelude::*;

fn antibodies() -> FieldSchema {
    FieldSchema::new(
        "antibodies",
        "Antibodies",
        vec![
            Field::new("ab_label", "Antibody name").required().unique(),
            Field::new("host_label", "Host").terms(["Homo sapiens", "Mus musculus"]),
            Field::new("isotype_label", "Isotype").terms(["IgG", "IgM"]),
        ],
    )
    .unwrap()
}

fn datasets() -> FieldSchema {
    FieldSchema::new(
        "neutralization",
        "Dataset",
        vec![
            Field::new("ab_label", "Antibody label")
                .required()
                .references("antibodies"),
            Field::new("score", "Score").typed("score-0-5"),
            Field::new("ic50", "IC50").typed("float-threshold-na"),
            Field::new("mutations", "Mutations").typed("mutation-list"),
        ],
    )
    .unwrap()
}

fn table(header: &[&str], rows: &[&[&str]]) -> Table {
    let header: Vec<String> = header.iter().map(ToString::to_string).collect();
    let values = rows
        .iter()
        .map(|row| row.iter().map(ToString::to_string).collect())
        .collect();
    Table::from_lists(&header, values).unwrap()
}

fn antibody_table(rows: &[&[&str]]) -> Table {
    table(&["Antibody name", "Host", "Isotype"], rows)
}

fn validate(schema: &FieldSchema, input: &Table, references: &References) -> Outcome {
    let prefixes: PrefixMap = [("COVIC", "https://cvdb.ontodev.com/antibody/")]
        .into_iter()
        .collect();
    ValidationEngine::new(&prefixes).validate(schema, input, references)
}

fn antibody_references() -> References {
    let mut references = References::new();
    references.insert("antibodies", "antibody label", ["COVIC 1", "COVIC 2"]);
    references
}

#[test]
fn test_valid_antibody_submission() {
    let input = antibody_table(&[&["Ab1", "Homo sapiens", "IgG"]]);
    let outcome = validate(&antibodies(), &input, &References::new());

    assert!(outcome.is_accepted());
    assert!(outcome.errors().is_empty());
    assert_eq!(outcome.accepted_table().map(Table::len), Some(1));
    assert!(!outcome.grid().has_errors());

    let response = outcome.into_response();
    assert_eq!(response.status, 200);
    assert_eq!(response.message, "Success");
}

#[test]
fn test_duplicate_and_bad_terminology() {
    let input = antibody_table(&[
        &["Ab1", "Homo sapiens", "IgG"],
        &["Ab1", "Homo sapiens", "IgZ"],
    ]);
    let outcome = validate(&antibodies(), &input, &References::new());

    assert!(!outcome.is_accepted());
    assert_eq!(
        outcome.errors(),
        [
            "Error in row 3: Duplicate value 'Ab1' is not allowed in column 'Antibody name'",
            "Error in row 3: 'IgZ' is not a valid term in column 'Isotype'",
        ]
    );
    assert!(outcome.accepted_table().is_none());

    let grid = outcome.grid();
    assert!(grid.rows[0].iter().all(|cell| !cell.is_error()));
    let flagged: Vec<bool> = grid.rows[1].iter().map(|cell| cell.is_error()).collect();
    assert_eq!(flagged, vec![true, false, true]);
    assert_eq!(grid.rows[1][2].value, "IgZ");
}

#[test]
fn test_uniqueness_follows_input_order() {
    let input = antibody_table(&[
        &["A", "Homo sapiens", "IgG"],
        &["A", "Homo sapiens", "IgG"],
        &["B", "Homo sapiens", "IgG"],
    ]);
    let outcome = validate(&antibodies(), &input, &References::new());
    assert_eq!(
        outcome.errors(),
        ["Error in row 3: Duplicate value 'A' is not allowed in column 'Antibody name'"]
    );
}

#[test]
fn test_invalid_rows_still_count_for_uniqueness() {
    let input = antibody_table(&[
        &["A", "Homo sapiens", "IgX"],
        &["A", "Homo sapiens", "IgG"],
    ]);
    let outcome = validate(&antibodies(), &input, &References::new());
    assert_eq!(
        outcome.errors(),
        [
            "Error in row 2: 'IgX' is not a valid term in column 'Isotype'",
            "Error in row 3: Duplicate value 'A' is not allowed in column 'Antibody name'",
        ]
    );
}

#[test]
fn test_blank_rows_are_dropped() {
    let input = antibody_table(&[
        &["Ab1", "Homo sapiens", "IgG"],
        &["", "  ", ""],
        &["", "Mus musculus", "IgM"],
    ]);
    let outcome = validate(&antibodies(), &input, &References::new());

    // Row numbers still count the blank row
    assert_eq!(
        outcome.errors(),
        ["Error in row 4: Missing required value in column 'Antibody name'"]
    );
    assert_eq!(outcome.table().len(), 2);
    assert_eq!(outcome.grid().rows.len(), 2);
}

#[test]
fn test_only_blank_rows_are_accepted_empty() {
    let input = antibody_table(&[&["", "", ""], &[" ", "", ""]]);
    let outcome = validate(&antibodies(), &input, &References::new());
    assert!(outcome.is_accepted());
    assert!(outcome.table().is_empty());
    assert!(outcome.grid().rows.is_empty());
}

#[test]
fn test_values_are_trimmed_when_valid() {
    let input = antibody_table(&[&[" Ab1 ", "Homo sapiens ", "IgG"]]);
    let outcome = validate(&antibodies(), &input, &References::new());
    assert!(outcome.is_accepted());
    assert_eq!(outcome.grid().rows[0][0].value, "Ab1");
    assert_eq!(outcome.grid().rows[0][1].value, "Homo sapiens");
}

#[test]
fn test_structural_errors_do_not_stop_cell_checks() {
    let input = table(
        &["Antibody name", "Host", "Notes"],
        &[&["", "Homo sapiens", "n/a"]],
    );
    let outcome = validate(&antibodies(), &input, &References::new());
    assert_eq!(
        outcome.errors(),
        [
            "Error in row 2: Extra columns: 'Notes'",
            "Error in row 2: Missing columns: 'Isotype'",
            "Error in row 2: Missing required value in column 'Antibody name'",
        ]
    );
}

#[test]
fn test_dataset_types() {
    let input = table(
        &["Antibody label", "Score", "IC50", "Mutations"],
        &[
            &["COVIC 1", "5", "<0.01", "D614G, del69-70"],
            &["COVIC 2", "6", "na", ""],
            &["COVIC 1", "0", "<abc", "A1A"],
        ],
    );
    let outcome = validate(&datasets(), &input, &antibody_references());
    assert_eq!(outcome.errors().len(), 3);
    assert_eq!(
        outcome.errors()[0],
        "Error in row 3: '6' is not of type 'score-0-5' in column 'Score'"
    );
    assert_eq!(
        outcome.errors()[1],
        "Error in row 4: '<abc' is not of type 'float-threshold-na' in column 'IC50'"
    );
    let prefix = "Error in row 4: 'A1A' is not of type 'mutation-list' in column 'Mutations': ";
    assert!(outcome.errors()[2].starts_with(prefix));
}

#[test]
fn test_reference_values() {
    let input = table(
        &["Antibody label", "Score", "IC50", "Mutations"],
        &[&["COVIC 9", "1", "", ""], &["", "1", "", ""]],
    );
    let outcome = validate(&datasets(), &input, &antibody_references());
    assert_eq!(
        outcome.errors(),
        [
            "Error in row 2: 'COVIC 9' is not a valid antibody label in column 'Antibody label'",
            "Error in row 3: Missing required value in column 'Antibody label'",
        ]
    );
}

#[test]
fn test_missing_reference_set_is_a_column_error() {
    let input = table(
        &["Antibody label", "Score", "IC50", "Mutations"],
        &[&["COVIC 1", "1", "", ""], &["COVIC 2", "2", "", ""]],
    );
    let outcome = validate(&datasets(), &input, &References::new());
    assert_eq!(
        outcome.errors(),
        ["No reference set 'antibodies' for column 'Antibody label'"]
    );
    assert!(outcome.grid().rows.iter().all(|row| row[0].is_error()));
}

#[test]
fn test_unknown_schema_is_an_ordinary_failure() {
    let mut config = SubmissionConfig::default();
    config.add_schema(antibodies());
    let service = SubmissionService::new(config);

    let response = service.validate("spike-variants", &Table::empty(), &References::new());
    assert_eq!(response.status, 400);
    assert!(response.message.contains("spike-variants"));

    let response = service.validate(
        "ANTIBODIES",
        &antibody_table(&[&["Ab1", "Mus musculus", "IgM"]]),
        &References::new(),
    );
    assert_eq!(response.status, 200);
}
