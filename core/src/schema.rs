//! Field schemas
//!
//! A [`FieldSchema`] is the ordered list of [`Field`]s that one submission
//! type accepts. The order of display labels is both the expected column set
//! of a submission and the column order of its spreadsheet template.

use crate::error::{Result, SubmissionError};
use crate::table::{Row, Table};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Value type of a field
///
/// Unrecognized names are kept as [`FieldType::Unknown`] so that a schema
/// naming a type this version does not know still loads; validation then
/// reports the column instead of failing the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Free text
    Text,
    /// A label
    Label,
    /// A prefixed identifier with a registered prefix
    Id,
    /// Base-10 integer
    Integer,
    /// Base-10 integer, zero or greater
    NonNegativeInteger,
    /// Integer from 0 to 5 inclusive
    Score0To5,
    /// Floating point number
    Float,
    /// Floating point number or `na`
    FloatNa,
    /// Floating point number with optional `<`/`>` prefix, or `na`
    FloatThresholdNa,
    /// Percentage, as a floating point number
    Percent,
    /// Comma-separated amino acid mutations
    MutationList,
    /// A type name that is not recognized
    Unknown(String),
}

impl FieldType {
    /// Canonical name
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text => "text",
            Self::Label => "label",
            Self::Id => "id",
            Self::Integer => "integer",
            Self::NonNegativeInteger => "non-negative-integer",
            Self::Score0To5 => "score-0-5",
            Self::Float => "float",
            Self::FloatNa => "float-na",
            Self::FloatThresholdNa => "float-threshold-na",
            Self::Percent => "percent",
            Self::MutationList => "mutation-list",
            Self::Unknown(name) => name,
        }
    }

    /// Whether the name was recognized
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name.trim() {
            "text" => Self::Text,
            "label" => Self::Label,
            "id" => Self::Id,
            "integer" | "int" => Self::Integer,
            "non-negative-integer" | "non-negative integer" | "non_negative_integer" => {
                Self::NonNegativeInteger
            }
            "score-0-5" | "score_0_5" => Self::Score0To5,
            "float" => Self::Float,
            "float-na" | "float_na" => Self::FloatNa,
            "float-threshold-na" | "float_threshold_na" => Self::FloatThresholdNa,
            "percent" => Self::Percent,
            "mutation-list" | "mutation_list" | "mutations" => Self::MutationList,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl FromStr for FieldType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of a submission type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Internal value key, used in stored tables
    pub value: String,

    /// Display label, used as the spreadsheet column header
    pub label: String,

    /// Help text shown in the template instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// A value must be given
    #[serde(default)]
    pub required: bool,

    /// Values must not repeat within one submission
    #[serde(default)]
    pub unique: bool,

    /// Header is protected in the template
    #[serde(default)]
    pub locked: bool,

    /// Value type
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,

    /// Closed list of allowed values, offered as a dropdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminology: Option<Vec<String>>,

    /// Example value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,

    /// Name of a caller-supplied reference set that values must belong to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Field {
    /// A field with no constraints
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Mark as unique
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark as locked
    #[must_use]
    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Set the value type
    #[must_use]
    pub fn typed(mut self, field_type: impl Into<FieldType>) -> Self {
        self.field_type = Some(field_type.into());
        self
    }

    /// Set the terminology
    #[must_use]
    pub fn terms<S: Into<String>>(mut self, terms: impl IntoIterator<Item = S>) -> Self {
        self.terminology = Some(terms.into_iter().map(Into::into).collect());
        self
    }

    /// Require values to come from a named reference set
    #[must_use]
    pub fn references(mut self, set: impl Into<String>) -> Self {
        self.reference = Some(set.into());
        self
    }
}

/// The ordered fields of one submission type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    /// Submission type name
    pub name: String,

    /// Title of the data sheet in the template
    pub sheet: String,

    /// Heading of the template instructions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Prefix of identifiers assigned to stored rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_prefix: Option<String>,

    /// Fields, in column order
    pub fields: Vec<Field>,
}

impl FieldSchema {
    /// Build a schema, checking its invariants.
    ///
    /// # Errors
    ///
    /// See [`FieldSchema::validate`].
    pub fn new(
        name: impl Into<String>,
        sheet: impl Into<String>,
        fields: Vec<Field>,
    ) -> Result<Self> {
        let schema = Self {
            name: name.into(),
            sheet: sheet.into(),
            title: None,
            id_prefix: None,
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// Check that the schema has fields, that no two fields share a display
    /// label or value key, and that every terminology has at least one term.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::InvalidSchema`] for the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(SubmissionError::invalid_schema(&self.name, "no fields"));
        }

        let mut labels = HashSet::new();
        let mut values = HashSet::new();
        for field in &self.fields {
            if field.label.trim().is_empty() {
                return Err(SubmissionError::invalid_schema(
                    &self.name,
                    format!("field '{}' has an empty label", field.value),
                ));
            }
            if !labels.insert(field.label.as_str()) {
                return Err(SubmissionError::invalid_schema(
                    &self.name,
                    format!("duplicate label '{}'", field.label),
                ));
            }
            if !values.insert(field.value.as_str()) {
                return Err(SubmissionError::invalid_schema(
                    &self.name,
                    format!("duplicate value key '{}'", field.value),
                ));
            }
            if field.terminology.as_ref().is_some_and(Vec::is_empty) {
                return Err(SubmissionError::invalid_schema(
                    &self.name,
                    format!("field '{}' has an empty terminology", field.label),
                ));
            }
        }
        Ok(())
    }

    /// Display labels, in column order
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.label.as_str())
    }

    /// Field with a display label
    #[must_use]
    pub fn field(&self, label: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.label == label)
    }

    /// Field with a value key
    #[must_use]
    pub fn field_by_key(&self, value: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.value == value)
    }

    /// Fields that carry a terminology, in column order
    pub fn terminology_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|field| field.terminology.is_some())
    }

    /// One column per terminology field, headed by its display label.
    /// Shorter term lists are padded with empty strings.
    #[must_use]
    pub fn terminology_table(&self) -> Table {
        let columns: Vec<(&str, &[String])> = self
            .terminology_fields()
            .filter_map(|field| {
                field
                    .terminology
                    .as_deref()
                    .map(|terms| (field.label.as_str(), terms))
            })
            .collect();
        let length = columns.iter().map(|(_, terms)| terms.len()).max().unwrap_or(0);

        let rows = (0..length)
            .map(|i| {
                columns
                    .iter()
                    .map(|(label, terms)| {
                        ((*label).to_string(), terms.get(i).cloned().unwrap_or_default())
                    })
                    .collect::<Row>()
            })
            .collect();
        Table::from_rows_unchecked(rows)
    }

    /// A one-row table of the example values, if any field has one
    #[must_use]
    pub fn example_row(&self) -> Option<Row> {
        if self.fields.iter().all(|field| field.example.is_none()) {
            return None;
        }
        Some(
            self.fields
                .iter()
                .map(|field| (field.label.clone(), field.example.clone().unwrap_or_default()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn antibodies() -> FieldSchema {
        FieldSchema::new(
            "antibodies",
            "Antibodies",
            vec![
                Field::new("ab_label", "Antibody name").required().unique(),
                Field::new("host_label", "Host").terms(["Homo sapiens", "Mus musculus"]),
                Field::new("isotype_label", "Isotype").terms(["IgG", "IgM", "IgA"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::from("score-0-5"), FieldType::Score0To5);
        assert_eq!(FieldType::from("non-negative integer"), FieldType::NonNegativeInteger);
        assert_eq!(FieldType::from("float_threshold_na"), FieldType::FloatThresholdNa);
        assert_eq!(
            FieldType::from("colour"),
            FieldType::Unknown("colour".to_string())
        );
        assert_eq!(FieldType::MutationList.to_string(), "mutation-list");
        assert!(!FieldType::from("colour").is_known());
    }

    #[test]
    fn test_field_deserialize() {
        let yaml = "value: ec50\nlabel: EC50\ntype: float-threshold-na\nrequired: true\n";
        let field: Field = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(field.field_type, Some(FieldType::FloatThresholdNa));
        assert!(field.required);
        assert!(!field.unique);
    }

    #[test]
    fn test_schema_invariants() {
        let duplicate = FieldSchema::new(
            "x",
            "X",
            vec![Field::new("a", "A"), Field::new("b", "A")],
        );
        assert!(matches!(duplicate, Err(SubmissionError::InvalidSchema { .. })));

        let no_terms = FieldSchema::new("x", "X", vec![Field::new("a", "A").terms(Vec::<String>::new())]);
        assert!(no_terms.is_err());

        assert!(FieldSchema::new("x", "X", Vec::new()).is_err());
    }

    #[test]
    fn test_lookup() {
        let schema = antibodies();
        assert_eq!(
            schema.labels().collect::<Vec<_>>(),
            vec!["Antibody name", "Host", "Isotype"]
        );
        assert_eq!(schema.field("Host").map(|f| f.value.as_str()), Some("host_label"));
        assert_eq!(schema.field_by_key("ab_label").map(|f| f.label.as_str()), Some("Antibody name"));
        assert!(schema.field("Nope").is_none());
    }

    #[test]
    fn test_terminology_table() {
        let table = antibodies().terminology_table();
        assert_eq!(table.len(), 3);
        assert_eq!(table.columns().collect::<Vec<_>>(), vec!["Host", "Isotype"]);
        assert_eq!(table.rows()[2]["Host"], "");
        assert_eq!(table.rows()[2]["Isotype"], "IgA");
    }
}
