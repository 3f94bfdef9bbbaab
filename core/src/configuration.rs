//! Submission configuration
//!
//! The configuration is built once at startup and passed by reference to
//! whatever needs it. It is never held as process-wide mutable state.

use crate::error::{Result, SubmissionError};
use crate::names::PrefixMap;
use crate::schema::FieldSchema;
use crate::table::{LabelMap, Row, read_tsv};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Everything needed to validate and render submissions
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SubmissionConfig {
    /// Prefix to base URI
    #[serde(default)]
    pub prefixes: PrefixMap,

    /// Identifier to label
    #[serde(default)]
    pub labels: LabelMap,

    /// Label to identifier. Derived from `labels` when empty.
    #[serde(default)]
    pub ids: IndexMap<String, String>,

    /// Column key to display label, used for grid headers
    #[serde(default)]
    pub fields: IndexMap<String, String>,

    /// Submission type name to schema
    #[serde(default)]
    pub schemas: IndexMap<String, FieldSchema>,
}

impl SubmissionConfig {
    /// Load a configuration from a JSON or YAML file, chosen by extension,
    /// and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// configuration is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SubmissionError::config(format!(
                "Could not read config from '{}': {e}",
                path.display()
            ))
        })?;

        let mut config: Self = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            _ => serde_json::from_str(&text)?,
        };
        config.derive_ids();
        config.validate().map_err(|e| {
            SubmissionError::config(format!("Invalid config '{}': {e}", path.display()))
        })?;

        info!(
            path = %path.display(),
            schemas = config.schemas.len(),
            prefixes = config.prefixes.len(),
            "Loaded submission config"
        );
        Ok(config)
    }

    /// Write the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check that at least one schema is registered and that every schema
    /// is well formed.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.schemas.is_empty() {
            return Err(SubmissionError::config("Config has no schemas"));
        }
        for (name, schema) in &self.schemas {
            if name.trim().is_empty() {
                return Err(SubmissionError::config("Config has a schema with an empty name"));
            }
            schema.validate()?;
        }
        Ok(())
    }

    /// Register a schema under its own name
    pub fn add_schema(&mut self, schema: FieldSchema) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Schema for a submission type, matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`SubmissionError::UnknownSchema`] if no schema matches.
    pub fn schema(&self, name: &str) -> Result<&FieldSchema> {
        if let Some(schema) = self.schemas.get(name) {
            return Ok(schema);
        }
        self.schemas
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, schema)| schema)
            .ok_or_else(|| SubmissionError::UnknownSchema(name.to_string()))
    }

    /// Names of the registered submission types
    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Fill `ids` from `labels` if it is empty
    pub fn derive_ids(&mut self) {
        if self.ids.is_empty() {
            self.ids = self
                .labels
                .iter()
                .map(|(id, label)| (label.clone(), id.clone()))
                .collect();
        }
    }

    /// Assemble a configuration from curated TSV tables and schema files.
    ///
    /// Schema files are YAML documents holding one [`FieldSchema`] each.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read, a table lacks its
    /// expected columns, or the result does not validate.
    pub fn build_from_tsv(
        prefixes_tsv: impl AsRef<Path>,
        labels_tsv: impl AsRef<Path>,
        fields_tsv: impl AsRef<Path>,
        schema_files: &[impl AsRef<Path>],
    ) -> Result<Self> {
        let labels_tsv = labels_tsv.as_ref();
        let mut config = Self {
            prefixes: read_prefixes(prefixes_tsv)?,
            labels: read_labels(labels_tsv)?,
            ids: read_ids(labels_tsv)?,
            fields: read_fields(fields_tsv)?,
            schemas: IndexMap::new(),
        };

        for path in schema_files {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path)?;
            let schema: FieldSchema = serde_yaml::from_str(&text).map_err(|e| {
                SubmissionError::parse_at(e.to_string(), path.display().to_string())
            })?;
            debug!(schema = %schema.name, path = %path.display(), "Read schema");
            config.add_schema(schema);
        }

        config.validate()?;
        Ok(config)
    }
}

fn column<'a>(row: &'a Row, key: &str, path: &Path) -> Result<&'a str> {
    row.get(key).map(String::as_str).ok_or_else(|| {
        SubmissionError::parse_at(
            format!("Missing column '{key}'"),
            path.display().to_string(),
        )
    })
}

fn read_pairs(path: &Path, key: &str, value: &str) -> Result<IndexMap<String, String>> {
    let table = read_tsv(path)?;
    let mut pairs = IndexMap::with_capacity(table.len());
    for row in &table {
        pairs.insert(
            column(row, key, path)?.to_string(),
            column(row, value, path)?.to_string(),
        );
    }
    Ok(pairs)
}

/// Read a `prefix`/`base` table.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks the columns.
pub fn read_prefixes(path: impl AsRef<Path>) -> Result<PrefixMap> {
    Ok(read_pairs(path.as_ref(), "prefix", "base")?.into_iter().collect())
}

/// Read an `ID`/`LABEL` table as identifier to label.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks the columns.
pub fn read_labels(path: impl AsRef<Path>) -> Result<LabelMap> {
    read_pairs(path.as_ref(), "ID", "LABEL")
}

/// Read an `ID`/`LABEL` table as label to identifier.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks the columns.
pub fn read_ids(path: impl AsRef<Path>) -> Result<IndexMap<String, String>> {
    read_pairs(path.as_ref(), "LABEL", "ID")
}

/// Read a `field`/`label` table as column key to display label.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks the columns.
pub fn read_fields(path: impl AsRef<Path>) -> Result<IndexMap<String, String>> {
    read_pairs(path.as_ref(), "field", "label")
}

/// Read a terms table keyed by label.
///
/// Terms tables have `id` and `label` columns plus others that vary; the
/// template-string row whose `id` is `ID` is skipped.
///
/// # Errors
///
/// Returns an error if the file cannot be read or lacks the columns.
pub fn read_terms(path: impl AsRef<Path>) -> Result<IndexMap<String, Row>> {
    let path = path.as_ref();
    let table = read_tsv(path)?;
    let mut terms = IndexMap::with_capacity(table.len());
    for row in &table {
        if column(row, "id", path)? == "ID" {
            continue;
        }
        terms.insert(column(row, "label", path)?.to_string(), row.clone());
    }
    Ok(terms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> SubmissionConfig {
        let mut config = SubmissionConfig::default();
        config.prefixes.insert("ex", "http://example.com/");
        config.add_schema(
            FieldSchema::new("antibodies", "Antibodies", vec![Field::new("ab_label", "Antibody name")])
                .unwrap(),
        );
        config
    }

    #[test]
    fn test_schema_lookup() {
        let config = config();
        assert_eq!(config.schema("antibodies").unwrap().sheet, "Antibodies");
        assert_eq!(config.schema("Antibodies").unwrap().sheet, "Antibodies");
        assert!(matches!(
            config.schema("spr"),
            Err(SubmissionError::UnknownSchema(name)) if name == "spr"
        ));
    }

    #[test]
    fn test_validate() {
        assert!(SubmissionConfig::default().validate().is_err());
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut original = config();
        original.labels.insert("ex:1".to_string(), "One".to_string());
        original.save(&path).unwrap();

        let loaded = SubmissionConfig::from_path(&path).unwrap();
        assert_eq!(loaded.ids.get("One").map(String::as_str), Some("ex:1"));
        assert_eq!(loaded.schemas, original.schemas);
        assert_eq!(loaded.prefixes, original.prefixes);
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "prefixes:\n  ex: http://example.com/\nschemas:\n  datasets:\n    name: datasets\n    sheet: Dataset\n    fields:\n      - value: ab_label\n        label: Antibody name\n        required: true\n",
        )
        .unwrap();
        let config = SubmissionConfig::from_path(&path).unwrap();
        assert!(config.schema("datasets").unwrap().fields[0].required);
    }

    #[test]
    fn test_build_from_tsv() {
        let dir = TempDir::new().unwrap();
        let write = |name: &str, text: &str| {
            let path = dir.path().join(name);
            fs::write(&path, text).unwrap();
            path
        };
        let prefixes = write("prefixes.tsv", "prefix\tbase\nex\thttp://example.com/\n");
        let labels = write("labels.tsv", "ID\tLABEL\nex:1\tOne\n");
        let fields = write("fields.tsv", "field\tlabel\nab_label\tAntibody name\n");
        let schema = write(
            "antibodies.yml",
            "name: antibodies\nsheet: Antibodies\nfields:\n  - value: ab_label\n    label: Antibody name\n",
        );

        let config = SubmissionConfig::build_from_tsv(&prefixes, &labels, &fields, &[schema]).unwrap();
        assert_eq!(config.prefixes.get("ex"), Some("http://example.com/"));
        assert_eq!(config.labels["ex:1"], "One");
        assert_eq!(config.ids["One"], "ex:1");
        assert_eq!(config.fields["ab_label"], "Antibody name");
        assert!(config.schema("antibodies").is_ok());
    }

    #[test]
    fn test_read_terms_skips_template_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hosts.tsv");
        fs::write(&path, "id\tlabel\tparent\nID\tLABEL\tSC %\nNCBITaxon:9606\tHomo sapiens\t\n").unwrap();
        let terms = read_terms(&path).unwrap();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms["Homo sapiens"]["id"], "NCBITaxon:9606");
    }
}
