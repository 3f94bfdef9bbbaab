//! Unique value tracking for submission columns
//!
//! Values are compared as literal strings after trimming. State lives for
//! one validation call only.

use std::collections::{HashMap, HashSet};
use submission_core::schema::FieldSchema;

/// Tracks the values seen so far in each unique column
#[derive(Debug, Default)]
pub struct UniqueKeyValidator {
    /// Seen values by column label
    seen: HashMap<String, HashSet<String>>,
}

impl UniqueKeyValidator {
    /// Create a validator with no tracked columns
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track every field of the schema marked unique
    #[must_use]
    pub fn from_schema(schema: &FieldSchema) -> Self {
        let mut validator = Self::new();
        for field in schema.fields.iter().filter(|field| field.unique) {
            validator.track(&field.label);
        }
        validator
    }

    /// Start tracking a column
    pub fn track(&mut self, column: &str) {
        self.seen.entry(column.to_string()).or_default();
    }

    /// Whether the column is tracked
    #[must_use]
    pub fn is_tracked(&self, column: &str) -> bool {
        self.seen.contains_key(column)
    }

    /// Whether the trimmed value was already recorded for the column
    #[must_use]
    pub fn is_duplicate(&self, column: &str, value: &str) -> bool {
        self.seen
            .get(column)
            .is_some_and(|values| values.contains(value.trim()))
    }

    /// Record the trimmed value for a tracked column, empty or not
    pub fn record(&mut self, column: &str, value: &str) {
        if let Some(values) = self.seen.get_mut(column) {
            values.insert(value.trim().to_string());
        }
    }
}
