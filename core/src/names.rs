//! Prefixes, identifiers and the `_id`/`_label` column convention
//!
//! Identifiers are CURIEs of the form `PREFIX:local`. A [`PrefixMap`] takes
//! short prefixes to base URIs so that identifiers can be expanded to IRIs.
//!
//! Column keys follow a naming convention: a key ending in `_id` holds an
//! identifier, and a key with the same stem ending in `_label` holds that
//! identifier's human-readable label. All suffix handling lives here.

use crate::error::{Result, SubmissionError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Suffix of identifier column keys
pub const ID_SUFFIX: &str = "_id";

/// Suffix of label column keys
pub const LABEL_SUFFIX: &str = "_label";

/// Map from CURIE prefix to base URI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixMap(IndexMap<String, String>);

impl PrefixMap {
    /// Create an empty prefix map
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prefix, replacing any previous base URI
    pub fn insert(&mut self, prefix: impl Into<String>, base: impl Into<String>) {
        self.0.insert(prefix.into(), base.into());
    }

    /// Base URI registered for a prefix
    #[must_use]
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    /// Whether the prefix is registered
    #[must_use]
    pub fn contains(&self, prefix: &str) -> bool {
        self.0.contains_key(prefix)
    }

    /// Number of registered prefixes
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no prefixes are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(prefix, base)` pairs in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True iff `value` contains `:` and the part before the first `:` is a
    /// registered prefix.
    #[must_use]
    pub fn is_id(&self, value: &str) -> bool {
        split_id(value).is_some_and(|(prefix, _)| self.contains(prefix))
    }

    /// Expand an identifier to an IRI.
    ///
    /// Identifiers with an unregistered prefix (or no prefix at all) are
    /// returned unchanged.
    #[must_use]
    pub fn id_to_iri(&self, id: &str) -> String {
        match split_id(id) {
            Some((prefix, local)) => match self.get(prefix) {
                Some(base) => format!("{base}{local}"),
                None => id.to_string(),
            },
            None => id.to_string(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PrefixMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Split an identifier at its first `:` into `(prefix, local)`.
#[must_use]
pub fn split_id(id: &str) -> Option<(&str, &str)> {
    id.split_once(':')
}

/// Given an identifier whose local part is an unpadded integer, return the
/// next identifier with the same prefix.
///
/// # Errors
///
/// Returns a parse error if the identifier has no prefix or the local part
/// is not an integer.
pub fn increment_id(id: &str) -> Result<String> {
    let (prefix, local) = split_id(id)
        .ok_or_else(|| SubmissionError::parse(format!("'{id}' is not a prefixed identifier")))?;
    let number: u64 = local.parse().map_err(|_| {
        SubmissionError::parse(format!("'{id}' does not have an integer local name"))
    })?;
    let next = number
        .checked_add(1)
        .ok_or_else(|| SubmissionError::parse(format!("'{id}' cannot be incremented")))?;
    Ok(format!("{prefix}:{next}"))
}

/// Whether a column key holds identifiers
#[must_use]
pub fn is_id_key(key: &str) -> bool {
    key.ends_with(ID_SUFFIX)
}

/// Whether a column key holds labels
#[must_use]
pub fn is_label_key(key: &str) -> bool {
    key.ends_with(LABEL_SUFFIX)
}

/// Replace a terminal `_id` with `_label`; other keys are returned unchanged.
#[must_use]
pub fn id_key_to_label_key(key: &str) -> String {
    match key.strip_suffix(ID_SUFFIX) {
        Some(stem) => format!("{stem}{LABEL_SUFFIX}"),
        None => key.to_string(),
    }
}

/// Replace a terminal `_label` with `_id`; other keys are returned unchanged.
#[must_use]
pub fn label_key_to_id_key(key: &str) -> String {
    match key.strip_suffix(LABEL_SUFFIX) {
        Some(stem) => format!("{stem}{ID_SUFFIX}"),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn prefixes() -> PrefixMap {
        [("ex", "http://example.com/"), ("NCBITaxon", "http://purl.obolibrary.org/obo/NCBITaxon_")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_id_to_iri() {
        let prefixes = prefixes();
        assert_eq!(prefixes.id_to_iri("ex:bar"), "http://example.com/bar");
        assert_eq!(
            prefixes.id_to_iri("NCBITaxon:9606"),
            "http://purl.obolibrary.org/obo/NCBITaxon_9606"
        );
        assert_eq!(prefixes.id_to_iri("foo:bar"), "foo:bar");
        assert_eq!(prefixes.id_to_iri("no colon"), "no colon");
    }

    #[test]
    fn test_is_id() {
        let prefixes = prefixes();
        assert!(prefixes.is_id("ex:bar"));
        assert!(prefixes.is_id("ex:"));
        assert!(!prefixes.is_id("foo:bar"));
        assert!(!prefixes.is_id("ex"));
        assert!(!prefixes.is_id(""));
    }

    #[test]
    fn test_split_and_increment() {
        assert_eq!(split_id("ex:bar"), Some(("ex", "bar")));
        assert_eq!(split_id("a:b:c"), Some(("a", "b:c")));
        assert_eq!(increment_id("ex:1").unwrap(), "ex:2");
        assert_eq!(increment_id("COVIC:99").unwrap(), "COVIC:100");
        assert!(increment_id("ex:one").is_err());
        assert!(increment_id("one").is_err());
    }

    #[test]
    fn test_key_suffixes() {
        assert_eq!(id_key_to_label_key("host_id"), "host_label");
        assert_eq!(label_key_to_id_key("host_label"), "host_id");
        assert_eq!(id_key_to_label_key("identity"), "identity");
        assert_eq!(label_key_to_id_key("relabel"), "relabel");
        assert!(is_id_key("ab_id"));
        assert!(!is_id_key("ab_identifier"));
        assert!(is_label_key("ab_label"));
        assert!(!is_label_key("ablabel"));
    }

    proptest! {
        #[test]
        fn prop_increment_keeps_prefix(prefix in "[A-Za-z]{1,8}", n in 0u64..1_000_000) {
            let next = increment_id(&format!("{prefix}:{n}")).unwrap();
            let expected = format!("{prefix}:{}", n + 1);
            prop_assert_eq!(next, expected);
        }

        #[test]
        fn prop_key_suffixes_invert(stem in "[a-z_]{0,10}") {
            let id_key = format!("{stem}_id");
            prop_assert_eq!(label_key_to_id_key(&id_key_to_label_key(&id_key)), id_key);
        }
    }
}
