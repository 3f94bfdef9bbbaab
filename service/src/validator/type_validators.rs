//! Type validators for field values

use super::mutation::validate_mutation_list;
use submission_core::names::PrefixMap;
use submission_core::schema::FieldType;

/// Result of checking a value against a field type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeCheck {
    /// The value has the type
    Valid,
    /// The value does not have the type, with an optional explanation
    Invalid(Option<String>),
    /// The type name is not recognized, so the value cannot be checked
    Unrecognized,
}

/// Checks trimmed, non-empty values against [`FieldType`]s
pub struct TypeValidator<'a> {
    prefixes: &'a PrefixMap,
}

impl<'a> TypeValidator<'a> {
    /// Create a type validator that resolves `id` values against `prefixes`
    #[must_use]
    pub fn new(prefixes: &'a PrefixMap) -> Self {
        Self { prefixes }
    }

    /// Check a value against a type
    #[must_use]
    pub fn validate(&self, field_type: &FieldType, value: &str) -> TypeCheck {
        let valid = match field_type {
            FieldType::Text | FieldType::Label => true,
            FieldType::Id => self.prefixes.is_id(value),
            FieldType::Integer => value.parse::<i64>().is_ok(),
            FieldType::NonNegativeInteger => value.parse::<i64>().is_ok_and(|n| n >= 0),
            FieldType::Score0To5 => value.parse::<i64>().is_ok_and(|n| (0..=5).contains(&n)),
            FieldType::Float | FieldType::Percent => is_float(value),
            FieldType::FloatNa => is_na(value) || is_float(value),
            FieldType::FloatThresholdNa => {
                is_na(value) || is_float(value.trim_start_matches(['<', '>']))
            }
            FieldType::MutationList => {
                return match validate_mutation_list(value) {
                    None => TypeCheck::Valid,
                    Some(reason) => TypeCheck::Invalid(Some(reason)),
                };
            }
            FieldType::Unknown(_) => return TypeCheck::Unrecognized,
        };
        if valid {
            TypeCheck::Valid
        } else {
            TypeCheck::Invalid(None)
        }
    }
}

fn is_float(value: &str) -> bool {
    value.parse::<f64>().is_ok()
}

fn is_na(value: &str) -> bool {
    value.is_empty() || value.eq_ignore_ascii_case("na")
}
