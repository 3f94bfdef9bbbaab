//! Amino acid mutation lists
//!
//! A mutation list is a comma-separated list of tokens. Each token is a
//! point mutation such as `D614G`, a point deletion such as `del145`, or a
//! range deletion such as `del241-243`.

use regex::Regex;
use std::sync::LazyLock;

/// The twenty standard amino acid one-letter codes
pub const AMINO_ACIDS: &str = "ACDEFGHIKLMNPQRSTVWY";

static POINT_MUTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z])(\d+)([A-Z])$").expect("Valid point mutation regex pattern")
});

static POINT_DELETION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^del\d+$").expect("Valid point deletion regex pattern"));

static RANGE_DELETION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^del(\d+)-(\d+)$").expect("Valid range deletion regex pattern")
});

fn is_amino_acid(residue: &str) -> bool {
    residue.len() == 1 && AMINO_ACIDS.contains(residue)
}

/// `None` if the token is a valid mutation, otherwise the reason it is not
#[must_use]
pub fn validate_mutation(token: &str) -> Option<String> {
    if let Some(captures) = POINT_MUTATION.captures(token) {
        let from = &captures[1];
        let to = &captures[3];
        if !is_amino_acid(from) {
            return Some(format!("'{from}' is not an amino acid in mutation '{token}'"));
        }
        if !is_amino_acid(to) {
            return Some(format!("'{to}' is not an amino acid in mutation '{token}'"));
        }
        if from == to {
            return Some(format!("Mutation '{token}' does not change the residue"));
        }
        return None;
    }

    if POINT_DELETION.is_match(token) {
        return None;
    }

    if let Some(captures) = RANGE_DELETION.captures(token) {
        // Overlong positions fail to parse and are rejected with the rest
        return match (captures[1].parse::<u64>(), captures[2].parse::<u64>()) {
            (Ok(start), Ok(end)) if start < end => None,
            _ => Some(format!("Deletion '{token}' must start before it ends")),
        };
    }

    Some(format!("'{token}' is not a valid mutation"))
}

/// `None` if every comma-separated token is a valid mutation, otherwise the
/// reason the first invalid token is not.
#[must_use]
pub fn validate_mutation_list(value: &str) -> Option<String> {
    value
        .split(',')
        .map(str::trim)
        .find_map(validate_mutation)
}
