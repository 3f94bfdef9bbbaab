//! Submission validation
//!
//! [`ValidationEngine`] checks a table against a [`FieldSchema`] and
//! produces an [`Outcome`] carrying either the accepted table or the errors,
//! along with a grid of the data sheet.
//!
//! [`FieldSchema`]: submission_core::schema::FieldSchema

pub mod engine;
pub mod mutation;
pub mod type_validators;
pub mod unique_key_validator;

pub use engine::{Outcome, ReferenceSet, References, ValidationEngine};
pub use type_validators::{TypeCheck, TypeValidator};
pub use unique_key_validator::UniqueKeyValidator;
