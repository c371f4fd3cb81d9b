//! Declarative field-validation engine.
//!
//! Provides rule types and a pure evaluator that turns a bag of field values
//! plus a [`RuleSet`] into a field -> message error map.

pub mod evaluator;
pub mod rules;

pub use evaluator::{is_empty, validate, validate_now};
pub use rules::{
    Bound, Constraint, Pattern, Rule, RuleSet, ValidationContext, ValidationErrors,
    ValidationMessages,
};
