//! Form definitions and their invariants.

#![forbid(unsafe_code)]

mod derivation;
mod field;
mod form;
mod form_field;
mod validation_rule;

pub use derivation::DerivationKind;
pub use field::{FieldType, FieldValue};
pub use form::Form;
pub use form_field::{FormField, FormFieldInput, FormFieldUpdate};
pub use validation_rule::{RuleParameter, ValidationRule, ValidationRuleKind};
