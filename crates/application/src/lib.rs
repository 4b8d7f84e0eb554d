//! Validation, derivation, preview sessions, and form services.

#![forbid(unsafe_code)]

mod derivation;
mod form_builder_service;
mod form_ports;
mod preview_session;
mod validator;

pub use derivation::{apply_derived_values, derive_values, derive_values_now};
pub use form_builder_service::FormBuilderService;
pub use form_ports::{FORMS_STORAGE_KEY, FormRepository, SubmissionSink};
pub use preview_session::{ErrorMap, PreviewSession, SubmitOutcome, ValueMap};
pub use validator::{
    EMAIL_MESSAGE, PASSWORD_DIGIT_MESSAGE, PASSWORD_LENGTH_MESSAGE, PASSWORD_MIN_LENGTH,
    REQUIRED_MESSAGE, is_email, validate_field,
};
