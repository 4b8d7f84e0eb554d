//! Live preview state for one form: values, errors, and touched fields.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Local, NaiveDate};
use formsmith_core::{AppError, AppResult};
use formsmith_domain::{FieldValue, Form, FormField};

use crate::derivation::apply_derived_values;
use crate::validator::validate_field;

/// Current value of every field, keyed by field id.
pub type ValueMap = BTreeMap<String, FieldValue>;

/// Violation messages of every invalid field, keyed by field id.
pub type ErrorMap = BTreeMap<String, Vec<String>>;

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Every field passed validation. Carries the values to hand off.
    Accepted(ValueMap),
    /// At least one field failed validation.
    Rejected(ErrorMap),
}

impl SubmitOutcome {
    /// Returns whether the submission was accepted.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Reducer over `(Form, ValueMap) -> (ValueMap, ErrorMap)` transitions.
///
/// The form is fixed for the lifetime of the session. Derived values are
/// recomputed after every mutation, before validation runs.
#[derive(Debug, Clone)]
pub struct PreviewSession {
    form: Form,
    values: ValueMap,
    errors: ErrorMap,
    touched: BTreeSet<String>,
    pinned_date: Option<NaiveDate>,
}

impl PreviewSession {
    /// Starts a session evaluated against the local calendar date.
    #[must_use]
    pub fn start(form: Form) -> Self {
        Self::with_pinned_date(form, None)
    }

    /// Starts a session whose derivations always use `today`.
    #[must_use]
    pub fn start_on(form: Form, today: NaiveDate) -> Self {
        Self::with_pinned_date(form, Some(today))
    }

    fn with_pinned_date(form: Form, pinned_date: Option<NaiveDate>) -> Self {
        let values = form
            .fields()
            .iter()
            .filter_map(|field| {
                field
                    .initial_value()
                    .map(|value| (field.id().to_owned(), value))
            })
            .collect();

        let mut session = Self {
            form,
            values,
            errors: ErrorMap::new(),
            touched: BTreeSet::new(),
            pinned_date,
        };
        session.rederive();
        session
    }

    /// Returns the previewed form.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Returns current values.
    #[must_use]
    pub fn values(&self) -> &ValueMap {
        &self.values
    }

    /// Returns current errors.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Returns one field's current value.
    #[must_use]
    pub fn value(&self, field_id: &str) -> Option<&FieldValue> {
        self.values.get(field_id)
    }

    /// Returns whether the field has been blurred or a submit touched it.
    #[must_use]
    pub fn is_touched(&self, field_id: &str) -> bool {
        self.touched.contains(field_id)
    }

    /// Returns the message to display next to a field.
    ///
    /// Only touched fields show errors, and only their first message.
    #[must_use]
    pub fn visible_error(&self, field_id: &str) -> Option<&str> {
        if !self.is_touched(field_id) {
            return None;
        }

        self.errors
            .get(field_id)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Records a user edit, re-derives, and re-validates the edited field.
    pub fn change(&mut self, field_id: &str, value: FieldValue) -> AppResult<()> {
        let field = self.editable_field(field_id)?;
        let field_id = field.id().to_owned();

        let derived_before = self.derived_values();
        self.values.insert(field_id.clone(), value);
        self.rederive();
        self.revalidate(field_id.as_str());

        let recomputed: Vec<String> = self
            .derived_values()
            .into_iter()
            .filter(|(derived_id, current)| derived_before.get(derived_id) != Some(current))
            .map(|(derived_id, _)| derived_id)
            .collect();
        for derived_id in recomputed {
            self.revalidate(derived_id.as_str());
        }

        Ok(())
    }

    /// Marks a field as touched.
    pub fn blur(&mut self, field_id: &str) -> AppResult<()> {
        let field_id = self.known_field(field_id)?.id().to_owned();
        self.touched.insert(field_id);
        Ok(())
    }

    /// Validates every field, touches all of them, and reports the outcome.
    pub fn submit(&mut self) -> SubmitOutcome {
        self.rederive();

        let mut errors = ErrorMap::new();
        for field in self.form.fields() {
            let messages = validate_field(field, self.values.get(field.id()));
            if !messages.is_empty() {
                errors.insert(field.id().to_owned(), messages);
            }
        }

        self.touched = self
            .form
            .fields()
            .iter()
            .map(|field| field.id().to_owned())
            .collect();
        self.errors = errors;

        if self.errors.is_empty() {
            SubmitOutcome::Accepted(self.values.clone())
        } else {
            SubmitOutcome::Rejected(self.errors.clone())
        }
    }

    fn known_field(&self, field_id: &str) -> AppResult<&FormField> {
        self.form.field(field_id).ok_or_else(|| {
            AppError::NotFound(format!(
                "field '{field_id}' does not exist in form '{}'",
                self.form.id()
            ))
        })
    }

    fn editable_field(&self, field_id: &str) -> AppResult<&FormField> {
        let field = self.known_field(field_id)?;
        if field.is_derived() {
            return Err(AppError::Validation(format!(
                "field '{field_id}' is derived and cannot be edited"
            )));
        }

        Ok(field)
    }

    fn today(&self) -> NaiveDate {
        self.pinned_date
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn derived_values(&self) -> ValueMap {
        self.form
            .fields()
            .iter()
            .filter(|field| field.is_derived())
            .filter_map(|field| {
                self.values
                    .get(field.id())
                    .map(|value| (field.id().to_owned(), value.clone()))
            })
            .collect()
    }

    fn rederive(&mut self) {
        let today = self.today();
        apply_derived_values(self.form.fields(), &mut self.values, today);
    }

    fn revalidate(&mut self, field_id: &str) {
        let Some(field) = self.form.field(field_id) else {
            return;
        };

        let messages = validate_field(field, self.values.get(field_id));
        if messages.is_empty() {
            self.errors.remove(field_id);
        } else {
            self.errors.insert(field_id.to_owned(), messages);
        }
    }
}
