use formsmith_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{DerivationKind, FieldType, FieldValue, ValidationRule};

/// One input definition inside a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    id: NonEmptyString,
    #[serde(rename = "type")]
    field_type: FieldType,
    label: NonEmptyString,
    #[serde(default)]
    required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_value: Option<FieldValue>,
    #[serde(default)]
    validation_rules: Vec<ValidationRule>,
    #[serde(default)]
    is_derived: bool,
    #[serde(rename = "parentFields", default)]
    parent_field_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    derived_formula: Option<String>,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    order: usize,
}

/// Input payload used to construct a validated form field.
#[derive(Debug, Clone, PartialEq)]
pub struct FormFieldInput {
    /// Stable field identifier, unique within its form.
    pub id: String,
    /// Field type.
    pub field_type: FieldType,
    /// User-facing label.
    pub label: String,
    /// Display flag for required inputs. Enforcement comes from rules.
    pub required: bool,
    /// Optional initial value.
    pub default_value: Option<FieldValue>,
    /// Ordered validation rules.
    pub validation_rules: Vec<ValidationRule>,
    /// Whether the value is computed from parent fields.
    pub is_derived: bool,
    /// Parent field identifiers read by the derivation.
    pub parent_field_ids: Vec<String>,
    /// Descriptive derivation formula.
    pub derived_formula: Option<String>,
    /// Choices for select and radio fields.
    pub options: Vec<String>,
}

impl FormFieldInput {
    /// Creates an input for a plain field with a generated identifier.
    #[must_use]
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            id: FormField::generate_id(),
            field_type,
            label: label.into(),
            required: false,
            default_value: None,
            validation_rules: Vec::new(),
            is_derived: false,
            parent_field_ids: Vec::new(),
            derived_formula: None,
            options: Vec::new(),
        }
    }
}

/// Partial update applied to an existing form field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFieldUpdate {
    /// Replacement field type.
    pub field_type: Option<FieldType>,
    /// Replacement label.
    pub label: Option<String>,
    /// Replacement required display flag.
    pub required: Option<bool>,
    /// Replacement default value. `Some(None)` clears it.
    pub default_value: Option<Option<FieldValue>>,
    /// Replacement validation rules.
    pub validation_rules: Option<Vec<ValidationRule>>,
    /// Replacement derived flag.
    pub is_derived: Option<bool>,
    /// Replacement parent field identifiers.
    pub parent_field_ids: Option<Vec<String>>,
    /// Replacement formula. `Some(None)` clears it.
    pub derived_formula: Option<Option<String>>,
    /// Replacement options.
    pub options: Option<Vec<String>>,
}

impl FormField {
    /// Creates a validated form field.
    ///
    /// Options are kept only for select and radio fields, and derivation
    /// settings only for derived fields.
    pub fn new(input: FormFieldInput) -> AppResult<Self> {
        let FormFieldInput {
            id,
            field_type,
            label,
            required,
            default_value,
            validation_rules,
            is_derived,
            parent_field_ids,
            derived_formula,
            options,
        } = input;

        let id = NonEmptyString::named("field id", id.trim())?;
        let label = NonEmptyString::named("field label", label.trim())?;

        if let Some(value) = &default_value
            && !field_type.accepts(value)
        {
            return Err(AppError::Validation(format!(
                "default value of field '{}' does not match field type '{}'",
                id.as_str(),
                field_type.as_str()
            )));
        }

        let options = if field_type.has_options() {
            options
                .into_iter()
                .map(|option| option.trim().to_owned())
                .filter(|option| !option.is_empty())
                .collect()
        } else {
            Vec::new()
        };

        let (parent_field_ids, derived_formula) = if is_derived {
            let mut parents: Vec<String> = Vec::with_capacity(parent_field_ids.len());
            for parent_id in parent_field_ids {
                let parent_id = parent_id.trim().to_owned();
                if parent_id.is_empty() || parents.contains(&parent_id) {
                    continue;
                }
                if parent_id == id.as_str() {
                    return Err(AppError::Validation(format!(
                        "derived field '{}' cannot be its own parent",
                        id.as_str()
                    )));
                }
                parents.push(parent_id);
            }

            let formula = derived_formula.and_then(|value| {
                let trimmed = value.trim().to_owned();
                (!trimmed.is_empty()).then_some(trimmed)
            });

            (parents, formula)
        } else {
            (Vec::new(), None)
        };

        Ok(Self {
            id,
            field_type,
            label,
            required,
            default_value,
            validation_rules,
            is_derived,
            parent_field_ids,
            derived_formula,
            options,
            order: 0,
        })
    }

    /// Returns a fresh random field identifier.
    #[must_use]
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Returns a copy with the update applied and invariants re-checked.
    pub fn with_updates(&self, update: FormFieldUpdate) -> AppResult<Self> {
        let mut updated = Self::new(FormFieldInput {
            id: self.id.as_str().to_owned(),
            field_type: update.field_type.unwrap_or(self.field_type),
            label: update
                .label
                .unwrap_or_else(|| self.label.as_str().to_owned()),
            required: update.required.unwrap_or(self.required),
            default_value: update
                .default_value
                .unwrap_or_else(|| self.default_value.clone()),
            validation_rules: update
                .validation_rules
                .unwrap_or_else(|| self.validation_rules.clone()),
            is_derived: update.is_derived.unwrap_or(self.is_derived),
            parent_field_ids: update
                .parent_field_ids
                .unwrap_or_else(|| self.parent_field_ids.clone()),
            derived_formula: update
                .derived_formula
                .unwrap_or_else(|| self.derived_formula.clone()),
            options: update.options.unwrap_or_else(|| self.options.clone()),
        })?;
        updated.order = self.order;

        Ok(updated)
    }

    pub(crate) fn revalidate(self) -> AppResult<Self> {
        let order = self.order;
        let mut field = Self::new(FormFieldInput {
            id: self.id.into(),
            field_type: self.field_type,
            label: self.label.into(),
            required: self.required,
            default_value: self.default_value,
            validation_rules: self.validation_rules,
            is_derived: self.is_derived,
            parent_field_ids: self.parent_field_ids,
            derived_formula: self.derived_formula,
            options: self.options,
        })?;
        field.order = order;

        Ok(field)
    }

    /// Returns the field identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the required display flag.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the default value.
    #[must_use]
    pub fn default_value(&self) -> Option<&FieldValue> {
        self.default_value.as_ref()
    }

    /// Returns validation rules in declaration order.
    #[must_use]
    pub fn validation_rules(&self) -> &[ValidationRule] {
        &self.validation_rules
    }

    /// Returns whether the value is computed instead of typed.
    #[must_use]
    pub fn is_derived(&self) -> bool {
        self.is_derived
    }

    /// Returns parent field identifiers of a derived field.
    #[must_use]
    pub fn parent_field_ids(&self) -> &[String] {
        &self.parent_field_ids
    }

    /// Returns the descriptive derivation formula.
    #[must_use]
    pub fn derived_formula(&self) -> Option<&str> {
        self.derived_formula.as_deref()
    }

    /// Returns the typed derivation for a derived field.
    #[must_use]
    pub fn derivation_kind(&self) -> Option<DerivationKind> {
        if !self.is_derived {
            return None;
        }

        self.derived_formula().and_then(DerivationKind::classify)
    }

    /// Returns choices of a select or radio field.
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Returns the display position inside the owning form.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Returns the value a fresh preview starts with.
    ///
    /// Checkboxes start unchecked and radios on their first option. Radios
    /// without options have no initial value.
    #[must_use]
    pub fn initial_value(&self) -> Option<FieldValue> {
        if let Some(value) = &self.default_value {
            return Some(value.clone());
        }

        match self.field_type {
            FieldType::Checkbox => Some(FieldValue::Boolean(false)),
            FieldType::Radio => self.options.first().cloned().map(FieldValue::Text),
            FieldType::Text
            | FieldType::Number
            | FieldType::Textarea
            | FieldType::Select
            | FieldType::Date => Some(FieldValue::Text(String::new())),
        }
    }

    pub(crate) fn set_order(&mut self, order: usize) {
        self.order = order;
    }

    pub(crate) fn forget_parent(&mut self, parent_id: &str) {
        self.retain_parents(|candidate| candidate != parent_id);
    }

    pub(crate) fn retain_parents(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.parent_field_ids
            .retain(|candidate| keep(candidate.as_str()));
    }

    /// An empty-string default stands for "no default" in stored forms.
    pub(crate) fn clear_empty_default(&mut self) {
        if self
            .default_value
            .as_ref()
            .is_some_and(FieldValue::is_empty_text)
        {
            self.default_value = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FormField, FormFieldInput, FormFieldUpdate};
    use crate::{DerivationKind, FieldType, FieldValue};

    fn input(field_type: FieldType, label: &str) -> FormFieldInput {
        let mut input = FormFieldInput::new(field_type, label);
        input.id = label.to_lowercase();
        input
    }

    #[test]
    fn blank_label_is_rejected() {
        assert!(FormField::new(input(FieldType::Text, "  ")).is_err());
    }

    #[test]
    fn options_are_trimmed_and_kept_only_for_choice_fields() {
        let mut radio = input(FieldType::Radio, "Plan");
        radio.options = vec![" basic ".to_owned(), "".to_owned(), "pro".to_owned()];
        let radio = FormField::new(radio).unwrap_or_else(|_| unreachable!());
        assert_eq!(radio.options(), ["basic", "pro"]);

        let mut text = input(FieldType::Text, "Name");
        text.options = vec!["ignored".to_owned()];
        let text = FormField::new(text).unwrap_or_else(|_| unreachable!());
        assert!(text.options().is_empty());
    }

    #[test]
    fn derived_field_cannot_be_its_own_parent() {
        let mut derived = input(FieldType::Number, "Age");
        derived.is_derived = true;
        derived.parent_field_ids = vec!["age".to_owned()];
        assert!(FormField::new(derived).is_err());
    }

    #[test]
    fn non_derived_field_drops_derivation_settings() {
        let mut field = input(FieldType::Text, "Name");
        field.parent_field_ids = vec!["dob".to_owned()];
        field.derived_formula = Some("Age".to_owned());
        let field = FormField::new(field).unwrap_or_else(|_| unreachable!());
        assert!(field.parent_field_ids().is_empty());
        assert_eq!(field.derivation_kind(), None);
    }

    #[test]
    fn checkbox_default_must_be_boolean() {
        let mut field = input(FieldType::Checkbox, "Terms");
        field.default_value = Some(FieldValue::from("yes"));
        assert!(FormField::new(field).is_err());
    }

    #[test]
    fn initial_values_follow_field_type() {
        let checkbox = FormField::new(input(FieldType::Checkbox, "Terms"))
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(checkbox.initial_value(), Some(FieldValue::Boolean(false)));

        let mut radio = input(FieldType::Radio, "Plan");
        radio.options = vec!["basic".to_owned(), "pro".to_owned()];
        let radio = FormField::new(radio).unwrap_or_else(|_| unreachable!());
        assert_eq!(radio.initial_value(), Some(FieldValue::from("basic")));

        let empty_radio =
            FormField::new(input(FieldType::Radio, "Tier")).unwrap_or_else(|_| unreachable!());
        assert_eq!(empty_radio.initial_value(), None);

        let number =
            FormField::new(input(FieldType::Number, "Count")).unwrap_or_else(|_| unreachable!());
        assert_eq!(number.initial_value(), Some(FieldValue::from("")));
    }

    #[test]
    fn updates_keep_identity_and_recheck_invariants() {
        let mut derived = input(FieldType::Text, "Age");
        derived.is_derived = true;
        derived.parent_field_ids = vec!["dob".to_owned()];
        derived.derived_formula = Some("Age from dob".to_owned());
        let derived = FormField::new(derived).unwrap_or_else(|_| unreachable!());
        assert_eq!(derived.derivation_kind(), Some(DerivationKind::AgeFromDate));

        let relabeled = derived
            .with_updates(FormFieldUpdate {
                label: Some("Age (years)".to_owned()),
                ..FormFieldUpdate::default()
            })
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(relabeled.id(), "age");
        assert_eq!(relabeled.label(), "Age (years)");
        assert_eq!(relabeled.parent_field_ids(), ["dob"]);

        let invalid = derived.with_updates(FormFieldUpdate {
            parent_field_ids: Some(vec!["age".to_owned()]),
            ..FormFieldUpdate::default()
        });
        assert!(invalid.is_err());
    }
}
