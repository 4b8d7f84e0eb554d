//! Per-field validation against the field's ordered rule list.

use std::sync::LazyLock;

use formsmith_domain::{FieldValue, FormField, ValidationRule, ValidationRuleKind};
use regex::Regex;

/// Default message for a failed `required` rule.
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Default message for a failed `email` rule.
pub const EMAIL_MESSAGE: &str = "Please enter a valid email address";

/// Fixed message for passwords shorter than [`PASSWORD_MIN_LENGTH`].
pub const PASSWORD_LENGTH_MESSAGE: &str = "Password must be at least 8 characters long";

/// Fixed message for passwords without a digit.
pub const PASSWORD_DIGIT_MESSAGE: &str = "Password must contain at least one number";

/// Minimum number of characters accepted by the `password` rule.
pub const PASSWORD_MIN_LENGTH: usize = 8;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Validates one candidate value against a field's rules.
///
/// Rules run in declaration order and every failing rule contributes its
/// message, so the first entry is the message to display. An empty result
/// means the value is valid. `None` stands for a value the session has never
/// held.
#[must_use]
pub fn validate_field(field: &FormField, value: Option<&FieldValue>) -> Vec<String> {
    let mut messages = Vec::new();

    for rule in field.validation_rules() {
        match rule.kind() {
            ValidationRuleKind::Required => {
                if value.is_none_or(is_missing) {
                    messages.push(message_or(rule, REQUIRED_MESSAGE.to_owned()));
                }
            }
            ValidationRuleKind::MinLength => {
                if let Some((length, bound)) = text_length_and_bound(rule, value)
                    && (length as f64) < bound
                {
                    messages.push(message_or(
                        rule,
                        format!("Minimum length is {} characters", parameter_text(rule)),
                    ));
                }
            }
            ValidationRuleKind::MaxLength => {
                if let Some((length, bound)) = text_length_and_bound(rule, value)
                    && (length as f64) > bound
                {
                    messages.push(message_or(
                        rule,
                        format!("Maximum length is {} characters", parameter_text(rule)),
                    ));
                }
            }
            ValidationRuleKind::Email => {
                if let Some(value) = present(value)
                    && !is_email(&value.display_text())
                {
                    messages.push(message_or(rule, EMAIL_MESSAGE.to_owned()));
                }
            }
            ValidationRuleKind::Password => {
                if let Some(value) = present(value) {
                    let text = value.display_text();
                    if text.chars().count() < PASSWORD_MIN_LENGTH {
                        messages.push(PASSWORD_LENGTH_MESSAGE.to_owned());
                    }
                    if !text.chars().any(|character| character.is_ascii_digit()) {
                        messages.push(PASSWORD_DIGIT_MESSAGE.to_owned());
                    }
                }
            }
            ValidationRuleKind::Custom => {}
        }
    }

    messages
}

/// Returns whether text has the `local@domain.tld` shape.
#[must_use]
pub fn is_email(text: &str) -> bool {
    EMAIL_RE
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(text))
}

fn message_or(rule: &ValidationRule, default: String) -> String {
    rule.configured_message()
        .map(str::to_owned)
        .unwrap_or(default)
}

fn parameter_text(rule: &ValidationRule) -> String {
    rule.parameter()
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn text_length_and_bound(
    rule: &ValidationRule,
    value: Option<&FieldValue>,
) -> Option<(usize, f64)> {
    let text = value?.as_text()?;
    let bound = rule.parameter()?.as_bound()?;

    Some((text.chars().count(), bound))
}

/// Unchecked boxes, zero, and blank text all count as not filled in.
fn is_missing(value: &FieldValue) -> bool {
    match value {
        FieldValue::Boolean(checked) => !checked,
        FieldValue::Number(number) => *number == 0.0 || number.is_nan(),
        FieldValue::Text(_) => value.is_blank_text(),
    }
}

fn present(value: Option<&FieldValue>) -> Option<&FieldValue> {
    value.filter(|value| !value.is_empty_text())
}

#[cfg(test)]
mod tests {
    use formsmith_domain::{
        FieldType, FieldValue, FormField, FormFieldInput, RuleParameter, ValidationRule,
        ValidationRuleKind,
    };
    use proptest::prelude::*;

    use super::{
        EMAIL_MESSAGE, PASSWORD_DIGIT_MESSAGE, PASSWORD_LENGTH_MESSAGE, REQUIRED_MESSAGE,
        validate_field,
    };

    fn field_with(rules: Vec<ValidationRule>) -> FormField {
        let mut input = FormFieldInput::new(FieldType::Text, "Field");
        input.id = "field".to_owned();
        input.validation_rules = rules;
        FormField::new(input).unwrap_or_else(|_| unreachable!())
    }

    fn length_rule(kind: ValidationRuleKind, bound: u32) -> ValidationRule {
        ValidationRule::new(kind, Some(RuleParameter::from(bound)), "")
            .unwrap_or_else(|_| unreachable!())
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::from(value)
    }

    #[test]
    fn required_rejects_absent_and_blank_values() {
        let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Required)]);
        assert_eq!(validate_field(&field, None), vec![REQUIRED_MESSAGE]);
        assert_eq!(
            validate_field(&field, Some(&text(" \t "))),
            vec![REQUIRED_MESSAGE]
        );
        assert!(validate_field(&field, Some(&text("x"))).is_empty());
    }

    #[test]
    fn required_rejects_unchecked_box_and_zero() {
        let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Required)]);
        assert_eq!(
            validate_field(&field, Some(&FieldValue::Boolean(false))),
            vec![REQUIRED_MESSAGE]
        );
        assert_eq!(
            validate_field(&field, Some(&FieldValue::Number(0.0))),
            vec![REQUIRED_MESSAGE]
        );
        assert!(validate_field(&field, Some(&FieldValue::Boolean(true))).is_empty());
        assert!(validate_field(&field, Some(&FieldValue::Number(-1.5))).is_empty());
        assert!(validate_field(&field, Some(&text("0"))).is_empty());
    }

    #[test]
    fn configured_message_replaces_default() {
        let rule = ValidationRule::new(ValidationRuleKind::Required, None, "Name please")
            .unwrap_or_else(|_| unreachable!());
        let field = field_with(vec![rule]);
        assert_eq!(validate_field(&field, Some(&text(""))), vec!["Name please"]);
    }

    #[test]
    fn length_defaults_mention_parameter() {
        let field = field_with(vec![
            length_rule(ValidationRuleKind::MinLength, 3),
            length_rule(ValidationRuleKind::MaxLength, 1),
        ]);
        assert_eq!(
            validate_field(&field, Some(&text("ab"))),
            vec![
                "Minimum length is 3 characters",
                "Maximum length is 1 characters"
            ]
        );
    }

    #[test]
    fn length_rules_ignore_non_text_values() {
        let field = field_with(vec![length_rule(ValidationRuleKind::MinLength, 5)]);
        assert!(validate_field(&field, None).is_empty());
        assert!(validate_field(&field, Some(&FieldValue::Number(1.0))).is_empty());
    }

    #[test]
    fn numeric_text_parameter_counts_as_bound() {
        let rule = ValidationRule::new(
            ValidationRuleKind::MaxLength,
            Some(RuleParameter::from("2")),
            "",
        )
        .unwrap_or_else(|_| unreachable!());
        let field = field_with(vec![rule]);
        assert_eq!(
            validate_field(&field, Some(&text("abc"))),
            vec!["Maximum length is 2 characters"]
        );
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let field = field_with(vec![length_rule(ValidationRuleKind::MaxLength, 3)]);
        assert!(validate_field(&field, Some(&text("äöü"))).is_empty());
    }

    #[test]
    fn email_rule_checks_shape_of_present_values() {
        let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Email)]);
        assert!(validate_field(&field, Some(&text("a@b.co"))).is_empty());
        assert_eq!(
            validate_field(&field, Some(&text("not-an-email"))),
            vec![EMAIL_MESSAGE]
        );
        assert_eq!(
            validate_field(&field, Some(&text("a b@c.de"))),
            vec![EMAIL_MESSAGE]
        );
        assert!(validate_field(&field, Some(&text(""))).is_empty());
        assert!(validate_field(&field, None).is_empty());
    }

    #[test]
    fn password_reports_each_failing_condition() {
        let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Password)]);
        assert_eq!(
            validate_field(&field, Some(&text("abc"))),
            vec![PASSWORD_LENGTH_MESSAGE, PASSWORD_DIGIT_MESSAGE]
        );
        assert!(validate_field(&field, Some(&text("abcd1234"))).is_empty());
        assert_eq!(
            validate_field(&field, Some(&text("abcdefgh"))),
            vec![PASSWORD_DIGIT_MESSAGE]
        );
        assert!(validate_field(&field, Some(&text(""))).is_empty());
    }

    #[test]
    fn password_ignores_configured_message() {
        let rule = ValidationRule::new(ValidationRuleKind::Password, None, "Weak password")
            .unwrap_or_else(|_| unreachable!());
        let field = field_with(vec![rule]);
        assert_eq!(
            validate_field(&field, Some(&text("abcdefgh"))),
            vec![PASSWORD_DIGIT_MESSAGE]
        );
    }

    #[test]
    fn custom_rule_always_passes() {
        let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Custom)]);
        assert!(validate_field(&field, None).is_empty());
    }

    #[test]
    fn messages_follow_rule_order() {
        let field = field_with(vec![
            ValidationRule::of(ValidationRuleKind::Email),
            ValidationRule::of(ValidationRuleKind::Required),
            length_rule(ValidationRuleKind::MinLength, 4),
        ]);
        assert_eq!(
            validate_field(&field, Some(&text(" "))),
            vec![
                EMAIL_MESSAGE,
                REQUIRED_MESSAGE,
                "Minimum length is 4 characters"
            ]
        );
    }

    proptest! {
        #[test]
        fn field_without_rules_accepts_anything(
            raw in ".*",
            number in any::<f64>(),
            flag in any::<bool>(),
        ) {
            let field = field_with(Vec::new());
            prop_assert!(validate_field(&field, Some(&text(&raw))).is_empty());
            prop_assert!(validate_field(&field, Some(&FieldValue::Number(number))).is_empty());
            prop_assert!(validate_field(&field, Some(&FieldValue::Boolean(flag))).is_empty());
            prop_assert!(validate_field(&field, None).is_empty());
        }

        #[test]
        fn length_bounds_are_inclusive(raw in "[a-z0-9]{0,40}") {
            let length = u32::try_from(raw.chars().count()).unwrap_or(u32::MAX);
            let field = field_with(vec![
                length_rule(ValidationRuleKind::MinLength, length),
                length_rule(ValidationRuleKind::MaxLength, length),
            ]);
            prop_assert!(validate_field(&field, Some(&text(&raw))).is_empty());
        }

        #[test]
        fn required_passes_any_visible_text(raw in "[ ]{0,3}[a-zA-Z0-9]{1,10}[ ]{0,3}") {
            let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Required)]);
            prop_assert!(validate_field(&field, Some(&text(&raw))).is_empty());
        }

        #[test]
        fn required_rejects_any_whitespace_only_text(raw in "[ \t\n]{0,10}") {
            let field = field_with(vec![ValidationRule::of(ValidationRuleKind::Required)]);
            prop_assert_eq!(
                validate_field(&field, Some(&text(&raw))),
                vec![REQUIRED_MESSAGE.to_owned()]
            );
        }
    }
}
