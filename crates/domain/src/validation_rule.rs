use std::fmt::{Display, Formatter};
use std::str::FromStr;

use formsmith_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Supported validation rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValidationRuleKind {
    /// Value must be present and non-blank.
    Required,
    /// String value must have at least `parameter` characters.
    MinLength,
    /// String value must have at most `parameter` characters.
    MaxLength,
    /// Value must look like `local@domain.tld`.
    Email,
    /// Value must be at least eight characters and contain a digit.
    Password,
    /// Reserved extension point without a built-in check.
    Custom,
}

impl ValidationRuleKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Email => "email",
            Self::Password => "password",
            Self::Custom => "custom",
        }
    }

    /// Returns whether the rule reads a length bound from its parameter.
    #[must_use]
    pub fn takes_length_bound(&self) -> bool {
        matches!(self, Self::MinLength | Self::MaxLength)
    }
}

impl FromStr for ValidationRuleKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "required" => Ok(Self::Required),
            "minLength" => Ok(Self::MinLength),
            "maxLength" => Ok(Self::MaxLength),
            "email" => Ok(Self::Email),
            "password" => Ok(Self::Password),
            "custom" => Ok(Self::Custom),
            _ => Err(AppError::Validation(format!(
                "unknown validation rule type '{value}'"
            ))),
        }
    }
}

/// Optional rule parameter as configured by the form author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleParameter {
    /// Numeric parameter.
    Number(f64),
    /// Free-text parameter, numeric text still counts as a bound.
    Text(String),
}

impl RuleParameter {
    /// Returns the parameter as a numeric bound when it has one.
    #[must_use]
    pub fn as_bound(&self) -> Option<f64> {
        let bound = match self {
            Self::Number(number) => *number,
            Self::Text(text) => text.trim().parse::<f64>().ok()?,
        };

        bound.is_finite().then_some(bound)
    }
}

impl Display for RuleParameter {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(number) => write!(formatter, "{number}"),
            Self::Text(text) => formatter.write_str(text.as_str()),
        }
    }
}

impl From<u32> for RuleParameter {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for RuleParameter {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// One named check attached to a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    kind: ValidationRuleKind,
    #[serde(rename = "value", default, skip_serializing_if = "Option::is_none")]
    parameter: Option<RuleParameter>,
    #[serde(default)]
    message: String,
}

impl ValidationRule {
    /// Creates a validated rule.
    ///
    /// Length rules require a numeric parameter. A blank message selects the
    /// built-in default message.
    pub fn new(
        kind: ValidationRuleKind,
        parameter: Option<RuleParameter>,
        message: impl Into<String>,
    ) -> AppResult<Self> {
        if kind.takes_length_bound() {
            let has_bound = parameter
                .as_ref()
                .and_then(RuleParameter::as_bound)
                .is_some_and(|bound| bound >= 0.0);
            if !has_bound {
                return Err(AppError::Validation(format!(
                    "{} rules require a non-negative numeric value",
                    kind.as_str()
                )));
            }
        }

        Ok(Self {
            kind,
            parameter,
            message: message.into().trim().to_owned(),
        })
    }

    /// Creates a rule without parameter that reports its default message.
    #[must_use]
    pub fn of(kind: ValidationRuleKind) -> Self {
        Self {
            kind,
            parameter: None,
            message: String::new(),
        }
    }

    /// Returns the rule kind.
    #[must_use]
    pub fn kind(&self) -> ValidationRuleKind {
        self.kind
    }

    /// Returns the configured parameter.
    #[must_use]
    pub fn parameter(&self) -> Option<&RuleParameter> {
        self.parameter.as_ref()
    }

    /// Returns the configured message, if the author supplied one.
    #[must_use]
    pub fn configured_message(&self) -> Option<&str> {
        let trimmed = self.message.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}
