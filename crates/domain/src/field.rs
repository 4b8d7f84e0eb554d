use std::borrow::Cow;
use std::str::FromStr;

use formsmith_core::AppError;
use serde::{Deserialize, Serialize};

/// Supported form field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Single-line text input.
    Text,
    /// Numeric input.
    Number,
    /// Multi-line text input.
    Textarea,
    /// Drop-down choice among options.
    Select,
    /// Radio group choice among options.
    Radio,
    /// Boolean checkbox.
    Checkbox,
    /// Date-only input.
    Date,
}

impl FieldType {
    /// Every field type in palette order.
    pub const ALL: [Self; 7] = [
        Self::Text,
        Self::Number,
        Self::Textarea,
        Self::Select,
        Self::Radio,
        Self::Checkbox,
        Self::Date,
    ];

    /// Returns a stable storage value for the field type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Textarea => "textarea",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Checkbox => "checkbox",
            Self::Date => "date",
        }
    }

    /// Returns whether the type picks its value from a list of options.
    #[must_use]
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    /// Returns whether a value has a shape this field type can hold.
    ///
    /// Number inputs may carry their raw text as well as a parsed number.
    #[must_use]
    pub fn accepts(&self, value: &FieldValue) -> bool {
        match self {
            Self::Checkbox => matches!(value, FieldValue::Boolean(_)),
            Self::Number => matches!(value, FieldValue::Number(_) | FieldValue::Text(_)),
            Self::Text | Self::Textarea | Self::Select | Self::Radio | Self::Date => {
                matches!(value, FieldValue::Text(_))
            }
        }
    }
}

impl FromStr for FieldType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "number" => Ok(Self::Number),
            "textarea" => Ok(Self::Textarea),
            "select" => Ok(Self::Select),
            "radio" => Ok(Self::Radio),
            "checkbox" => Ok(Self::Checkbox),
            "date" => Ok(Self::Date),
            _ => Err(AppError::Validation(format!(
                "unknown field type '{value}'"
            ))),
        }
    }
}

/// Scalar value held by one form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Checkbox state.
    Boolean(bool),
    /// Numeric value.
    Number(f64),
    /// Text, date, or selected option.
    Text(String),
}

impl FieldValue {
    /// Returns the text payload when the value is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            Self::Number(_) | Self::Boolean(_) => None,
        }
    }

    /// Returns whether the value is the empty string.
    #[must_use]
    pub fn is_empty_text(&self) -> bool {
        self.as_text().is_some_and(str::is_empty)
    }

    /// Returns whether the value is a string with no visible characters.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        self.as_text().is_some_and(|text| text.trim().is_empty())
    }

    /// Returns the value as display text.
    #[must_use]
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text.as_str()),
            Self::Number(number) => Cow::Owned(number.to_string()),
            Self::Boolean(flag) => Cow::Borrowed(if *flag { "true" } else { "false" }),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
