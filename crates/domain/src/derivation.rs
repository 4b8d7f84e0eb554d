use serde::{Deserialize, Serialize};

/// Supported derived-value computations.
///
/// Authors describe a derivation with free text. The text is classified once
/// here, and evaluators only ever match on the typed kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DerivationKind {
    /// Whole years elapsed since the first parent's date value.
    AgeFromDate,
}

impl DerivationKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AgeFromDate => "ageFromDate",
        }
    }

    /// Classifies a descriptive formula. Unrecognized text has no kind.
    #[must_use]
    pub fn classify(formula: &str) -> Option<Self> {
        formula.contains("Age").then_some(Self::AgeFromDate)
    }
}
