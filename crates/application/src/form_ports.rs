use async_trait::async_trait;
use formsmith_core::AppResult;
use formsmith_domain::Form;

use crate::ValueMap;

/// Fixed key under which the saved form list is stored.
pub const FORMS_STORAGE_KEY: &str = "formBuilder_forms";

/// Blob store port holding the whole saved form list.
#[async_trait]
pub trait FormRepository: Send + Sync {
    /// Loads every saved form in stored order.
    ///
    /// Missing or unreadable content yields an empty list.
    async fn load_forms(&self) -> AppResult<Vec<Form>>;

    /// Replaces the stored list.
    async fn save_forms(&self, forms: &[Form]) -> AppResult<()>;

    /// Removes the stored list.
    async fn clear_forms(&self) -> AppResult<()>;
}

/// Receiver of accepted preview submissions.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    /// Hands off the submitted values of one form.
    async fn deliver(&self, form: &Form, values: &ValueMap) -> AppResult<()>;
}
