//! Console submission sink for previews. Logs submitted values to tracing output.

use async_trait::async_trait;
use formsmith_application::{SubmissionSink, ValueMap};
use formsmith_core::{AppError, AppResult};
use formsmith_domain::Form;
use tracing::info;

/// Submission sink that logs accepted values.
#[derive(Clone)]
pub struct ConsoleSubmissionSink;

impl ConsoleSubmissionSink {
    /// Creates a new console submission sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleSubmissionSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionSink for ConsoleSubmissionSink {
    async fn deliver(&self, form: &Form, values: &ValueMap) -> AppResult<()> {
        let payload = serde_json::to_string(values).map_err(|error| {
            AppError::Internal(format!("failed to serialize submitted values: {error}"))
        })?;

        info!(
            form_id = form.id(),
            form_name = form.name(),
            field_count = values.len(),
            "form submitted successfully: {}",
            payload
        );

        Ok(())
    }
}
