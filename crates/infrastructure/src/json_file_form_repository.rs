use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use formsmith_application::{FORMS_STORAGE_KEY, FormRepository};
use formsmith_core::{AppError, AppResult};
use formsmith_domain::Form;
use tracing::{debug, warn};

/// Form repository storing the saved list as one JSON blob on disk.
///
/// The blob lives at `<store_dir>/formBuilder_forms.json`.
#[derive(Debug, Clone)]
pub struct JsonFileFormRepository {
    path: PathBuf,
}

impl JsonFileFormRepository {
    /// Creates a repository rooted at a store directory.
    #[must_use]
    pub fn new(store_dir: impl AsRef<Path>) -> Self {
        Self {
            path: store_dir
                .as_ref()
                .join(format!("{FORMS_STORAGE_KEY}.json")),
        }
    }

    /// Returns the blob file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parses the stored list one form at a time.
    ///
    /// Content that is not a JSON array is an error. A single form that
    /// cannot be restored is skipped so the rest of the list survives.
    fn parse_forms(&self, raw: &str) -> AppResult<Vec<Form>> {
        let entries: Vec<serde_json::Value> = serde_json::from_str(raw).map_err(|error| {
            AppError::Internal(format!(
                "failed to parse stored forms '{}': {error}",
                self.path.display()
            ))
        })?;

        let mut forms = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let restored = serde_json::from_value::<Form>(entry)
                .map_err(|error| AppError::Validation(format!("malformed form: {error}")))
                .and_then(Form::restore);

            match restored {
                Ok(form) => forms.push(form),
                Err(error) => warn!(
                    path = %self.path.display(),
                    index,
                    error = %error,
                    "skipping stored form that cannot be restored"
                ),
            }
        }

        Ok(forms)
    }
}

#[async_trait]
impl FormRepository for JsonFileFormRepository {
    async fn load_forms(&self) -> AppResult<Vec<Form>> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored forms yet");
                return Ok(Vec::new());
            }
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "failed to read stored forms"
                );
                return Ok(Vec::new());
            }
        };

        match self.parse_forms(raw.as_str()) {
            Ok(forms) => Ok(forms),
            Err(error) => {
                warn!(
                    path = %self.path.display(),
                    error = %error,
                    "stored forms are unreadable, starting with an empty list"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save_forms(&self, forms: &[Form]) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                AppError::Internal(format!(
                    "failed to create store directory '{}': {error}",
                    parent.display()
                ))
            })?;
        }

        let payload = serde_json::to_vec(forms)
            .map_err(|error| AppError::Internal(format!("failed to serialize forms: {error}")))?;

        tokio::fs::write(&self.path, payload)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to write stored forms '{}': {error}",
                    self.path.display()
                ))
            })?;

        debug!(path = %self.path.display(), form_count = forms.len(), "saved forms");
        Ok(())
    }

    async fn clear_forms(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(AppError::Internal(format!(
                "failed to clear stored forms '{}': {error}",
                self.path.display()
            ))),
        }
    }
}
