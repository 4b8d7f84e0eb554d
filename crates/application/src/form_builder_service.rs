use std::sync::Arc;

use chrono::NaiveDate;
use formsmith_core::{AppError, AppResult};
use formsmith_domain::Form;

use crate::{FormRepository, PreviewSession, SubmissionSink, SubmitOutcome};

/// Application service for saved forms and their previews.
#[derive(Clone)]
pub struct FormBuilderService {
    repository: Arc<dyn FormRepository>,
    submission_sink: Arc<dyn SubmissionSink>,
}

impl FormBuilderService {
    /// Creates a new form builder service from port implementations.
    #[must_use]
    pub fn new(
        repository: Arc<dyn FormRepository>,
        submission_sink: Arc<dyn SubmissionSink>,
    ) -> Self {
        Self {
            repository,
            submission_sink,
        }
    }

    /// Returns every saved form in stored order.
    pub async fn list_forms(&self) -> AppResult<Vec<Form>> {
        self.repository.load_forms().await
    }

    /// Returns one saved form.
    pub async fn find_form(&self, form_id: &str) -> AppResult<Form> {
        self.repository
            .load_forms()
            .await?
            .into_iter()
            .find(|form| form.id() == form_id)
            .ok_or_else(|| AppError::NotFound(format!("form '{form_id}' does not exist")))
    }

    /// Saves a form, replacing a stored form with the same id in place.
    pub async fn save_form(&self, form: Form) -> AppResult<Form> {
        let mut forms = self.repository.load_forms().await?;

        match forms.iter_mut().find(|stored| stored.id() == form.id()) {
            Some(stored) => *stored = form.clone(),
            None => forms.push(form.clone()),
        }

        self.repository.save_forms(&forms).await?;
        Ok(form)
    }

    /// Deletes one saved form.
    pub async fn delete_form(&self, form_id: &str) -> AppResult<()> {
        let mut forms = self.repository.load_forms().await?;
        let before = forms.len();
        forms.retain(|form| form.id() != form_id);

        if forms.len() == before {
            return Err(AppError::NotFound(format!(
                "form '{form_id}' does not exist"
            )));
        }

        self.repository.save_forms(&forms).await
    }

    /// Deletes every saved form.
    pub async fn clear_forms(&self) -> AppResult<()> {
        self.repository.clear_forms().await
    }

    /// Starts a preview of a saved form.
    ///
    /// Derivations use `today` when given, otherwise the local date at each
    /// evaluation.
    pub async fn start_preview(
        &self,
        form_id: &str,
        today: Option<NaiveDate>,
    ) -> AppResult<PreviewSession> {
        let form = self.find_form(form_id).await?;

        Ok(match today {
            Some(today) => PreviewSession::start_on(form, today),
            None => PreviewSession::start(form),
        })
    }

    /// Submits a preview and hands accepted values to the submission sink.
    ///
    /// Rejected submissions never reach the sink.
    pub async fn submit_preview(&self, session: &mut PreviewSession) -> AppResult<SubmitOutcome> {
        let outcome = session.submit();

        if let SubmitOutcome::Accepted(values) = &outcome {
            self.submission_sink
                .deliver(session.form(), values)
                .await?;
        }

        Ok(outcome)
    }
}
