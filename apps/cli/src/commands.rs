use std::path::Path;

use chrono::NaiveDate;
use formsmith_application::{FormBuilderService, SubmitOutcome};
use formsmith_core::{AppError, AppResult};
use formsmith_domain::{FieldValue, Form};
use tracing::info;

/// One `--set field=value` edit applied during a preview.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAssignment {
    pub field_id: String,
    pub value: FieldValue,
}

impl FieldAssignment {
    /// Parses `field=value`. The value is read as a JSON scalar when it is
    /// one, so `true` and `42` become a boolean and a number, and anything
    /// else is kept as text.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let Some((field_id, value)) = raw.split_once('=') else {
            return Err(AppError::Validation(format!(
                "invalid assignment '{raw}', expected FIELD=VALUE"
            )));
        };

        let field_id = field_id.trim();
        if field_id.is_empty() {
            return Err(AppError::Validation(format!(
                "invalid assignment '{raw}', field id must not be empty"
            )));
        }

        let value = serde_json::from_str::<FieldValue>(value)
            .unwrap_or_else(|_| FieldValue::Text(value.to_owned()));

        Ok(Self {
            field_id: field_id.to_owned(),
            value,
        })
    }
}

pub async fn list_forms(service: &FormBuilderService) -> AppResult<()> {
    let forms = service.list_forms().await?;
    if forms.is_empty() {
        println!("no saved forms");
        return Ok(());
    }

    for form in forms {
        println!(
            "{}\t{}\t{} fields\tcreated {}",
            form.id(),
            form.name(),
            form.fields().len(),
            form.created_at().format("%Y-%m-%d")
        );
    }

    Ok(())
}

pub async fn show_form(service: &FormBuilderService, form_id: &str) -> AppResult<()> {
    let form = service.find_form(form_id).await?;
    let rendered = serde_json::to_string_pretty(&form)
        .map_err(|error| AppError::Internal(format!("failed to render form: {error}")))?;
    println!("{rendered}");
    Ok(())
}

pub async fn import_form(service: &FormBuilderService, path: &Path) -> AppResult<()> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|error| {
        AppError::Validation(format!("failed to read '{}': {error}", path.display()))
    })?;
    let form = serde_json::from_str::<Form>(raw.as_str())
        .map_err(|error| {
            AppError::Validation(format!(
                "'{}' is not a valid form document: {error}",
                path.display()
            ))
        })?
        .restore()?;

    let saved = service.save_form(form).await?;
    info!(
        form_id = saved.id(),
        field_count = saved.fields().len(),
        "imported form"
    );
    println!("saved form {} ({})", saved.id(), saved.name());
    Ok(())
}

pub async fn delete_form(service: &FormBuilderService, form_id: &str) -> AppResult<()> {
    service.delete_form(form_id).await?;
    println!("deleted form {form_id}");
    Ok(())
}

pub async fn preview_form(
    service: &FormBuilderService,
    form_id: &str,
    assignments: Vec<FieldAssignment>,
    today: Option<NaiveDate>,
) -> AppResult<()> {
    let mut session = service.start_preview(form_id, today).await?;

    for assignment in assignments {
        session.change(assignment.field_id.as_str(), assignment.value)?;
        session.blur(assignment.field_id.as_str())?;
    }

    match service.submit_preview(&mut session).await? {
        SubmitOutcome::Accepted(values) => {
            let rendered = serde_json::to_string_pretty(&values).map_err(|error| {
                AppError::Internal(format!("failed to render submitted values: {error}"))
            })?;
            println!("{rendered}");
            Ok(())
        }
        SubmitOutcome::Rejected(errors) => {
            for field in session.form().fields() {
                let Some(messages) = errors.get(field.id()) else {
                    continue;
                };
                for message in messages {
                    println!("{} ({}): {message}", field.label(), field.id());
                }
            }

            Err(AppError::Validation(format!(
                "submission rejected: {} invalid field(s)",
                errors.len()
            )))
        }
    }
}
