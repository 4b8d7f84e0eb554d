use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use formsmith_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{FormField, FormFieldUpdate};

/// Named, ordered collection of field definitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    id: NonEmptyString,
    name: NonEmptyString,
    fields: Vec<FormField>,
    created_at: DateTime<Utc>,
}

impl Form {
    /// Creates a validated form.
    ///
    /// Fields are sorted by their incoming order and then renumbered so that
    /// every `order` equals the field's position.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        mut fields: Vec<FormField>,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        fields.sort_by_key(FormField::order);
        validate_field_graph(&fields)?;

        let mut form = Self {
            id: NonEmptyString::named("form id", id.into().trim())?,
            name: NonEmptyString::named("form name", name.into().trim())?,
            fields,
            created_at,
        };
        form.reindex();

        Ok(form)
    }

    /// Creates an empty form with a generated identifier stamped now.
    pub fn create(name: impl Into<String>) -> AppResult<Self> {
        Self::new(Uuid::new_v4().to_string(), name, Vec::new(), Utc::now())
    }

    /// Rebuilds a form read back from a store or an export file.
    ///
    /// Stored fields may carry an empty-string default whatever their type,
    /// and derived fields may still list parents that were removed later.
    /// Empty defaults are treated as unset, parents that are unknown or
    /// derived are detached, and then the usual invariants apply.
    pub fn restore(self) -> AppResult<Self> {
        let Self {
            id,
            name,
            fields,
            created_at,
        } = self;

        let derived_by_id: HashMap<String, bool> = fields
            .iter()
            .map(|field| (field.id().to_owned(), field.is_derived()))
            .collect();

        let fields = fields
            .into_iter()
            .map(|mut field| {
                field.clear_empty_default();
                field.retain_parents(|parent_id| derived_by_id.get(parent_id) == Some(&false));
                field.revalidate()
            })
            .collect::<AppResult<Vec<_>>>()?;

        Self::new(id, name, fields, created_at)
    }

    /// Returns the form identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    /// Returns the form name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Looks up one field by identifier.
    #[must_use]
    pub fn field(&self, field_id: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.id() == field_id)
    }

    /// Renames the form.
    pub fn rename(&mut self, name: impl Into<String>) -> AppResult<()> {
        self.name = NonEmptyString::named("form name", name.into().trim())?;
        Ok(())
    }

    /// Appends a field at the end of the form.
    pub fn add_field(&mut self, field: FormField) -> AppResult<()> {
        if self.field(field.id()).is_some() {
            return Err(AppError::Conflict(format!(
                "field '{}' already exists in form '{}'",
                field.id(),
                self.id.as_str()
            )));
        }

        let mut fields = self.fields.clone();
        fields.push(field);
        validate_field_graph(&fields)?;

        self.fields = fields;
        self.reindex();
        Ok(())
    }

    /// Applies a partial update to one field without moving it.
    pub fn update_field(&mut self, field_id: &str, update: FormFieldUpdate) -> AppResult<()> {
        let index = self.position_of(field_id)?;
        let updated = self.fields[index].with_updates(update)?;

        let mut fields = self.fields.clone();
        fields[index] = updated;
        validate_field_graph(&fields)?;

        self.fields = fields;
        self.reindex();
        Ok(())
    }

    /// Removes one field and detaches it from every derived field that read it.
    pub fn remove_field(&mut self, field_id: &str) -> AppResult<FormField> {
        let index = self.position_of(field_id)?;
        let removed = self.fields.remove(index);

        for field in &mut self.fields {
            field.forget_parent(field_id);
        }

        self.reindex();
        Ok(removed)
    }

    /// Moves the field at `from_index` so that it ends up at `to_index`.
    pub fn move_field(&mut self, from_index: usize, to_index: usize) -> AppResult<()> {
        let len = self.fields.len();
        if from_index >= len || to_index >= len {
            return Err(AppError::Validation(format!(
                "cannot move field from position {from_index} to {to_index} in a form with {len} fields"
            )));
        }

        let field = self.fields.remove(from_index);
        self.fields.insert(to_index, field);
        self.reindex();
        Ok(())
    }

    fn position_of(&self, field_id: &str) -> AppResult<usize> {
        self.fields
            .iter()
            .position(|field| field.id() == field_id)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "field '{field_id}' does not exist in form '{}'",
                    self.id.as_str()
                ))
            })
    }

    fn reindex(&mut self) {
        for (position, field) in self.fields.iter_mut().enumerate() {
            field.set_order(position);
        }
    }
}

fn validate_field_graph(fields: &[FormField]) -> AppResult<()> {
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field.id()) {
            return Err(AppError::Validation(format!(
                "duplicate field id '{}' in form",
                field.id()
            )));
        }
    }

    let by_id: HashMap<&str, &FormField> = fields.iter().map(|field| (field.id(), field)).collect();
    for field in fields.iter().filter(|field| field.is_derived()) {
        for parent_id in field.parent_field_ids() {
            match by_id.get(parent_id.as_str()) {
                None => {
                    return Err(AppError::Validation(format!(
                        "derived field '{}' references unknown parent '{}'",
                        field.id(),
                        parent_id
                    )));
                }
                Some(parent) if parent.is_derived() => {
                    return Err(AppError::Validation(format!(
                        "derived field '{}' cannot read derived field '{}'",
                        field.id(),
                        parent_id
                    )));
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}
