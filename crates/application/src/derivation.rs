//! Recomputes derived field values from their parents.

use chrono::{DateTime, Local, NaiveDate};
use formsmith_domain::{DerivationKind, FieldValue, FormField};

use crate::ValueMap;

/// Returns a copy of `values` with every resolvable derived field recomputed
/// as of `today`.
///
/// Fields whose derivation cannot be resolved keep their previous value.
#[must_use]
pub fn derive_values(fields: &[FormField], values: &ValueMap, today: NaiveDate) -> ValueMap {
    let mut derived = values.clone();
    apply_derived_values(fields, &mut derived, today);
    derived
}

/// Same as [`derive_values`] evaluated against the local calendar date.
#[must_use]
pub fn derive_values_now(fields: &[FormField], values: &ValueMap) -> ValueMap {
    derive_values(fields, values, Local::now().date_naive())
}

/// Recomputes derived fields in place.
///
/// Parents are never derived themselves, so one pass over the fields is
/// enough and repeated passes leave the map unchanged.
pub fn apply_derived_values(fields: &[FormField], values: &mut ValueMap, today: NaiveDate) {
    for field in fields.iter().filter(|field| field.is_derived()) {
        let Some(kind) = field.derivation_kind() else {
            continue;
        };

        if let Some(value) = evaluate(kind, field, values, today) {
            values.insert(field.id().to_owned(), value);
        }
    }
}

fn evaluate(
    kind: DerivationKind,
    field: &FormField,
    values: &ValueMap,
    today: NaiveDate,
) -> Option<FieldValue> {
    match kind {
        DerivationKind::AgeFromDate => {
            let parent_id = field.parent_field_ids().first()?;
            let birth_date = parse_date(values.get(parent_id)?.as_text()?)?;
            let age = today.years_since(birth_date)?;
            Some(FieldValue::Text(age.to_string()))
        }
    }
}

/// Parses `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use formsmith_domain::{FieldType, FieldValue, FormField, FormFieldInput};
    use proptest::prelude::*;

    use super::{derive_values, parse_date};
    use crate::ValueMap;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| unreachable!())
    }

    fn plain(id: &str, field_type: FieldType) -> FormField {
        let mut input = FormFieldInput::new(field_type, id);
        input.id = id.to_owned();
        FormField::new(input).unwrap_or_else(|_| unreachable!())
    }

    fn derived(id: &str, parents: &[&str], formula: &str) -> FormField {
        let mut input = FormFieldInput::new(FieldType::Text, id);
        input.id = id.to_owned();
        input.is_derived = true;
        input.parent_field_ids = parents.iter().map(|parent| (*parent).to_owned()).collect();
        input.derived_formula = Some(formula.to_owned());
        FormField::new(input).unwrap_or_else(|_| unreachable!())
    }

    fn age_form() -> Vec<FormField> {
        vec![
            plain("dob", FieldType::Date),
            derived("age", &["dob"], "Age from date of birth"),
        ]
    }

    fn values(entries: &[(&str, FieldValue)]) -> ValueMap {
        entries
            .iter()
            .map(|(id, value)| ((*id).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn age_is_whole_years_since_birth_date() {
        let fields = age_form();
        let current = values(&[("dob", FieldValue::from("2000-01-01"))]);
        let derived = derive_values(&fields, &current, date(2024, 6, 15));
        assert_eq!(derived.get("age"), Some(&FieldValue::from("24")));
    }

    #[test]
    fn age_waits_for_the_birthday() {
        let fields = age_form();
        let current = values(&[("dob", FieldValue::from("2000-06-16"))]);
        let derived = derive_values(&fields, &current, date(2024, 6, 15));
        assert_eq!(derived.get("age"), Some(&FieldValue::from("23")));
    }

    #[test]
    fn unresolvable_derivations_keep_previous_value() {
        let fields = vec![
            plain("dob", FieldType::Date),
            derived("age", &["dob"], "Age from date of birth"),
            derived("total", &["dob"], "sum of everything"),
            derived("orphan", &[], "Age"),
        ];
        let current = values(&[
            ("dob", FieldValue::from("not a date")),
            ("age", FieldValue::from("41")),
            ("total", FieldValue::from("7")),
        ]);
        let derived = derive_values(&fields, &current, date(2024, 6, 15));
        assert_eq!(derived, current);
    }

    #[test]
    fn future_birth_date_is_skipped() {
        let fields = age_form();
        let current = values(&[("dob", FieldValue::from("2030-01-01"))]);
        let derived = derive_values(&fields, &current, date(2024, 6, 15));
        assert_eq!(derived.get("age"), None);
    }

    #[test]
    fn non_text_parent_is_skipped() {
        let fields = age_form();
        let current = values(&[("dob", FieldValue::Number(2000.0))]);
        let derived = derive_values(&fields, &current, date(2024, 6, 15));
        assert_eq!(derived.get("age"), None);
    }

    #[test]
    fn timestamps_use_their_date_part() {
        assert_eq!(
            parse_date("2000-01-01T10:30:00Z"),
            Some(date(2000, 1, 1))
        );
        assert_eq!(parse_date(""), None);
    }

    proptest! {
        #[test]
        fn derivation_is_idempotent(
            year in 1900_i32..2024,
            month in 1_u32..=12,
            day in 1_u32..=28,
        ) {
            let fields = age_form();
            let birth = format!("{year:04}-{month:02}-{day:02}");
            let current = values(&[("dob", FieldValue::from(birth.as_str()))]);
            let today = date(2024, 6, 15);
            let once = derive_values(&fields, &current, today);
            let twice = derive_values(&fields, &once, today);
            prop_assert_eq!(once, twice);
        }
    }
}
