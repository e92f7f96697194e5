//! Section validation.
//!
//! A section is checked question by question and every failure is reported
//! at once. Errors are keyed by the question id, which is also the form
//! path of the answer.
//!
//! | Kind                         | Required answer fails when                 |
//! |------------------------------|--------------------------------------------|
//! | checkbox-group, repeater     | missing or an empty collection             |
//! | currency                     | missing, non-numeric or below zero         |
//! | percentage                   | missing, non-numeric or outside 0 to 100   |
//! | file-upload                  | no file recorded for the question          |
//! | everything else              | missing or blank after trimming            |
//!
//! The currency and percentage ranges are part of the required rule. An
//! optional answer is checked only against the bounds and custom validator
//! its question declares.

mod custom;

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::form::{FieldPath, FormData, FormValue};
use crate::models::{Question, QuestionKind, Section, ValidationRule};

/// File names recorded per file-upload question id.
pub type UploadedFiles = BTreeMap<String, Vec<String>>;

/// Field path to error message. An absent key means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.insert(field.into(), message.into());
    }

    pub fn get(
        &self,
        field: &str,
    ) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    pub fn contains(
        &self,
        field: &str,
    ) -> bool {
        self.errors.contains_key(field)
    }

    /// Drops the error for `field` and for anything stored beneath it.
    pub fn clear_field(
        &mut self,
        field: &FieldPath,
    ) {
        self.errors.retain(|key, _| {
            FieldPath::parse(key)
                .map(|key| !field.covers(&key))
                .unwrap_or(true)
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Checks a section's questions against the current answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionValidator;

impl SectionValidator {
    pub fn validate(
        section: &Section,
        form: &FormData,
        uploads: &UploadedFiles,
    ) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for question in &section.questions {
            if let Some(message) = Self::validate_question(question, form, uploads) {
                errors.insert(question.id.clone(), message);
            }
        }
        errors
    }

    /// Returns the error for a single question, if any.
    pub fn validate_question(
        question: &Question,
        form: &FormData,
        uploads: &UploadedFiles,
    ) -> Option<String> {
        let value = form.get(&question.id);
        let present = value.filter(|v| !v.is_blank());

        // Step 1: required-field rules
        let mut error = if question.required && is_missing(question, value, uploads) {
            Some(question.required_message())
        } else {
            None
        };

        // Step 2: declared bounds on present answers
        if error.is_none() {
            if let Some(value) = present {
                error = check_bounds(question, value);
            }
        }

        // Step 3: custom validator replaces any generic message
        if question.required || present.is_some() {
            let custom = question
                .validation
                .as_ref()
                .and_then(|rule| rule.custom.as_ref())
                .and_then(|validator| custom::check(validator, value, form));
            if custom.is_some() {
                error = custom;
            }
        }

        error
    }
}

fn is_missing(
    question: &Question,
    value: Option<&FormValue>,
    uploads: &UploadedFiles,
) -> bool {
    match question.kind {
        QuestionKind::FileUpload => uploads
            .get(&question.id)
            .is_none_or(|files| files.is_empty()),
        QuestionKind::CheckboxGroup | QuestionKind::Repeater => {
            !matches!(value, Some(FormValue::List(items)) if !items.is_empty())
        }
        kind if kind.is_numeric() => value
            .and_then(FormValue::to_decimal)
            .is_none_or(|n| !in_implicit_range(question.kind, n)),
        _ => value.is_none_or(FormValue::is_blank),
    }
}

fn in_implicit_range(
    kind: QuestionKind,
    n: Decimal,
) -> bool {
    match kind {
        QuestionKind::Currency => n >= Decimal::ZERO,
        QuestionKind::Percentage => n >= Decimal::ZERO && n <= Decimal::ONE_HUNDRED,
        _ => true,
    }
}

fn check_bounds(
    question: &Question,
    value: &FormValue,
) -> Option<String> {
    let rule = question.validation.as_ref()?;
    if rule.min.is_none() && rule.max.is_none() {
        return None;
    }
    let within = value.to_decimal().is_some_and(|n| {
        rule.min.is_none_or(|min| n >= min) && rule.max.is_none_or(|max| n <= max)
    });
    (!within).then(|| bounds_message(rule))
}

fn bounds_message(rule: &ValidationRule) -> String {
    if let Some(message) = &rule.message {
        return message.clone();
    }
    match (rule.min, rule.max) {
        (Some(min), Some(max)) => format!("Please enter a value between {min} and {max}"),
        (Some(min), None) => format!("Please enter a value of at least {min}"),
        (None, Some(max)) => format!("Please enter a value of at most {max}"),
        (None, None) => String::new(),
    }
}
