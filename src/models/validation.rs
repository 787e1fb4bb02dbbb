//! Field-level validation results.
//!
//! Payload rules are written as [`validator::Validate`] implementations; the
//! resulting [`ValidationErrors`] map is flattened here into a stable, ordered
//! list that is sent back to the client.

use std::borrow::Cow;

use serde::Serialize;
use utoipa::ToSchema;
use validator::{ValidationError, ValidationErrors};

/// One violated rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Field name as it appears in the request body
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Build a validation error carrying a client-facing message
pub fn rule_error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Flatten validator errors following `fields` order, then rule order within a field.
///
/// Fields not listed in `fields` are appended in name order so nothing is dropped.
pub fn flatten_errors(errors: &ValidationErrors, fields: &[&str]) -> Vec<FieldError> {
    let mut by_field: Vec<(String, Vec<ValidationError>)> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| (field.to_string(), errs.clone()))
        .collect();

    by_field.sort_by(|(a, _), (b, _)| {
        let rank = |name: &str| fields.iter().position(|f| *f == name).unwrap_or(fields.len());
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });

    by_field
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.into_iter().map(move |e| {
                let message = e
                    .message
                    .map(|m| m.into_owned())
                    .unwrap_or_else(|| e.code.into_owned());
                FieldError::new(field.clone(), message)
            })
        })
        .collect()
}
