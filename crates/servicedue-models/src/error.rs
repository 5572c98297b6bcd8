//! Error types for the `servicedue-models` crate.
//!
//! All fallible operations in this crate return variants of [`ModelError`].
//! Form validation collects per-field problems into [`FieldErrors`] before
//! surfacing them as [`ModelError::Validation`].

use std::fmt;

use serde::Serialize;

use crate::validation::FormField;

/// Errors produced when looking up or validating model values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// No template with the given id exists in the registry.
    #[error("unknown template \"{id}\"")]
    UnknownTemplate {
        /// The id that was looked up.
        id: String,
    },

    /// A channel id did not match any entry of the channel catalog.
    #[error("unknown channel \"{id}\"")]
    UnknownChannel {
        /// The id that was looked up.
        id: String,
    },

    /// A form failed client-side validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
}

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// A single problem attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The offending field.
    pub field: FormField,
    /// Message shown inline next to the field.
    pub message: String,
}

/// Ordered list of per-field validation problems.
///
/// Fields keep the order in which the form declares them, so the first
/// entry is the first field the user should fix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    /// Create an empty error list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a problem for `field`.
    pub fn push(&mut self, field: FormField, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// `true` when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded problems.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// First message recorded for `field`, if any.
    pub fn message_for(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    /// Iterate over all recorded problems.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    /// `Ok(value)` when empty, otherwise [`ModelError::Validation`].
    pub fn into_result<T>(self, value: T) -> Result<T, ModelError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(ModelError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_template() {
        let err = ModelError::UnknownTemplate {
            id: "NOPE".into(),
        };
        assert_eq!(err.to_string(), "unknown template \"NOPE\"");
    }

    #[test]
    fn error_display_unknown_channel() {
        let err = ModelError::UnknownChannel { id: "sms".into() };
        assert_eq!(err.to_string(), "unknown channel \"sms\"");
    }

    #[test]
    fn field_errors_display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.push(FormField::Email, "Please enter a valid email address");
        errors.push(FormField::Password, "Password is required");
        assert_eq!(
            ModelError::Validation(errors).to_string(),
            "validation failed: email: Please enter a valid email address; password: Password is required"
        );
    }

    #[test]
    fn message_for_returns_first_match() {
        let mut errors = FieldErrors::new();
        errors.push(FormField::Password, "first");
        errors.push(FormField::Password, "second");
        assert_eq!(errors.message_for(FormField::Password), Some("first"));
        assert_eq!(errors.message_for(FormField::Email), None);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn into_result_ok_when_empty() {
        assert_eq!(FieldErrors::new().into_result(7), Ok(7));
    }
}
