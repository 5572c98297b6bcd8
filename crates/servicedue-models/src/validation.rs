//! Client-side validation of the authentication forms.
//!
//! Validation only blocks submission; every problem is reported against the
//! field it belongs to so it can be shown inline.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::auth::{ResetPasswordRequest, SignInRequest, SignUpRequest};
use crate::error::{FieldErrors, ModelError};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// `true` when `email` looks like `local@domain.tld`.
///
/// ```
/// use servicedue_models::is_valid_email;
///
/// assert!(is_valid_email("foo@bar.com"));
/// assert!(!is_valid_email("foo@bar"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Form fields that can carry a validation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FormField {
    Email,
    Password,
    ConfirmPassword,
    FirstName,
    LastName,
    DealershipName,
}

const MSG_EMAIL: &str = "Please enter a valid email address";
const MSG_PASSWORD_REQUIRED: &str = "Password is required";
const MSG_PASSWORD_SHORT: &str = "Password must be at least 8 characters";
const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";

fn check_email(errors: &mut FieldErrors, email: &str) {
    if !is_valid_email(email.trim()) {
        errors.push(FormField::Email, MSG_EMAIL);
    }
}

fn check_required(errors: &mut FieldErrors, field: FormField, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.push(field, format!("{label} is required"));
    }
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Sign-in form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

impl SignInForm {
    /// Validate and build the request body.
    pub fn validate(&self) -> Result<SignInRequest, ModelError> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        if self.password.is_empty() {
            errors.push(FormField::Password, MSG_PASSWORD_REQUIRED);
        }
        errors.into_result(SignInRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

/// Sign-up form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpForm {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub dealership_name: String,
}

impl SignUpForm {
    /// Validate and build the request body.
    pub fn validate(&self) -> Result<SignUpRequest, ModelError> {
        let mut errors = FieldErrors::new();
        check_required(&mut errors, FormField::FirstName, &self.first_name, "First name");
        check_required(&mut errors, FormField::LastName, &self.last_name, "Last name");
        check_required(
            &mut errors,
            FormField::DealershipName,
            &self.dealership_name,
            "Dealership name",
        );
        check_email(&mut errors, &self.email);
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FormField::Password, MSG_PASSWORD_SHORT);
        }
        if self.password != self.confirm_password {
            errors.push(FormField::ConfirmPassword, MSG_PASSWORD_MISMATCH);
        }
        errors.into_result(SignUpRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            dealership_name: self.dealership_name.trim().to_string(),
        })
    }
}

/// Password-reset form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetPasswordForm {
    pub email: String,
}

impl ResetPasswordForm {
    /// Validate and build the request body.
    pub fn validate(&self) -> Result<ResetPasswordRequest, ModelError> {
        let mut errors = FieldErrors::new();
        check_email(&mut errors, &self.email);
        errors.into_result(ResetPasswordRequest {
            email: self.email.trim().to_string(),
        })
    }
}
