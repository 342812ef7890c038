//! Credential forms and presence validation
//!
//! Validation here is presence-only. Everything else is decided by the server
//! and comes back as field errors.

use portal_http::{ClientError, LoginRequest, RegisterRequest};
use std::collections::BTreeMap;
use std::fmt;

/// Why a field is flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Left empty on the client
    Required,
    /// Rejected by the server
    Server,
}

/// Error attached to one form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: FieldErrorKind,
    pub message: Option<String>,
}

impl FieldError {
    /// Message to show, or a word for the kind when the server sent none
    pub fn describe(&self) -> &str {
        match (self.message.as_deref(), self.kind) {
            (Some(message), _) => message,
            (None, FieldErrorKind::Required) => "required",
            (None, FieldErrorKind::Server) => "rejected",
        }
    }
}

/// Field name to error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, FieldError>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        field: impl Into<String>,
        kind: FieldErrorKind,
        message: Option<String>,
    ) {
        self.fields.insert(field.into(), FieldError { kind, message });
    }

    /// A single server error on `field`
    pub fn server(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.insert(field, FieldErrorKind::Server, Some(message.into()));
        errors
    }

    /// Map an API failure onto the form
    ///
    /// Server field errors keep their field names; every other failure is
    /// shown on `fallback_field`. An error object without any message only
    /// flags `fallback_field`.
    pub fn from_client_error(error: &ClientError, fallback_field: &str) -> Self {
        match error {
            ClientError::ValidationFailed(fields) => {
                let mut errors = Self::new();
                for (field, message) in fields {
                    errors.insert(field.clone(), FieldErrorKind::Server, Some(message.clone()));
                }
                if errors.is_empty() {
                    errors.insert(fallback_field, FieldErrorKind::Server, None);
                }
                errors
            }
            other => Self::server(fallback_field, other.user_message()),
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.fields.get(field)
    }

    /// Message shown under `field`, if any
    pub fn message(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|e| e.message.as_deref())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldError)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .fields
            .iter()
            .map(|(field, error)| format!("{field}: {}", error.describe()))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&rendered)
    }
}

/// Sign-in form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Flag every empty field; no message, the field highlight is enough
    ///
    /// # Errors
    ///
    /// Returns the empty fields when any required field is empty
    pub fn validate(&self) -> Result<LoginRequest, FormErrors> {
        let mut errors = FormErrors::new();
        for (field, value) in [("email", &self.email), ("password", &self.password)] {
            if value.is_empty() {
                errors.insert(field, FieldErrorKind::Required, None);
            }
        }

        if errors.is_empty() {
            Ok(LoginRequest {
                email: self.email.clone(),
                password: self.password.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Sign-up form
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    /// Privacy policy and terms accepted
    pub terms: bool,
}

impl RegisterForm {
    /// # Errors
    ///
    /// Returns every empty field with `Please enter a valid <field>`, plus a
    /// message-less `terms` error when the terms were not accepted
    pub fn validate(&self) -> Result<RegisterRequest, FormErrors> {
        let mut errors = FormErrors::new();
        for (field, value) in [
            ("username", &self.username),
            ("email", &self.email),
            ("password", &self.password),
        ] {
            if value.is_empty() {
                errors.insert(
                    field,
                    FieldErrorKind::Required,
                    Some(format!("Please enter a valid {field}")),
                );
            }
        }
        if !self.terms {
            errors.insert("terms", FieldErrorKind::Required, None);
        }

        if errors.is_empty() {
            Ok(RegisterRequest {
                username: self.username.clone(),
                email: self.email.clone(),
                password: self.password.clone(),
            })
        } else {
            Err(errors)
        }
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("terms", &self.terms)
            .finish_non_exhaustive()
    }
}
