//! Sign-in and sign-up form validation.
//!
//! Validation runs before anything is dispatched to the store: the store only
//! accepts [`Credentials`] and [`Registration`], which can only be built from
//! input that passed these checks.

#[cfg(test)]
#[path = "validation_test.rs"]
mod validation_test;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_FULL_NAME_LEN: usize = 2;

pub const INVALID_EMAIL_MESSAGE: &str = "Please enter a valid email address";
pub const SHORT_PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
pub const SHORT_NAME_MESSAGE: &str = "Full name must be at least 2 characters";

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Email,
    Password,
    FullName,
}

impl Field {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::FullName => "full_name",
        }
    }
}

/// A single inline form error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

/// Every failing field of a submitted form, in field order.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", join_field_errors(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Message for one field, if that field failed.
    #[must_use]
    pub fn message_for(&self, field: Field) -> Option<&'static str> {
        self.errors.iter().find(|e| e.field == field).map(|e| e.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field.as_str(), e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validated sign-in input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// # Errors
    ///
    /// Returns every failing field when the email or password is invalid.
    pub fn new(email: &str, password: &str) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let email = check_email(email, &mut errors);
        check_password(password, &mut errors);
        finish(errors)?;
        Ok(Self { email, password: password.to_owned() })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Validated sign-up input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: Credentials,
    full_name: String,
}

impl Registration {
    /// # Errors
    ///
    /// Returns every failing field when the email, password or name is invalid.
    pub fn new(email: &str, password: &str, full_name: &str) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let email = check_email(email, &mut errors);
        check_password(password, &mut errors);
        let full_name = full_name.trim();
        if full_name.chars().count() < MIN_FULL_NAME_LEN {
            errors.push(FieldError { field: Field::FullName, message: SHORT_NAME_MESSAGE });
        }
        finish(errors)?;
        Ok(Self {
            credentials: Credentials { email, password: password.to_owned() },
            full_name: full_name.to_owned(),
        })
    }

    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

/// Basic address syntax: one `@`, non-empty local part, dotted domain, no spaces.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

fn check_email(raw: &str, errors: &mut Vec<FieldError>) -> String {
    let email = raw.trim();
    if !is_valid_email(email) {
        errors.push(FieldError { field: Field::Email, message: INVALID_EMAIL_MESSAGE });
    }
    email.to_owned()
}

fn check_password(password: &str, errors: &mut Vec<FieldError>) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError { field: Field::Password, message: SHORT_PASSWORD_MESSAGE });
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { errors })
    }
}
