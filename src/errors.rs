// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use thiserror::Error;

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("{}", .code.message())]
    Auth { code: AuthErrorCode },

    #[error("Operation failed: {0}")]
    Store(String),

    #[error("{message}")]
    Validation { field: Field, message: String },

    #[error("Expense record not found: {id}")]
    NotFound { id: String },

    #[error("No expenses match the current filters; nothing to export")]
    EmptyExport,

    #[error("Please log in first")]
    NotSignedIn,
}

impl TrackerError {
    pub fn validation(field: Field, message: impl Into<String>) -> Self {
        TrackerError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn auth(code: AuthErrorCode) -> Self {
        TrackerError::Auth { code }
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(e: rusqlite::Error) -> Self {
        TrackerError::Store(e.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(e: csv::Error) -> Self {
        TrackerError::Store(format!("export write failed: {}", e))
    }
}

/// Form field a validation or auth error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Amount,
    Category,
    Description,
    Date,
    Name,
    Email,
    Password,
    ConfirmPassword,
    Terms,
    Budget,
    Currency,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::Amount => "amount",
            Field::Category => "category",
            Field::Description => "description",
            Field::Date => "date",
            Field::Name => "name",
            Field::Email => "email",
            Field::Password => "password",
            Field::ConfirmPassword => "confirm-password",
            Field::Terms => "terms",
            Field::Budget => "budget",
            Field::Currency => "currency",
        };
        f.write_str(s)
    }
}

/// Error codes reported by the authentication service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidEmail,
    UserNotFound,
    UserDisabled,
    WrongPassword,
    TooManyRequests,
    NetworkRequestFailed,
    EmailAlreadyInUse,
    WeakPassword,
    OperationNotAllowed,
    UnauthorizedDomain,
    Other(String),
}

const DEFAULT_AUTH_MESSAGE: &str = "An error occurred. Please try again.";

impl AuthErrorCode {
    /// Parses `auth/<code>` or a bare `<code>`.
    pub fn parse(raw: &str) -> Self {
        let code = raw.strip_prefix("auth/").unwrap_or(raw);
        match code {
            "invalid-email" => AuthErrorCode::InvalidEmail,
            "user-not-found" => AuthErrorCode::UserNotFound,
            "user-disabled" => AuthErrorCode::UserDisabled,
            "wrong-password" => AuthErrorCode::WrongPassword,
            "too-many-requests" => AuthErrorCode::TooManyRequests,
            "network-request-failed" => AuthErrorCode::NetworkRequestFailed,
            "email-already-in-use" => AuthErrorCode::EmailAlreadyInUse,
            "weak-password" => AuthErrorCode::WeakPassword,
            "operation-not-allowed" => AuthErrorCode::OperationNotAllowed,
            "unauthorized-domain" => AuthErrorCode::UnauthorizedDomain,
            other => AuthErrorCode::Other(other.to_string()),
        }
    }

    pub fn as_code(&self) -> String {
        let s = match self {
            AuthErrorCode::InvalidEmail => "invalid-email",
            AuthErrorCode::UserNotFound => "user-not-found",
            AuthErrorCode::UserDisabled => "user-disabled",
            AuthErrorCode::WrongPassword => "wrong-password",
            AuthErrorCode::TooManyRequests => "too-many-requests",
            AuthErrorCode::NetworkRequestFailed => "network-request-failed",
            AuthErrorCode::EmailAlreadyInUse => "email-already-in-use",
            AuthErrorCode::WeakPassword => "weak-password",
            AuthErrorCode::OperationNotAllowed => "operation-not-allowed",
            AuthErrorCode::UnauthorizedDomain => "unauthorized-domain",
            AuthErrorCode::Other(s) => return format!("auth/{}", s),
        };
        format!("auth/{}", s)
    }

    pub fn message(&self) -> &'static str {
        match self {
            AuthErrorCode::EmailAlreadyInUse => {
                "This email is already registered. Please login or use a different email."
            }
            AuthErrorCode::InvalidEmail => "Please enter a valid email address.",
            AuthErrorCode::OperationNotAllowed => {
                "Email/password signup is not enabled. Please contact support."
            }
            AuthErrorCode::WeakPassword => {
                "Password is too weak. Please use at least 6 characters with a mix of letters and numbers."
            }
            AuthErrorCode::NetworkRequestFailed => {
                "Network error. Please check your internet connection."
            }
            AuthErrorCode::TooManyRequests => "Too many failed attempts. Please try again later.",
            AuthErrorCode::UserDisabled => "This account has been disabled. Please contact support.",
            AuthErrorCode::UnauthorizedDomain => {
                "This domain is not authorized for authentication."
            }
            AuthErrorCode::UserNotFound => "No account found with this email. Please sign up first.",
            AuthErrorCode::WrongPassword => "Incorrect password. Please try again.",
            AuthErrorCode::Other(_) => DEFAULT_AUTH_MESSAGE,
        }
    }

    /// Input the error should be highlighted on, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            AuthErrorCode::InvalidEmail
            | AuthErrorCode::UserNotFound
            | AuthErrorCode::UserDisabled
            | AuthErrorCode::EmailAlreadyInUse => Some(Field::Email),
            AuthErrorCode::WrongPassword
            | AuthErrorCode::TooManyRequests
            | AuthErrorCode::WeakPassword => Some(Field::Password),
            _ => None,
        }
    }

    pub fn clears_password(&self) -> bool {
        matches!(
            self,
            AuthErrorCode::WrongPassword | AuthErrorCode::TooManyRequests
        )
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_code())
    }
}
