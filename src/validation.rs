// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client-side form checks. Nothing here touches the store; a form that fails
//! validation never produces a store call.

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::errors::{Field, TrackerError, TrackerResult};
use crate::models::{ExpenseDraft, ExpensePatch};
use crate::utils::{parse_date, parse_decimal};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_NAME_LEN: usize = 2;

/// Largest amount or budget accepted from a form.
// 1_000_000_000_000 with scale 0 (`Decimal::new` is not const).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

/// Raw expense input as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct ExpenseForm {
    pub amount: String,
    pub category: String,
    pub description: String,
    pub date: String,
}

impl ExpenseForm {
    /// Checks fields in display order and stops at the first failure.
    pub fn validate(&self) -> TrackerResult<ExpenseDraft> {
        let amount = validate_amount(&self.amount)?;
        let category = required(&self.category, Field::Category, "Please select a category")?;
        let description = required(
            &self.description,
            Field::Description,
            "Please enter a description",
        )?;
        let date = validate_date(&self.date)?;
        Ok(ExpenseDraft {
            amount,
            category,
            description,
            date,
        })
    }
}

/// Edit input; empty fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct EditForm {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

impl EditForm {
    pub fn validate(&self) -> TrackerResult<ExpensePatch> {
        let patch = ExpensePatch {
            amount: self.amount.as_deref().map(validate_amount).transpose()?,
            category: self
                .category
                .as_deref()
                .map(|c| required(c, Field::Category, "Please select a category"))
                .transpose()?,
            description: self
                .description
                .as_deref()
                .map(|d| required(d, Field::Description, "Please enter a description"))
                .transpose()?,
            date: self.date.as_deref().map(validate_date).transpose()?,
        };
        if patch.is_empty() {
            return Err(TrackerError::validation(
                Field::Amount,
                "Nothing to update; change at least one field",
            ));
        }
        Ok(patch)
    }
}

fn required(value: &str, field: Field, message: &str) -> TrackerResult<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(TrackerError::validation(field, message));
    }
    Ok(v.to_string())
}

fn validate_amount(raw: &str) -> TrackerResult<Decimal> {
    match parse_decimal(raw.trim()) {
        Ok(d) if d > Decimal::ZERO && d <= MAX_AMOUNT => Ok(d),
        _ => Err(TrackerError::validation(
            Field::Amount,
            "Please enter a valid amount",
        )),
    }
}

fn validate_date(raw: &str) -> TrackerResult<chrono::NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(TrackerError::validation(Field::Date, "Please select a date"));
    }
    parse_date(raw).map_err(|e| TrackerError::validation(Field::Date, e.to_string()))
}

pub fn validate_budget(raw: &str) -> TrackerResult<Decimal> {
    match parse_decimal(raw.trim()) {
        Ok(d) if d >= Decimal::ZERO && d <= MAX_AMOUNT => Ok(d),
        _ => Err(TrackerError::validation(
            Field::Budget,
            "Budget must be a non-negative number",
        )),
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(TrackerError::validation(
                if self.email.is_empty() {
                    Field::Email
                } else {
                    Field::Password
                },
                "Please fill in all fields",
            ));
        }
        if !is_valid_email(&self.email) {
            return Err(TrackerError::validation(
                Field::Email,
                "Please enter a valid email address",
            ));
        }
        if !is_valid_password(&self.password) {
            return Err(TrackerError::validation(
                Field::Password,
                "Password must be at least 6 characters long",
            ));
        }
        Ok(())
    }

    pub fn clear_password(&mut self) {
        self.password.clear();
    }
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub accepted_terms: bool,
}

impl SignupForm {
    /// Every field is checked; all failures are returned together.
    pub fn validate(&self) -> Result<(), Vec<TrackerError>> {
        let mut errs = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errs.push(TrackerError::validation(Field::Name, "Name is required"));
        } else if name.chars().count() < MIN_NAME_LEN {
            errs.push(TrackerError::validation(
                Field::Name,
                "Name must be at least 2 characters",
            ));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errs.push(TrackerError::validation(Field::Email, "Email is required"));
        } else if !is_valid_email(email) {
            errs.push(TrackerError::validation(
                Field::Email,
                "Please enter a valid email address",
            ));
        }

        if self.password.is_empty() {
            errs.push(TrackerError::validation(
                Field::Password,
                "Password is required",
            ));
        } else if !is_valid_password(&self.password) {
            errs.push(TrackerError::validation(
                Field::Password,
                "Password must be at least 6 characters",
            ));
        }

        if self.confirm_password.is_empty() {
            errs.push(TrackerError::validation(
                Field::ConfirmPassword,
                "Please confirm your password",
            ));
        } else if self.password != self.confirm_password {
            errs.push(TrackerError::validation(
                Field::ConfirmPassword,
                "Passwords do not match",
            ));
        }

        if !self.accepted_terms {
            errs.push(TrackerError::validation(
                Field::Terms,
                "Please agree to the Terms and Privacy Policy to continue",
            ));
        }

        if errs.is_empty() { Ok(()) } else { Err(errs) }
    }
}

const STRENGTH_LABELS: [&str; 5] = ["Very Weak", "Weak", "Medium", "Strong", "Very Strong"];

/// Score in 0..=5 plus its label.
pub fn password_strength(password: &str) -> (u8, &'static str) {
    let mut score = 0u8;
    if password.chars().count() >= MIN_PASSWORD_LEN {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| "$@#&!".contains(c)) {
        score += 1;
    }
    let idx = (score as usize).min(STRENGTH_LABELS.len() - 1);
    (score, STRENGTH_LABELS[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(amount: &str, cat: &str, desc: &str, date: &str) -> ExpenseForm {
        ExpenseForm {
            amount: amount.into(),
            category: cat.into(),
            description: desc.into(),
            date: date.into(),
        }
    }

    fn field_of(e: TrackerError) -> Field {
        match e {
            TrackerError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn expense_form_trims_and_parses() {
        let d = form("12.50", " Food ", "  lunch with team ", "2025-03-04")
            .validate()
            .unwrap();
        assert_eq!(d.amount, Decimal::new(1250, 2));
        assert_eq!(d.category, "Food");
        assert_eq!(d.description, "lunch with team");
        assert_eq!(d.date.to_string(), "2025-03-04");
    }

    #[test]
    fn expense_form_rejects_bad_fields() {
        assert_eq!(
            field_of(form("0", "Food", "x", "2025-01-01").validate().unwrap_err()),
            Field::Amount
        );
        assert_eq!(
            field_of(form("-3", "Food", "x", "2025-01-01").validate().unwrap_err()),
            Field::Amount
        );
        assert_eq!(
            field_of(form("abc", "Food", "x", "2025-01-01").validate().unwrap_err()),
            Field::Amount
        );
        assert_eq!(
            field_of(form("5", "", "x", "2025-01-01").validate().unwrap_err()),
            Field::Category
        );
        assert_eq!(
            field_of(form("5", "Food", "   ", "2025-01-01").validate().unwrap_err()),
            Field::Description
        );
        assert_eq!(
            field_of(form("5", "Food", "x", "").validate().unwrap_err()),
            Field::Date
        );
        assert_eq!(
            field_of(form("5", "Food", "x", "01/02/2025").validate().unwrap_err()),
            Field::Date
        );
    }

    #[test]
    fn empty_edit_is_rejected() {
        assert!(EditForm::default().validate().is_err());
        let p = EditForm {
            amount: Some("7".into()),
            ..Default::default()
        }
        .validate()
        .unwrap();
        assert_eq!(p.amount, Some(Decimal::from(7)));
        assert!(p.category.is_none());
    }

    #[test]
    fn login_form_rules() {
        assert!(LoginForm::new("", "secret1").validate().is_err());
        assert!(LoginForm::new("not-an-email", "secret1").validate().is_err());
        assert!(LoginForm::new("a@b.co", "12345").validate().is_err());
        assert!(LoginForm::new("  a@b.co ", "123456").validate().is_ok());
    }

    #[test]
    fn signup_collects_every_error() {
        let f = SignupForm {
            name: "A".into(),
            email: "bad".into(),
            password: "123".into(),
            confirm_password: "456".into(),
            accepted_terms: false,
        };
        let errs = f.validate().unwrap_err();
        let fields: Vec<Field> = errs.into_iter().map(field_of).collect();
        assert_eq!(
            fields,
            vec![
                Field::Name,
                Field::Email,
                Field::Password,
                Field::ConfirmPassword,
                Field::Terms
            ]
        );
    }

    #[test]
    fn strength_scores() {
        assert_eq!(password_strength("abc"), (1, "Weak"));
        assert_eq!(password_strength("abcdef"), (2, "Medium"));
        assert_eq!(password_strength("Abcdef1"), (4, "Very Strong"));
        assert_eq!(password_strength("Abcdef1!").0, 5);
        assert_eq!(password_strength("Abcdef1!").1, "Very Strong");
        assert_eq!(password_strength(""), (0, "Very Weak"));
    }
}
