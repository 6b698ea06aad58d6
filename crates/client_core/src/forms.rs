//! Client-side form validation. Nothing here touches the network.

use std::borrow::Cow;

use chrono::NaiveDate;
use shared::{
    domain::User,
    protocol::{LoginRequest, ProfileUpdate, RegistrationRequest},
};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ClientError, Result};

pub const MIN_PASSWORD_LEN: usize = 8;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "not_blank", message = "Username is required."))]
    pub username: String,
    #[validate(custom(function = "not_blank", message = "Password is required."))]
    pub password: String,
}

impl LoginForm {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<LoginRequest> {
        check(self, &["username", "password"])?;
        Ok(LoginRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RegistrationForm {
    #[validate(custom(function = "not_blank", message = "Username is required."))]
    pub username: String,
    #[validate(custom(function = "not_blank", message = "Password is required."))]
    pub password: String,
    #[validate(
        custom(function = "not_blank", message = "Email is required."),
        email(message = "Please enter a valid email address.")
    )]
    pub email: String,
    pub birth_date: Option<NaiveDate>,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<RegistrationRequest> {
        check(self, &["username", "password", "email"])?;
        Ok(RegistrationRequest {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            email: self.email.trim().to_string(),
            birth_date: self.birth_date.map(format_date),
        })
    }
}

/// Editable copy of the session user. An empty password means "unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq, Validate)]
pub struct ProfileForm {
    #[validate(
        custom(function = "not_blank", message = "Username is required."),
        length(min = 3, message = "Username must be at least 3 characters long.")
    )]
    pub username: String,
    #[validate(custom(function = "optional_password"))]
    pub password: String,
    #[validate(
        custom(function = "not_blank", message = "Email is required."),
        email(message = "Please enter a valid email address.")
    )]
    pub email: String,
    pub birth_date: Option<NaiveDate>,
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            password: String::new(),
            email: user.email.clone(),
            birth_date: user.birth_date_day().and_then(parse_date),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check(self, &["username", "password", "email"])
    }

    /// Fields that differ from `current`, in the server's update vocabulary.
    pub fn changes_from(&self, current: &User) -> ProfileUpdate {
        let username = self.username.trim();
        let email = self.email.trim();
        let birth_date = self.birth_date.map(format_date);

        ProfileUpdate {
            new_username: (username != current.username).then(|| username.to_string()),
            new_password: (!self.password.is_empty()).then(|| self.password.clone()),
            new_email: (email != current.email).then(|| email.to_string()),
            new_birth_date: birth_date.filter(|date| Some(date.as_str()) != current.birth_date_day()),
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Runs the derived rules and reports the first failing field in `order`.
/// A blank field reports "required" ahead of its other rules.
fn check<T: Validate>(form: &T, order: &[&str]) -> Result<()> {
    form.validate().map_err(|errors| first_failure(&errors, order))
}

fn first_failure(errors: &ValidationErrors, order: &[&str]) -> ClientError {
    let fields = errors.field_errors();
    let message = order
        .iter()
        .filter_map(|field| fields.get(*field))
        .find_map(|failures| {
            failures
                .iter()
                .find(|failure| failure.code == REQUIRED)
                .or_else(|| failures.first())
                .and_then(|failure| failure.message.as_ref())
        })
        .map(|message| message.to_string())
        .unwrap_or_else(|| errors.to_string());
    ClientError::Validation(message)
}

const REQUIRED: &str = "required";

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(REQUIRED));
    }
    Ok(())
}

/// Empty means "keep the current password".
fn optional_password(value: &str) -> std::result::Result<(), ValidationError> {
    if value.is_empty() || value.chars().count() >= MIN_PASSWORD_LEN {
        return Ok(());
    }
    Err(ValidationError::new("length").with_message(Cow::Owned(format!(
        "Password must be at least {MIN_PASSWORD_LEN} characters long."
    ))))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn user() -> User {
        User {
            username: "alice".into(),
            email: "alice@kino.app".into(),
            birth_date: Some("1990-05-04T00:00:00.000Z".into()),
            token_invalid_before: None,
            favorites: BTreeSet::new(),
        }
    }

    #[test]
    fn login_requires_both_fields() {
        assert!(LoginForm::new("alice", "").validate().is_err());
        assert!(LoginForm::new("  ", "secret").validate().is_err());
        let request = LoginForm::new(" alice ", "secret").validate().expect("valid");
        assert_eq!(request.username, "alice");
    }

    #[test]
    fn registration_rejects_malformed_email() {
        let mut form = RegistrationForm {
            username: "bob".into(),
            password: "pw".into(),
            email: "bob.example.com".into(),
            birth_date: None,
        };
        assert!(matches!(form.validate(), Err(ClientError::Validation(_))));

        form.email = "bob@example.com".into();
        form.birth_date = NaiveDate::from_ymd_opt(2001, 2, 3);
        let request = form.validate().expect("valid");
        assert_eq!(request.birth_date.as_deref(), Some("2001-02-03"));
    }

    #[test]
    fn registration_rejects_malformed_domains_and_locals() {
        for email in [
            "alice@kino,app",
            "alice@kino..app",
            "alice@-kino",
            "a\"b@kino.app",
            "alice@kino_app!",
        ] {
            let form = RegistrationForm {
                username: "alice".into(),
                password: "secret".into(),
                email: email.into(),
                birth_date: None,
            };
            match form.validate() {
                Err(ClientError::Validation(message)) => {
                    assert_eq!(message, "Please enter a valid email address.", "{email}")
                }
                other => panic!("{email} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn first_failing_field_wins_and_blank_means_required() {
        let form = RegistrationForm::default();
        match form.validate() {
            Err(ClientError::Validation(message)) => assert_eq!(message, "Username is required."),
            other => panic!("unexpected: {other:?}"),
        }

        let mut profile = ProfileForm::from_user(&user());
        profile.email = String::new();
        profile.password = "short".into();
        match profile.validate() {
            Err(ClientError::Validation(message)) => {
                assert_eq!(message, "Password must be at least 8 characters long.")
            }
            other => panic!("unexpected: {other:?}"),
        }
        profile.password = String::new();
        match profile.validate() {
            Err(ClientError::Validation(message)) => assert_eq!(message, "Email is required."),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn profile_enforces_lengths() {
        let mut form = ProfileForm::from_user(&user());
        form.username = "al".into();
        assert!(form.validate().is_err());

        form.username = "alice".into();
        form.password = "short".into();
        assert!(form.validate().is_err());

        form.password = "long enough".into();
        assert!(form.validate().is_ok());
    }

    #[test]
    fn unchanged_form_yields_empty_update() {
        let form = ProfileForm::from_user(&user());
        assert_eq!(form.birth_date, NaiveDate::from_ymd_opt(1990, 5, 4));
        assert!(form.changes_from(&user()).is_empty());
    }

    #[test]
    fn changed_fields_are_reported() {
        let mut form = ProfileForm::from_user(&user());
        form.email = "new@kino.app".into();
        form.birth_date = NaiveDate::from_ymd_opt(1991, 1, 1);
        let update = form.changes_from(&user());
        assert_eq!(update.new_email.as_deref(), Some("new@kino.app"));
        assert_eq!(update.new_birth_date.as_deref(), Some("1991-01-01"));
        assert!(update.new_username.is_none());
        assert!(!update.invalidates_credentials());

        form.username = "alicia".into();
        assert!(form.changes_from(&user()).invalidates_credentials());
    }
}
