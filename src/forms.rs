//! Submitted forms and their validation rules.
//!
//! Each form deserializes leniently (missing fields become empty) and then
//! validates into either a clean request value or a set of per-field error
//! messages that the page re-renders inline.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

pub const REQUIRED: &str = "This field is required.";
pub const PASSWORDS_MUST_MATCH: &str = "Passwords must match";
pub const EMAIL_TAKEN: &str = "Email already registered.";
pub const USERNAME_TAKEN: &str = "Username already taken";
pub const INVALID_CHOICE: &str = "Not a valid choice";
const INVALID_EMAIL: &str = "Invalid email address.";
const USERNAME_CHARSET: &str = "Usernames must have only letters, numbers, dots or underscores";

const MAX_EMAIL_LEN: usize = 64;
const MAX_USERNAME_LEN: usize = 64;
const MAX_SEARCH_LEN: usize = 32;
const MAX_COLLECTION_NAME_LEN: usize = 255;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern compiles"));
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").expect("username pattern compiles"));

/// Error messages keyed by form field name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn for_field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

fn check_length(errors: &mut FormErrors, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len == 0 {
        errors.add(field, REQUIRED);
    } else if len > max {
        errors.add(field, format!("Field must be between 1 and {} characters long.", max));
    }
}

fn check_email(errors: &mut FormErrors, value: &str) {
    check_length(errors, "email", value, MAX_EMAIL_LEN);
    if !value.is_empty() && !EMAIL_RE.is_match(value) {
        errors.add("email", INVALID_EMAIL);
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RegistrationForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password2: String,
}

/// A registration that passed the field rules; uniqueness is checked later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();
        let email = self.email.trim();
        let username = self.username.trim();

        check_email(&mut errors, email);

        check_length(&mut errors, "username", username, MAX_USERNAME_LEN);
        if !username.is_empty() && !USERNAME_RE.is_match(username) {
            errors.add("username", USERNAME_CHARSET);
        }

        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        } else if self.password != self.password2 {
            errors.add("password", PASSWORDS_MUST_MATCH);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        errors.into_result(Registration {
            email: email.to_string(),
            username: username.to_string(),
            password: self.password.clone(),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    /// Present (any value) when the "keep me logged in" box is ticked.
    pub remember_me: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::default();
        let email = self.email.trim();

        check_email(&mut errors, email);
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }

        errors.into_result(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
            remember_me: self.remember_me.is_some(),
        })
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct GifSearchForm {
    pub search: String,
}

impl GifSearchForm {
    /// Returns the trimmed search term.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::default();
        let term = self.search.trim();
        check_length(&mut errors, "search", term, MAX_SEARCH_LEN);
        errors.into_result(term.to_string())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct CollectionCreateForm {
    pub name: String,
    pub gif_picks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    pub name: String,
    /// Distinct selected GIF ids, in ascending order.
    pub gif_ids: Vec<i64>,
}

impl CollectionCreateForm {
    /// Checks the name and that every pick is a GIF id. Whether those GIFs
    /// exist is for the caller to verify.
    pub fn validate(&self) -> Result<CollectionRequest, FormErrors> {
        let mut errors = FormErrors::default();
        let name = self.name.trim();
        check_length(&mut errors, "name", name, MAX_COLLECTION_NAME_LEN);

        let mut gif_ids = Vec::with_capacity(self.gif_picks.len());
        for pick in &self.gif_picks {
            match pick.trim().parse::<i64>() {
                Ok(id) => gif_ids.push(id),
                Err(_) => {
                    errors.add("gif_picks", INVALID_CHOICE);
                    break;
                }
            }
        }
        gif_ids.sort_unstable();
        gif_ids.dedup();

        errors.into_result(CollectionRequest {
            name: name.to_string(),
            gif_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, username: &str, password: &str, password2: &str) -> RegistrationForm {
        RegistrationForm {
            email: email.into(),
            username: username.into(),
            password: password.into(),
            password2: password2.into(),
        }
    }

    #[test]
    fn valid_registration_is_trimmed() {
        let clean = registration(" ann@example.com ", " ann_1.x ", "pw", "pw").validate().unwrap();
        assert_eq!(clean.email, "ann@example.com");
        assert_eq!(clean.username, "ann_1.x");
    }

    #[test]
    fn registration_reports_each_bad_field() {
        let errors = registration("not-an-email", "1ann", "pw", "other").validate().unwrap_err();
        assert_eq!(errors.for_field("email"), [INVALID_EMAIL]);
        assert_eq!(errors.for_field("username"), [USERNAME_CHARSET]);
        assert_eq!(errors.for_field("password"), [PASSWORDS_MUST_MATCH]);
        assert!(errors.for_field("password2").is_empty());
    }

    #[test]
    fn registration_requires_every_field() {
        let errors = RegistrationForm::default().validate().unwrap_err();
        for field in ["email", "username", "password", "password2"] {
            assert_eq!(errors.for_field(field), [REQUIRED], "{field}");
        }
    }

    #[test]
    fn registration_enforces_length_limits() {
        let long_name = "a".repeat(65);
        let errors = registration("ann@example.com", &long_name, "pw", "pw").validate().unwrap_err();
        assert_eq!(errors.for_field("username").len(), 1);
        assert!(errors.for_field("email").is_empty());
    }

    #[test]
    fn login_tracks_remember_me() {
        let form = LoginForm {
            email: "ann@example.com".into(),
            password: "pw".into(),
            remember_me: Some("y".into()),
        };
        assert!(form.validate().unwrap().remember_me);

        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.for_field("password"), [REQUIRED]);
    }

    #[test]
    fn search_terms_are_trimmed_and_bounded() {
        let form = GifSearchForm { search: "  cats ".into() };
        assert_eq!(form.validate().unwrap(), "cats");

        let blank = GifSearchForm { search: "   ".into() };
        assert_eq!(blank.validate().unwrap_err().for_field("search"), [REQUIRED]);

        let long = GifSearchForm { search: "x".repeat(33) };
        assert!(long.validate().is_err());
    }

    #[test]
    fn collection_picks_must_be_ids() {
        let form = CollectionCreateForm {
            name: " Favorites ".into(),
            gif_picks: vec!["3".into(), "1".into(), "3".into()],
        };
        let request = form.validate().unwrap();
        assert_eq!(request.name, "Favorites");
        assert_eq!(request.gif_ids, vec![1, 3]);

        let bad = CollectionCreateForm {
            name: "Favorites".into(),
            gif_picks: vec!["cat".into()],
        };
        assert_eq!(bad.validate().unwrap_err().for_field("gif_picks"), [INVALID_CHOICE]);

        let unnamed = CollectionCreateForm::default();
        assert_eq!(unnamed.validate().unwrap_err().for_field("name"), [REQUIRED]);
    }
}
