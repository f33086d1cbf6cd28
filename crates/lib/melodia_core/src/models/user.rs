//! User domain model and sign-up validation.
//!
//! These are internal domain models, distinct from the API request
//! types (which carry `#[serde(rename)]` for camelCase fields).

use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Earliest plausible birth year accepted at sign-up.
const MIN_BIRTH_YEAR: i32 = 1900;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex"));

/// User sex as stored on the profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    F,
    M,
    O,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::F => "F",
            Sex::M => "M",
            Sex::O => "O",
        }
    }
}

impl FromStr for Sex {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" => Ok(Sex::F),
            "M" => Ok(Sex::M),
            "O" => Ok(Sex::O),
            other => Err(AuthError::Validation(format!("invalid sex: {other:?}"))),
        }
    }
}

/// Persisted user row. The identity store exclusively owns these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    /// Monotonic counter; bumping it revokes all outstanding tokens.
    pub version: u32,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: NaiveDate,
    /// Opaque reference into the avatar object store; may be empty.
    pub avatar_src: String,
}

/// Validated sign-up input (plaintext password, no id/version yet).
#[derive(Debug, Clone)]
pub struct SignUp {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    pub birth_date: NaiveDate,
}

impl SignUp {
    /// Validate every field against the sign-up schema.
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_code_points("username", &self.username, 4, 20)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_code_points("firstName", &self.first_name, 2, 20)?;
        validate_code_points("lastName", &self.last_name, 2, 20)?;
        validate_birth_date(self.birth_date)?;
        Ok(())
    }
}

fn validate_code_points(field: &str, value: &str, min: usize, max: usize) -> Result<(), AuthError> {
    let n = value.chars().count();
    if n < min || n > max {
        return Err(AuthError::Validation(format!(
            "{field} must be {min}-{max} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    if email.len() > 255 || !EMAIL_RE.is_match(email) {
        return Err(AuthError::Validation("invalid email".into()));
    }
    Ok(())
}

/// Password complexity: 8-30 code points, at least one letter and one digit.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    validate_code_points("password", password, 8, 30)?;
    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(AuthError::Validation(
            "password must contain a letter and a digit".into(),
        ));
    }
    Ok(())
}

fn validate_birth_date(date: NaiveDate) -> Result<(), AuthError> {
    let today = Utc::now().date_naive();
    if date.year() < MIN_BIRTH_YEAR || date > today {
        return Err(AuthError::Validation("implausible birth date".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SignUp {
        SignUp {
            username: "yarik_tri".into(),
            email: "y@example.com".into(),
            password: "Love1234".into(),
            first_name: "Yaroslav".into(),
            last_name: "Kuzmin".into(),
            sex: Sex::M,
            birth_date: NaiveDate::from_ymd_opt(2003, 8, 23).unwrap(),
        }
    }

    #[test]
    fn sample_input_is_valid() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn short_username_is_rejected() {
        let mut s = sample();
        s.username = "abc".into();
        assert!(matches!(s.validate(), Err(AuthError::Validation(_))));
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut s = sample();
        s.email = "not-an-email".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn overlong_email_is_rejected() {
        let mut s = sample();
        s.email = format!("{}@example.com", "a".repeat(250));
        assert!(s.validate().is_err());
    }

    #[test]
    fn password_needs_letter_and_digit() {
        assert!(validate_password("Love1234").is_ok());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password("lovelove").is_err());
        assert!(validate_password("short1").is_err());
    }

    #[test]
    fn future_birth_date_is_rejected() {
        let mut s = sample();
        s.birth_date = Utc::now().date_naive() + chrono::Duration::days(2);
        assert!(s.validate().is_err());
    }

    #[test]
    fn ancient_birth_date_is_rejected() {
        let mut s = sample();
        s.birth_date = NaiveDate::from_ymd_opt(1850, 1, 1).unwrap();
        assert!(s.validate().is_err());
    }

    #[test]
    fn sex_parses_from_str() {
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::F);
        assert!("x".parse::<Sex>().is_err());
    }
}
