//! Client-side checks for the inputs the sign-up, sign-in and new-link forms
//! collect, run before a request is sent.

use thiserror::Error;
use url::Url;

use crate::types::{LoginRequest, NewUrlRequest, NewUserRequest};

pub const SLUG_MIN_LEN: usize = 2;
pub const SLUG_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

const SLUG_PUNCTUATION: &str = "-._~!'()+";
const PASSWORD_SPECIALS: &str = "!@#$%^&*";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("A URL is required")]
    UrlRequired,
    #[error("Please use a full URL, including http:// or https://")]
    UrlScheme,
    #[error("Please enter a valid URL")]
    UrlInvalid,
    #[error("The micro URL must be at least 2 characters long")]
    SlugTooShort,
    #[error("The micro URL must be at most 150 characters long")]
    SlugTooLong,
    #[error("The micro URL must be a valid url string")]
    SlugInvalid,
    #[error("A name is required")]
    NameRequired,
    #[error("Invalid email")]
    EmailInvalid,
    #[error("Password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("Password must contain at least one number and one special character")]
    PasswordInvalid,
}

pub fn validate_url(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::UrlRequired);
    }
    if !raw.starts_with("http") {
        return Err(ValidationError::UrlScheme);
    }
    Url::parse(raw).map_err(|_| ValidationError::UrlInvalid)?;
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    let len = slug.chars().count();
    if len < SLUG_MIN_LEN {
        return Err(ValidationError::SlugTooShort);
    }
    if len > SLUG_MAX_LEN {
        return Err(ValidationError::SlugTooLong);
    }
    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || SLUG_PUNCTUATION.contains(c))
    {
        return Err(ValidationError::SlugInvalid);
    }
    Ok(())
}

/// `local@domain.tld`, surrounding whitespace ignored.
pub fn validate_email(raw: &str) -> Result<(), ValidationError> {
    let email = raw.trim();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalid);
    };
    let well_formed = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::EmailInvalid)
    }
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(c));
    let has_special = password.chars().any(|c| PASSWORD_SPECIALS.contains(c));
    if allowed && has_special {
        Ok(())
    } else {
        Err(ValidationError::PasswordInvalid)
    }
}

impl NewUrlRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_url(&self.url)?;
        match self.short.as_deref() {
            Some(slug) => validate_slug(slug),
            None => Ok(()),
        }
    }
}

impl NewUserRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_rules() {
        assert_eq!(validate_url(""), Err(ValidationError::UrlRequired));
        assert_eq!(validate_url("example.com"), Err(ValidationError::UrlScheme));
        assert_eq!(validate_url("http//broken"), Err(ValidationError::UrlInvalid));
        assert_eq!(validate_url("https://example.com/path?q=1"), Ok(()));
    }

    #[test]
    fn slug_rules() {
        assert_eq!(validate_slug("a"), Err(ValidationError::SlugTooShort));
        assert_eq!(validate_slug(&"a".repeat(151)), Err(ValidationError::SlugTooLong));
        assert_eq!(validate_slug("has space"), Err(ValidationError::SlugInvalid));
        assert_eq!(validate_slug("my-link_(v2)~!"), Err(ValidationError::SlugInvalid));
        assert_eq!(validate_slug("my-link.(v2)~!'+"), Ok(()));
        assert_eq!(validate_slug(&"a".repeat(150)), Ok(()));
    }

    #[test]
    fn email_rules() {
        assert_eq!(validate_email("  user@example.com "), Ok(()));
        assert_eq!(validate_email("user@example"), Err(ValidationError::EmailInvalid));
        assert_eq!(validate_email("@example.com"), Err(ValidationError::EmailInvalid));
        assert_eq!(validate_email("us er@example.com"), Err(ValidationError::EmailInvalid));
        assert_eq!(validate_email("a@b@c.com"), Err(ValidationError::EmailInvalid));
        assert_eq!(validate_email("user@example..com"), Err(ValidationError::EmailInvalid));
    }

    #[test]
    fn password_rules() {
        assert_eq!(validate_password("short!"), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("longenough1"), Err(ValidationError::PasswordInvalid));
        assert_eq!(validate_password("spaces not ok!"), Err(ValidationError::PasswordInvalid));
        assert_eq!(validate_password("Secret123!"), Ok(()));
    }

    #[test]
    fn request_validation_delegates() {
        let mut req = NewUrlRequest::new("https://example.com");
        assert_eq!(req.validate(), Ok(()));
        req.short = Some("x".to_string());
        assert_eq!(req.validate(), Err(ValidationError::SlugTooShort));

        let user = NewUserRequest {
            name: "   ".to_string(),
            email: "user@example.com".to_string(),
            password: "Secret123!".to_string(),
        };
        assert_eq!(user.validate(), Err(ValidationError::NameRequired));

        let login = LoginRequest {
            email: "user@example.com".to_string(),
            password: "Secret123!".to_string(),
        };
        assert_eq!(login.validate(), Ok(()));
    }
}
