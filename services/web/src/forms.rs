//! Sign-in form input and its validation

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::sync::OnceLock;

use crate::signin::Credentials;

/// Fields posted by the sign-in form
#[derive(Debug, Deserialize)]
pub struct SignInFormData {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(rename = "csrfToken", default)]
    pub csrf_token: Option<String>,
}

impl SignInFormData {
    /// Check the fields the browser would have refused to submit
    pub fn validate(&self) -> Result<(), String> {
        validate_email(self.email.trim())?;
        validate_password(self.password.as_ref())
    }

    /// Split into the credentials and the anti-forgery token
    pub fn into_parts(self) -> (Credentials, Option<String>) {
        let credentials = Credentials {
            email: self.email.trim().to_string(),
            password: self
                .password
                .unwrap_or_else(|| SecretString::new(String::new())),
        };

        (credentials, self.csrf_token)
    }
}

/// Longest address the form accepts, in bytes
const MAX_EMAIL_LEN: usize = 254;

static SIGNIN_EMAIL: OnceLock<Regex> = OnceLock::new();

/// Check the address typed into the sign-in form
///
/// Only the shape the browser's `type="email"` field would accept is checked;
/// whether the account exists is for the auth provider to say.
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(format!("Email must be at most {} characters long", MAX_EMAIL_LEN));
    }

    let shape = SIGNIN_EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile sign-in email regex")
    });

    if shape.is_match(email) {
        Ok(())
    } else {
        Err("Invalid email format".to_string())
    }
}

/// Validate password
///
/// Strength rules belong to the auth provider; only presence is checked here.
pub fn validate_password(password: Option<&SecretString>) -> Result<(), String> {
    match password {
        Some(password) if !password.expose_secret().is_empty() => Ok(()),
        _ => Err("Password is required".to_string()),
    }
}
