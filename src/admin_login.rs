//! Admin sign-in flow: form validation, login call, user-facing messages

use crate::error::{ClientError, Result};
use crate::session::SessionManager;
use crate::types::Credentials;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const INVALID_FORM_MESSAGE: &str = "Please fill in all fields correctly.";
pub const LOGIN_FAILED_MESSAGE: &str = "An error occurred while signing in.";
pub const PROFILE_ROUTE: &str = "/dashboard/profile";

#[derive(Debug, Clone, Default)]
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

    /// Email is required and must look like an address; password is required
    pub fn validate(&self) -> Result<()> {
        if self.email.trim().is_empty() {
            return Err(ClientError::Validation("email is required".to_string()));
        }
        if !looks_like_email(self.email.trim()) {
            return Err(ClientError::Validation("email is not valid".to_string()));
        }
        if self.password.is_empty() {
            return Err(ClientError::Validation("password is required".to_string()));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

// local@domain, no whitespace, non-empty on both sides
fn looks_like_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
}

pub struct AdminLogin {
    session: Arc<SessionManager>,
}

impl AdminLogin {
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Validate and submit the form
    ///
    /// Returns the route to navigate to on success. Pass a failure to
    /// [`AdminLogin::error_message`] for the text to show.
    pub async fn submit(&self, form: &LoginForm) -> Result<&'static str> {
        if let Err(e) = form.validate() {
            debug!(error = %e, "Admin login form rejected");
            return Err(ClientError::Validation(INVALID_FORM_MESSAGE.to_string()));
        }

        let credentials = Credentials {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };

        match self.session.login(&credentials).await {
            Ok(_) => {
                info!(email = %credentials.email, "Admin signed in");
                Ok(PROFILE_ROUTE)
            }
            Err(e) => {
                error!(error = %e, "Admin sign-in failed");
                Err(e)
            }
        }
    }

    /// Backend message if it sent one, the form message for an invalid
    /// form, otherwise a generic sign-in failure
    pub fn error_message(err: &ClientError) -> String {
        err.user_message(LOGIN_FAILED_MESSAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form() {
        assert!(LoginForm::new("admin@shop.test", "secret").is_valid());
    }

    #[test]
    fn test_missing_fields() {
        assert!(!LoginForm::new("", "secret").is_valid());
        assert!(!LoginForm::new("admin@shop.test", "").is_valid());
        assert!(!LoginForm::default().is_valid());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            AdminLogin::error_message(&ClientError::Validation(INVALID_FORM_MESSAGE.to_string())),
            INVALID_FORM_MESSAGE
        );
        assert_eq!(
            AdminLogin::error_message(&ClientError::TokenExpired),
            LOGIN_FAILED_MESSAGE
        );
    }

    #[test]
    fn test_malformed_email() {
        for email in ["admin", "@shop.test", "admin@", "a@b@c", "ad min@shop.test"] {
            assert!(!LoginForm::new(email, "secret").is_valid(), "{email}");
        }
    }
}
