//! Login and registration against the backend
//!
//! Forms are validated locally before any request is made; the first failing
//! rule is reported as [`ChataiError::Validation`]. Both endpoints answer with
//! an [`ApiResponse`] envelope where `code == 200` means success.

use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::ServerConfig;
use crate::error::{ChataiError, Result};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Minimum password length accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Status value sent for newly registered (active) accounts
const ACTIVE_STATUS: i32 = 1;

/// JSON envelope returned by the auth endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Application-level status code; `200` means success
    pub code: i64,
    /// Human-readable message to show the user
    #[serde(default)]
    pub message: String,
}

impl ApiResponse {
    /// Whether the backend accepted the request
    pub fn is_success(&self) -> bool {
        self.code == 200
    }
}

/// Login form input
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    /// User name; surrounding whitespace is ignored
    pub username: String,
    /// Password, used verbatim
    pub password: String,
}

impl LoginForm {
    /// Check required fields
    ///
    /// # Errors
    ///
    /// Returns [`ChataiError::Validation`] naming the first missing field.
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(invalid("Please enter a username"));
        }
        if self.password.is_empty() {
            return Err(invalid("Please enter a password"));
        }
        Ok(())
    }
}

/// Registration form input
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// User name; also used as the nickname
    pub username: String,
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Password confirmation
    pub confirm_password: String,
}

impl RegisterForm {
    /// Check the form, stopping at the first failing rule
    ///
    /// # Errors
    ///
    /// Returns [`ChataiError::Validation`] describing the failed rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use chatai::auth::RegisterForm;
    ///
    /// let form = RegisterForm {
    ///     username: "alice".into(),
    ///     email: "alice@example.com".into(),
    ///     password: "secret1".into(),
    ///     confirm_password: "secret2".into(),
    /// };
    /// let err = form.validate().unwrap_err();
    /// assert!(err.to_string().contains("Passwords do not match"));
    /// ```
    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(invalid("Please enter a username"));
        }

        let email = self.email.trim();
        if email.is_empty() {
            return Err(invalid("Please enter an email address"));
        }

        let email_re = Regex::new(EMAIL_PATTERN)
            .map_err(|e| anyhow::anyhow!("Invalid email pattern: {}", e))?;
        if !email_re.is_match(email) {
            return Err(invalid("Please enter a valid email address"));
        }

        if self.password.is_empty() {
            return Err(invalid("Please enter a password"));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(invalid(&format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        if self.password != self.confirm_password {
            return Err(invalid("Passwords do not match"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> anyhow::Error {
    ChataiError::Validation(message.to_string()).into()
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
    email: &'a str,
    nickname: &'a str,
    status: i32,
    created_at: String,
    updated_at: String,
}

/// Client for the login and register endpoints
///
/// Share the `reqwest::Client` with the chat transport so the session cookie
/// from a login is reused for chat requests.
#[derive(Debug, Clone)]
pub struct AuthClient {
    client: reqwest::Client,
    login_url: String,
    register_url: String,
}

impl AuthClient {
    /// Create a client for the configured auth endpoints
    pub fn new(client: reqwest::Client, server: &ServerConfig) -> Self {
        Self {
            client,
            login_url: server.endpoint(&server.login_path),
            register_url: server.endpoint(&server.register_path),
        }
    }

    /// Validate `form` and log in
    ///
    /// # Errors
    ///
    /// Returns a validation error before any request, [`ChataiError::Request`]
    /// for a non-success HTTP status, or an HTTP/decoding error.
    pub async fn login(&self, form: &LoginForm) -> Result<ApiResponse> {
        form.validate()?;
        tracing::info!(username = %form.username.trim(), "Logging in");

        let body = LoginRequest {
            username: form.username.trim(),
            password: &form.password,
        };
        self.post(&self.login_url, &body).await
    }

    /// Validate `form` and register a new account
    ///
    /// # Errors
    ///
    /// Same as [`AuthClient::login`].
    pub async fn register(&self, form: &RegisterForm) -> Result<ApiResponse> {
        form.validate()?;
        tracing::info!(username = %form.username.trim(), "Registering account");

        let now = Utc::now().to_rfc3339();
        let username = form.username.trim();
        let body = RegisterRequest {
            username,
            password: &form.password,
            email: form.email.trim(),
            nickname: username,
            status: ACTIVE_STATUS,
            created_at: now.clone(),
            updated_at: now,
        };
        self.post(&self.register_url, &body).await
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<ApiResponse> {
        let response = self.client.post(url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChataiError::Request {
                status: status.as_u16(),
                body: text,
            }
            .into());
        }

        let reply: ApiResponse = response.json().await?;
        tracing::debug!(code = reply.code, "Auth endpoint replied");
        Ok(reply)
    }
}
