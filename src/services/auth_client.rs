//! Client for the provider's auth API (password grant, sign-up, sign-out).
//!
//! Failures are classified on the provider's structured `error_code` field
//! first; substring matching on the free-text message is kept only as a
//! compatibility shim for older gateways that report nothing structured.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    credentials::Credentials,
    session::{AuthUser, ProfileMetadata, Session},
};

/// Auth operations the bootstrap sequence depends on.
///
/// The production implementation is [`AuthClient`]; tests drive the sequence
/// against a scripted stand-in.
pub(crate) trait AuthBackend {
    async fn sign_in_with_password(&self, creds: &Credentials) -> Result<Session, AuthError>;
    async fn sign_up(
        &self,
        creds: &Credentials,
        profile: ProfileMetadata,
    ) -> Result<SignUpOutcome, AuthError>;
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// The provider rejected the request with an error payload.
    #[error("{message}")]
    Provider {
        code: Option<String>,
        message: String,
    },
    /// The request never produced a provider response.
    #[error("auth request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Coarse classification of an auth failure, used for branching in the
/// bootstrap sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    UnknownAccount,
    AccountExists,
    AwaitingVerification,
    Other,
}

impl AuthError {
    pub fn failure(&self) -> AuthFailure {
        let AuthError::Provider { code, message } = self else {
            return AuthFailure::Other;
        };

        if let Some(code) = code.as_deref() {
            match code {
                "invalid_credentials" | "user_not_found" => return AuthFailure::UnknownAccount,
                "email_not_confirmed" => return AuthFailure::AwaitingVerification,
                "user_already_exists" | "email_exists" => return AuthFailure::AccountExists,
                _ => {}
            }
        }

        // Compatibility shim: the provider's message strings are not a
        // designed contract, so this is a last resort after the codes.
        if message.contains("Invalid login credentials") || message.contains("User not found") {
            AuthFailure::UnknownAccount
        } else if message.contains("Email not confirmed") {
            AuthFailure::AwaitingVerification
        } else if message.contains("already registered") {
            AuthFailure::AccountExists
        } else {
            AuthFailure::Other
        }
    }
}

/// Result of a successful sign-up call.
#[derive(Debug, Clone, Copy)]
pub struct SignUpOutcome {
    /// True when the provider still expects the new account to be verified
    /// before it can sign in.
    pub requires_verification: bool,
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: ProfileMetadata,
}

/// The provider answers sign-up with either a full session (auto-confirmed
/// accounts) or a bare user record (verification pending).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    User(AuthUser),
}

/// Error payload shapes the provider has shipped over time.
#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorPayload {
    fn into_error(self, status: reqwest::StatusCode) -> AuthError {
        let message = self
            .msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| format!("authentication failed (HTTP {status})"));
        AuthError::Provider {
            code: self.error_code,
            message,
        }
    }
}

/// HTTP client for the provider's auth endpoints.
#[derive(Clone)]
pub struct AuthClient {
    http: Client,
    base_url: String,
    api_key: String,
    site_url: String,
}

impl AuthClient {
    pub fn new(http: Client, base_url: &str, api_key: &str, site_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            site_url: site_url.to_string(),
        }
    }

    async fn provider_error(resp: reqwest::Response) -> AuthError {
        let status = resp.status();
        let payload = resp.json::<ErrorPayload>().await.unwrap_or_default();
        payload.into_error(status)
    }

    /// Revoke the provider session. Best effort; the in-process session is
    /// cleared regardless of the outcome.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::provider_error(resp).await)
        }
    }

    /// Liveness probe against the auth service, used by the readiness check.
    pub async fn health(&self) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/health", self.base_url);
        let resp = self
            .http
            .get(&url)
            .header("apikey", &self.api_key)
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::provider_error(resp).await)
        }
    }
}

impl AuthBackend for AuthClient {
    async fn sign_in_with_password(&self, creds: &Credentials) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&PasswordGrant {
                email: &creds.email,
                password: &creds.password,
            })
            .send()
            .await?;
        if resp.status().is_success() {
            Ok(resp.json::<Session>().await?)
        } else {
            Err(Self::provider_error(resp).await)
        }
    }

    async fn sign_up(
        &self,
        creds: &Credentials,
        profile: ProfileMetadata,
    ) -> Result<SignUpOutcome, AuthError> {
        let url = format!("{}/auth/v1/signup", self.base_url);
        let resp = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .query(&[("redirect_to", self.site_url.as_str())])
            .json(&SignUpRequest {
                email: &creds.email,
                password: &creds.password,
                data: profile,
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::provider_error(resp).await);
        }
        let requires_verification = match resp.json::<SignUpResponse>().await? {
            SignUpResponse::Session(session) => session.user.email_confirmed_at.is_none(),
            SignUpResponse::User(user) => user.email_confirmed_at.is_none(),
        };
        Ok(SignUpOutcome {
            requires_verification,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(code: Option<&str>, message: &str) -> AuthError {
        AuthError::Provider {
            code: code.map(str::to_string),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_classifies_structured_error_codes() {
        assert_eq!(
            provider_error(Some("invalid_credentials"), "whatever").failure(),
            AuthFailure::UnknownAccount
        );
        assert_eq!(
            provider_error(Some("email_not_confirmed"), "whatever").failure(),
            AuthFailure::AwaitingVerification
        );
        assert_eq!(
            provider_error(Some("user_already_exists"), "whatever").failure(),
            AuthFailure::AccountExists
        );
    }

    #[test]
    fn test_structured_code_wins_over_contradicting_message() {
        let err = provider_error(Some("user_already_exists"), "Invalid login credentials");
        assert_eq!(err.failure(), AuthFailure::AccountExists);
    }

    #[test]
    fn test_falls_back_to_message_substrings() {
        assert_eq!(
            provider_error(None, "Invalid login credentials").failure(),
            AuthFailure::UnknownAccount
        );
        assert_eq!(
            provider_error(None, "Email not confirmed").failure(),
            AuthFailure::AwaitingVerification
        );
        assert_eq!(
            provider_error(None, "User already registered").failure(),
            AuthFailure::AccountExists
        );
        assert_eq!(
            provider_error(None, "Database error saving new user").failure(),
            AuthFailure::Other
        );
    }

    #[test]
    fn test_error_payload_field_precedence() {
        let raw = r#"{"code":400,"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#;
        let payload: ErrorPayload = serde_json::from_str(raw).unwrap();
        let err = payload.into_error(reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(err.failure(), AuthFailure::UnknownAccount);
        assert_eq!(err.to_string(), "Invalid login credentials");

        let raw = r#"{"error":"invalid_grant","error_description":"No such user"}"#;
        let payload: ErrorPayload = serde_json::from_str(raw).unwrap();
        let err = payload.into_error(reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "No such user");
    }

    #[test]
    fn test_signup_response_shapes() {
        let raw = r#"{
            "access_token": "jwt",
            "user": {
                "id": "0b0f2a66-2f29-4ab6-9a7e-7f2a9f8f0f10",
                "email": "12345@student.local",
                "email_confirmed_at": "2026-08-01T10:00:00Z",
                "user_metadata": { "student_id": "12345" }
            }
        }"#;
        match serde_json::from_str::<SignUpResponse>(raw).unwrap() {
            SignUpResponse::Session(session) => {
                assert!(session.user.email_confirmed_at.is_some())
            }
            SignUpResponse::User(_) => panic!("expected session shape"),
        }

        let raw = r#"{
            "id": "0b0f2a66-2f29-4ab6-9a7e-7f2a9f8f0f10",
            "email": "12345@student.local",
            "user_metadata": { "student_id": "12345" }
        }"#;
        match serde_json::from_str::<SignUpResponse>(raw).unwrap() {
            SignUpResponse::User(user) => assert!(user.email_confirmed_at.is_none()),
            SignUpResponse::Session(_) => panic!("expected bare user shape"),
        }
    }
}
