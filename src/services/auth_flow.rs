//! The login bootstrap: try sign-in, create the account when it does not
//! exist yet, and settle the races that scheme allows.
//!
//! Accounts are derived from the student number on first use, so a failed
//! sign-in for an unknown account is the normal first-contact path, not an
//! error. Two fresh bootstraps for the same number can race on sign-up;
//! the loser observes a collision and falls back to one more sign-in.

use thiserror::Error;
use tracing::debug;

use crate::models::{
    credentials::Credentials,
    session::{ProfileMetadata, Session},
};
use crate::services::auth_client::{AuthBackend, AuthFailure};

#[derive(Debug, Error)]
pub enum LoginError {
    /// The account was created but the provider still wants it verified.
    #[error("Account created. Please try signing in again in a moment.")]
    AwaitingVerification,
    /// Any other provider failure, surfaced verbatim.
    #[error("{0}")]
    Provider(String),
}

/// Profile metadata attached to a brand-new account.
pub fn profile_for(identifier: &str) -> ProfileMetadata {
    ProfileMetadata {
        student_id: Some(identifier.to_string()),
        display_name: Some(format!("Student {identifier}")),
    }
}

/// Run the bootstrap sequence to completion.
///
/// Exactly one sign-in attempt happens before any sign-up, and the only
/// automatic retry is the single sign-in after a sign-up collision.
pub(crate) async fn sign_in_or_sign_up<B: AuthBackend>(
    backend: &B,
    creds: &Credentials,
    profile: ProfileMetadata,
) -> Result<Session, LoginError> {
    let first_failure = match backend.sign_in_with_password(creds).await {
        Ok(session) => return Ok(session),
        Err(err) => err,
    };

    match first_failure.failure() {
        AuthFailure::UnknownAccount | AuthFailure::AwaitingVerification => {
            debug!(login = %creds.email, "no usable account yet, attempting sign-up");
        }
        _ => return Err(LoginError::Provider(first_failure.to_string())),
    }

    match backend.sign_up(creds, profile).await {
        Ok(outcome) => match backend.sign_in_with_password(creds).await {
            Ok(session) => Ok(session),
            Err(err)
                if outcome.requires_verification
                    && err.failure() == AuthFailure::AwaitingVerification =>
            {
                Err(LoginError::AwaitingVerification)
            }
            Err(err) => Err(LoginError::Provider(err.to_string())),
        },
        Err(err) if err.failure() == AuthFailure::AccountExists => {
            // Lost the sign-up race; the account exists now.
            debug!(login = %creds.email, "sign-up collision, retrying sign-in");
            backend
                .sign_in_with_password(creds)
                .await
                .map_err(|err| LoginError::Provider(err.to_string()))
        }
        Err(err) => Err(LoginError::Provider(err.to_string())),
    }
}
