//! Session types issued by the external auth provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::credentials::LOGIN_DOMAIN;

/// An authenticated session as returned by the provider's token endpoint.
///
/// Only the attributes the portal actually consumes are kept: the access
/// token for storage calls, and the user record for display and key
/// derivation. Sessions live in process memory and are never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}

/// The provider's user record, trimmed to the consumed attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_metadata: ProfileMetadata,
}

/// Custom profile attributes attached at sign-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileMetadata {
    #[serde(default)]
    pub student_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Session {
    /// Recover the original student number from the session.
    ///
    /// Prefers the custom profile attribute; falls back to stripping the
    /// fixed domain suffix from the login name.
    pub fn student_number(&self) -> Option<String> {
        if let Some(id) = &self.user.user_metadata.student_id {
            return Some(id.clone());
        }
        self.user
            .email
            .as_deref()
            .map(|email| email.strip_suffix(LOGIN_DOMAIN).unwrap_or(email).to_string())
    }

    /// Human-facing label for the signed-in student.
    pub fn display_label(&self) -> String {
        if let Some(name) = &self.user.user_metadata.display_name {
            return name.clone();
        }
        match self.student_number() {
            Some(id) => format!("Student {id}"),
            None => "Student".to_string(),
        }
    }
}

/// A change pushed through the session holder.
///
/// The holder is the sole owner of post-authentication navigation: each
/// change maps to exactly one destination, and handlers redirect wherever
/// the applied change points.
#[derive(Debug, Clone)]
pub enum AuthChange {
    SignedIn(Session),
    SignedOut,
}

impl AuthChange {
    pub fn destination(&self) -> &'static str {
        match self {
            AuthChange::SignedIn(_) => "/upload",
            AuthChange::SignedOut => "/login",
        }
    }
}

/// Snapshot of the shared session state.
///
/// `loading` stays true until the initial session check resolves at startup.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub loading: bool,
    pub session: Option<Session>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            loading: true,
            session: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(metadata: ProfileMetadata, email: Option<&str>) -> Session {
        Session {
            access_token: "token".into(),
            user: AuthUser {
                id: Uuid::new_v4(),
                email: email.map(str::to_string),
                email_confirmed_at: None,
                user_metadata: metadata,
            },
        }
    }

    #[test]
    fn test_student_number_prefers_profile_attribute() {
        let session = session_with(
            ProfileMetadata {
                student_id: Some("99999".into()),
                display_name: None,
            },
            Some("11111@student.local"),
        );
        assert_eq!(session.student_number().as_deref(), Some("99999"));
    }

    #[test]
    fn test_student_number_falls_back_to_login_name() {
        let session = session_with(ProfileMetadata::default(), Some("12345@student.local"));
        assert_eq!(session.student_number().as_deref(), Some("12345"));
    }

    #[test]
    fn test_student_number_keeps_foreign_login_names_verbatim() {
        let session = session_with(ProfileMetadata::default(), Some("someone@example.com"));
        assert_eq!(session.student_number().as_deref(), Some("someone@example.com"));
    }

    #[test]
    fn test_destination_per_change() {
        let session = session_with(ProfileMetadata::default(), None);
        assert_eq!(AuthChange::SignedIn(session).destination(), "/upload");
        assert_eq!(AuthChange::SignedOut.destination(), "/login");
    }

    #[test]
    fn test_state_starts_loading() {
        let state = SessionState::default();
        assert!(state.loading);
        assert!(state.session.is_none());
    }
}
