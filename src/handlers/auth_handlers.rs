//! Login and logout: the identifier form and the handlers driving the
//! bootstrap sequence.

use axum::{
    Form,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::handlers::{notice, page};
use crate::models::{credentials::credentials_for, session::AuthChange};
use crate::services::auth_flow::{self, profile_for};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub identifier: String,
}

/// GET `/login` — the identifier form.
pub async fn login_page() -> Html<String> {
    Html(render_login(None))
}

/// POST `/login` — validate the identifier, then run the sign-in/sign-up
/// bootstrap. On success the browser is sent wherever the session holder
/// points for a signed-in change; the holder is the only owner of that
/// decision.
pub async fn login_submit(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    let creds = match credentials_for(&form.identifier) {
        Ok(creds) => creds,
        Err(err) => {
            return Html(render_login(Some(("error", err.to_string())))).into_response();
        }
    };
    let identifier = form.identifier.trim().to_string();

    match auth_flow::sign_in_or_sign_up(&state.auth, &creds, profile_for(&identifier)).await {
        Ok(session) => {
            let destination = state.sessions.apply(AuthChange::SignedIn(session));
            Redirect::to(destination).into_response()
        }
        Err(err) => {
            Html(render_login(Some(("error", format!("Sign-in failed: {err}"))))).into_response()
        }
    }
}

/// POST `/logout` — revoke the provider session (best effort) and clear the
/// held one.
pub async fn logout(State(state): State<AppState>) -> Redirect {
    if let Some(session) = state.sessions.current().session {
        if let Err(err) = state.auth.sign_out(&session.access_token).await {
            warn!("provider sign-out failed: {err}");
        }
    }
    let destination = state.sessions.apply(AuthChange::SignedOut);
    Redirect::to(destination)
}

fn render_login(message: Option<(&str, String)>) -> String {
    let mut body = String::from(
        concat!(
            r#"<section class="panel">"#,
            r#"<h1>Sign in with your student number</h1>"#,
            r#"<form method="post" action="/login">"#,
            r#"<label for="identifier">Student number</label>"#,
            r#"<input type="text" id="identifier" name="identifier" inputmode="numeric" "#,
            r#"pattern="\d{5,}" minlength="5" required placeholder="e.g. 1234567890">"#,
            r#"<p class="hint">Digits only, at least 5 of them.</p>"#,
            r#"<button type="submit">Sign in / Register</button>"#,
            r#"</form>"#
        ),
    );
    if let Some((kind, text)) = message {
        body.push_str(&notice(kind, &text));
    }
    body.push_str(
        r#"<p class="hint">Signing in lets you upload PDFs and open them from anywhere.</p></section>"#,
    );
    page("Sign in", &body)
}
