//! Defines routes for all portal pages and probes.
//!
//! ## Structure
//! - **Pages**
//!   - `GET  /`       — list uploaded PDFs
//!   - `GET  /login`  — identifier form
//!   - `POST /login`  — run the sign-in/sign-up bootstrap
//!   - `POST /logout` — revoke and clear the session
//!   - `GET  /upload` — upload form (requires a session)
//!   - `POST /upload` — multipart PDF upload
//!
//! - **Probes**
//!   - `GET /healthz` — liveness
//!   - `GET /readyz`  — backend reachability

use crate::{
    handlers::{
        auth_handlers::{login_page, login_submit, logout},
        file_handlers::{list_files, upload_page, upload_submit},
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Build and return the router for every portal route.
///
/// The router carries shared state (`AppState`) to all handlers.
pub fn routes() -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // pages
        .route("/", get(list_files))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", post(logout))
        .route("/upload", get(upload_page).post(upload_submit))
}
