use anyhow::Result;
use axum::Router;
use std::io::ErrorKind;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config ---
    let cfg = config::AppConfig::from_env_and_args()?;

    tracing::info!(
        "Starting pdf-portal on {} against backend {}",
        cfg.addr(),
        cfg.provider_url
    );

    // --- Provider clients + session holder ---
    let app_state = state::AppState::new(&cfg);

    // Nothing is persisted locally, so the initial session check resolves to
    // signed-out; it still runs so views stop gating on the loading flag.
    app_state.sessions.resolve_initial(None);

    // --- Observe session changes for the life of the process ---
    let mut session_changes = app_state.sessions.subscribe();
    tokio::spawn(async move {
        while session_changes.changed().await.is_ok() {
            let snapshot = session_changes.borrow_and_update().clone();
            match &snapshot.session {
                Some(session) => tracing::info!(
                    user_id = %session.user.id,
                    student = session.student_number().as_deref().unwrap_or("unknown"),
                    "signed in, landing on /upload"
                ),
                None => tracing::info!("signed out, landing on /login"),
            }
        }
    });

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(app_state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
