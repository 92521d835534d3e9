//! Shared state handed to every handler.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::auth_client::AuthClient;
use crate::services::session_service::SessionHolder;
use crate::services::storage_client::StorageClient;

/// One provider client pair plus the session holder, cloned into each route.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthClient,
    pub storage: StorageClient,
    pub sessions: Arc<SessionHolder>,
}

impl AppState {
    pub fn new(cfg: &AppConfig) -> Self {
        let http = reqwest::Client::new();
        Self {
            auth: AuthClient::new(
                http.clone(),
                &cfg.provider_url,
                &cfg.provider_key,
                &cfg.site_url,
            ),
            storage: StorageClient::new(http, &cfg.provider_url, &cfg.provider_key),
            sessions: SessionHolder::new(),
        }
    }
}
