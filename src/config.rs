use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub provider_url: String,
    pub provider_key: String,
    pub site_url: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Student PDF upload portal")]
pub struct Args {
    /// Host to bind to (overrides PORTAL_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PORTAL_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Backend project base URL (overrides PORTAL_PROVIDER_URL)
    #[arg(long)]
    pub provider_url: Option<String>,

    /// Backend public API key (overrides PORTAL_PROVIDER_KEY)
    #[arg(long)]
    pub provider_key: Option<String>,

    /// Public URL of this portal, used as the sign-up redirect target
    /// (overrides PORTAL_SITE_URL)
    #[arg(long)]
    pub site_url: Option<String>,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    ///
    /// The provider URL and key have no defaults: running without them is a
    /// misconfiguration and fails startup.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PORTAL_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PORTAL_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PORTAL_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PORTAL_PORT"),
        };

        let provider_url = args
            .provider_url
            .or_else(|| env::var("PORTAL_PROVIDER_URL").ok())
            .context("PORTAL_PROVIDER_URL must be set to the backend project URL")?;
        let provider_key = args
            .provider_key
            .or_else(|| env::var("PORTAL_PROVIDER_KEY").ok())
            .context("PORTAL_PROVIDER_KEY must be set to the backend public API key")?;

        let host = args.host.unwrap_or(env_host);
        let port = args.port.unwrap_or(env_port);
        let site_url = args
            .site_url
            .or_else(|| env::var("PORTAL_SITE_URL").ok())
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Self {
            host,
            port,
            provider_url,
            provider_key,
            site_url,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
