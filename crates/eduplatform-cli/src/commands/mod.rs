pub mod auth;
pub mod dashboard;
pub mod forum;
pub mod init;
pub mod mentor;
pub mod paths;
pub mod profile;
pub mod quiz;

use std::path::Path;

use anyhow::{bail, Context, Result};
use dialoguer::Password;

use eduplatform_client::{create_backend, load_config_from, ClientConfig};
use eduplatform_core::error::ApiError;
use eduplatform_core::session::{Route, Session};

/// Configuration plus a session wired to the configured backend.
pub struct App {
    pub config: ClientConfig,
    pub session: Session,
}

impl App {
    /// Build the session without touching the backend.
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = load_config_from(config_path)?;
        let (backend, tokens) = create_backend(&config);
        tracing::debug!(backend = %config.backend_url, "opened client");
        Ok(Self {
            session: Session::new(backend, tokens),
            config,
        })
    }

    /// Restore the stored session and make sure `route` is reachable.
    pub async fn signed_in(config_path: Option<&Path>, route: Route) -> Result<Self> {
        let mut app = Self::open(config_path)?;
        app.session.init().await;
        app.require(route)?;
        Ok(app)
    }

    /// Fail unless the session may show `route`.
    pub fn require(&mut self, route: Route) -> Result<()> {
        if self.session.resolve(route) != route {
            bail!("not logged in; run `eduplatform login` first");
        }
        Ok(())
    }
}

/// Turn a backend failure into a CLI error, pointing at `login` when the
/// session was rejected.
pub fn api_error(e: ApiError) -> anyhow::Error {
    if e.is_unauthorized() {
        anyhow::anyhow!("{e}: session expired, run `eduplatform login` again")
    } else {
        anyhow::Error::new(e)
    }
}

/// Read a secret from the terminal without echoing it.
pub fn prompt_password(label: &str) -> Result<String> {
    Password::new()
        .with_prompt(label)
        .allow_empty_password(true)
        .interact()
        .context("failed to read password")
}
