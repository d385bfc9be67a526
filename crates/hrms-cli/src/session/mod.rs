//! Session construction for CLI commands.

mod navigator;
mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::debug;

use hrms_core::ApiUrl;
use hrms_file::FileCredentialStore;
use hrms_http::{
    AuthenticatedHttpSession, CookieCredentialStore, HttpClient, MemoryCredentialStore,
    SessionConfig,
};

use crate::cli::{ConnectionArgs, StoreKind};

pub use navigator::TerminalNavigator;
pub use store::CliStore;
use store::PersistentCookieStore;

/// Everything a command needs to talk to the backend.
pub struct CliContext {
    pub session: AuthenticatedHttpSession,
    pub store: Arc<CliStore>,
    pub navigator: Arc<TerminalNavigator>,
}

/// Default credentials file under the platform data directory.
fn default_credentials_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "hrms").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("credentials.json"))
}

fn credentials_path(conn: &ConnectionArgs) -> Result<PathBuf> {
    match &conn.credentials_file {
        Some(path) => Ok(path.clone()),
        None => default_credentials_path(),
    }
}

/// Build the session described by the connection arguments.
pub async fn open(conn: &ConnectionArgs) -> Result<CliContext> {
    let api_url = ApiUrl::new(&conn.api_url).context("Invalid API URL")?;
    let mut config = SessionConfig::new(api_url);
    if let Some(secs) = conn.timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let (store, client) = match conn.store {
        StoreKind::Memory => (
            CliStore::Memory(MemoryCredentialStore::new()),
            HttpClient::new(&config).context("Failed to build HTTP client")?,
        ),
        StoreKind::File => (
            CliStore::File(FileCredentialStore::new(credentials_path(conn)?)),
            HttpClient::new(&config).context("Failed to build HTTP client")?,
        ),
        StoreKind::Cookie => {
            let cookies = CookieCredentialStore::new(&config).context("Invalid refresh URL")?;
            let client = HttpClient::with_cookie_jar(&config, cookies.jar())
                .context("Failed to build HTTP client")?;
            let snapshot = FileCredentialStore::new(credentials_path(conn)?);
            let store = PersistentCookieStore::open(cookies, snapshot)
                .await
                .context("Failed to load saved cookies")?;
            (CliStore::Cookie(store), client)
        }
    };

    debug!(api_url = %config.api_url, store = %store.describe(), "opening session");

    let store = Arc::new(store);
    let navigator = Arc::new(TerminalNavigator::default());
    let session = AuthenticatedHttpSession::with_client(
        config,
        client,
        store.clone(),
        navigator.clone(),
    );

    Ok(CliContext {
        session,
        store,
        navigator,
    })
}
