//! Credential store selected at startup.

use async_trait::async_trait;
use tracing::debug;

use hrms_core::{AccessToken, CredentialPair, CredentialStore, RefreshToken, Result};
use hrms_file::FileCredentialStore;
use hrms_http::{CookieCredentialStore, MemoryCredentialStore};

/// Store wrapper for CLI use.
#[derive(Debug)]
pub enum CliStore {
    /// Lives for one command only.
    Memory(MemoryCredentialStore),
    File(FileCredentialStore),
    Cookie(PersistentCookieStore),
}

/// Cookie-backed store whose jar outlives the process.
///
/// Each command starts with a fresh cookie jar, so the refresh cookie and
/// the access token are mirrored into a credentials file after every change
/// and put back into the jar when the next command starts.
#[derive(Debug)]
pub struct PersistentCookieStore {
    cookies: CookieCredentialStore,
    snapshot: FileCredentialStore,
}

impl PersistentCookieStore {
    /// Seed the jar of `cookies` from the snapshot file.
    pub async fn open(
        cookies: CookieCredentialStore,
        snapshot: FileCredentialStore,
    ) -> Result<Self> {
        let saved = snapshot.load().await?;
        debug!(
            path = %snapshot.path().display(),
            state = ?saved.state(),
            "loaded cookie snapshot"
        );
        cookies.replace(saved).await?;
        Ok(Self { cookies, snapshot })
    }

    pub fn snapshot(&self) -> &FileCredentialStore {
        &self.snapshot
    }

    /// Write the jar's refresh cookie and the access token to the file.
    async fn save(&self) -> Result<()> {
        let current = self.cookies.load().await?;
        if current.is_cleared() {
            self.snapshot.clear().await
        } else {
            self.snapshot.replace(current).await
        }
    }
}

#[async_trait]
impl CredentialStore for PersistentCookieStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        self.cookies.access_token().await
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        self.cookies.refresh_token().await
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        self.cookies.set_access_token(token).await?;
        self.save().await
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        self.cookies.set_refresh_token(token).await?;
        self.save().await
    }

    async fn clear(&self) -> Result<()> {
        self.cookies.clear().await?;
        self.snapshot.clear().await
    }

    async fn store(&self, pair: CredentialPair) -> Result<()> {
        self.cookies.store(pair).await?;
        self.save().await
    }

    async fn replace(&self, pair: CredentialPair) -> Result<()> {
        self.cookies.replace(pair).await?;
        self.save().await
    }
}

impl CliStore {
    /// Human-readable description of where credentials live.
    pub fn describe(&self) -> String {
        match self {
            CliStore::Memory(_) => "memory".to_string(),
            CliStore::File(store) => format!("file ({})", store.path().display()),
            CliStore::Cookie(store) => {
                format!("cookie (saved to {})", store.snapshot().path().display())
            }
        }
    }

    /// Last write time, for stores that keep one.
    pub fn saved_at(&self) -> Result<Option<String>> {
        match self {
            CliStore::File(store) => Ok(store.saved_at()?.map(|at| at.to_rfc3339())),
            CliStore::Cookie(store) => Ok(store
                .snapshot()
                .saved_at()?
                .map(|at| at.to_rfc3339())),
            CliStore::Memory(_) => Ok(None),
        }
    }
}

#[async_trait]
impl CredentialStore for CliStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        match self {
            CliStore::Memory(store) => store.access_token().await,
            CliStore::File(store) => store.access_token().await,
            CliStore::Cookie(store) => store.access_token().await,
        }
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        match self {
            CliStore::Memory(store) => store.refresh_token().await,
            CliStore::File(store) => store.refresh_token().await,
            CliStore::Cookie(store) => store.refresh_token().await,
        }
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        match self {
            CliStore::Memory(store) => store.set_access_token(token).await,
            CliStore::File(store) => store.set_access_token(token).await,
            CliStore::Cookie(store) => store.set_access_token(token).await,
        }
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        match self {
            CliStore::Memory(store) => store.set_refresh_token(token).await,
            CliStore::File(store) => store.set_refresh_token(token).await,
            CliStore::Cookie(store) => store.set_refresh_token(token).await,
        }
    }

    async fn clear(&self) -> Result<()> {
        match self {
            CliStore::Memory(store) => store.clear().await,
            CliStore::File(store) => store.clear().await,
            CliStore::Cookie(store) => store.clear().await,
        }
    }

    async fn load(&self) -> Result<CredentialPair> {
        match self {
            CliStore::Memory(store) => store.load().await,
            CliStore::File(store) => store.load().await,
            CliStore::Cookie(store) => store.load().await,
        }
    }

    async fn store(&self, pair: CredentialPair) -> Result<()> {
        match self {
            CliStore::Memory(store) => store.store(pair).await,
            CliStore::File(store) => store.store(pair).await,
            CliStore::Cookie(store) => store.store(pair).await,
        }
    }

    async fn replace(&self, pair: CredentialPair) -> Result<()> {
        match self {
            CliStore::Memory(store) => store.replace(pair).await,
            CliStore::File(store) => store.replace(pair).await,
            CliStore::Cookie(store) => store.replace(pair).await,
        }
    }
}
