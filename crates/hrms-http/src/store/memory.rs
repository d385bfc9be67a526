//! Memory-backed credential store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use hrms_core::{AccessToken, CredentialPair, CredentialStore, RefreshToken, Result};

/// Credentials held only for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    tokens: RwLock<CredentialPair>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing pair, e.g. tokens handed over by another process.
    pub fn with_tokens(pair: CredentialPair) -> Self {
        Self {
            tokens: RwLock::new(pair),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.tokens.read().await.access.clone())
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self.tokens.read().await.refresh.clone())
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        self.tokens.write().await.access = Some(token);
        Ok(())
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        self.tokens.write().await.refresh = Some(token);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.tokens.write().await = CredentialPair::default();
        Ok(())
    }

    async fn load(&self) -> Result<CredentialPair> {
        Ok(self.tokens.read().await.clone())
    }

    async fn replace(&self, pair: CredentialPair) -> Result<()> {
        *self.tokens.write().await = pair;
        Ok(())
    }
}
