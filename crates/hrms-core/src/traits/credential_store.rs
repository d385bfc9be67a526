//! Credential store trait.

use async_trait::async_trait;

use crate::{AccessToken, CredentialPair, RefreshToken, Result};

/// Holder of the current access and refresh credentials.
///
/// Implementations may be memory, file, or cookie backed. Lookups are async
/// because a backing medium may need I/O to answer.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the current access token, if any.
    async fn access_token(&self) -> Result<Option<AccessToken>>;

    /// Returns the current refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<RefreshToken>>;

    /// Replace the access token.
    async fn set_access_token(&self, token: AccessToken) -> Result<()>;

    /// Replace the refresh token.
    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()>;

    /// Remove both tokens.
    async fn clear(&self) -> Result<()>;

    /// Read both tokens.
    async fn load(&self) -> Result<CredentialPair> {
        let access = self.access_token().await?;
        let refresh = self.refresh_token().await?;
        Ok(CredentialPair::new(access, refresh))
    }

    /// Write whichever tokens the pair holds. Absent tokens are left as-is.
    async fn store(&self, pair: CredentialPair) -> Result<()> {
        if let Some(refresh) = pair.refresh {
            self.set_refresh_token(refresh).await?;
        }
        if let Some(access) = pair.access {
            self.set_access_token(access).await?;
        }
        Ok(())
    }

    /// Make the pair the whole of the stored credentials.
    ///
    /// Unlike [`store`](Self::store), a token absent from the pair is
    /// removed. Used after a login, once the new credentials are in hand.
    async fn replace(&self, pair: CredentialPair) -> Result<()> {
        self.clear().await?;
        self.store(pair).await
    }
}
