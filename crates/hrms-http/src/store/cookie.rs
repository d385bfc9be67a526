//! Cookie-backed credential store.
//!
//! Mirrors a deployment where the backend keeps the refresh token in an
//! HTTP-only cookie: the refresh token lives in the cookie jar the HTTP
//! client sends from, and only the access token is held in memory.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use tokio::sync::RwLock;
use url::Url;

use hrms_core::error::InvalidInputError;
use hrms_core::{AccessToken, CredentialPair, CredentialStore, RefreshToken, Result};

use crate::config::SessionConfig;

/// Cookie name the backend uses for the refresh token by default.
pub const DEFAULT_REFRESH_COOKIE: &str = "refresh_token";

/// Credential store whose refresh token is a cookie.
///
/// Build the session's client with [`HttpClient::with_cookie_jar`](crate::HttpClient::with_cookie_jar)
/// and [`jar`](Self::jar) so cookies the backend sets land here.
#[derive(Debug)]
pub struct CookieCredentialStore {
    jar: Arc<Jar>,
    /// The refresh endpoint: the URL the cookie must be sent to.
    refresh_url: Url,
    cookie_name: String,
    access: RwLock<Option<AccessToken>>,
}

impl CookieCredentialStore {
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Self::with_jar(config, Arc::new(Jar::default()))
    }

    pub fn with_jar(config: &SessionConfig, jar: Arc<Jar>) -> Result<Self> {
        let endpoint = config.api_url.endpoint(&config.refresh_path);
        let refresh_url = Url::parse(&endpoint).map_err(|e| InvalidInputError::ApiUrl {
            value: endpoint.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            jar,
            refresh_url,
            cookie_name: DEFAULT_REFRESH_COOKIE.to_string(),
            access: RwLock::new(None),
        })
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    /// The jar to hand to the HTTP client.
    pub fn jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }

    fn read_cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.refresh_url)?;
        let header = header.to_str().ok()?;
        header.split(';').find_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == self.cookie_name && !value.is_empty()).then(|| value.to_string())
        })
    }
}

#[async_trait]
impl CredentialStore for CookieCredentialStore {
    async fn access_token(&self) -> Result<Option<AccessToken>> {
        Ok(self.access.read().await.clone())
    }

    async fn refresh_token(&self) -> Result<Option<RefreshToken>> {
        Ok(self.read_cookie().map(RefreshToken::new))
    }

    async fn set_access_token(&self, token: AccessToken) -> Result<()> {
        *self.access.write().await = Some(token);
        Ok(())
    }

    async fn set_refresh_token(&self, token: RefreshToken) -> Result<()> {
        let cookie = format!("{}={}; Path=/; HttpOnly", self.cookie_name, token.as_str());
        self.jar.add_cookie_str(&cookie, &self.refresh_url);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.access.write().await = None;
        // Expire under both the root path and the endpoint's default path,
        // whichever the backend used when setting it.
        for path in ["; Path=/", ""] {
            let expired = format!("{}=; Max-Age=0{}", self.cookie_name, path);
            self.jar.add_cookie_str(&expired, &self.refresh_url);
        }
        Ok(())
    }

    /// The access token is replaced outright. The refresh cookie is only
    /// written when the pair carries one: after a login the backend has
    /// already set it through the jar.
    async fn replace(&self, pair: CredentialPair) -> Result<()> {
        *self.access.write().await = pair.access;
        if let Some(refresh) = pair.refresh {
            self.set_refresh_token(refresh).await?;
        }
        Ok(())
    }
}
