//! The authenticated HTTP session.

use std::sync::Arc;

use futures_util::future::FutureExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use hrms_core::error::{ApiError, AuthError, Error};
use hrms_core::{
    AccessToken, ApiRequest, ApiResponse, CredentialPair, CredentialStore, Credentials, Navigator,
    RefreshToken, Result, SessionState,
};

use crate::client::HttpClient;
use crate::config::SessionConfig;
use crate::refresh::{RefreshCoordinator, RefreshFailure, RefreshOutcome, Ticket};

/// An HTTP session that attaches the current access token to every request
/// and recovers transparently from an expired one.
///
/// When a request is rejected with 401 the session refreshes the access
/// token once, shared across every request rejected at the same time, and
/// replays the request with the new token. A request is replayed at most
/// once. If the refresh fails, or there was never a token to refresh, the
/// credential store is cleared and the [`Navigator`] is sent to the login
/// screen.
///
/// Sessions are cheap to clone (they use internal `Arc`); create one per
/// application and hand clones to whatever issues requests.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hrms_core::{ApiUrl, Credentials};
/// use hrms_http::{AuthenticatedHttpSession, ChannelNavigator, MemoryCredentialStore, SessionConfig};
///
/// # async fn example() -> Result<(), hrms_core::Error> {
/// let config = SessionConfig::new(ApiUrl::new("https://hr.example.com/api")?);
/// let session = AuthenticatedHttpSession::new(
///     config,
///     Arc::new(MemoryCredentialStore::new()),
///     Arc::new(ChannelNavigator::new()),
/// )?;
///
/// session.login(&Credentials::new("hr.admin@example.com", "secret")).await?;
/// let employees: serde_json::Value = session.get_json("/employees").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthenticatedHttpSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: HttpClient,
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    refresh: RefreshCoordinator,
}

/// A request on its way through the session.
struct PendingRequest {
    request: ApiRequest,
    /// Set once the request has been cleared for a replay.
    retried: bool,
}

impl AuthenticatedHttpSession {
    /// Create a session with its own HTTP client.
    pub fn new(
        config: SessionConfig,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let client = HttpClient::new(&config)?;
        Ok(Self::with_client(config, client, store, navigator))
    }

    /// Create a session around an existing client, for example one that
    /// shares a cookie jar with a [`CookieCredentialStore`](crate::CookieCredentialStore).
    pub fn with_client(
        config: SessionConfig,
        client: HttpClient,
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                store,
                navigator,
                refresh: RefreshCoordinator::default(),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    /// True while a token refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Current state of the stored credentials.
    pub async fn state(&self) -> Result<SessionState> {
        Ok(self.inner.store.load().await?.state())
    }

    /// Send a request with the current credentials.
    ///
    /// Returns the response of the original request, or of its single
    /// replay after a token refresh. Errors other than 401 are returned
    /// unchanged and never touch the credential store.
    ///
    /// A session holding only a refresh token is restored before the
    /// request goes out. Requests to another origin carry no credentials
    /// and their 401s are returned as-is.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.path()))]
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        if !self.inner.config.api_url.is_own_endpoint(request.path()) {
            debug!("request leaves the API origin, skipping authentication");
            return self.inner.client.dispatch(&request, None).await;
        }

        let mut pending = PendingRequest {
            request,
            retried: false,
        };
        let mut token = self.inner.store.access_token().await?;

        if token.is_none() && self.can_restore().await? {
            debug!("no access token, restoring from refresh token before sending");
            pending.retried = true;
            let fresh = self.shared_refresh().wait().await.map_err(|failure| {
                Error::from(AuthError::RefreshFailed {
                    original: None,
                    reason: failure.reason,
                })
            })?;
            token = Some(fresh);
        }

        loop {
            match self.inner.client.dispatch(&pending.request, token.as_ref()).await {
                Err(Error::Api(err)) if err.is_auth_rejected() => {
                    let fresh = self.recover(&mut pending, token.as_ref(), err).await?;
                    debug!("replaying request with refreshed token");
                    token = Some(fresh);
                }
                result => return result,
            }
        }
    }

    /// Decide what a 401 means for this request.
    ///
    /// Returns the token to replay with, or the terminal error.
    async fn recover(
        &self,
        pending: &mut PendingRequest,
        sent: Option<&AccessToken>,
        original: ApiError,
    ) -> Result<AccessToken> {
        if self.inner.navigator.is_at_login() {
            debug!("rejected on the login screen, not refreshing");
            return Err(AuthError::Rejected { original }.into());
        }

        if pending.retried {
            warn!("request rejected again after refresh, ending session");
            self.inner.terminate().await;
            return Err(AuthError::RetryRejected { original }.into());
        }

        let Some(current) = self.inner.store.access_token().await? else {
            info!("rejected with no local access token, ending session");
            self.inner.terminate().await;
            return Err(AuthError::Unauthenticated { original }.into());
        };

        pending.retried = true;

        // The token was replaced while this request was on the wire.
        if sent != Some(&current) {
            debug!("credential changed since dispatch, replaying without refresh");
            return Ok(current);
        }

        self.shared_refresh().wait().await.map_err(|failure| {
            Error::from(AuthError::RefreshFailed {
                original: Some(original),
                reason: failure.reason,
            })
        })
    }

    /// True when a refresh token is held and the user is not already on the
    /// login screen.
    async fn can_restore(&self) -> Result<bool> {
        if self.inner.navigator.is_at_login() {
            return Ok(false);
        }
        Ok(self.inner.store.refresh_token().await?.is_some())
    }

    /// Join the in-flight refresh or start one.
    fn shared_refresh(&self) -> Ticket {
        let inner = Arc::clone(&self.inner);
        let ticket = self.inner.refresh.join_or_start(move || {
            run_refresh(inner)
                .instrument(info_span!("token_refresh"))
                .boxed()
        });

        if ticket.is_initiator() {
            info!("starting token refresh");
        } else {
            debug!("joining in-flight token refresh");
        }
        ticket
    }

    /// Log in and replace the stored tokens with the returned ones.
    ///
    /// A failed login leaves the stored credentials untouched.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<()> {
        let response = self
            .inner
            .client
            .login(&self.inner.config.login_path, credentials)
            .await?;

        self.inner
            .store
            .replace(CredentialPair::new(
                Some(AccessToken::new(response.access_token)),
                response.refresh_token.map(RefreshToken::new),
            ))
            .await?;

        info!("logged in");
        Ok(())
    }

    /// End the session: tell the backend, then clear local credentials.
    ///
    /// The backend call is best effort; the store is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        let token = self.inner.store.access_token().await?;
        if let Err(e) = self
            .inner
            .client
            .logout(&self.inner.config.logout_path, token.as_ref())
            .await
        {
            warn!(error = %e, "backend logout failed, clearing local credentials anyway");
        }

        self.inner.store.clear().await?;
        info!("logged out");
        Ok(())
    }

    /// Bring a session holding only a refresh token back to life.
    ///
    /// Returns the resulting state. A failed refresh ends the session the
    /// same way a failed recovery does.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<SessionState> {
        let state = self.state().await?;
        if state != SessionState::Recoverable {
            return Ok(state);
        }

        match self.shared_refresh().wait().await {
            Ok(_) => Ok(SessionState::Authenticated),
            Err(failure) => {
                debug!(reason = %failure.reason, "restore failed");
                Ok(SessionState::Unauthenticated)
            }
        }
    }

    /// Refresh the access token now.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AccessToken> {
        self.shared_refresh().wait().await.map_err(|failure| {
            Error::from(AuthError::RefreshFailed {
                original: None,
                reason: failure.reason,
            })
        })
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::get(path)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::post(path).json(body)?).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::put(path).json(body)?).await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        self.send(ApiRequest::patch(path).json(body)?).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResponse> {
        self.send(ApiRequest::delete(path)).await
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.get(path).await?.json()
    }
}

impl SessionInner {
    /// Clear every credential and send the user to the login screen.
    async fn terminate(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "failed to clear credentials");
        }
        self.navigator.redirect_to_login();
    }

    /// Call the refresh endpoint and store what it returns.
    async fn perform_refresh(&self) -> RefreshOutcome {
        let refresh_token = self.store.refresh_token().await?;
        let response = self
            .client
            .refresh(&self.config.refresh_path, refresh_token.as_ref())
            .await?;

        let access = AccessToken::new(response.access_token);
        self.store
            .store(CredentialPair::new(
                Some(access.clone()),
                response.refresh_token.map(RefreshToken::new),
            ))
            .await?;

        Ok(access)
    }
}

/// The body of the shared refresh future.
///
/// Runs once per refresh no matter how many requests await it: store
/// writes, the logout on failure, and releasing the in-flight slot all
/// happen here before any waiter resumes.
async fn run_refresh(inner: Arc<SessionInner>) -> RefreshOutcome {
    let outcome = inner.perform_refresh().await;

    match &outcome {
        Ok(_) => info!("token refresh succeeded"),
        Err(RefreshFailure { reason }) => {
            warn!(%reason, "token refresh failed, ending session");
            inner.terminate().await;
        }
    }

    inner.refresh.settle();
    outcome
}

// Custom Debug impl that hides sensitive data
impl std::fmt::Debug for AuthenticatedHttpSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedHttpSession")
            .field("api_url", &self.inner.config.api_url)
            .field("refresh", &self.inner.refresh)
            .field("tokens", &"[REDACTED]")
            .finish()
    }
}
