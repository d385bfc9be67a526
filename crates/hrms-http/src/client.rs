//! HTTP client for the HRMS backend.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace, warn};

use hrms_core::error::{ApiError, AuthError, Error, InvalidInputError, TransportError};
use hrms_core::{AccessToken, ApiRequest, ApiResponse, ApiUrl, Credentials, Method, RefreshToken, Result};

use crate::config::SessionConfig;
use crate::endpoints::{LoginRequest, RefreshRequest, TokenResponse};

/// Low-level dispatcher: one request in, one response or error out.
///
/// It knows nothing about refresh or retries; that lives in the session.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    api: ApiUrl,
}

impl HttpClient {
    /// Create a client for the configured API.
    pub fn new(config: &SessionConfig) -> Result<Self> {
        Self::build(config, None)
    }

    /// Create a client that sends and stores cookies through `jar`.
    pub fn with_cookie_jar(config: &SessionConfig, jar: Arc<Jar>) -> Result<Self> {
        Self::build(config, Some(jar))
    }

    fn build(config: &SessionConfig, jar: Option<Arc<Jar>>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout());

        if let Some(jar) = jar {
            builder = builder.cookie_provider(jar);
        }

        let client = builder.build().map_err(|e| TransportError::Http {
            message: format!("failed to build HTTP client: {}", e),
        })?;

        Ok(Self {
            client,
            api: config.api_url.clone(),
        })
    }

    /// Returns the API URL this client is configured for.
    pub fn api_url(&self) -> &ApiUrl {
        &self.api
    }

    /// Send a request, attaching `token` as a bearer credential when given.
    ///
    /// Non-2xx responses come back as [`Error::Api`] with the backend's
    /// error payload intact.
    #[instrument(skip(self, request, token), fields(method = %request.method(), path = %request.path()))]
    pub async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&AccessToken>,
    ) -> Result<ApiResponse> {
        let url = self.api.endpoint(request.path());
        let token = match token {
            Some(_) if !self.api.is_own_endpoint(request.path()) => {
                warn!(%url, "request leaves the API origin, sending without credentials");
                None
            }
            token => token,
        };
        debug!(authenticated = token.is_some(), "API request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), &url)
            .header(ACCEPT, "application/json");

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.as_str()));
        }

        let response = builder.send().await.map_err(map_reqwest)?;

        self.handle_response(response).await
    }

    /// Exchange login credentials for a token pair.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, path: &str, credentials: &Credentials) -> Result<TokenResponse> {
        let request = LoginRequest {
            email: credentials.email(),
            password: credentials.password(),
        };

        match self.post_json(path, &request).await {
            Err(Error::Api(err)) if err.status == 400 || err.status == 401 => {
                let reason = err.message.clone().unwrap_or_else(|| err.to_string());
                Err(AuthError::InvalidCredentials(reason).into())
            }
            other => other,
        }
    }

    /// Call the refresh endpoint.
    ///
    /// The refresh token goes in the body when one is held locally;
    /// otherwise the backend is expected to read its own refresh cookie.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(
        &self,
        path: &str,
        refresh_token: Option<&RefreshToken>,
    ) -> Result<TokenResponse> {
        let request = RefreshRequest {
            refresh_token: refresh_token.map(RefreshToken::as_str),
        };
        self.post_json(path, &request).await
    }

    /// Tell the backend the session is over.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, path: &str, token: Option<&AccessToken>) -> Result<()> {
        let request = ApiRequest::post(path);
        self.dispatch(&request, token).await.map(|_| ())
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.api.endpoint(path);
        debug!(%url, "auth endpoint request");

        let response = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(map_reqwest)?;

        self.handle_response(response).await?.json()
    }

    /// Turn a wire response into a success or an [`ApiError`].
    async fn handle_response(&self, response: reqwest::Response) -> Result<ApiResponse> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();
            let body = response.bytes().await.map_err(map_reqwest)?;
            Ok(ApiResponse::new(status.as_u16(), headers, body.to_vec()))
        } else {
            Err(Error::Api(self.parse_error_response(response).await))
        }
    }

    /// Capture the backend's error body without reinterpreting it.
    async fn parse_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        match response.bytes().await {
            Ok(body) => ApiError::from_body(status, &body),
            Err(_) => ApiError::new(status),
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Classify a reqwest failure. Builder errors are bad input, not transport.
pub(crate) fn map_reqwest(err: reqwest::Error) -> Error {
    if err.is_builder() {
        return InvalidInputError::Other {
            message: err.to_string(),
        }
        .into();
    }

    let transport = if err.is_timeout() {
        TransportError::Timeout {
            message: err.to_string(),
        }
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_body() || err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    transport.into()
}
