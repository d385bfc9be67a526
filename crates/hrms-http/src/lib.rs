//! hrms-http - Authenticated HTTP session for the HRMS backend.
//!
//! The centerpiece is [`AuthenticatedHttpSession`]: every request goes
//! through it, it attaches the current access token, and on a 401 it runs a
//! single shared token refresh and replays the request once.

mod client;
mod config;
mod endpoints;
mod navigator;
mod refresh;
mod session;
mod store;

pub use client::HttpClient;
pub use config::{
    DEFAULT_LOGIN_PATH, DEFAULT_LOGOUT_PATH, DEFAULT_REFRESH_PATH, DEFAULT_TIMEOUT_MS,
    SessionConfig,
};
pub use endpoints::TokenResponse;
pub use navigator::{ChannelNavigator, SessionEvent};
pub use session::AuthenticatedHttpSession;
pub use store::{CookieCredentialStore, DEFAULT_REFRESH_COOKIE, MemoryCredentialStore};
