//! hrms-core - Core types and traits for the HRMS API client.
//!
//! This crate holds everything the authenticated session and its
//! collaborators share: token types, the request/response descriptions,
//! the error taxonomy, and the [`CredentialStore`] and [`Navigator`]
//! contracts. It has no HTTP dependency of its own.

pub mod credentials;
pub mod error;
pub mod request;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::Credentials;
pub use error::Error;
pub use request::{ApiRequest, ApiResponse, Method};
pub use tokens::{AccessToken, CredentialPair, RefreshToken, SessionState};
pub use traits::{CredentialStore, Navigator};
pub use types::ApiUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
