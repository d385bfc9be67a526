//! Token types for bearer authentication.

use std::fmt;

/// A short-lived access token, sent as a bearer credential on every request.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in authorization headers.
    ///
    /// # Security
    ///
    /// Use only when constructing HTTP authorization headers or persisting
    /// the token to a credential store.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&"[REDACTED]").finish()
    }
}

/// A longer-lived token exchanged only for a new access token.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Create a new refresh token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the token value for use in refresh requests.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Hide token value in Debug output
impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefreshToken").field(&"[REDACTED]").finish()
    }
}

/// How far a set of stored credentials can take a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// An access token is present.
    Authenticated,
    /// Only a refresh token is present; a refresh can restore the session.
    Recoverable,
    /// Nothing is stored.
    Unauthenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Authenticated => "authenticated",
            SessionState::Recoverable => "recoverable",
            SessionState::Unauthenticated => "unauthenticated",
        };
        f.write_str(s)
    }
}

/// The access/refresh pair held by a credential store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialPair {
    pub access: Option<AccessToken>,
    pub refresh: Option<RefreshToken>,
}

impl CredentialPair {
    pub fn new(access: Option<AccessToken>, refresh: Option<RefreshToken>) -> Self {
        Self { access, refresh }
    }

    pub fn state(&self) -> SessionState {
        match (&self.access, &self.refresh) {
            (Some(_), _) => SessionState::Authenticated,
            (None, Some(_)) => SessionState::Recoverable,
            (None, None) => SessionState::Unauthenticated,
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_hides_value_in_debug() {
        let token = AccessToken::new("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("eyJ"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn refresh_token_hides_value_in_debug() {
        let token = RefreshToken::new("refresh_token_value_here");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("refresh_token_value"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn pair_state() {
        let both = CredentialPair::new(
            Some(AccessToken::new("a")),
            Some(RefreshToken::new("r")),
        );
        assert_eq!(both.state(), SessionState::Authenticated);

        let refresh_only = CredentialPair::new(None, Some(RefreshToken::new("r")));
        assert_eq!(refresh_only.state(), SessionState::Recoverable);

        let empty = CredentialPair::default();
        assert_eq!(empty.state(), SessionState::Unauthenticated);
        assert!(empty.is_cleared());
    }
}
