//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL for the HRMS backend.
///
/// Must use HTTPS, or HTTP when the host is a loopback address. A path
/// prefix (for example `/api/v1`) is kept and every endpoint is joined
/// beneath it.
///
/// # Example
///
/// ```
/// use hrms_core::ApiUrl;
///
/// let api = ApiUrl::new("https://hr.example.com/api/v1/").unwrap();
/// assert_eq!(api.endpoint("/employees"), "https://hr.example.com/api/v1/employees");
/// assert_eq!(api.endpoint("leaves?status=pending"),
///            "https://hr.example.com/api/v1/leaves?status=pending");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not valid or doesn't meet requirements.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: remove trailing slashes from the path prefix
        let mut normalized = url;
        let trimmed = normalized.path().trim_end_matches('/').to_string();
        if trimmed != normalized.path() {
            normalized.set_path(&trimmed);
        }

        Ok(Self(normalized))
    }

    /// Returns the full URL for a request path.
    ///
    /// Relative paths are joined under the base. A path that is already an
    /// absolute `http(s)` URL is returned unchanged.
    pub fn endpoint(&self, path: &str) -> String {
        if let Some(absolute) = absolute_http_url(path) {
            return absolute.to_string();
        }

        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// True when `path` resolves to this API's origin.
    ///
    /// Relative paths always do. An absolute URL does only when its scheme,
    /// host, and port match the base.
    pub fn is_own_endpoint(&self, path: &str) -> bool {
        match absolute_http_url(path) {
            Some(absolute) => absolute.origin() == self.0.origin(),
            None => true,
        }
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    /// Returns the origin (scheme, host, port) with no path.
    pub fn origin(&self) -> Url {
        let mut origin = self.0.clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);
        origin
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        let scheme = url.scheme();
        let is_localhost = url
            .host_str()
            .is_some_and(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]");

        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use HTTPS (HTTP allowed only for localhost)".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must not carry a query or fragment".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Parses `path` as an absolute `http(s)` URL, whatever the scheme's case.
fn absolute_http_url(path: &str) -> Option<Url> {
    let url = Url::parse(path).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
