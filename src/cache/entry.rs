//! Cache entry types: request identity, stored response, generation id

use crate::error::{OffcacheError, OffcacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of an intercepted request (method + full URL)
///
/// Matching is exact on both parts. No prefix matching and no query-string
/// normalization is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    /// HTTP method, e.g. `GET`
    pub method: String,
    /// URL or origin-relative path, exactly as requested
    pub url: String,
}

impl RequestKey {
    /// Create a key for an arbitrary method
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    /// Create a GET key, the only method seeded from a manifest
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Stable digest of the identity, used to name on-disk entries
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response as stored in a cache generation, served byte-for-byte
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredResponse {
    /// HTTP status code
    pub status: u16,
    /// Headers in the order they were received
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// Create a response from its parts
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Case-insensitive header lookup (first match)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the status is in the 2xx class
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Identifier of one versioned snapshot of the cache
///
/// Any non-empty string works; bumping it is how a deploy forces re-seeding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Generation(String);

impl Generation {
    /// Validate and wrap a generation identifier
    pub fn new(id: impl Into<String>) -> OffcacheResult<Self> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(OffcacheError::InvalidGeneration(id));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The store name this generation lives in
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Generation {
    type Err = OffcacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Generation {
    type Error = OffcacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Generation> for String {
    fn from(generation: Generation) -> Self {
        generation.0
    }
}

impl PartialEq<str> for Generation {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
