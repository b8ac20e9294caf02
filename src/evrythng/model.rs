//! Thng data model and API error envelope.

use std::fmt;

use serde::Deserialize;

/// A Thng resource as returned by the platform API.
///
/// Only the stable fields are modelled; unknown fields in the response are
/// ignored. `properties` is kept as free-form JSON because property sets
/// are account-specific.
#[derive(Debug, Clone, Deserialize)]
pub struct Thng {
    /// Unique Thng identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Tags attached to the Thng.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Creation timestamp in epoch milliseconds.
    #[serde(default, rename = "createdAt")]
    pub created_at: Option<i64>,
    /// Last-update timestamp in epoch milliseconds.
    #[serde(default, rename = "updatedAt")]
    pub updated_at: Option<i64>,
    /// Current property values, keyed by property name.
    #[serde(default)]
    pub properties: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Error payload returned by the platform on non-2xx responses.
///
/// Every declared field is optional; the API is not consistent about which
/// ones it sends. `raw` holds the unparsed response body so callers can
/// inspect fields this struct does not model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    /// Human-readable error messages.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Status code echoed in the body, when present.
    #[serde(default)]
    pub status: Option<u16>,
    /// Link to further documentation, when present.
    #[serde(default, rename = "moreInfo")]
    pub more_info: Option<String>,
    /// The raw response body. Not deserialized; filled in by the client.
    #[serde(skip)]
    pub raw: String,
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.first() {
            Some(msg) => write!(f, "{}", msg),
            None => write!(f, "unspecified error"),
        }
    }
}
