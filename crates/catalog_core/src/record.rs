use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog item exactly as the listing endpoint returned it.
pub type RawEntry = Value;

/// Fixed-shape record derived from a [`RawEntry`].
///
/// Every string field is always present; the empty string is the floor value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub name: String,
    pub username: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub affiliate_url: String,
    pub stats: Map<String, Value>,
    pub categories: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: String,
    #[serde(rename = "modifiedAt")]
    pub modified_at: String,
}

impl NormalizedRecord {
    /// Link target used by the rendered outputs: the affiliate URL, or the
    /// plain URL when no affiliate URL could be derived.
    pub fn link(&self) -> &str {
        if self.affiliate_url.is_empty() {
            &self.url
        } else {
            &self.affiliate_url
        }
    }
}
