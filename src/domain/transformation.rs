use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Most entries a gallery holds; extra submissions are dropped from the
/// tail, matching the home-page layout.
pub const GALLERY_CAPACITY: usize = 3;

/// One before/after success story shown on the public home page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationEntry {
    pub name: String,
    pub duration: String,
    pub weight_lost: String,
    /// Stored image URLs, set after upload.
    pub before_image: String,
    pub after_image: String,
}

/// Keyed gallery record; `key` names the page slot (currently only
/// `home`).
#[derive(Debug, Clone)]
pub struct TransformationSet {
    pub key: String,
    pub entries: Vec<TransformationEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wire shape for a gallery submission. Image fields carry the source
/// to upload (a data URL or a remote URL), not a stored location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformationInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub weight_lost: Option<String>,
    pub before_image: Option<String>,
    pub after_image: Option<String>,
}
