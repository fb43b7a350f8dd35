//! Kind 0 profile metadata.

use serde::{Deserialize, Serialize};

use crate::shorten;

/// Base URL for generated fallback avatars.
pub const FALLBACK_AVATAR_BASE: &str = "https://robohash.org";

/// Parsed profile metadata from kind 0 JSON content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProfileMetadata {
    /// Short name.
    #[serde(default)]
    pub name: Option<String>,
    /// Longer display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Short biography.
    #[serde(default)]
    pub about: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
    /// NIP-05 identifier (e.g., "user@domain.com").
    #[serde(default)]
    pub nip05: Option<String>,
    /// Website URL.
    #[serde(default)]
    pub website: Option<String>,
}

impl ProfileMetadata {
    /// Parse from kind 0 JSON content. Returns `None` if the content is not
    /// a JSON object of the expected shape.
    pub fn from_json(content: &str) -> Option<Self> {
        serde_json::from_str(content).ok()
    }

    /// The best available name: `name`, then `display_name`. Empty strings
    /// are skipped.
    pub fn label(&self) -> Option<&str> {
        non_empty(self.name.as_deref()).or_else(|| non_empty(self.display_name.as_deref()))
    }

    /// Avatar URL if one is set.
    pub fn avatar(&self) -> Option<&str> {
        non_empty(self.picture.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Display label for an author, falling back to the shortened key.
pub fn display_label(profile: Option<&ProfileMetadata>, pubkey: &str) -> String {
    profile
        .and_then(ProfileMetadata::label)
        .map(str::to_string)
        .unwrap_or_else(|| shorten(pubkey))
}

/// Avatar URL for an author, falling back to a deterministic generated image.
pub fn avatar_url(profile: Option<&ProfileMetadata>, pubkey: &str) -> String {
    profile
        .and_then(ProfileMetadata::avatar)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{FALLBACK_AVATAR_BASE}/{pubkey}?set=set5"))
}
