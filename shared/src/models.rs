//! Shared data models.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Longest query accepted over HTTP, in characters.
pub const MAX_QUERY_CHARS: usize = 200;

/// One image reference with provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(default)]
    pub attribution: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
}

/// A web page the model consulted while answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Preservation and visitor statistics from institutional sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstitutionalStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protection_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_footfall: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_time_to_visit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficialRecord {
    pub label: String,
    pub value: String,
}

/// Official government or UNESCO page about the monument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstitutionalLink {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ready-made promotional copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMedia {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub reel_ideas: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emojis: Option<String>,
}

/// Descriptive fields of a monument as reported by the model.
///
/// Every field is optional: the upstream generator may omit or mistype any of
/// them, and fields that fail to decode are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonumentDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynasty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emotional_hook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub core_story: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub era_significance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experiential_appeal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotional_angle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institutional_stats: Option<InstitutionalStats>,
    pub official_records: Vec<OfficialRecord>,
    pub institutional_links: Vec<InstitutionalLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social_media: Option<SocialMedia>,
    #[serde(rename = "model3dUrl", skip_serializing_if = "Option::is_none")]
    pub model_3d_url: Option<String>,
}

/// Display-ready monument profile.
///
/// `image_url` is never empty, and equals `archive_gallery[0].url` whenever the
/// gallery is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(flatten)]
    pub details: MonumentDetails,
    pub image_url: String,
    pub archive_gallery: Vec<ImageRecord>,
    pub grounding_sources: Vec<GroundingSource>,
}

/// Oracle request payload.
#[derive(Debug, Deserialize)]
pub struct OracleRequest {
    pub query: String,
}

impl OracleRequest {
    /// The trimmed query, rejected when empty or longer than [`MAX_QUERY_CHARS`].
    pub fn validated_query(&self) -> Result<&str> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Query cannot be empty".to_string()));
        }
        if query.chars().count() > MAX_QUERY_CHARS {
            return Err(Error::Validation(format!(
                "Query cannot exceed {} characters",
                MAX_QUERY_CHARS
            )));
        }
        Ok(query)
    }
}
