//! Gemini client for structured profile retrieval and image synthesis.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GatewayError;
use crate::models::GroundingSource;
use crate::prompts;
use crate::{Config, Error, Result};

/// Title given to citations that arrive without one.
pub const DEFAULT_GROUNDING_TITLE: &str = "Reference";

/// Longest slice of an error body kept in a transport error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Outcome of the structured profile request.
#[derive(Debug, Clone, Default)]
pub struct TextGeneration {
    /// Candidate text, `None` when the model returned nothing.
    pub text: Option<String>,
    pub grounding_sources: Vec<GroundingSource>,
}

/// Image bytes returned inline, still base64-encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// `data:<mime>;base64,<payload>`
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// The two generation calls the profile resolver depends on.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Ask for a JSON monument profile with search grounding enabled.
    async fn generate_profile(&self, query: &str) -> std::result::Result<TextGeneration, GatewayError>;

    /// Ask for an image; `Ok(None)` when the response carries no image part.
    async fn generate_image(&self, prompt: &str) -> std::result::Result<Option<InlineImage>, GatewayError>;
}

// Wire format for `models/{model}:generateContent`.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            role: role.map(String::from),
            parts: vec![Part {
                text: Some(text.into()),
                ..Default::default()
            }],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineImage>,
    /// Set on reasoning parts, which are not part of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub google_search: GoogleSearch,
}

#[derive(Debug, Default, Serialize)]
pub struct GoogleSearch {}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    #[serde(default)]
    pub grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Default, Deserialize)]
pub struct GroundingChunk {
    #[serde(default)]
    pub web: Option<WebSource>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebSource {
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Answer text of the first candidate, `None` if there is none.
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .first_parts()
            .iter()
            .filter(|p| p.thought != Some(true))
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Citations attached to the first candidate.
    pub fn grounding_sources(&self) -> Vec<GroundingSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .map(|m| {
                m.grounding_chunks
                    .iter()
                    .filter_map(|chunk| chunk.web.as_ref())
                    .filter_map(|web| {
                        let uri = web.uri.as_deref().filter(|u| !u.is_empty())?;
                        let title = web
                            .title
                            .as_deref()
                            .filter(|t| !t.is_empty())
                            .unwrap_or(DEFAULT_GROUNDING_TITLE);
                        Some(GroundingSource {
                            title: title.to_string(),
                            uri: uri.to_string(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// First inline-data part of the first candidate.
    pub fn first_inline_image(&self) -> Option<InlineImage> {
        self.first_parts()
            .iter()
            .find_map(|p| p.inline_data.clone())
    }
}

/// Build the grounded, JSON-mode profile request.
pub fn profile_request(query: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(Some("user"), prompts::profile_prompt(query))],
        system_instruction: Some(Content::text(None, prompts::PROFILE_SYSTEM_INSTRUCTION)),
        tools: vec![Tool {
            google_search: GoogleSearch::default(),
        }],
        generation_config: Some(GenerationConfig {
            response_mime_type: Some("application/json".to_string()),
            ..Default::default()
        }),
    }
}

/// Build the 4:3 image-synthesis request.
pub fn image_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(Some("user"), prompt)],
        system_instruction: None,
        tools: Vec::new(),
        generation_config: Some(GenerationConfig {
            response_modalities: Some(vec!["IMAGE".to_string()]),
            image_config: Some(ImageConfig {
                aspect_ratio: prompts::IMAGE_ASPECT_RATIO.to_string(),
            }),
            ..Default::default()
        }),
    }
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    /// Create a new client; every request inherits the configured timeout.
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            text_model: config.text_model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    /// Send one `generateContent` call. An empty body yields `Ok(None)`.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<Option<GenerateContentResponse>, GatewayError> {
        let url = format!("{}/models/{}:generateContent", self.api_base_url, model);
        debug!(model = %model, "sending generateContent request");

        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(GatewayError::Transport(format!(
                "{} returned HTTP {}: {}",
                model, status, excerpt
            )));
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| GatewayError::MalformedResponse(format!("invalid envelope: {}", e)))
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_profile(&self, query: &str) -> std::result::Result<TextGeneration, GatewayError> {
        let response = self
            .generate_content(&self.text_model, &profile_request(query))
            .await?
            .unwrap_or_default();

        Ok(TextGeneration {
            text: response.text(),
            grounding_sources: response.grounding_sources(),
        })
    }

    async fn generate_image(&self, prompt: &str) -> std::result::Result<Option<InlineImage>, GatewayError> {
        let response = self
            .generate_content(&self.image_model, &image_request(prompt))
            .await?;

        Ok(response.and_then(|r| r.first_inline_image()))
    }
}
