//! Monument profile resolution.
//!
//! A resolution runs in four stages:
//! 1. structured retrieval from the text model (with search grounding),
//! 2. gallery validation,
//! 3. fallback image synthesis when no gallery image survives,
//! 4. assembly of the final [`Profile`].
//!
//! Only the first stage can fail. Once it succeeds a profile is always
//! produced, with a placeholder image if synthesis is unavailable.

use tracing::{info, warn};

use crate::config::ImageSubject;
use crate::gallery::validate_gallery;
use crate::genai::{GeminiClient, GenerativeModel};
use crate::models::{ImageRecord, Profile};
use crate::payload::{decode_payload, FieldDiagnostic};
use crate::prompts;
use crate::{Config, Error, Result};

pub const GENERATED_IMAGE_ATTRIBUTION: &str = "Gemini 2.5 Flash Image";
pub const GENERATED_IMAGE_SOURCE: &str = "AI Generated Visualization";
pub const GENERATED_IMAGE_LICENSE: &str = "Generative AI";

/// Why the placeholder image was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderReason {
    /// The image request failed.
    GenerationFailed(String),
    /// The image response contained no inline image.
    NoImagePart,
}

/// How the profile's primary image was obtained.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageResolution {
    /// First valid gallery entry.
    Found(String),
    /// Synthesized image, prepended to the gallery as `record`.
    Synthesized { url: String, record: ImageRecord },
    /// Fixed placeholder; the gallery is left as it was.
    PlaceholderUsed { url: String, reason: PlaceholderReason },
}

impl ImageResolution {
    pub fn url(&self) -> &str {
        match self {
            ImageResolution::Found(url) => url,
            ImageResolution::Synthesized { url, .. } => url,
            ImageResolution::PlaceholderUsed { url, .. } => url,
        }
    }
}

/// A successful resolution with the details of how it was reached.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub profile: Profile,
    pub image: ImageResolution,
    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Resolves free-text queries into monument profiles.
///
/// Stateless between calls; share it behind an `Arc`.
pub struct ProfileResolver<M> {
    model: M,
    placeholder_image_url: String,
    image_subject: ImageSubject,
}

impl ProfileResolver<GeminiClient> {
    /// Resolver backed by the Gemini REST API.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(GeminiClient::new(config)?, config))
    }
}

impl<M: GenerativeModel> ProfileResolver<M> {
    pub fn new(model: M, config: &Config) -> Self {
        Self {
            model,
            placeholder_image_url: config.placeholder_image_url.clone(),
            image_subject: config.image_subject,
        }
    }

    /// Resolve `query` into a profile, or `None` when the model has no answer.
    pub async fn resolve(&self, query: &str) -> Result<Option<Profile>> {
        Ok(self
            .resolve_detailed(query)
            .await?
            .map(|resolution| resolution.profile))
    }

    /// Like [`resolve`](Self::resolve), also reporting how the image was
    /// chosen and which payload fields were dropped.
    pub async fn resolve_detailed(&self, query: &str) -> Result<Option<Resolution>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::Validation("Query cannot be empty".to_string()));
        }

        info!(query = %query, "resolving monument profile");

        let generation = self.model.generate_profile(query).await.map_err(|e| {
            warn!(query = %query, kind = e.kind(), error = %e, "profile retrieval failed");
            e
        })?;

        let Some(text) = generation.text else {
            info!(query = %query, "model returned no profile");
            return Ok(None);
        };

        let decoded = decode_payload(&text).map_err(|e| {
            warn!(query = %query, kind = e.kind(), error = %e, "profile payload rejected");
            e
        })?;

        for diagnostic in &decoded.diagnostics {
            warn!(
                query = %query,
                field = %diagnostic.field,
                problem = %diagnostic.problem,
                "dropped malformed payload field"
            );
        }

        let mut gallery = validate_gallery(decoded.archive_gallery.as_ref());

        let image = match gallery.first().map(|record| record.url.clone()) {
            Some(url) => ImageResolution::Found(url),
            None => {
                let subject = match self.image_subject {
                    ImageSubject::PayloadNameOrQuery => {
                        decoded.details.name.as_deref().unwrap_or(query)
                    }
                    ImageSubject::Query => query,
                };
                self.synthesize_image(subject, &mut gallery).await
            }
        };

        info!(
            query = %query,
            gallery_len = gallery.len(),
            grounding_sources = generation.grounding_sources.len(),
            image = image_kind(&image),
            "monument profile resolved"
        );

        let profile = Profile {
            id: slugify(query),
            details: decoded.details,
            image_url: image.url().to_string(),
            archive_gallery: gallery,
            grounding_sources: generation.grounding_sources,
        };

        Ok(Some(Resolution {
            profile,
            image,
            diagnostics: decoded.diagnostics,
        }))
    }

    /// Generate an image of `subject`, absorbing every failure.
    async fn synthesize_image(
        &self,
        subject: &str,
        gallery: &mut Vec<ImageRecord>,
    ) -> ImageResolution {
        info!(subject = %subject, "no archival images, generating visualization");

        match self.model.generate_image(&prompts::image_prompt(subject)).await {
            Ok(Some(image)) => {
                let url = image.to_data_uri();
                let record = ImageRecord {
                    url: url.clone(),
                    attribution: GENERATED_IMAGE_ATTRIBUTION.to_string(),
                    source: GENERATED_IMAGE_SOURCE.to_string(),
                    license: Some(GENERATED_IMAGE_LICENSE.to_string()),
                };
                gallery.insert(0, record.clone());
                ImageResolution::Synthesized { url, record }
            }
            Ok(None) => {
                warn!(subject = %subject, "image response had no inline image, using placeholder");
                self.placeholder(PlaceholderReason::NoImagePart)
            }
            Err(e) => {
                warn!(subject = %subject, error = %e, "image generation failed, using placeholder");
                self.placeholder(PlaceholderReason::GenerationFailed(e.to_string()))
            }
        }
    }

    fn placeholder(&self, reason: PlaceholderReason) -> ImageResolution {
        ImageResolution::PlaceholderUsed {
            url: self.placeholder_image_url.clone(),
            reason,
        }
    }
}

fn image_kind(image: &ImageResolution) -> &'static str {
    match image {
        ImageResolution::Found(_) => "gallery",
        ImageResolution::Synthesized { .. } => "synthesized",
        ImageResolution::PlaceholderUsed { .. } => "placeholder",
    }
}

/// Profile identifier for a query: lower-cased, whitespace runs replaced by `-`.
pub fn slugify(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PLACEHOLDER_IMAGE_URL;
    use crate::error::GatewayError;
    use crate::genai::{InlineImage, TextGeneration};
    use crate::models::GroundingSource;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum TextReply {
        Text(String),
        Empty,
        Fail(fn() -> GatewayError),
    }

    enum ImageReply {
        Image,
        NoPart,
        Fail,
    }

    struct FakeModel {
        text: TextReply,
        image: ImageReply,
        grounding: Vec<GroundingSource>,
        image_calls: AtomicUsize,
        image_prompts: Mutex<Vec<String>>,
    }

    impl FakeModel {
        fn new(text: TextReply, image: ImageReply) -> Self {
            Self {
                text,
                image,
                grounding: Vec::new(),
                image_calls: AtomicUsize::new(0),
                image_prompts: Mutex::new(Vec::new()),
            }
        }

        fn with_payload(payload: serde_json::Value, image: ImageReply) -> Self {
            Self::new(TextReply::Text(payload.to_string()), image)
        }

        fn image_calls(&self) -> usize {
            self.image_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerativeModel for FakeModel {
        async fn generate_profile(
            &self,
            _query: &str,
        ) -> std::result::Result<TextGeneration, GatewayError> {
            match &self.text {
                TextReply::Text(text) => Ok(TextGeneration {
                    text: Some(text.clone()),
                    grounding_sources: self.grounding.clone(),
                }),
                TextReply::Empty => Ok(TextGeneration::default()),
                TextReply::Fail(make) => Err(make()),
            }
        }

        async fn generate_image(
            &self,
            prompt: &str,
        ) -> std::result::Result<Option<InlineImage>, GatewayError> {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            self.image_prompts.lock().unwrap().push(prompt.to_string());
            match self.image {
                ImageReply::Image => Ok(Some(InlineImage {
                    mime_type: "image/png".to_string(),
                    data: "iVBORw0KGgo=".to_string(),
                })),
                ImageReply::NoPart => Ok(None),
                ImageReply::Fail => Err(GatewayError::Transport("HTTP 503".to_string())),
            }
        }
    }

    fn resolver(model: FakeModel) -> ProfileResolver<FakeModel> {
        ProfileResolver::new(model, &Config::new("test-key"))
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Taj Mahal "), "taj-mahal");
        assert_eq!(slugify("Mohenjo   daro"), "mohenjo-daro");
        assert_eq!(slugify("Brihadeeswarar\tTemple"), "brihadeeswarar-temple");
        assert_eq!(slugify("konark"), "konark");
    }

    #[tokio::test]
    async fn test_gallery_image_skips_synthesis() {
        let model = FakeModel::with_payload(
            json!({
                "name": "Taj Mahal",
                "archiveGallery": [
                    {"url": "https://images.example.org/taj.jpg", "attribution": "example.org", "source": "Unsplash"}
                ]
            }),
            ImageReply::Image,
        );
        let resolver = resolver(model);

        let resolution = resolver
            .resolve_detailed("Taj Mahal")
            .await
            .unwrap()
            .unwrap();
        let profile = &resolution.profile;

        assert_eq!(profile.id, "taj-mahal");
        assert_eq!(profile.image_url, "https://images.example.org/taj.jpg");
        assert_eq!(profile.archive_gallery.len(), 1);
        assert_eq!(
            resolution.image,
            ImageResolution::Found("https://images.example.org/taj.jpg".to_string())
        );
        assert_eq!(resolver.model.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_synthesized_image_is_prepended() {
        let model = FakeModel::with_payload(
            json!({
                "name": "Unknown Site",
                "archiveGallery": [{"url": "not-a-url"}]
            }),
            ImageReply::Image,
        );
        let resolver = resolver(model);

        let resolution = resolver
            .resolve_detailed("Unknown Site")
            .await
            .unwrap()
            .unwrap();
        let profile = &resolution.profile;

        assert!(profile.image_url.starts_with("data:"));
        assert_eq!(profile.image_url, "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(profile.archive_gallery.len(), 1);
        assert_eq!(profile.archive_gallery[0].source, GENERATED_IMAGE_SOURCE);
        assert_eq!(profile.archive_gallery[0].url, profile.image_url);
        assert!(matches!(resolution.image, ImageResolution::Synthesized { .. }));
        assert_eq!(resolver.model.image_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_synthesis_uses_placeholder() {
        let model = FakeModel::with_payload(json!({"name": "Unknown Site"}), ImageReply::Fail);
        let resolver = resolver(model);

        let resolution = resolver
            .resolve_detailed("Unknown Site")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(resolution.profile.image_url, DEFAULT_PLACEHOLDER_IMAGE_URL);
        assert!(resolution.profile.archive_gallery.is_empty());
        assert!(matches!(
            resolution.image,
            ImageResolution::PlaceholderUsed {
                reason: PlaceholderReason::GenerationFailed(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_image_part_uses_placeholder() {
        let model = FakeModel::with_payload(json!({"archiveGallery": null}), ImageReply::NoPart);
        let resolver = ProfileResolver::new(
            model,
            &Config {
                placeholder_image_url: "https://cdn.example.org/placeholder.jpg".to_string(),
                ..Config::new("test-key")
            },
        );

        let resolution = resolver
            .resolve_detailed("Lost Temple")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            resolution.profile.image_url,
            "https://cdn.example.org/placeholder.jpg"
        );
        assert_eq!(
            resolution.image,
            ImageResolution::PlaceholderUsed {
                url: "https://cdn.example.org/placeholder.jpg".to_string(),
                reason: PlaceholderReason::NoImagePart,
            }
        );
    }

    #[tokio::test]
    async fn test_image_subject_prefers_payload_name() {
        let model = FakeModel::with_payload(json!({"name": "Rani ki Vav"}), ImageReply::NoPart);
        let resolver = resolver(model);
        resolver.resolve("queen's stepwell").await.unwrap();

        let sent = resolver.model.image_prompts.lock().unwrap();
        assert_eq!(sent[0], prompts::image_prompt("Rani ki Vav"));
    }

    #[tokio::test]
    async fn test_image_subject_falls_back_to_query() {
        let model = FakeModel::with_payload(json!({"era": "Chola"}), ImageReply::NoPart);
        let resolver = resolver(model);
        resolver.resolve("  Gangaikonda Cholapuram ").await.unwrap();

        let sent = resolver.model.image_prompts.lock().unwrap();
        assert_eq!(sent[0], prompts::image_prompt("Gangaikonda Cholapuram"));
    }

    #[tokio::test]
    async fn test_image_subject_query_policy() {
        let model = FakeModel::with_payload(json!({"name": "Rani ki Vav"}), ImageReply::NoPart);
        let resolver = ProfileResolver::new(
            model,
            &Config {
                image_subject: ImageSubject::Query,
                ..Config::new("test-key")
            },
        );
        resolver.resolve("Patan stepwell").await.unwrap();

        let sent = resolver.model.image_prompts.lock().unwrap();
        assert_eq!(sent[0], prompts::image_prompt("Patan stepwell"));
    }

    #[tokio::test]
    async fn test_empty_body_is_not_found() {
        let resolver = resolver(FakeModel::new(TextReply::Empty, ImageReply::Image));
        assert!(resolver.resolve("Atlantis").await.unwrap().is_none());
        assert_eq!(resolver.model.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_is_gateway_error() {
        let resolver = resolver(FakeModel::new(
            TextReply::Fail(|| GatewayError::Transport("HTTP 500".to_string())),
            ImageReply::Image,
        ));

        let err = resolver.resolve("Taj Mahal").await.unwrap_err();
        assert!(matches!(err, Error::Gateway(GatewayError::Transport(_))));
        assert_eq!(resolver.model.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_error() {
        let resolver = resolver(FakeModel::new(
            TextReply::Fail(|| GatewayError::Timeout),
            ImageReply::Image,
        ));

        let err = resolver.resolve("Taj Mahal").await.unwrap_err();
        assert!(matches!(err, Error::Gateway(GatewayError::Timeout)));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_gateway_error() {
        let resolver = resolver(FakeModel::new(
            TextReply::Text("Here is the profile you asked for!".to_string()),
            ImageReply::Image,
        ));

        let err = resolver.resolve("Taj Mahal").await.unwrap_err();
        match err {
            Error::Gateway(e) => assert_eq!(e.kind(), "malformed-response"),
            other => panic!("expected gateway error, got {:?}", other),
        }
        assert_eq!(resolver.model.image_calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_query_is_rejected() {
        let resolver = resolver(FakeModel::new(TextReply::Empty, ImageReply::Image));
        assert!(matches!(
            resolver.resolve("   ").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_carries_payload_and_grounding() {
        let mut model = FakeModel::with_payload(
            json!({
                "name": "Khajuraho Group of Monuments",
                "slug": "khajuraho",
                "id": "upstream-id",
                "dynasty": "Chandela",
                "era": 1000,
                "archiveGallery": [
                    {"url": "ftp://old.example.org/k.jpg"},
                    {"url": "https://images.example.org/k1.jpg", "source": "Pexels"},
                    {"url": "https://images.example.org/k2.jpg", "source": "Pixabay"}
                ]
            }),
            ImageReply::Image,
        );
        model.grounding = vec![GroundingSource {
            title: "UNESCO".to_string(),
            uri: "https://whc.unesco.org/en/list/240".to_string(),
        }];
        let resolver = resolver(model);

        let resolution = resolver
            .resolve_detailed("Khajuraho Temples")
            .await
            .unwrap()
            .unwrap();
        let profile = resolution.profile;

        assert_eq!(profile.id, "khajuraho-temples");
        assert_eq!(profile.details.slug.as_deref(), Some("khajuraho"));
        assert_eq!(profile.details.dynasty.as_deref(), Some("Chandela"));
        assert_eq!(profile.details.era, None);
        assert_eq!(resolution.diagnostics.len(), 1);
        assert_eq!(resolution.diagnostics[0].field, "era");
        assert_eq!(profile.image_url, "https://images.example.org/k1.jpg");
        assert_eq!(profile.archive_gallery.len(), 2);
        assert_eq!(profile.archive_gallery[1].source, "Pixabay");
        assert_eq!(profile.grounding_sources.len(), 1);
        assert_eq!(profile.grounding_sources[0].title, "UNESCO");
    }
}
