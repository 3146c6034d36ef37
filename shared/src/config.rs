//! Configuration management for the Oracle Lambda.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::gallery::is_valid_image_url;
use crate::secrets;
use crate::{Error, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1548013146-72479768bada?q=80&w=1200";

/// Which text is used as the subject of the fallback image prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageSubject {
    /// The monument name reported by the model, or the query when it has none.
    #[default]
    PayloadNameOrQuery,
    /// Always the user's query.
    Query,
}

impl FromStr for ImageSubject {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(ImageSubject::PayloadNameOrQuery),
            "query" => Ok(ImageSubject::Query),
            other => Err(Error::Config(format!(
                "ORACLE_IMAGE_SUBJECT must be 'name' or 'query', got '{}'",
                other
            ))),
        }
    }
}

/// Resolver configuration, injected at construction time.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API credential
    pub api_key: String,
    /// Root of the generative-language REST API
    pub api_base_url: String,
    /// Model used for structured profile retrieval
    pub text_model: String,
    /// Model used for fallback image synthesis
    pub image_model: String,
    /// Timeout applied to each outbound request
    pub request_timeout: Duration,
    /// Image shown when neither a gallery image nor a synthesized one exists
    pub placeholder_image_url: String,
    /// Subject used in the fallback image prompt
    pub image_subject: ImageSubject,
}

impl Config {
    /// Configuration with defaults for everything but the credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            placeholder_image_url: DEFAULT_PLACEHOLDER_IMAGE_URL.to_string(),
            image_subject: ImageSubject::default(),
        }
    }

    /// Load configuration, resolving the credential from `GEMINI_API_KEY` or,
    /// failing that, from the secret named by `GEMINI_API_KEY_SECRET_ARN`.
    pub async fn load() -> Result<Self> {
        let api_key = match env_api_key() {
            Some(key) => key,
            None => {
                let secret_arn = env::var("GEMINI_API_KEY_SECRET_ARN").map_err(|_| {
                    Error::Config(
                        "GEMINI_API_KEY or GEMINI_API_KEY_SECRET_ARN must be set".to_string(),
                    )
                })?;
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let client = aws_sdk_secretsmanager::Client::new(&aws_config);
                secrets::get_api_key(&client, &secret_arn).await?
            }
        };

        Self::from_vars(api_key, |name| env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    pub fn from_vars<F>(api_key: String, var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if api_key.trim().is_empty() {
            return Err(Error::Config("API key is empty".to_string()));
        }

        let mut config = Self::new(api_key.trim());

        if let Some(base_url) = var("GEMINI_API_BASE_URL") {
            config.api_base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(model) = var("ORACLE_TEXT_MODEL") {
            config.text_model = model;
        }
        if let Some(model) = var("ORACLE_IMAGE_MODEL") {
            config.image_model = model;
        }
        if let Some(secs) = var("ORACLE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("ORACLE_REQUEST_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            if secs == 0 {
                return Err(Error::Config(
                    "ORACLE_REQUEST_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = var("ORACLE_PLACEHOLDER_IMAGE_URL") {
            let url = url.trim();
            if !is_valid_image_url(url) {
                return Err(Error::Config(format!(
                    "ORACLE_PLACEHOLDER_IMAGE_URL must be an absolute http(s) URL, got '{}'",
                    url
                )));
            }
            config.placeholder_image_url = url.to_string();
        }
        if let Some(subject) = var("ORACLE_IMAGE_SUBJECT") {
            config.image_subject = subject.parse()?;
        }

        tracing::info!(
            api_base_url = %config.api_base_url,
            text_model = %config.text_model,
            image_model = %config.image_model,
            timeout_secs = config.request_timeout.as_secs(),
            "oracle configuration loaded"
        );

        Ok(config)
    }
}

fn env_api_key() -> Option<String> {
    env::var("GEMINI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
}
