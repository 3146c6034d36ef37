//! Shared library for the Heritage Oracle Lambda functions.
//!
//! This crate provides configuration, the Gemini client, and the profile
//! resolver that turns a free-text monument query into a display-ready profile.

pub mod config;
pub mod error;
pub mod gallery;
pub mod genai;
pub mod http;
pub mod models;
pub mod payload;
pub mod prompts;
pub mod resolver;
pub mod secrets;

pub use config::{Config, ImageSubject};
pub use error::{Error, GatewayError, Result};
pub use genai::{GeminiClient, GenerativeModel, InlineImage, TextGeneration};
pub use http::ApiResponse;
pub use models::{GroundingSource, ImageRecord, MonumentDetails, OracleRequest, Profile};
pub use payload::FieldDiagnostic;
pub use resolver::{slugify, ImageResolution, PlaceholderReason, ProfileResolver, Resolution};
