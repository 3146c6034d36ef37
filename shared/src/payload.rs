//! Decoding of the untrusted JSON payload returned by the text model.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::models::MonumentDetails;

/// A field that was present in the payload but could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDiagnostic {
    pub field: String,
    pub problem: String,
}

/// Result of decoding a model payload.
#[derive(Debug, Clone, Default)]
pub struct DecodedPayload {
    pub details: MonumentDetails,
    /// Raw `archiveGallery` value, validated separately.
    pub archive_gallery: Option<Value>,
    pub diagnostics: Vec<FieldDiagnostic>,
}

/// Parse the model's text output into typed monument details.
///
/// Only a body that is not a JSON object is an error. Individual fields with
/// the wrong shape are dropped and reported as diagnostics.
pub fn decode_payload(text: &str) -> Result<DecodedPayload, GatewayError> {
    let value: Value = serde_json::from_str(text.trim())
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(GatewayError::MalformedResponse(format!(
                "expected a JSON object, found {}",
                type_name(&other)
            )))
        }
    };

    let archive_gallery = object.remove("archiveGallery");
    let mut reader = FieldReader::new(&object);

    let details = MonumentDetails {
        name: reader.string("name"),
        slug: reader.string("slug"),
        dynasty: reader.string("dynasty"),
        era: reader.string("era"),
        location: reader.string("location"),
        emotional_hook: reader.string("emotionalHook"),
        core_story: reader.string("coreStory"),
        era_significance: reader.string("eraSignificance"),
        experiential_appeal: reader.string("experientialAppeal"),
        promotional_angle: reader.string("promotionalAngle"),
        institutional_stats: reader.group("institutionalStats"),
        official_records: reader.list("officialRecords"),
        institutional_links: reader.list("institutionalLinks"),
        social_media: reader.group("socialMedia"),
        model_3d_url: reader.string("model3dUrl"),
    };

    Ok(DecodedPayload {
        details,
        archive_gallery,
        diagnostics: reader.diagnostics,
    })
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    diagnostics: Vec<FieldDiagnostic>,
}

impl<'a> FieldReader<'a> {
    fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            diagnostics: Vec::new(),
        }
    }

    /// Absent, null and blank values all read as `None`.
    fn present(&self, field: &str) -> Option<&'a Value> {
        self.object.get(field).filter(|v| !v.is_null())
    }

    fn report(&mut self, field: impl Into<String>, problem: impl Into<String>) {
        self.diagnostics.push(FieldDiagnostic {
            field: field.into(),
            problem: problem.into(),
        });
    }

    fn string(&mut self, field: &str) -> Option<String> {
        match self.present(field)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => {
                self.report(field, format!("expected string, found {}", type_name(other)));
                None
            }
        }
    }

    fn group<T: DeserializeOwned>(&mut self, field: &str) -> Option<T> {
        let value = self.present(field)?;
        match serde_json::from_value(value.clone()) {
            Ok(group) => Some(group),
            Err(e) => {
                self.report(field, e.to_string());
                None
            }
        }
    }

    fn list<T: DeserializeOwned>(&mut self, field: &str) -> Vec<T> {
        let items = match self.present(field) {
            None => return Vec::new(),
            Some(Value::Array(items)) => items,
            Some(other) => {
                self.report(field, format!("expected array, found {}", type_name(other)));
                return Vec::new();
            }
        };

        let mut decoded = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match serde_json::from_value(item.clone()) {
                Ok(entry) => decoded.push(entry),
                Err(e) => self.report(format!("{}[{}]", field, index), e.to_string()),
            }
        }
        decoded
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
