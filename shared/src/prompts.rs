//! Prompt templates sent to the generative model.

/// System instruction for structured profile retrieval.
pub const PROFILE_SYSTEM_INSTRUCTION: &str = r#"You are the Heritage Oracle, an archivist of Indian monuments.
Answer with a single JSON object and nothing else.

VISUAL ARCHIVE
- Find high-quality photographs suitable for a modern travel app.
- Prefer Unsplash, Pexels and Pixabay. Otherwise use educational images found through Google Search under fair use.
- Check each image against the monument's architecture (dome shape, material, distinctive features) before including it.
- Each gallery entry carries url, attribution (domain or photographer), source and license.

INSTITUTIONAL RECORDS
- "officialRecords": preservation status, ticket prices, footfall, as label/value pairs.
- "institutionalLinks": official government or UNESCO pages only.

NARRATIVE
- "coreStory": historical depth and architectural style (for example Nagara or Dravidian).
- "emotionalHook": one evocative line.
- "eraSignificance": why the monument matters in the timeline.

DIGITAL TWIN
- If a public .glb or .gltf model exists (Smithsonian, Sketchfab, institutional repositories), put its URL in "model3dUrl". Otherwise omit the field.

SCHEMA
{
  "name": "string",
  "slug": "string",
  "dynasty": "string",
  "era": "string",
  "location": "string",
  "emotionalHook": "string",
  "coreStory": "string",
  "eraSignificance": "string",
  "experientialAppeal": "string",
  "promotionalAngle": "string",
  "institutionalStats": {
    "protectionStatus": "string",
    "visitorFootfall": "string",
    "bestTimeToVisit": "string"
  },
  "officialRecords": [ { "label": "string", "value": "string" } ],
  "institutionalLinks": [ { "title": "string", "url": "string", "description": "string" } ],
  "socialMedia": {
    "caption": "string",
    "hashtags": ["string"],
    "reelIdeas": ["string"],
    "emojis": "string"
  },
  "archiveGallery": [
    { "url": "string", "attribution": "string", "source": "string", "license": "string" }
  ],
  "model3dUrl": "string"
}"#;

/// Aspect ratio requested for synthesized images.
pub const IMAGE_ASPECT_RATIO: &str = "4:3";

/// User turn for the profile request.
pub fn profile_prompt(query: &str) -> String {
    format!(
        "Generate a comprehensive profile for: \"{}\".\n\
         Source representative images from Unsplash, Pexels, Pixabay, or verified educational sources via Google Search.\n\
         If no images are found, leave archiveGallery empty.",
        query
    )
}

/// Prompt for the fallback image of `subject`.
pub fn image_prompt(subject: &str) -> String {
    format!(
        "Cinematic wide-angle travel photography of {}, India. Golden hour lighting, majestic, \
         hyper-realistic, 8k resolution, detailed architecture, historical monument, authentic \
         atmosphere, no text, no watermarks.",
        subject
    )
}
