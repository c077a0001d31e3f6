//! Data models and structures
//!
//! Defines the user-facing generation options, the request/result types that
//! flow between the session and the AI services, and runtime configuration.

use crate::ai::mime;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stylistic register applied to generated post text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Humorous,
    Inspirational,
    Persuasive,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Friendly,
        Tone::Professional,
        Tone::Humorous,
        Tone::Inspirational,
        Tone::Persuasive,
    ];

    /// Phrase inserted verbatim into the post instruction.
    pub fn prompt_phrase(self) -> &'static str {
        match self {
            Tone::Friendly => "thân thiện",
            Tone::Professional => "chuyên nghiệp",
            Tone::Humorous => "hài hước",
            Tone::Inspirational => "truyền cảm hứng",
            Tone::Persuasive => "thuyết phục",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Tone::Friendly => "friendly",
            Tone::Professional => "professional",
            Tone::Humorous => "humorous",
            Tone::Inspirational => "inspirational",
            Tone::Persuasive => "persuasive",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("Unknown tone '{}'", s)))
    }
}

/// Target width:height category for generated images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    #[default]
    Square,
    Portrait,
    Landscape,
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 3] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
    ];

    /// Ratio string understood by the image API.
    pub fn as_ratio(self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "9:16",
            AspectRatio::Landscape => "16:9",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AspectRatio::Square => "square",
            AspectRatio::Portrait => "portrait",
            AspectRatio::Landscape => "landscape",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ratio())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    /// Accepts either the name (`portrait`) or the ratio (`9:16`).
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.name().eq_ignore_ascii_case(s) || ratio.as_ratio() == s)
            .ok_or_else(|| Error::Validation(format!("Unknown aspect ratio '{}'", s)))
    }
}

/// Number of images requested per generation, always within 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ImageCount(u8);

impl ImageCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(count: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(Error::Validation(format!(
                "Number of images must be between {} and {}, got {}",
                Self::MIN,
                Self::MAX,
                count
            )))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for ImageCount {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for ImageCount {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ImageCount> for u8 {
    fn from(count: ImageCount) -> Self {
        count.0
    }
}

/// Self-contained image reference: a `data:<mime>;base64,<payload>` URL that
/// can be rendered directly or decoded back into bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap an already base64-encoded payload.
    pub fn from_base64(mime_type: &str, data: &str) -> Self {
        Self(mime::data_url(mime_type, data))
    }

    /// Encode raw bytes, sniffing the MIME type from the payload.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        use base64::Engine as _;
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self::from_base64(mime::detect_image_mime(bytes), &data)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mime_type(&self) -> Option<&str> {
        mime::split_data_url(&self.0).map(|(mime_type, _)| mime_type)
    }

    /// Decode the embedded payload.
    pub fn decode(&self) -> Result<Vec<u8>> {
        let (_, payload) = mime::split_data_url(&self.0)
            .ok_or_else(|| Error::Invariant("Image reference is not a data URL".to_string()))?;

        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| Error::Invariant(format!("Failed to decode image reference: {}", e)))
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Inputs of a single Generate action, snapshotted from the session form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub post_prompt: String,
    pub image_prompt: String,
    pub tone: Tone,
    pub aspect_ratio: AspectRatio,
    pub number_of_images: ImageCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub post_text: String,
    pub images: Vec<ImageRef>,
}

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub text_model: String,
    pub image_model: String,
    pub base_url: String,
}

impl Config {
    /// Load configuration from the process environment (and `.env`).
    ///
    /// The API key is the one required value; without it nothing can be
    /// generated, so this is the single place startup fails.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_empty("API_KEY")
            .or_else(|| non_empty("GEMINI_API_KEY"))
            .ok_or_else(|| {
                Error::Config("API_KEY environment variable is not set".to_string())
            })?;

        Ok(Self {
            api_key,
            text_model: non_empty("TEXT_MODEL").unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            image_model: non_empty("IMAGE_MODEL")
                .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            base_url: non_empty("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_tone_parsing_and_phrase() {
        let tone: Tone = "Professional".parse().unwrap();
        assert_eq!(tone, Tone::Professional);
        assert_eq!(tone.prompt_phrase(), "chuyên nghiệp");
        assert!(matches!(
            "sarcastic".parse::<Tone>(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_tone_serialization() {
        let json = serde_json::to_string(&Tone::Inspirational).unwrap();
        assert_eq!(json, "\"inspirational\"");
    }

    #[test]
    fn test_aspect_ratio_accepts_name_or_ratio() {
        assert_eq!(
            "portrait".parse::<AspectRatio>().unwrap(),
            AspectRatio::Portrait
        );
        assert_eq!(
            "16:9".parse::<AspectRatio>().unwrap(),
            AspectRatio::Landscape
        );
        assert!("4:3".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::default().as_ratio(), "1:1");
    }

    #[test]
    fn test_image_count_bounds() {
        assert!(ImageCount::new(0).is_err());
        assert_eq!(ImageCount::new(1).unwrap().get(), 1);
        assert_eq!(ImageCount::new(4).unwrap().get(), 4);
        assert!(ImageCount::new(5).is_err());
        assert_eq!(ImageCount::default().get(), 3);
    }

    #[test]
    fn test_image_count_rejects_out_of_range_json() {
        assert!(serde_json::from_str::<ImageCount>("7").is_err());
        assert_eq!(serde_json::from_str::<ImageCount>("2").unwrap().get(), 2);
    }

    #[test]
    fn test_image_ref_from_bytes_round_trips() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A];
        let image = ImageRef::from_bytes(&png);
        assert!(image.as_str().starts_with("data:image/png;base64,"));
        assert_eq!(image.mime_type(), Some("image/png"));
        assert_eq!(image.decode().unwrap(), png);
    }

    #[test]
    fn test_image_ref_decode_rejects_garbage() {
        let image: ImageRef = serde_json::from_str("\"not a data url\"").unwrap();
        assert!(matches!(image.decode(), Err(Error::Invariant(_))));
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = Config::from_lookup(lookup_from(&[("API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("API_KEY", "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.text_model, DEFAULT_TEXT_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_overrides_and_fallback_key() {
        let config = Config::from_lookup(lookup_from(&[
            ("GEMINI_API_KEY", "fallback"),
            ("TEXT_MODEL", "gemini-2.5-pro"),
            ("IMAGE_MODEL", "imagen-4.0-ultra-generate-001"),
            ("GEMINI_BASE_URL", "http://localhost:8080/"),
        ]))
        .unwrap();
        assert_eq!(config.api_key, "fallback");
        assert_eq!(config.text_model, "gemini-2.5-pro");
        assert_eq!(config.image_model, "imagen-4.0-ultra-generate-001");
        assert_eq!(config.base_url, "http://localhost:8080");
    }
}
