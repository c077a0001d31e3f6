//! AI service integration for post text, images and image-prompt suggestions
//!
//! Each capability is a trait so the session can run against Gemini in
//! production and against the in-memory mocks in tests. Implementations log
//! the underlying failure and return [`Error::Generation`](crate::Error::Generation)
//! carrying one of the generic messages below.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::{GeminiImageClient, GeminiPostClient, GeminiSuggestionClient};
pub use mock::{MockImageGenerationClient, MockPostClient, MockSuggestionClient};

use crate::models::{AspectRatio, ImageCount, ImageRef, Tone};
use crate::{Error, Result};
use async_trait::async_trait;

pub const POST_FAILED: &str = "Failed to generate post content.";
pub const IMAGES_FAILED: &str = "Failed to generate image.";
pub const SUGGESTIONS_FAILED: &str = "Failed to generate image prompt suggestions.";

/// Number of image descriptions a suggestion call must return.
pub const SUGGESTION_COUNT: usize = 3;

#[async_trait]
pub trait PostService: Send + Sync {
    async fn generate_post(&self, prompt: &str, tone: Tone) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_images(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        count: ImageCount,
    ) -> Result<Vec<ImageRef>>;
}

#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn suggest_image_prompts(&self, post_content: &str) -> Result<Vec<String>>;
}

/// Log the underlying failure with full detail and replace it with the
/// generic message callers are allowed to show.
pub(crate) fn generation_failure(
    context: &'static str,
    message: &'static str,
) -> impl FnOnce(Error) -> Error {
    move |e| {
        tracing::error!("Error {}: {}", context, e);
        Error::Generation(message.to_string())
    }
}
