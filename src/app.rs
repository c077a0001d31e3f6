//! Session state and orchestration of the generation workflows.
//!
//! A [`Session`] holds everything one user is editing (inputs, loading flags,
//! errors, results) and wires actions to the AI services. Every action takes
//! `&self`, so the Generate and Suggest workflows can be in flight together;
//! the state lock is never held across an await.

use crate::ai::{
    GeminiImageClient, GeminiPostClient, GeminiSuggestionClient, ImageGenerationService,
    PostService, SuggestionService, SUGGESTION_COUNT,
};
use crate::models::{
    AspectRatio, Config, GenerationRequest, GenerationResult, ImageCount, Tone,
};
use crate::{templates, Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{error, info, warn};

pub const MISSING_INPUT_MESSAGE: &str = "Vui lòng nhập đầy đủ nội dung bài đăng và mô tả ảnh.";
pub const GENERATION_FAILED_MESSAGE: &str = "Đã xảy ra lỗi khi tạo nội dung. Vui lòng thử lại.";
pub const MISSING_POST_MESSAGE: &str = "Vui lòng nhập nội dung bài đăng trước để nhận gợi ý.";
pub const SUGGESTIONS_FAILED_MESSAGE: &str = "Không thể tạo gợi ý. Vui lòng thử lại.";
pub const BUSY_MESSAGE: &str = "Đang xử lý yêu cầu trước đó.";

/// How long the "copied" indicator stays up after [`Session::copy_post`].
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Failed,
}

/// Image-prompt suggestion sub-workflow. Independent of [`GenerationStatus`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    pub loading: bool,
    pub suggestions: Vec<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub post_prompt: String,
    pub image_prompt: String,
    pub tone: Tone,
    pub aspect_ratio: AspectRatio,
    pub number_of_images: ImageCount,
    /// Key of the template the inputs came from; cleared by manual edits.
    pub selected_template: Option<&'static str>,
    pub status: GenerationStatus,
    pub error: Option<String>,
    pub result: Option<GenerationResult>,
    pub suggestions: SuggestionState,
    copied_at: Option<Instant>,
}

impl SessionState {
    pub fn is_loading(&self) -> bool {
        self.status == GenerationStatus::Loading
    }

    pub fn is_copied(&self) -> bool {
        self.copied_at
            .is_some_and(|copied_at| copied_at.elapsed() < COPY_FEEDBACK)
    }

    /// Snapshot the form into a request, or `None` when a required text is blank.
    fn generation_request(&self) -> Option<GenerationRequest> {
        if self.post_prompt.trim().is_empty() || self.image_prompt.trim().is_empty() {
            return None;
        }

        Some(GenerationRequest {
            post_prompt: self.post_prompt.clone(),
            image_prompt: self.image_prompt.clone(),
            tone: self.tone,
            aspect_ratio: self.aspect_ratio,
            number_of_images: self.number_of_images,
        })
    }
}

/// Injectable service bundle used to construct a [`Session`].
pub struct GenerationServices {
    pub post: Box<dyn PostService>,
    pub images: Box<dyn ImageGenerationService>,
    pub suggestions: Box<dyn SuggestionService>,
}

impl GenerationServices {
    /// Build Gemini-backed services from configuration.
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across the three clients.
        let http_client = reqwest::Client::new();

        info!("Text model: {}", config.text_model);
        info!("Image model: {}", config.image_model);

        Self {
            post: Box::new(
                GeminiPostClient::new_with_client(
                    config.api_key.clone(),
                    config.text_model.clone(),
                    http_client.clone(),
                )
                .with_base_url(config.base_url.clone()),
            ),
            images: Box::new(
                GeminiImageClient::new_with_client(
                    config.api_key.clone(),
                    config.image_model.clone(),
                    http_client.clone(),
                )
                .with_base_url(config.base_url.clone()),
            ),
            suggestions: Box::new(
                GeminiSuggestionClient::new_with_client(
                    config.api_key.clone(),
                    config.text_model.clone(),
                    http_client,
                )
                .with_base_url(config.base_url.clone()),
            ),
        }
    }
}

/// Puts a workflow back into a resting state if its future is dropped while
/// the remote calls are still pending.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
    reset: fn(&mut SessionState),
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Workflow dropped while in flight; resetting its loading state");
            (self.reset)(&mut lock(self.state));
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One user's editing session.
pub struct Session {
    services: GenerationServices,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn with_services(services: GenerationServices) -> Self {
        Self {
            services,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_services(GenerationServices::from_config(config))
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> SessionState {
        lock(&self.state).clone()
    }

    /// Overwrite both inputs with a template's patterns. Unknown keys are a
    /// no-op and return `false`.
    pub fn select_template(&self, key: &str) -> bool {
        let Some(template) = templates::find(key) else {
            warn!("Unknown template '{}'", key);
            return false;
        };

        let mut state = lock(&self.state);
        state.post_prompt = template.post.to_string();
        state.image_prompt = template.image.to_string();
        state.selected_template = Some(template.key);
        state.suggestions.suggestions.clear();
        state.suggestions.error = None;
        true
    }

    pub fn set_post_prompt(&self, text: impl Into<String>) {
        let mut state = lock(&self.state);
        state.post_prompt = text.into();
        state.selected_template = None;
    }

    pub fn set_image_prompt(&self, text: impl Into<String>) {
        let mut state = lock(&self.state);
        state.image_prompt = text.into();
        state.selected_template = None;
    }

    pub fn set_tone(&self, tone: Tone) {
        lock(&self.state).tone = tone;
    }

    pub fn set_aspect_ratio(&self, aspect_ratio: AspectRatio) {
        lock(&self.state).aspect_ratio = aspect_ratio;
    }

    /// Set the image count; values outside 1..=4 are rejected and ignored.
    pub fn set_number_of_images(&self, count: u8) -> Result<()> {
        let count = ImageCount::new(count)?;
        lock(&self.state).number_of_images = count;
        Ok(())
    }

    /// Generate the post text and images together.
    ///
    /// Both calls run concurrently and the first failure ends the wait; there
    /// is no partial result. The session ends in `Success` or `Failed`, and the
    /// returned error only ever carries the generic message.
    pub async fn generate(&self) -> Result<GenerationResult> {
        let request = {
            let mut state = lock(&self.state);
            if state.is_loading() {
                warn!("Generate ignored: a generation is already in progress");
                return Err(Error::Validation(BUSY_MESSAGE.to_string()));
            }

            let Some(request) = state.generation_request() else {
                state.error = Some(MISSING_INPUT_MESSAGE.to_string());
                return Err(Error::Validation(MISSING_INPUT_MESSAGE.to_string()));
            };

            state.error = None;
            state.result = None;
            state.status = GenerationStatus::Loading;
            request
        };

        info!(
            "Generating post ({}) and {} image(s) at {}",
            request.tone,
            request.number_of_images.get(),
            request.aspect_ratio
        );

        let in_flight = InFlight {
            state: &self.state,
            reset: |state| state.status = GenerationStatus::Idle,
            armed: true,
        };

        let outcome = tokio::try_join!(
            self.services
                .post
                .generate_post(&request.post_prompt, request.tone),
            self.services.images.generate_images(
                &request.image_prompt,
                request.aspect_ratio,
                request.number_of_images
            ),
        );
        in_flight.disarm();

        let mut state = lock(&self.state);
        match outcome {
            Ok((post_text, images)) => {
                info!(
                    "Generation succeeded: {} chars, {} image(s)",
                    post_text.chars().count(),
                    images.len()
                );
                let result = GenerationResult { post_text, images };
                state.result = Some(result.clone());
                state.status = GenerationStatus::Success;
                Ok(result)
            }
            Err(e) => {
                error!("Content generation failed: {}", e);
                state.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                state.status = GenerationStatus::Failed;
                Err(Error::Generation(GENERATION_FAILED_MESSAGE.to_string()))
            }
        }
    }

    /// Ask for image descriptions derived from the current post text.
    pub async fn suggest(&self) -> Result<Vec<String>> {
        let post_content = {
            let mut state = lock(&self.state);
            if state.suggestions.loading {
                warn!("Suggest ignored: suggestions are already loading");
                return Err(Error::Validation(BUSY_MESSAGE.to_string()));
            }

            if state.post_prompt.trim().is_empty() {
                state.suggestions.error = Some(MISSING_POST_MESSAGE.to_string());
                return Err(Error::Validation(MISSING_POST_MESSAGE.to_string()));
            }

            state.suggestions = SuggestionState {
                loading: true,
                ..SuggestionState::default()
            };
            state.post_prompt.clone()
        };

        let in_flight = InFlight {
            state: &self.state,
            reset: |state| state.suggestions.loading = false,
            armed: true,
        };

        let outcome = self
            .services
            .suggestions
            .suggest_image_prompts(&post_content)
            .await;
        in_flight.disarm();

        let mut state = lock(&self.state);
        state.suggestions.loading = false;
        match outcome {
            Ok(suggestions) => {
                let suggestions: Vec<String> =
                    suggestions.into_iter().take(SUGGESTION_COUNT).collect();
                info!("Received {} image prompt suggestion(s)", suggestions.len());
                state.suggestions.suggestions = suggestions.clone();
                Ok(suggestions)
            }
            Err(e) => {
                error!("Image prompt suggestion failed: {}", e);
                state.suggestions.error = Some(SUGGESTIONS_FAILED_MESSAGE.to_string());
                Err(Error::Generation(SUGGESTIONS_FAILED_MESSAGE.to_string()))
            }
        }
    }

    /// Copy a suggestion into the image description. Does not generate.
    pub fn apply_suggestion(&self, index: usize) -> bool {
        let mut state = lock(&self.state);
        let Some(suggestion) = state.suggestions.suggestions.get(index).cloned() else {
            return false;
        };
        state.image_prompt = suggestion;
        true
    }

    /// Returns the generated post text for the clipboard and raises the
    /// "copied" indicator for [`COPY_FEEDBACK`].
    pub fn copy_post(&self) -> Option<String> {
        let mut state = lock(&self.state);
        let text = state
            .result
            .as_ref()
            .map(|result| result.post_text.clone())
            .filter(|text| !text.is_empty())?;
        state.copied_at = Some(Instant::now());
        Some(text)
    }

    /// Write the image at `index` to `dir/generated-image-<index+1>.png`.
    pub fn download_image(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let image = {
            let state = lock(&self.state);
            state
                .result
                .as_ref()
                .and_then(|result| result.images.get(index))
                .cloned()
                .ok_or_else(|| Error::Validation(format!("No generated image at index {}", index)))?
        };

        let bytes = image.decode()?;
        let path = dir.join(format!("generated-image-{}.png", index + 1));
        fs::write(&path, bytes)?;
        info!("Saved image to {}", path.display());
        Ok(path)
    }
}
