use super::{
    ImageGenerationService, PostService, SuggestionService, IMAGES_FAILED, POST_FAILED,
    SUGGESTIONS_FAILED,
};
use crate::models::{AspectRatio, ImageCount, ImageRef, Tone};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Tiny valid PNG returned when no image response is configured.
const PLACEHOLDER_PNG: [u8; 69] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
    0x44, 0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
    0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Shared knobs for every mock: call counter, forced failure and latency.
#[derive(Clone, Default)]
struct MockControl {
    call_count: Arc<Mutex<usize>>,
    should_fail: Arc<Mutex<bool>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockControl {
    /// Record a call and return its 1-based index.
    async fn begin_call(&self, failure_message: &str) -> Result<usize> {
        let index = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if *self.should_fail.lock().unwrap() {
            return Err(Error::Generation(failure_message.to_string()));
        }
        Ok(index)
    }

    fn set_failure(&self, should_fail: bool) {
        *self.should_fail.lock().unwrap() = should_fail;
    }

    fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    fn count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

fn cycle<T: Clone>(responses: &[T], call_index: usize) -> Option<T> {
    if responses.is_empty() {
        None
    } else {
        Some(responses[(call_index - 1) % responses.len()].clone())
    }
}

#[derive(Clone, Default)]
pub struct MockPostClient {
    responses: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<(String, Tone)>>>,
    control: MockControl,
}

impl MockPostClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        self.control.set_failure(should_fail);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.control.set_delay(delay);
        self
    }

    /// Flip failure injection on a mock already handed to a session.
    pub fn set_failure(&self, should_fail: bool) {
        self.control.set_failure(should_fail);
    }

    pub fn get_call_count(&self) -> usize {
        self.control.count()
    }

    /// Prompts and tones received so far, in call order.
    pub fn get_requests(&self) -> Vec<(String, Tone)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PostService for MockPostClient {
    async fn generate_post(&self, prompt: &str, tone: Tone) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_string(), tone));
        let index = self.control.begin_call(POST_FAILED).await?;

        let responses = self.responses.lock().unwrap();
        Ok(cycle(&responses, index)
            .unwrap_or_else(|| format!("Bài đăng {} về {} #mock", tone.prompt_phrase(), prompt)))
    }
}

#[derive(Clone, Default)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<Vec<u8>>>>,
    requests: Arc<Mutex<Vec<(String, AspectRatio, ImageCount)>>>,
    control: MockControl,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes for one generated image. Responses cycle across the images of a
    /// call and across calls.
    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.image_responses.lock().unwrap().push(response);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        self.control.set_failure(should_fail);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.control.set_delay(delay);
        self
    }

    /// Flip failure injection on a mock already handed to a session.
    pub fn set_failure(&self, should_fail: bool) {
        self.control.set_failure(should_fail);
    }

    pub fn get_call_count(&self) -> usize {
        self.control.count()
    }

    pub fn get_requests(&self) -> Vec<(String, AspectRatio, ImageCount)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_images(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        count: ImageCount,
    ) -> Result<Vec<ImageRef>> {
        self.requests
            .lock()
            .unwrap()
            .push((prompt.to_string(), aspect_ratio, count));
        self.control.begin_call(IMAGES_FAILED).await?;

        let responses = self.image_responses.lock().unwrap();
        Ok((1..=usize::from(count.get()))
            .map(|n| {
                let bytes = cycle(&responses, n).unwrap_or_else(|| PLACEHOLDER_PNG.to_vec());
                ImageRef::from_bytes(&bytes)
            })
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct MockSuggestionClient {
    responses: Arc<Mutex<Vec<Vec<String>>>>,
    control: MockControl,
}

impl MockSuggestionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suggestions(self, suggestions: Vec<String>) -> Self {
        self.responses.lock().unwrap().push(suggestions);
        self
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        self.control.set_failure(should_fail);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.control.set_delay(delay);
        self
    }

    /// Flip failure injection on a mock already handed to a session.
    pub fn set_failure(&self, should_fail: bool) {
        self.control.set_failure(should_fail);
    }

    pub fn get_call_count(&self) -> usize {
        self.control.count()
    }
}

#[async_trait]
impl SuggestionService for MockSuggestionClient {
    async fn suggest_image_prompts(&self, post_content: &str) -> Result<Vec<String>> {
        let index = self.control.begin_call(SUGGESTIONS_FAILED).await?;

        let responses = self.responses.lock().unwrap();
        Ok(cycle(&responses, index).unwrap_or_else(|| {
            let topic: String = post_content.chars().take(40).collect();
            vec![
                format!("Ảnh chụp cận cảnh: {}", topic),
                format!("Ảnh phong cách tối giản: {}", topic),
                format!("Ảnh đời thường: {}", topic),
            ]
        }))
    }
}
