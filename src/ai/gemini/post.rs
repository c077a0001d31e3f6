use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::{generation_failure, PostService, POST_FAILED};
use crate::models::Tone;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct PostRequest {
    contents: Vec<Content>,
}

/// Writes Facebook posts with a Gemini text model.
pub struct GeminiPostClient {
    http: GeminiHttpClient,
}

impl GeminiPostClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
        }
    }

    fn instruction(prompt: &str, tone: Tone) -> String {
        prompts::render(
            prompts::POST,
            &[("topic", prompt), ("tone", tone.prompt_phrase())],
        )
    }

    async fn request_post(&self, prompt: &str, tone: Tone) -> Result<String> {
        let request = PostRequest {
            contents: vec![Content::user_text(Self::instruction(prompt, tone))],
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = response
            .text()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::AiProvider("No text in Gemini post response".to_string()))?;

        tracing::info!(
            "Generated post ({} chars) with model {}",
            text.chars().count(),
            self.http.model()
        );
        Ok(text)
    }
}

super::impl_with_gemini_base_url!(GeminiPostClient);

#[async_trait]
impl PostService for GeminiPostClient {
    async fn generate_post(&self, prompt: &str, tone: Tone) -> Result<String> {
        self.request_post(prompt, tone)
            .await
            .map_err(generation_failure("generating Facebook post", POST_FAILED))
    }
}
