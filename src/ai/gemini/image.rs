use super::client::GeminiHttpClient;
use super::types::{
    OutputOptions, PredictInstance, PredictParameters, PredictRequest, PredictResponse,
};
use crate::ai::{generation_failure, mime, ImageGenerationService, IMAGES_FAILED};
use crate::models::{AspectRatio, ImageCount, ImageRef};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Generates images with an Imagen model through the `predict` endpoint.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::new_with_client(api_key, model, reqwest::Client::new())
    }

    pub fn new_with_client(api_key: String, model: String, client: reqwest::Client) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(120),
                client,
            ),
        }
    }

    async fn request_images(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        count: ImageCount,
    ) -> Result<Vec<ImageRef>> {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: count.get(),
                aspect_ratio: aspect_ratio.as_ratio().to_string(),
                output_options: OutputOptions {
                    mime_type: mime::PNG.to_string(),
                },
            },
        };

        let response: PredictResponse = self.http.predict(&request).await?;

        use base64::Engine as _;
        let mut images = Vec::with_capacity(response.predictions.len());
        for (index, prediction) in response.predictions.iter().enumerate() {
            let Some(data) = prediction.bytes_base64_encoded.as_deref() else {
                tracing::warn!(
                    "Imagen prediction {} has no image data (filtered: {})",
                    index,
                    prediction.rai_filtered_reason.as_deref().unwrap_or("unknown")
                );
                continue;
            };

            base64::engine::general_purpose::STANDARD
                .decode(data)
                .map_err(|e| {
                    Error::AiProvider(format!(
                        "Failed to decode Imagen base64 image {}: {}",
                        index, e
                    ))
                })?;

            let mime_type = prediction.mime_type.as_deref().unwrap_or(mime::PNG);
            images.push(ImageRef::from_base64(mime_type, data));
        }

        if images.is_empty() {
            return Err(Error::AiProvider(
                "No image data found in the Imagen response".to_string(),
            ));
        }

        if images.len() < usize::from(count.get()) {
            tracing::warn!(
                "Imagen returned {} of {} requested images",
                images.len(),
                count.get()
            );
        }

        Ok(images)
    }
}

super::impl_with_gemini_base_url!(GeminiImageClient);

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_images(
        &self,
        prompt: &str,
        aspect_ratio: AspectRatio,
        count: ImageCount,
    ) -> Result<Vec<ImageRef>> {
        self.request_images(prompt, aspect_ratio, count)
            .await
            .map_err(generation_failure("generating images", IMAGES_FAILED))
    }
}
