use crate::models::DEFAULT_BASE_URL;
use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// Longest slice of a response body written to error logs. Imagen bodies
/// carry megabytes of base64.
const LOGGED_BODY_LIMIT: usize = 512;

fn body_excerpt(body: &str) -> &str {
    if body.len() <= LOGGED_BODY_LIMIT {
        return body;
    }
    let mut end = LOGGED_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

/// Lightweight REST client for the generative-language API, shared by the
/// post, image and suggestion clients.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    model: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl GeminiHttpClient {
    /// Construct a client.
    ///
    /// `model` should be the bare model ID (for example `gemini-2.5-flash`),
    /// a `models/...` prefix is stripped.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        tracing::debug!("Sending request to {}", url);

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to Gemini: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!(
                "Gemini API error (status {}): {}",
                status,
                body_excerpt(&error_text)
            );
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Failed to parse Gemini response: {}\nBody ({} bytes): {}",
                e,
                body.len(),
                body_excerpt(&body)
            );
            tracing::debug!("Unparsed Gemini response body: {}", body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Calls the `generateContent` endpoint used for post text and suggestions.
    pub async fn generate_content<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        self.post_to_url(url, request).await
    }

    /// Calls the `predict` endpoint used by Imagen models.
    pub async fn predict<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/v1beta/models/{}:predict", self.base_url, self.model);
        self.post_to_url(url, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_excerpt_truncates_large_bodies() {
        assert_eq!(body_excerpt("{\"short\":true}"), "{\"short\":true}");

        let large = format!("{{\"predictions\":\"{}\"}}", "A".repeat(5_000_000));
        assert_eq!(body_excerpt(&large).len(), LOGGED_BODY_LIMIT);
        assert!(large.starts_with(body_excerpt(&large)));
    }

    #[test]
    fn test_body_excerpt_respects_char_boundaries() {
        // Three-byte characters straddle the limit.
        let body = "ả".repeat(LOGGED_BODY_LIMIT);
        let excerpt = body_excerpt(&body);
        assert!(excerpt.len() <= LOGGED_BODY_LIMIT);
        assert!(excerpt.chars().all(|c| c == 'ả'));
    }
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Serialize)]
    struct Ping {
        ping: bool,
    }

    #[derive(Debug, serde::Deserialize)]
    struct Pong {
        pong: bool,
    }

    fn make_client(server: &MockServer, model: &str) -> GeminiHttpClient {
        GeminiHttpClient::new("test-key".to_string(), model.to_string(), Duration::from_secs(5))
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn test_generate_content_sends_api_key_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pong": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "models/gemini-2.5-flash");
        assert_eq!(client.model(), "gemini-2.5-flash");

        let pong: Pong = client.generate_content(&Ping { ping: true }).await.unwrap();
        assert!(pong.pong);
    }

    #[tokio::test]
    async fn test_predict_uses_predict_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "pong": false
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server, "imagen-4.0-generate-001");
        let pong: Pong = client.predict(&Ping { ping: true }).await.unwrap();
        assert!(!pong.pong);
    }

    #[tokio::test]
    async fn test_non_success_status_is_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = make_client(&server, "gemini-2.5-flash");
        let err = client
            .generate_content::<_, Pong>(&Ping { ping: true })
            .await
            .unwrap_err();
        match err {
            Error::AiProvider(message) => assert!(message.contains("API key not valid")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_ai_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = make_client(&server, "gemini-2.5-flash");
        let err = client
            .generate_content::<_, Pong>(&Ping { ping: true })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
