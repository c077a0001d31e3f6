use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::{generation_failure, SuggestionService, SUGGESTIONS_FAILED, SUGGESTION_COUNT};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct SuggestionRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: SuggestionGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionGenerationConfig {
    response_mime_type: String,
    response_schema: Schema,
}

#[derive(Debug, Serialize)]
struct Schema {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<Schema>>,
}

impl Schema {
    fn array_of_strings() -> Self {
        Self {
            kind: "ARRAY",
            items: Some(Box::new(Schema {
                kind: "STRING",
                items: None,
            })),
        }
    }
}

/// Derives image descriptions from a post, asking for a JSON array of strings.
pub struct GeminiSuggestionClient {
    http: GeminiHttpClient,
}

impl GeminiSuggestionClient {
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

    async fn request_suggestions(&self, post_content: &str) -> Result<Vec<String>> {
        let request = SuggestionRequest {
            contents: vec![Content::user_text(prompts::render(
                prompts::SUGGEST,
                &[("post", post_content)],
            ))],
            generation_config: SuggestionGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: Schema::array_of_strings(),
            },
        };

        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        let text = response
            .text()
            .ok_or_else(|| Error::AiProvider("No text in Gemini suggestion response".to_string()))?;

        parse_suggestions(&text)
    }
}

super::impl_with_gemini_base_url!(GeminiSuggestionClient);

/// Decode a suggestion payload and check its shape.
///
/// The response schema sent with the request is not trusted: the payload must
/// be a JSON array of exactly [`SUGGESTION_COUNT`] strings.
pub fn parse_suggestions(text: &str) -> Result<Vec<String>> {
    let value: Value = serde_json::from_str(text.trim())?;

    let items = value.as_array().ok_or_else(|| {
        Error::AiProvider(format!("Suggestions are not a JSON array: {}", value))
    })?;

    if items.len() != SUGGESTION_COUNT {
        return Err(Error::AiProvider(format!(
            "Expected {} suggestions, got {}",
            SUGGESTION_COUNT,
            items.len()
        )));
    }

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::AiProvider(format!("Suggestion {} is not a string: {}", index, item))
            })
        })
        .collect()
}

#[async_trait]
impl SuggestionService for GeminiSuggestionClient {
    async fn suggest_image_prompts(&self, post_content: &str) -> Result<Vec<String>> {
        self.request_suggestions(post_content)
            .await
            .map_err(generation_failure(
                "generating image prompt suggestions",
                SUGGESTIONS_FAILED,
            ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::gemini::test_support;
    use wiremock::matchers::body_partial_json;
    use wiremock::{MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> GeminiSuggestionClient {
        GeminiSuggestionClient::new("key".to_string(), "gemini-2.5-flash".to_string())
            .with_base_url(server.uri())
    }

    #[test]
    fn test_parse_accepts_three_strings_unchanged() {
        let parsed =
            parse_suggestions(r#" ["Túi vải trên bàn gỗ", "Cận cảnh đường may", "Người mẫu đeo túi"] "#)
                .unwrap();
        assert_eq!(
            parsed,
            vec![
                "Túi vải trên bàn gỗ".to_string(),
                "Cận cảnh đường may".to_string(),
                "Người mẫu đeo túi".to_string(),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_suggestions(r#"{"suggestions": ["a", "b", "c"]}"#).unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_parse_rejects_non_string_element() {
        let err = parse_suggestions(r#"["a", 2, "c"]"#).unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(parse_suggestions(r#"["a", "b"]"#).is_err());
        assert!(parse_suggestions(r#"["a", "b", "c", "d"]"#).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = parse_suggestions(r#"["a", "b""#).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[tokio::test]
    async fn test_suggest_requests_json_array_schema() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": { "type": "ARRAY", "items": { "type": "STRING" } }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                test_support::text_response(r#"["one", "two", "three"]"#),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let client = make_client(&server);
        let suggestions = client
            .suggest_image_prompts("Bài đăng về túi vải")
            .await
            .unwrap();
        assert_eq!(suggestions, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_malformed_payload_is_generation_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(test_support::text_response(r#"["one", null, "three"]"#)),
            )
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.suggest_image_prompts("post").await.unwrap_err();
        match err {
            Error::Generation(message) => assert_eq!(message, SUGGESTIONS_FAILED),
            other => panic!("expected generation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_api_error_is_generation_error() {
        let server = MockServer::start().await;

        test_support::post_path_regex(test_support::GENERATE_CONTENT_PATH_REGEX)
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client.suggest_image_prompts("post").await.unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
