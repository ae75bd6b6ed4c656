//! Remote colorization client for the Gemini `generateContent` API

use async_trait::async_trait;
use log::{error, info, warn};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::{resolve_api_key, AppConfig};
use crate::error::ClientError;

/// Sends a line drawing plus a styling prompt and returns the generated image.
///
/// `Ok(None)` means the service answered but produced no image; hard failures
/// (network, auth, service errors) come back as `Err`.
#[async_trait]
pub trait ColorizationClient: Send + Sync {
    async fn colorize(
        &self,
        payload: &str,
        media_type: &str,
        prompt: &str,
    ) -> Result<Option<String>, ClientError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            resolve_api_key(config),
            config.model.clone(),
            config.base_url.clone(),
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ColorizationClient for GeminiClient {
    async fn colorize(
        &self,
        payload: &str,
        media_type: &str,
        prompt: &str,
    ) -> Result<Option<String>, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ClientError::MissingApiKey)?;

        info!(
            "[gemini] Sending {} drawing ({} base64 chars) to {}",
            media_type,
            payload.len(),
            self.model
        );

        let body = GenerateContentRequest::new(payload, media_type, prompt);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = service_error_message(status, &text);
            error!("[gemini] API error: {} - {}", status, message);
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)?;
        let image = parsed.first_image().map(str::to_string);

        match &image {
            Some(data) => info!("[gemini] Received image ({} base64 chars)", data.len()),
            None => warn!("[gemini] Response contained no image part"),
        }

        Ok(image)
    }
}

/// Prefers the service's own `error.message`, else the status line
fn service_error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| format!("Service responded with {}", status))
}

// ============ Wire Types ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(payload: &'a str, media_type: &'a str, prompt: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineDataRef {
                            mime_type: media_type,
                            data: payload,
                        },
                    },
                    RequestPart::Text { text: prompt },
                ],
            }],
            generation_config: GenerationConfig {
                response_modalities: vec!["IMAGE", "TEXT"],
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataRef<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataRef<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<&'static str>,
}

/// Top-level `generateContent` response envelope
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

/// One part of a candidate's content, in service order
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ResponsePart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub data: String,
}

impl ResponsePart {
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            ResponsePart::InlineData { inline_data } if inline_data.mime_type.starts_with("image/")
        )
    }

    fn image_data(&self) -> Option<&str> {
        match self {
            ResponsePart::InlineData { inline_data } if self.is_image() => {
                Some(inline_data.data.as_str())
            }
            _ => None,
        }
    }
}

impl GenerateContentResponse {
    /// Payload of the first image-bearing part across all candidates
    pub fn first_image(&self) -> Option<&str> {
        self.candidates
            .iter()
            .filter_map(|candidate| candidate.content.as_ref())
            .flat_map(|content| content.parts.iter())
            .find(|part| part.is_image())
            .and_then(ResponsePart::image_data)
            .filter(|data| !data.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GenerateContentResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn request_carries_image_then_prompt() {
        let body = serde_json::to_value(GenerateContentRequest::new("AAAA", "image/png", "color it"))
            .unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[0]["inlineData"]["data"], "AAAA");
        assert_eq!(parts[1]["text"], "color it");
        assert_eq!(
            body["generationConfig"]["responseModalities"],
            serde_json::json!(["IMAGE", "TEXT"])
        );
    }

    #[test]
    fn picks_first_image_part_after_text() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"text":"Here is your drawing"},
                {"inlineData":{"mimeType":"image/png","data":"first"}},
                {"inlineData":{"mimeType":"image/png","data":"second"}}
            ]}}]}"#,
        );
        assert_eq!(response.first_image(), Some("first"));
    }

    #[test]
    fn skips_non_image_inline_data() {
        let response = parse(
            r#"{"candidates":[{"content":{"parts":[
                {"inlineData":{"mimeType":"application/pdf","data":"doc"}},
                {"functionCall":{"name":"noop"}},
                {"inlineData":{"mimeType":"image/jpeg","data":"photo"}}
            ]}}]}"#,
        );
        assert!(matches!(response.candidates[0].content.as_ref().unwrap().parts[1], ResponsePart::Other(_)));
        assert_eq!(response.first_image(), Some("photo"));
    }

    #[test]
    fn text_only_or_empty_responses_have_no_image() {
        assert_eq!(parse(r#"{"candidates":[{"content":{"parts":[{"text":"sorry"}]}}]}"#).first_image(), None);
        assert_eq!(parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).first_image(), None);
        assert_eq!(parse(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#).first_image(), None);
    }

    #[test]
    fn error_message_prefers_service_text() {
        let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(
            service_error_message(StatusCode::TOO_MANY_REQUESTS, body),
            "quota exceeded"
        );
        assert_eq!(
            service_error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "Service responded with 502 Bad Gateway"
        );
    }

    #[test]
    fn endpoint_joins_model_path() {
        let client = GeminiClient::new(None, "gemini-test", "http://localhost:1234/v1beta/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-test:generateContent"
        );
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(None, "gemini-test", "http://127.0.0.1:9");
        let err = client.colorize("AAAA", "image/png", "p").await.unwrap_err();
        assert!(matches!(err, ClientError::MissingApiKey));
    }
}
