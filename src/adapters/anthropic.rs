//! Anthropic Messages API client.
//!
//! Used for label summarization and, with an image content block, as a
//! vision OCR engine.

use crate::domain::model::{CompletionRequest, ImageInput};
use crate::domain::ports::{LlmClient, OcrEngine};
use crate::utils::error::{MedGuardError, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const ANTHROPIC_API_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const SERVICE: &str = "anthropic";

pub(crate) const OCR_PROMPT: &str = "Transcribe all text printed on this medication label exactly as written. \
Return only the transcribed text, keeping the original line breaks.";

pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum ContentBlock<'a> {
    #[serde(rename = "image")]
    Image { source: ImageSource<'a> },
    #[serde(rename = "text")]
    Text { text: &'a str },
}

#[derive(Serialize)]
struct ImageSource<'a> {
    #[serde(rename = "type")]
    source_type: &'a str,
    media_type: &'a str,
    data: String,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<String>,
}

impl AnthropicClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn send(&self, request: &MessagesRequest<'_>) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);
        debug!(model = %self.model, "Calling Anthropic Messages API");

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MedGuardError::UpstreamError {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: MessagesResponse = response.json().await?;
        body.content
            .into_iter()
            .find(|c| c.content_type == "text")
            .and_then(|c| c.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MedGuardError::EmptyResponseError {
                service: SERVICE.to_string(),
            })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> &str {
        SERVICE
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.as_deref(),
            messages: vec![Message {
                role: "user",
                content: vec![ContentBlock::Text {
                    text: &request.prompt,
                }],
            }],
        };
        self.send(&body).await
    }
}

#[async_trait]
impl OcrEngine for AnthropicClient {
    async fn recognize(&self, image: &ImageInput) -> Result<String> {
        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        debug!(size = image.bytes.len(), media_type = %image.media_type, "Sending image for OCR");

        let body = MessagesRequest {
            model: &self.model,
            max_tokens: 2048,
            temperature: 0.0,
            system: None,
            messages: vec![Message {
                role: "user",
                content: vec![
                    ContentBlock::Image {
                        source: ImageSource {
                            source_type: "base64",
                            media_type: &image.media_type,
                            data,
                        },
                    },
                    ContentBlock::Text { text: OCR_PROMPT },
                ],
            }],
        };
        self.send(&body).await
    }
}
