//! Google Gemini `generateContent` client (text and vision).

use crate::adapters::anthropic::OCR_PROMPT;
use crate::domain::model::{CompletionRequest, ImageInput};
use crate::domain::ports::{LlmClient, OcrEngine};
use crate::utils::error::{MedGuardError, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
const SERVICE: &str = "gemini";

pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn generate(&self, body: Value) -> Result<String> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        debug!(model = %self.model, "Calling Gemini generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
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

        let json: Value = response.json().await?;
        let text = json["candidates"][0]["content"]["parts"]
            .as_array()
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p["text"].as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(MedGuardError::EmptyResponseError {
                service: SERVICE.to_string(),
            });
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> &str {
        SERVICE
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let mut body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": request.prompt }] }],
            "generationConfig": {
                "maxOutputTokens": request.max_tokens,
                "temperature": request.temperature,
            }
        });
        if let Some(system) = &request.system {
            body["systemInstruction"] = json!({ "parts": [{ "text": system }] });
        }
        self.generate(body).await
    }
}

#[async_trait]
impl OcrEngine for GeminiClient {
    async fn recognize(&self, image: &ImageInput) -> Result<String> {
        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        let body = json!({
            "contents": [{ "parts": [
                { "text": OCR_PROMPT },
                { "inlineData": { "mimeType": image.media_type, "data": data } }
            ]}]
        });
        self.generate(body).await
    }
}
