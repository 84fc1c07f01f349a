use crate::domain::model::{CompletionRequest, ImageInput, LabelRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 文字補全服務 (Anthropic、Gemini ...)
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> &str;
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

/// 藥品標籤查詢；查無資料回傳 Ok(None)
#[async_trait]
pub trait LabelLookup: Send + Sync {
    async fn find_label(&self, drug_name: &str) -> Result<Option<LabelRecord>>;
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image: &ImageInput) -> Result<String>;
}
