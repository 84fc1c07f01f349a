// Adapters layer: concrete implementations of the domain ports for external APIs.

pub mod anthropic;
pub mod gemini;
pub mod openfda;

use crate::config::{AppConfig, ProviderKind};
use crate::domain::ports::{LabelLookup, LlmClient, OcrEngine};
use crate::utils::error::{MedGuardError, Result};
use anthropic::AnthropicClient;
use gemini::GeminiClient;
use openfda::OpenFdaClient;
use reqwest::Client;
use std::sync::Arc;

/// 所有外部呼叫共用同一個 HTTP client
pub fn build_http_client(config: &AppConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout())
        .user_agent(concat!("medguard/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(MedGuardError::from)
}

fn provider_client(
    client: &Client,
    provider: ProviderKind,
    api_key: &Option<String>,
    model: &str,
    base_url: &Option<String>,
) -> Option<ProviderClient> {
    let api_key = api_key.clone().unwrap_or_default();
    match provider {
        ProviderKind::Anthropic => {
            let mut llm = AnthropicClient::new(client.clone(), api_key, model);
            if let Some(url) = base_url {
                llm = llm.with_base_url(url);
            }
            Some(ProviderClient::Anthropic(Arc::new(llm)))
        }
        ProviderKind::Gemini => {
            let mut llm = GeminiClient::new(client.clone(), api_key, model);
            if let Some(url) = base_url {
                llm = llm.with_base_url(url);
            }
            Some(ProviderClient::Gemini(Arc::new(llm)))
        }
        ProviderKind::None => None,
    }
}

enum ProviderClient {
    Anthropic(Arc<AnthropicClient>),
    Gemini(Arc<GeminiClient>),
}

pub fn build_llm(config: &AppConfig, client: &Client) -> Option<Arc<dyn LlmClient>> {
    let llm = &config.llm;
    provider_client(client, llm.provider, &llm.api_key, llm.model(), &llm.base_url).map(
        |provider| -> Arc<dyn LlmClient> {
            match provider {
                ProviderClient::Anthropic(c) => c,
                ProviderClient::Gemini(c) => c,
            }
        },
    )
}

pub fn build_ocr(config: &AppConfig, client: &Client) -> Option<Arc<dyn OcrEngine>> {
    let ocr = &config.ocr;
    if !ocr.enabled {
        return None;
    }
    provider_client(client, ocr.provider, &ocr.api_key, ocr.model(), &ocr.base_url).map(
        |provider| -> Arc<dyn OcrEngine> {
            match provider {
                ProviderClient::Anthropic(c) => c,
                ProviderClient::Gemini(c) => c,
            }
        },
    )
}

pub fn build_lookup(config: &AppConfig, client: &Client) -> Option<Arc<dyn LabelLookup>> {
    config.verification.enabled.then(|| {
        Arc::new(OpenFdaClient::new(client.clone(), config.verification.base_url()))
            as Arc<dyn LabelLookup>
    })
}
