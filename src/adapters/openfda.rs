//! openFDA drug label lookup.

use crate::domain::model::LabelRecord;
use crate::domain::ports::LabelLookup;
use crate::utils::error::{MedGuardError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "openfda";

pub struct OpenFdaClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct LabelResponse {
    #[serde(default)]
    results: Vec<LabelResult>,
}

#[derive(Deserialize)]
struct LabelResult {
    #[serde(default)]
    openfda: OpenFdaFields,
}

#[derive(Deserialize, Default)]
struct OpenFdaFields {
    #[serde(default)]
    brand_name: Vec<String>,
    #[serde(default)]
    generic_name: Vec<String>,
    #[serde(default)]
    manufacturer_name: Vec<String>,
}

impl OpenFdaClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// 品牌名稱查詢語法；移除會破壞查詢的引號
    fn search_query(drug_name: &str) -> String {
        let cleaned: String = drug_name.chars().filter(|c| *c != '"').collect();
        format!("openfda.brand_name:\"{}\"", cleaned.trim())
    }
}

#[async_trait]
impl LabelLookup for OpenFdaClient {
    async fn find_label(&self, drug_name: &str) -> Result<Option<LabelRecord>> {
        let url = format!("{}/drug/label.json", self.base_url);
        let search = Self::search_query(drug_name);
        debug!(%search, "Looking up drug label");

        let response = self
            .client
            .get(&url)
            .query(&[("search", search.as_str()), ("limit", "1")])
            .send()
            .await?;

        // openFDA 查無結果時回傳 404
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MedGuardError::UpstreamError {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body: LabelResponse = response.json().await?;
        let record = body.results.into_iter().next().map(|result| {
            let fields = result.openfda;
            LabelRecord {
                brand_name: fields
                    .brand_name
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| drug_name.to_string()),
                generic_name: fields.generic_name.into_iter().next(),
                manufacturer: fields.manufacturer_name.into_iter().next(),
            }
        });
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_find_label_reads_first_result() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/drug/label.json")
                .query_param("search", "openfda.brand_name:\"Advil\"")
                .query_param("limit", "1");
            then.status(200).json_body(serde_json::json!({
                "results": [{"openfda": {
                    "brand_name": ["Advil"],
                    "generic_name": ["IBUPROFEN"],
                    "manufacturer_name": ["Haleon US Holdings LLC"]
                }}]
            }));
        });

        let lookup = OpenFdaClient::new(Client::new(), server.base_url());
        let record = lookup.find_label("Advil").await.unwrap().unwrap();

        api_mock.assert();
        assert_eq!(record.brand_name, "Advil");
        assert_eq!(record.generic_name.as_deref(), Some("IBUPROFEN"));
        assert_eq!(record.manufacturer.as_deref(), Some("Haleon US Holdings LLC"));
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/drug/label.json");
            then.status(404).json_body(serde_json::json!({
                "error": {"code": "NOT_FOUND", "message": "No matches found!"}
            }));
        });

        let lookup = OpenFdaClient::new(Client::new(), server.base_url());
        assert!(lookup.find_label("Zzyzx").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_propagates() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/drug/label.json");
            then.status(500);
        });

        let lookup = OpenFdaClient::new(Client::new(), server.base_url());
        assert!(lookup.find_label("Advil").await.is_err());
    }

    #[test]
    fn test_search_query_strips_quotes() {
        assert_eq!(
            OpenFdaClient::search_query(" Tylenol \"Extra\" "),
            "openfda.brand_name:\"Tylenol Extra\""
        );
    }
}
