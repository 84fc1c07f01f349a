//! Route handlers.

use crate::core::analyzer::ScanResult;
use crate::core::prompts::DEFAULT_LANGUAGE;
use crate::domain::model::{AnalysisResult, ImageInput, QuickCheck, ReportOutcome};
use crate::server::AppState;
use crate::utils::error::{ErrorCategory, MedGuardError};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

const MAX_DRUGS: usize = 20;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct InteractionRequest {
    pub drugs: Vec<String>,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// base64，可帶 `data:image/png;base64,` 前綴
    pub image: String,
    pub media_type: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub llm_provider: String,
    pub ocr_enabled: bool,
    pub uptime_seconds: i64,
    pub time: chrono::DateTime<Utc>,
}

/// handler 錯誤，依錯誤類別對應 HTTP 狀態碼
pub struct ApiError(MedGuardError);

impl From<MedGuardError> for ApiError {
    fn from(err: MedGuardError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match (&self.0, self.0.category()) {
            (MedGuardError::UnavailableError { .. }, _) => StatusCode::SERVICE_UNAVAILABLE,
            (_, ErrorCategory::Input) => StatusCode::BAD_REQUEST,
            (_, ErrorCategory::Network | ErrorCategory::Upstream | ErrorCategory::Data) => {
                StatusCode::BAD_GATEWAY
            }
            (_, ErrorCategory::Configuration | ErrorCategory::System) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!("❌ Request failed: {}", self.0);
            tracing::error!("💡 Suggestion: {}", self.0.recovery_suggestion());
        }
        (status, Json(json!({ "error": self.0.user_friendly_message() }))).into_response()
    }
}

fn language_or_default(language: Option<String>) -> String {
    language
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Json<AnalysisResult> {
    let language = language_or_default(req.language);
    tracing::debug!(%language, "Received text for analysis: {:?}", req.text);
    Json(state.analyzer.analyze(&req.text, &language).await)
}

pub async fn quick_check(
    State(state): State<AppState>,
    Json(req): Json<CheckRequest>,
) -> Json<QuickCheck> {
    Json(state.analyzer.quick_check(&req.text))
}

pub async fn interactions(
    State(state): State<AppState>,
    Json(req): Json<InteractionRequest>,
) -> Result<Json<ReportOutcome>, ApiError> {
    let drugs: Vec<String> = req
        .drugs
        .into_iter()
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .collect();

    if drugs.is_empty() || drugs.len() > MAX_DRUGS {
        return Err(MedGuardError::InvalidInputError {
            message: format!("Provide between 1 and {} medication names.", MAX_DRUGS),
        }
        .into());
    }

    let language = language_or_default(req.language);
    Ok(Json(state.analyzer.check_interactions(&drugs, &language).await))
}

pub async fn scan(
    State(state): State<AppState>,
    Json(req): Json<ScanRequest>,
) -> Result<Json<ScanResult>, ApiError> {
    let image = decode_image(&req.image, req.media_type)?;
    let language = language_or_default(req.language);
    Ok(Json(state.analyzer.scan(&image, &language).await?))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let now = Utc::now();
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        llm_provider: state.analyzer.llm_provider().unwrap_or("none").to_string(),
        ocr_enabled: state.analyzer.ocr_enabled(),
        uptime_seconds: (now - state.started_at).num_seconds(),
        time: now,
    })
}

/// 解析 data URL 或純 base64；未指定類型時預設 image/png
fn decode_image(raw: &str, media_type: Option<String>) -> Result<ImageInput, MedGuardError> {
    let (declared, payload) = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                MedGuardError::InvalidInputError {
                    message: "Malformed data URL.".to_string(),
                }
            })?;
            let declared = header.trim_end_matches(";base64").to_string();
            (Some(declared).filter(|d| !d.is_empty()), payload)
        }
        None => (None, raw),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| MedGuardError::InvalidInputError {
            message: "Image must be base64 encoded.".to_string(),
        })?;

    if bytes.is_empty() {
        return Err(MedGuardError::InvalidInputError {
            message: "Image is empty.".to_string(),
        });
    }

    let media_type = media_type
        .or(declared)
        .unwrap_or_else(|| "image/png".to_string());
    if !media_type.starts_with("image/") {
        return Err(MedGuardError::InvalidInputError {
            message: format!("Unsupported media type: {}", media_type),
        });
    }

    Ok(ImageInput { bytes, media_type })
}
