use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use httpmock::prelude::*;
use medguard::config::ProviderKind;
use medguard::{create_router, AppConfig, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

/// 把 LLM 與 openFDA 都指向同一個 mock server
fn config_for(server: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.llm.provider = ProviderKind::Anthropic;
    config.llm.api_key = Some("test-key".to_string());
    config.llm.model = Some("claude-test".to_string());
    config.llm.base_url = Some(server.base_url());
    config.verification.base_url = Some(server.base_url());
    config.ocr.enabled = true;
    config.ocr.provider = ProviderKind::Gemini;
    config.ocr.api_key = Some("g-key".to_string());
    config.ocr.model = Some("gemini-test".to_string());
    config.ocr.base_url = Some(server.base_url());
    config
}

fn app_for(config: &AppConfig) -> Router {
    create_router(AppState::from_config(config).unwrap())
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn mock_llm_reply<'a>(server: &'a MockServer, text: &str) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(200)
            .json_body(json!({"content": [{"type": "text", "text": text}]}));
    })
}

#[tokio::test]
async fn test_analyze_end_to_end() {
    let server = MockServer::start();
    let llm_mock = mock_llm_reply(
        &server,
        "DRUG: Amoxicillin\nUSAGE: Tomar dos veces al día\nDOSAGE: 500mg\nWARN: No mezclar con alcohol",
    );
    let fda_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/drug/label.json")
            .query_param("search", "openfda.brand_name:\"Amoxicillin\"");
        then.status(200).json_body(json!({
            "results": [{"openfda": {"brand_name": ["Amoxicillin"], "generic_name": ["AMOXICILLIN"]}}]
        }));
    });

    let app = app_for(&config_for(&server));
    let (status, body) = post_json(
        app,
        "/api/analyze",
        json!({"text": "Take with food. May cause drowsiness. Avoid alcohol.", "language": "Spanish"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    llm_mock.assert();
    fda_mock.assert();

    assert_eq!(body["safe"], json!(false));
    assert_eq!(body["color"], json!("red"));
    assert_eq!(body["title"], json!("High Risk Warning"));
    assert_eq!(body["data"]["drug"], json!("Amoxicillin"));
    assert_eq!(body["data"]["warning"], json!("No mezclar con alcohol"));
    assert_eq!(body["fda"], json!("FDA verified: Amoxicillin (AMOXICILLIN)"));
    assert_eq!(body["speech"]["lang"], json!("es-ES"));
}

#[tokio::test]
async fn test_analyze_survives_upstream_failures() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1/messages");
        then.status(500).body("internal error");
    });
    let fda_mock = server.mock(|when, then| {
        when.method(GET).path("/drug/label.json");
        then.status(500);
    });

    let app = app_for(&config_for(&server));
    let (status, body) = post_json(app, "/api/analyze", json!({"text": ""})).await;

    assert_eq!(status, StatusCode::OK);
    // 空白文字沒有命中任何關鍵字，仍回傳 green
    assert_eq!(body["color"], json!("green"));
    assert_eq!(body["safe"], json!(true));
    assert_eq!(
        body["data"],
        json!({"drug": "Unknown", "usage": "See label.", "dosage": "As directed.", "warning": "Consult doctor."})
    );
    assert_eq!(body["fda"], json!("FDA check skipped: medication name not recognized."));
    assert_eq!(body["speech"]["lang"], json!("en-US"));
    fda_mock.assert_hits(0);
}

#[tokio::test]
async fn test_quick_check_legacy_shape() {
    let server = MockServer::start();
    let app = app_for(&config_for(&server));

    let (status, body) = post_json(app.clone(), "/api/check", json!({"text": "Recall notice"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"safe": false, "message": "WARNING: Label mentions 'expired' or 'recall'. Do not use."})
    );

    let (_, body) = post_json(app, "/api/check", json!({"text": "Vitamin D3"})).await;
    assert_eq!(body["safe"], json!(true));
}

#[tokio::test]
async fn test_interactions_report_and_error_object() {
    let server = MockServer::start();
    let mut llm_mock = mock_llm_reply(
        &server,
        r#"```json
{"safetyScore": "Medium", "summary": "Watch for bleeding.", "interactions": [], "schedule_advice": "Take aspirin in the morning."}
```"#,
    );

    let app = app_for(&config_for(&server));
    let (status, body) = post_json(
        app.clone(),
        "/api/interactions",
        json!({"drugs": ["Warfarin", "Aspirin"]}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["safetyScore"], json!("Medium"));
    assert_eq!(body["schedule_advice"], json!("Take aspirin in the morning."));
    llm_mock.assert();
    llm_mock.delete();

    mock_llm_reply(&server, "Sorry, I cannot answer that.");
    let (status, body) = post_json(app.clone(), "/api/interactions", json!({"drugs": ["Aspirin"]})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"error": "Safety check failed. Please consult a pharmacist."}));

    let (status, _) = post_json(app, "/api/interactions", json!({"drugs": ["  "]})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_scan_runs_ocr_and_analysis() {
    let server = MockServer::start();
    let ocr_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-test:generateContent")
            .header("x-goog-api-key", "g-key");
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "Keep out of direct sunlight"}]}}]
        }));
    });
    mock_llm_reply(&server, "DRUG: Unknown");

    let app = app_for(&config_for(&server));
    let (status, body) = post_json(
        app,
        "/api/scan",
        json!({"image": "data:image/jpeg;base64,aGVsbG8=", "language": "French"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    ocr_mock.assert();
    assert_eq!(body["text"], json!("Keep out of direct sunlight"));
    assert_eq!(body["result"]["color"], json!("yellow"));
    assert_eq!(body["result"]["speech"]["lang"], json!("fr-FR"));
}

#[tokio::test]
async fn test_scan_accepts_multi_megabyte_photo() {
    let server = MockServer::start();
    let ocr_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-test:generateContent");
        then.status(200).json_body(json!({
            "candidates": [{"content": {"parts": [{"text": "Take 1 tablet daily"}]}}]
        }));
    });
    mock_llm_reply(&server, "DRUG: Unknown");

    // 約 4 MB 的 base64，超過 axum 預設的 2 MB
    let photo = format!("data:image/jpeg;base64,{}", "A".repeat(4_000_000));
    let app = app_for(&config_for(&server));
    let (status, body) = post_json(app, "/api/scan", json!({"image": photo})).await;

    assert_eq!(status, StatusCode::OK);
    ocr_mock.assert();
    assert_eq!(body["text"], json!("Take 1 tablet daily"));
}

#[tokio::test]
async fn test_body_over_configured_limit_is_rejected() {
    let server = MockServer::start();
    let mut config = config_for(&server);
    config.server.max_body_bytes = Some(64 * 1024);
    let app = app_for(&config);

    let photo = "A".repeat(128 * 1024);
    let (status, _) = post_json(app, "/api/scan", json!({"image": photo})).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_scan_ocr_failure_is_bad_gateway() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/v1beta/models/gemini-test:generateContent");
        then.status(500);
    });

    let app = app_for(&config_for(&server));
    let (status, body) = post_json(app, "/api/scan", json!({"image": "aGVsbG8="})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("gemini"));
}

#[tokio::test]
async fn test_scan_disabled_and_bad_image() {
    let server = MockServer::start();
    let mut config = config_for(&server);
    config.ocr.enabled = false;
    let app = app_for(&config);

    let (status, _) = post_json(app.clone(), "/api/scan", json!({"image": "aGVsbG8="})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = post_json(app, "/api/scan", json!({"image": "%%%"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Image must be base64 encoded."));
}

#[tokio::test]
async fn test_missing_text_is_rejected() {
    let server = MockServer::start();
    let app = app_for(&config_for(&server));
    let (status, _) = post_json(app, "/api/analyze", json!({"language": "English"})).await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_health_reports_provider() {
    let server = MockServer::start();
    let app = app_for(&config_for(&server));

    let request = Request::builder()
        .uri("/health")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["llm_provider"], json!("anthropic"));
    assert_eq!(body["ocr_enabled"], json!(true));
}
