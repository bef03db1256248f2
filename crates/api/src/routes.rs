use axum::{
    body::Bytes,
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use autofill::{AutofillError, AutofillRequest, Autofiller, OpenAiClient, TemplateStore};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metrics::{Metrics, MetricsSnapshot, TimedOperation};

#[derive(Clone)]
pub struct AppState {
    autofiller: Arc<Autofiller>,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> Self {
        let llm_client = OpenAiClient::new(
            config.base_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
        );
        let templates = TemplateStore::new(config.template_path.clone());

        Self {
            autofiller: Arc::new(Autofiller::new(templates, llm_client)),
            metrics: Metrics::new(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    model: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/autofill", post(autofill))
        .route("/health", get(health_check))
        .route("/stats", get(get_stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// The body is taken raw so that a missing `input_text` surfaces as a 500
// instead of axum's 422 JSON rejection.
async fn autofill(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let timer = TimedOperation::start();
    let result = run_autofill(&state.autofiller, &body).await;
    state.metrics.record_autofill(timer.elapsed(), result.as_ref().err());

    Ok(Json(result?))
}

async fn run_autofill(autofiller: &Autofiller, body: &[u8]) -> Result<Value, AutofillError> {
    let request = AutofillRequest::from_slice(body)?;
    autofiller.autofill(&request.text()).await
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.autofiller.model().to_string(),
    })
}

async fn get_stats(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use std::path::PathBuf;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer, template_path: PathBuf) -> AppConfig {
        AppConfig {
            api_key: "test-key".to_string(),
            model: "gpt-4o".to_string(),
            base_url: server.uri(),
            template_path,
            bind_addr: "127.0.0.1:0".to_string(),
            log_json: false,
        }
    }

    fn write_template(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("sample.json");
        std::fs::write(&path, r#"{"personalInfo": {"firstName": ""}, "consentToTreatment": false}"#)
            .unwrap();
        path
    }

    async fn completion_server(content: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": content}}]
            })))
            .mount(&server)
            .await;
        server
    }

    fn autofill_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/autofill")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn fenced_completion_returns_parsed_object() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("```json\n{\"a\":1}\n```").await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app
            .oneshot(autofill_request(r#"{"input_text": "Jane Roe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"a": 1}));
    }

    #[tokio::test]
    async fn unfenced_completion_returns_parsed_object() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("{\"a\":1}").await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app
            .oneshot(autofill_request(r#"{"input_text": "Jane Roe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"a": 1}));
    }

    #[tokio::test]
    async fn invalid_completion_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("not json").await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app
            .oneshot(autofill_request(r#"{"input_text": "Jane Roe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"detail": "The AI service returned an invalid format."})
        );
    }

    #[tokio::test]
    async fn missing_template_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("{}").await;
        let config = test_config(&server, dir.path().join("sample.json"));

        for input in ["", "Jane Roe", "```json {} ```"] {
            let app = router(AppState::from_config(&config));
            let body = json!({"input_text": input}).to_string();
            let response = app.oneshot(autofill_request(&body)).await.unwrap();

            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(
                json_body(response).await,
                json!({"detail": "Server configuration error: 'sample.json' not found."})
            );
        }
    }

    #[tokio::test]
    async fn missing_input_text_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("{}").await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app
            .oneshot(autofill_request(r#"{"text": "Jane Roe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.starts_with("An internal server error occurred: "));
        assert!(detail.contains("input_text"));
    }

    #[tokio::test]
    async fn upstream_error_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .mount(&server)
            .await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app
            .oneshot(autofill_request(r#"{"input_text": "Jane Roe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("An internal server error occurred: "));
    }

    #[tokio::test]
    async fn non_string_input_text_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("{\"a\":1}").await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app
            .oneshot(autofill_request(r#"{"input_text": 42}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"a": 1}));

        let requests = server.received_requests().await.unwrap();
        let sent: Value = requests[0].body_json().unwrap();
        assert!(sent["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Text: 42."));
    }

    #[tokio::test]
    async fn unreachable_completion_service_is_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let mut config = test_config(&server, write_template(&dir));
        let closed = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        config.base_url = format!("http://{closed}");
        let app = router(AppState::from_config(&config));

        let response = app
            .oneshot(autofill_request(r#"{"input_text": "Jane Roe"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["detail"]
            .as_str()
            .unwrap()
            .starts_with("An internal server error occurred: Failed to send request"));
    }

    #[tokio::test]
    async fn health_reports_model() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let response = app.oneshot(get_request("/health")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok", "model": "gpt-4o"}));
    }

    #[tokio::test]
    async fn stats_reflect_previous_calls() {
        let dir = tempfile::tempdir().unwrap();
        let server = completion_server("{\"a\":1}").await;
        let state = AppState::from_config(&test_config(&server, write_template(&dir)));

        router(state.clone())
            .oneshot(autofill_request(r#"{"input_text": "Jane Roe"}"#))
            .await
            .unwrap();
        router(state.clone())
            .oneshot(autofill_request("{}"))
            .await
            .unwrap();

        let response = router(state).oneshot(get_request("/stats")).await.unwrap();
        let stats = json_body(response).await;
        assert_eq!(stats["total_requests"], 2);
        assert_eq!(stats["successful_requests"], 1);
        assert_eq!(stats["failed_requests"], 1);
        assert_eq!(stats["internal_errors"], 1);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let dir = tempfile::tempdir().unwrap();
        let server = MockServer::start().await;
        let app = router(AppState::from_config(&test_config(&server, write_template(&dir))));

        let request = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:5173")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
