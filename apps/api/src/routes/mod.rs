pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::render::handlers::handle_render;
use crate::state::AppState;
use crate::suggestions::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Suggestions API
        .route(
            "/api/v1/keywords",
            post(handlers::handle_extract_keywords),
        )
        .route("/api/v1/suggestions", post(handlers::handle_suggest))
        .route("/api/v1/suggestions/apply", post(handlers::handle_apply))
        // Render API
        .route("/api/v1/render", post(handle_render))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::render::{RenderError, Renderer};
    use crate::suggestions::generation::stub::StubGenerator;

    struct StubRenderer {
        fail: bool,
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        async fn render(&self, _source: &str) -> Result<Vec<u8>, RenderError> {
            if self.fail {
                return Err(RenderError::Compilation {
                    log_tail: "! Missing } inserted.".to_string(),
                });
            }
            Ok(b"%PDF-1.5".to_vec())
        }
    }

    fn test_config() -> Config {
        Config {
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            max_suggestions_per_keyword: 2,
            max_keywords: 10,
            generation_timeout: Duration::from_secs(5),
            render_timeout: Duration::from_secs(5),
            latexmk_bin: "latexmk".to_string(),
        }
    }

    fn app(generator: StubGenerator, render_fails: bool) -> Router {
        build_router(AppState {
            config: test_config(),
            generator: Arc::new(generator),
            renderer: Arc::new(StubRenderer { fail: render_fails }),
        })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn edit(id: &str, target: &str, replacement: &str) -> Value {
        json!({
            "id": id,
            "type": "replace",
            "target_text": target,
            "replacement_text": replacement,
            "description": "",
            "keywords_used": ["Rust"]
        })
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(StubGenerator::default(), false)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_apply_endpoint_reports_partial_success() {
        let (status, body) = post_json(
            app(StubGenerator::default(), false),
            "/api/v1/suggestions/apply",
            json!({
                "document_content": "Languages: Java, Go",
                "suggestions": [
                    edit("ok", "Go", "Go, Rust"),
                    edit("bad", "Java", r"\textbf{Java"),
                    {"id": "broken"}
                ]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document_text"], "Languages: Java, Go, Rust");
        assert_eq!(body["summary"]["applied"], 1);
        assert_eq!(body["summary"]["rejected"], 1);
        assert_eq!(body["schema_errors"][0]["id"], "broken");
        assert_eq!(body["suggestions"][1]["outcome"]["status"], "rejected");
        assert!(body["batch_id"].is_string());
    }

    #[tokio::test]
    async fn test_suggest_endpoint_uses_generator() {
        let generator = StubGenerator {
            records: vec![edit("ok", "Go", "Go, Rust")],
            ..Default::default()
        };
        let (status, body) = post_json(
            app(generator, false),
            "/api/v1/suggestions",
            json!({
                "document_content": "Languages: Java, Go",
                "selected_keywords": ["Rust"],
                "document_type": "coverLetter"
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["changed"], true);
        assert_eq!(body["selected_keywords"], json!(["Rust"]));
    }

    #[tokio::test]
    async fn test_suggest_endpoint_normalizes_selected_keywords() {
        let generator = StubGenerator {
            records: vec![edit("ok", "Go", "Go, Rust")],
            ..Default::default()
        };
        let (status, body) = post_json(
            app(generator, false),
            "/api/v1/suggestions",
            json!({
                "document_content": "Languages: Java, Go",
                "selected_keywords": [" Rust ", "rust", "", "Tokio"]
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selected_keywords"], json!(["Rust", "Tokio"]));
    }

    #[tokio::test]
    async fn test_suggest_endpoint_requires_keywords() {
        let (status, body) = post_json(
            app(StubGenerator::default(), false),
            "/api/v1/suggestions",
            json!({"document_content": "text", "selected_keywords": []}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_suggest_endpoint_surfaces_generation_failure() {
        let generator = StubGenerator {
            fail: true,
            ..Default::default()
        };
        let (status, _) = post_json(
            app(generator, false),
            "/api/v1/suggestions",
            json!({"document_content": "text", "selected_keywords": ["Rust"]}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_keywords_endpoint() {
        let generator = StubGenerator {
            keywords: vec!["Rust".into(), "Tokio".into()],
            ..Default::default()
        };
        let (status, body) = post_json(
            app(generator, false),
            "/api/v1/keywords",
            json!({"job_posting": "Rust and Tokio engineer"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["keywords"], json!(["Rust", "Tokio"]));
    }

    #[tokio::test]
    async fn test_keywords_endpoint_rejects_empty_posting() {
        let (status, _) = post_json(
            app(StubGenerator::default(), false),
            "/api/v1/keywords",
            json!({"job_posting": "   "}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_render_endpoint_encodes_pdf() {
        let (status, body) = post_json(
            app(StubGenerator::default(), false),
            "/api/v1/render",
            json!({"latex_content": r"\documentclass{article}"}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["size_bytes"], 8);
        assert_eq!(body["pdf_base64"], "JVBERi0xLjU=");
    }

    #[tokio::test]
    async fn test_render_failure_is_reported_not_fatal() {
        let (status, body) = post_json(
            app(StubGenerator::default(), true),
            "/api/v1/render",
            json!({"latex_content": r"\documentclass{article"}),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "RENDER_FAILED");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Missing }"));
    }
}
