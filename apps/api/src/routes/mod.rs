pub mod health;

use std::time::Duration;

use axum::{
    http::{header, Method},
    routing::{any, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::correction::handlers::handle_corrigir;
use crate::export::handlers::handle_exportar;
use crate::grading::handlers::handle_avaliar;
use crate::state::AppState;

/// CORS for the browser-facing auxiliary routes. `/corrigir` sets its own headers.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION])
        .max_age(Duration::from_secs(86400))
}

pub fn build_router(state: AppState) -> Router {
    let browser_routes = Router::new()
        .route("/avaliar", post(handle_avaliar))
        .route("/exportar", post(handle_exportar))
        .layer(cors_layer());

    Router::new()
        .route("/health", get(health::health_handler))
        // Proxy contract: every method lands in the handler so it can answer 405 itself
        .route("/corrigir", any(handle_corrigir))
        .merge(browser_routes)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderMap, Request, StatusCode},
    };
    use mockito::Server;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{Config, RunMode};
    use crate::grading::corpora::{GradingContext, ReferenceCorpora};
    use crate::llm_client::{CompletionClient, CompletionError, LlmClient};
    use crate::models::api::CompletionResult;

    // ── fixtures ─────────────────────────────────────────────────────────────

    enum Reply {
        Text(&'static str),
        Status(u16, &'static str),
    }

    /// Records every prompt it receives and answers with a canned reply.
    struct FakeCompletion {
        reply: Reply,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<String>>,
    }

    impl FakeCompletion {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for FakeCompletion {
        async fn complete(
            &self,
            _system: &str,
            prompt: &str,
        ) -> Result<CompletionResult, CompletionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
            match self.reply {
                Reply::Text(text) => Ok(CompletionResult {
                    text: text.to_string(),
                    model: "fake-model".to_string(),
                    usage: Some(json!({"total_tokens": 42})),
                }),
                Reply::Status(status, message) => Err(CompletionError::Api {
                    status,
                    message: message.to_string(),
                }),
            }
        }
    }

    fn test_config(run_mode: RunMode) -> Config {
        Config {
            openrouter_key: "test-key".to_string(),
            completion_url: "http://127.0.0.1:9/unused".to_string(),
            completion_timeout: Duration::from_secs(5),
            min_prompt_chars: 10,
            corpus_dir: PathBuf::from("static"),
            run_mode,
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    fn app_with(completion: Arc<dyn CompletionClient>, run_mode: RunMode) -> Router {
        build_router(AppState {
            completion,
            grading: GradingContext::new(ReferenceCorpora {
                top_scores: "CORPUS NOTA MIL".to_string(),
                mixed_scores: "CORPUS VARIADO".to_string(),
            }),
            config: test_config(run_mode),
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, body.to_vec())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_of(body: &[u8]) -> Value {
        serde_json::from_slice(body).unwrap()
    }

    fn assert_cors(headers: &HeaderMap) {
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
            "Content-Type, Authorization"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    }

    /// A JSON object well past the default 2 MiB extractor limit.
    fn oversized_post(uri: &str, field: &str) -> Request<Body> {
        let filler = "a".repeat(3 * 1024 * 1024);
        post_json(uri, json!({ "tema": "Tema", "resultado": "Nota", field: filler }))
    }

    const VALID_PROMPT: &str = "Tema: mobilidade urbana. Redação: o transporte público...";

    // ── /corrigir ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_options_is_empty_200_with_cors() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/corrigir")
            .body(Body::empty())
            .unwrap();

        let (status, headers, body) = send(app_with(fake.clone(), RunMode::Production), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.is_empty());
        assert_cors(&headers);
        assert!(headers.get(header::CACHE_CONTROL).is_none());
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_other_methods_are_405_without_body_inspection() {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let fake = FakeCompletion::new(Reply::Text("X"));
            let request = Request::builder()
                .method(method.clone())
                .uri("/corrigir")
                .body(Body::from("{definitely not json"))
                .unwrap();

            let (status, headers, body) =
                send(app_with(fake.clone(), RunMode::Production), request).await;
            assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(json_of(&body)["code"], "METHOD_NOT_ALLOWED");
            assert_eq!(json_of(&body)["status"], "error");
            assert_cors(&headers);
            assert_eq!(fake.calls(), 0);
        }
    }

    #[tokio::test]
    async fn test_non_object_body_is_invalid_body() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/corrigir")
            .body(Body::from("[\"prompt\"]"))
            .unwrap();

        let (status, _, body) = send(app_with(fake.clone(), RunMode::Production), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["code"], "INVALID_BODY");
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_body_is_invalid_body() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let request = Request::builder()
            .method(Method::POST)
            .uri("/corrigir")
            .body(Body::empty())
            .unwrap();

        let (status, _, body) = send(app_with(fake, RunMode::Production), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_short_prompts_never_reach_upstream() {
        let cases = [
            json!({}),
            json!({"prompt": ""}),
            json!({"prompt": "         "}),
            json!({"prompt": "  curto  "}),
            json!({"prompt": "123456789"}),
            json!({"prompt": 12345678901_u64}),
        ];
        for payload in cases {
            let fake = FakeCompletion::new(Reply::Text("X"));
            let (status, headers, body) = send(
                app_with(fake.clone(), RunMode::Production),
                post_json("/corrigir", payload.clone()),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
            assert_eq!(json_of(&body)["code"], "INVALID_PROMPT");
            assert_cors(&headers);
            assert_eq!(fake.calls(), 0, "{payload}");
        }
    }

    #[tokio::test]
    async fn test_upstream_success_through_http() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "model": "deepseek/deepseek-r1",
                    "choices": [{"message": {"role": "assistant", "content": "X"}}],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 1, "total_tokens": 13}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = LlmClient::new(
            "test-key".to_string(),
            format!("{}/chat/completions", server.url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let (status, headers, body) = send(
            app_with(Arc::new(client), RunMode::Production),
            post_json("/corrigir", json!({"prompt": VALID_PROMPT})),
        )
        .await;

        mock.assert_async().await;
        assert_eq!(status, StatusCode::OK);
        assert_cors(&headers);
        assert_eq!(
            headers[header::CACHE_CONTROL],
            "public, s-maxage=60, stale-while-revalidate=30"
        );

        let body = json_of(&body);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["resposta"], "X");
        assert_eq!(body["data"]["metadata"]["model"], "deepseek/deepseek-r1");
        assert_eq!(body["data"]["metadata"]["usage"]["total_tokens"], 13);
    }

    #[tokio::test]
    async fn test_upstream_429_in_development_exposes_details() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": {"message": "Rate limit exceeded: free-models-per-day"}}"#)
            .create_async()
            .await;

        let client = LlmClient::new(
            "test-key".to_string(),
            format!("{}/chat/completions", server.url()),
            Duration::from_secs(5),
        )
        .unwrap();

        let (status, headers, body) = send(
            app_with(Arc::new(client), RunMode::Development),
            post_json("/corrigir", json!({"prompt": VALID_PROMPT})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&headers);
        assert!(headers.get(header::CACHE_CONTROL).is_none());
        let body = json_of(&body);
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("Rate limit exceeded: free-models-per-day"));
    }

    #[tokio::test]
    async fn test_upstream_failure_in_production_hides_details() {
        let fake = FakeCompletion::new(Reply::Status(429, "Rate limit exceeded"));
        let (status, _, body) = send(
            app_with(fake.clone(), RunMode::Production),
            post_json("/corrigir", json!({"prompt": VALID_PROMPT})),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_of(&body);
        assert_eq!(body["code"], "INTERNAL_SERVER_ERROR");
        assert_eq!(body["message"], "Erro ao processar a correção");
        assert!(body.get("details").is_none());
        assert_eq!(fake.calls(), 1);
    }

    #[tokio::test]
    async fn test_prompt_forwarded_verbatim() {
        let fake = FakeCompletion::new(Reply::Text("ok"));
        let prompt = "  texto com espaços nas bordas  ";
        send(
            app_with(fake.clone(), RunMode::Production),
            post_json("/corrigir", json!({"prompt": prompt})),
        )
        .await;
        assert_eq!(fake.last_prompt.lock().unwrap().as_deref(), Some(prompt));
    }

    // ── /avaliar ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_avaliar_builds_prompt_and_formats_report() {
        let fake = FakeCompletion::new(Reply::Text(
            "**Nota Final: 720/1000** Detalhamento por Competência: Competência I (Norma): 160/200",
        ));
        let (status, _, body) = send(
            app_with(fake.clone(), RunMode::Production),
            post_json(
                "/avaliar",
                json!({"tema": "Mobilidade urbana", "redacao": "O transporte público brasileiro..."}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let body = json_of(&body);
        assert_eq!(body["status"], "success");
        assert!(body["data"]["resposta"].as_str().unwrap().starts_with("**Nota Final"));
        assert!(body["data"]["relatorio"]
            .as_str()
            .unwrap()
            .starts_with("===== Nota Final: 720/1000 ====="));
        assert_eq!(body["data"]["metadata"]["model"], "fake-model");

        let prompt = fake.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("CORPUS NOTA MIL"));
        assert!(prompt.contains("CORPUS VARIADO"));
        assert!(prompt.contains("Tema: Mobilidade urbana"));
        assert!(prompt.ends_with("O transporte público brasileiro..."));
    }

    #[tokio::test]
    async fn test_avaliar_short_essay_rejected_before_upstream() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let (status, _, body) = send(
            app_with(fake.clone(), RunMode::Production),
            post_json("/avaliar", json!({"tema": "Tema", "redacao": "  curta "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["code"], "INVALID_PROMPT");
        assert_eq!(fake.calls(), 0);
    }

    #[tokio::test]
    async fn test_avaliar_missing_essay_is_invalid_body() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let (status, _, body) = send(
            app_with(fake, RunMode::Production),
            post_json("/avaliar", json!({"tema": "Tema"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_of(&body)["code"], "INVALID_BODY");
    }

    #[tokio::test]
    async fn test_avaliar_preflight_handled_by_cors_layer() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/avaliar")
            .header(header::ORIGIN, "https://corretor.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let (status, headers, _) = send(app_with(fake.clone(), RunMode::Production), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(fake.calls(), 0);
    }

    // ── /exportar ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_exportar_returns_attachment() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let (status, headers, body) = send(
            app_with(fake, RunMode::Production),
            post_json(
                "/exportar",
                json!({
                    "resultado": "===== Nota Final: 720/1000 =====",
                    "tema": "Mobilidade urbana",
                    "aluno": "João",
                    "turma": "3A"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers[header::CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Correcao_Jo_o_3A.txt\""
        );
        let text = String::from_utf8(body).unwrap();
        assert!(text.starts_with("Avaliação da Redação - ENEM\nAluno: João | Turma: 3A | Data: "));
        assert!(text.contains("===== Nota Final: 720/1000 ====="));
    }

    #[tokio::test]
    async fn test_exportar_refuses_placeholder() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let (status, _, body) = send(
            app_with(fake, RunMode::Production),
            post_json(
                "/exportar",
                json!({"resultado": "Aguardando correção...", "tema": "Tema"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json_of(&body)["code"], "NO_RESULT_TO_EXPORT");
    }

    // ── oversized bodies ─────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_oversized_body_is_invalid_body_on_every_route() {
        for (uri, field) in [
            ("/corrigir", "prompt"),
            ("/avaliar", "redacao"),
            ("/exportar", "resultado"),
        ] {
            let fake = FakeCompletion::new(Reply::Text("X"));
            let (status, _, body) = send(
                app_with(fake.clone(), RunMode::Production),
                oversized_post(uri, field),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            let body = json_of(&body);
            assert_eq!(body["status"], "error", "{uri}");
            assert_eq!(body["code"], "INVALID_BODY", "{uri}");
            assert_eq!(fake.calls(), 0, "{uri}");
        }
    }

    // ── /health ──────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_health() {
        let fake = FakeCompletion::new(Reply::Text("X"));
        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(app_with(fake, RunMode::Production), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_of(&body)["status"], "ok");
    }
}
