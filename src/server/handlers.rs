use axum::{
    Router,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

use crate::server::AppState;
use crate::server::reason::{handle_reason, reject_unreadable_body};
use crate::server::reason_request::ReasonBody;
use crate::server::reason_response::NormalizedResult;
use crate::server::request_logging::log_reason_request;
use crate::server::util::bearer_token;

pub const ROUTES: [&str; 4] = ["/", "/health", "/diag", "/reason"];

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/diag", get(diag))
        .route("/reason", post(reason))
}

async fn root() -> Json<Value> {
    Json(json!({ "ok": true, "routes": ROUTES }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

// 仅报告密钥是否存在，绝不回显其值
async fn diag(State(app_state): State<Arc<AppState>>) -> Json<Value> {
    let credentials = &app_state.config.credentials;
    Json(json!({
        "ok": true,
        "env_openai": credentials.openai_api_key.is_some(),
        "env_token": credentials.proxy_token_configured,
    }))
}

// 始终返回 200，成功与否由响应体中的 ok 字段表达
async fn reason(
    State(app_state): State<Arc<AppState>>,
    headers: HeaderMap,
    raw: Result<Bytes, BytesRejection>,
) -> Json<NormalizedResult> {
    let start_time = Utc::now();
    let request_id = Uuid::new_v4();
    let header_token = bearer_token(&headers);

    let raw = match raw {
        Ok(raw) => raw,
        Err(rejection) => {
            let result = reject_unreadable_body(
                &app_state,
                header_token.as_deref(),
                &rejection.body_text(),
            );
            log_reason_request(request_id, start_time, None, &result);
            return Json(result);
        }
    };

    let body = ReasonBody::from_bytes(&raw);
    let result = handle_reason(&app_state, &body, header_token.as_deref()).await;

    log_reason_request(request_id, start_time, body.model.as_str(), &result);

    Json(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Credentials, Settings};
    use crate::providers::openai::{ResponsesRequest, Upstream, UpstreamOutcome};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct CountingUpstream {
        calls: AtomicUsize,
        body: &'static str,
    }

    #[async_trait]
    impl Upstream for CountingUpstream {
        async fn send(&self, _payload: &ResponsesRequest, _api_key: &str) -> UpstreamOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            UpstreamOutcome::Success {
                status: 200,
                body: self.body.to_string(),
            }
        }
    }

    fn app(api_key: Option<&str>, proxy_token: Option<&str>) -> (Router, Arc<CountingUpstream>) {
        let upstream = Arc::new(CountingUpstream {
            calls: AtomicUsize::new(0),
            body: r#"{"output_text":"hello","usage":{"total_tokens":5}}"#,
        });
        let config = Settings {
            credentials: Credentials {
                openai_api_key: api_key.map(|k| k.to_string()),
                proxy_token: proxy_token.unwrap_or("secret").to_string(),
                proxy_token_configured: proxy_token.is_some(),
            },
            ..Default::default()
        };
        let state = Arc::new(AppState {
            config,
            upstream: upstream.clone(),
        });
        (routes().with_state(state), upstream)
    }

    async fn body_json(res: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        (status, body_json(res).await)
    }

    async fn post_reason(
        app: Router,
        body: impl Into<Body>,
        content_type: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("POST").uri("/reason");
        if let Some(ct) = content_type {
            builder = builder.header("content-type", ct);
        }
        let res = app.oneshot(builder.body(body.into()).unwrap()).await.unwrap();
        let status = res.status();
        (status, body_json(res).await)
    }

    #[tokio::test]
    async fn root_lists_routes() {
        let (app, _) = app(None, None);
        let (status, v) = get_json(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, json!({"ok": true, "routes": ["/", "/health", "/diag", "/reason"]}));
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (app, _) = app(None, None);
        let (status, v) = get_json(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn diag_reports_presence_only() {
        let (app_without, _) = app(None, None);
        let (_, v) = get_json(app_without, "/diag").await;
        assert_eq!(v, json!({"ok": true, "env_openai": false, "env_token": false}));

        let (app_with, _) = app(Some("sk-very-secret"), Some("proxy-very-secret"));
        let (_, v) = get_json(app_with, "/diag").await;
        assert_eq!(v, json!({"ok": true, "env_openai": true, "env_token": true}));
        let rendered = v.to_string();
        assert!(!rendered.contains("very-secret"));
    }

    #[tokio::test]
    async fn reason_success_over_http() {
        let (app, upstream) = app(Some("sk"), Some("tok"));
        let body = json!({"token": "tok", "prompt": "hi", "model": "gpt-5-thinking"}).to_string();
        let (status, v) = post_reason(app, body, Some("application/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            v,
            json!({"ok": true, "text": "hello", "tokens_used": 5, "model_used": "gpt-5-thinking"})
        );
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reason_failures_are_still_http_200() {
        let (app_bad_token, upstream) = app(Some("sk"), Some("tok"));
        let body = json!({"token": "nope", "prompt": "hi", "model": "o3"}).to_string();
        let (status, v) = post_reason(app_bad_token, body, Some("application/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            v,
            json!({"ok": false, "where": "auth", "error": "Bad token in body (token field)"})
        );
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);

        // neither a JSON body nor a content type: still a structured auth failure
        let (app_garbage, _) = app(Some("sk"), Some("tok"));
        let (status, v) = post_reason(app_garbage, "garbage", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v["where"], "auth");

        let (app_no_key, _) = app(None, Some("tok"));
        let body = json!({"token": "tok", "prompt": "hi", "model": "o3"}).to_string();
        let (status, v) = post_reason(app_no_key, body, Some("application/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(v, json!({"ok": false, "where": "env", "error": "Missing OPENAI_API_KEY"}));
    }

    #[tokio::test]
    async fn oversized_body_still_answers_with_normalized_result() {
        let prompt = "p".repeat(3_000_000);
        let payload = json!({"token": "tok", "prompt": prompt, "model": "o3"}).to_string();

        // body unreadable, so its token field is never seen
        let (app_no_header, upstream) = app(Some("sk"), Some("tok"));
        let (status, v) =
            post_reason(app_no_header, payload.clone(), Some("application/json")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            v,
            json!({"ok": false, "where": "auth", "error": "Bad token in body (token field)"})
        );
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);

        let (app_with_header, upstream) = app(Some("sk"), Some("tok"));
        let req = Request::builder()
            .method("POST")
            .uri("/reason")
            .header("content-type", "application/json")
            .header("authorization", "Bearer tok")
            .body(Body::from(payload))
            .unwrap();
        let res = app_with_header.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let v = body_json(res).await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["where"], "input");
        assert!(v["error"].as_str().unwrap().starts_with("Request body rejected"));
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reason_accepts_bearer_header() {
        let (app, _) = app(Some("sk"), Some("tok"));
        let req = Request::builder()
            .method("POST")
            .uri("/reason")
            .header("content-type", "application/json")
            .header("authorization", "Bearer tok")
            .body(Body::from(json!({"prompt": "hi", "model": "o3"}).to_string()))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let v = body_json(res).await;
        assert_eq!(v["ok"], true);
    }
}
