pub mod auth;
pub mod handlers;
pub mod normalize;
pub mod reason;
pub mod reason_request;
pub mod reason_response;
pub(crate) mod request_logging;
pub(crate) mod util;

use crate::config::Settings;
use crate::error::Result as AppResult;
use crate::providers::openai::{ResponsesClient, Upstream};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Settings,
    pub upstream: Arc<dyn Upstream + Send + Sync>,
}

pub fn create_app(config: Settings) -> AppResult<Router> {
    let upstream = ResponsesClient::new(&config.upstream.url, config.upstream.timeout())?;
    tracing::info!(
        "Upstream endpoint {} (timeout {}s)",
        upstream.url(),
        config.upstream.timeout_secs
    );

    if !config.credentials.proxy_token_configured {
        tracing::warn!(
            "PROXY_TOKEN is not set; falling back to the placeholder token. \
             Do not run like this in production."
        );
    }
    if config.credentials.openai_api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; /reason will answer with an env failure");
    }
    match &config.models.allowed {
        Some(list) => tracing::info!("Model allow-list active: {:?}", list),
        None => tracing::info!("No model allow-list configured; any model is forwarded"),
    }

    Ok(build_router(AppState {
        config,
        upstream: Arc::new(upstream),
    }))
}

pub fn build_router(app_state: AppState) -> Router {
    let mut app = handlers::routes().with_state(Arc::new(app_state));

    // CORS（便于浏览器端直接调用；生产应收敛来源）
    use axum::http::{Method, header};
    use tower_http::cors::{AllowOrigin, CorsLayer};
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(AllowOrigin::any());
    app = app.layer(cors).layer(TraceLayer::new_for_http());

    app
}
