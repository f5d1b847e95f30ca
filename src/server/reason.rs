use crate::providers::openai::{UpstreamOutcome, build_payload};
use crate::server::AppState;
use crate::server::auth::{BAD_TOKEN_MESSAGE, authenticate};
use crate::server::normalize::normalize;
use crate::server::reason_request::ReasonBody;
use crate::server::reason_response::{FailureStage, NormalizedResult};
use crate::server::util::token_fingerprint;

pub const TIMEOUT_MESSAGE: &str = "Timeout calling OpenAI";
pub const MISSING_KEY_MESSAGE: &str = "Missing OPENAI_API_KEY";

/// One `/reason` call: auth → input checks → env check → upstream → normalize.
///
/// Every early exit is a `NormalizedResult::Failure`; nothing here returns an
/// error to the transport layer. The body `token` field wins over the
/// `Authorization: Bearer` header when both are present.
pub async fn handle_reason(
    state: &AppState,
    body: &ReasonBody,
    header_token: Option<&str>,
) -> NormalizedResult {
    let supplied = body.token().or(header_token);
    if !authenticate(supplied, &state.config.credentials.proxy_token) {
        if let Some(tok) = supplied {
            tracing::debug!(token_fp = %token_fingerprint(tok), "rejected proxy token");
        }
        return NormalizedResult::failure(FailureStage::Auth, BAD_TOKEN_MESSAGE);
    }

    let request = match body.validate() {
        Ok(r) => r,
        Err(msg) => return NormalizedResult::failure(FailureStage::Input, msg),
    };

    if !state.config.models.permits(&request.model) {
        return NormalizedResult::failure(
            FailureStage::Input,
            format!("Model not allowed: {}", request.model),
        );
    }

    let Some(api_key) = state.config.credentials.openai_api_key.as_deref() else {
        return NormalizedResult::failure(FailureStage::Env, MISSING_KEY_MESSAGE);
    };

    let payload = build_payload(&request.model, &request.prompt, request.temperature);

    match state.upstream.send(&payload, api_key).await {
        UpstreamOutcome::TimedOut => {
            NormalizedResult::failure(FailureStage::OpenAI, TIMEOUT_MESSAGE)
        }
        UpstreamOutcome::TransportError(detail) => {
            NormalizedResult::failure(FailureStage::OpenAI, detail)
        }
        UpstreamOutcome::Success { status, body } if !(200..300).contains(&status) => {
            NormalizedResult::upstream_failure(status, body)
        }
        UpstreamOutcome::Success { status, body } => {
            let normalized = normalize(&body);
            if !normalized.parsed {
                return NormalizedResult::upstream_failure(
                    status,
                    format!("Invalid JSON from OpenAI: {}", normalized.text),
                );
            }
            NormalizedResult::success(normalized.text, normalized.tokens_used, request.model)
        }
    }
}

/// The body could not be read at all (e.g. over the size limit). Only the
/// header token can be checked; past that the caller gets an `input` failure.
pub fn reject_unreadable_body(
    state: &AppState,
    header_token: Option<&str>,
    detail: &str,
) -> NormalizedResult {
    if !authenticate(header_token, &state.config.credentials.proxy_token) {
        return NormalizedResult::failure(FailureStage::Auth, BAD_TOKEN_MESSAGE);
    }
    NormalizedResult::failure(
        FailureStage::Input,
        format!("Request body rejected: {}", detail),
    )
}
