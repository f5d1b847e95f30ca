use std::time::Duration;

use async_trait::async_trait;

use crate::error::GatewayError;
use crate::http_client::client_for_url_with_timeout;

use super::types::ResponsesRequest;

/// Result of one outbound call. Transport failures are data, not errors:
/// any HTTP response, whatever its status, is a `Success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamOutcome {
    Success { status: u16, body: String },
    TimedOut,
    TransportError(String),
}

#[async_trait]
pub trait Upstream: Send + Sync {
    async fn send(&self, payload: &ResponsesRequest, api_key: &str) -> UpstreamOutcome;
}

pub struct ResponsesClient {
    client: reqwest::Client,
    url: String,
}

impl ResponsesClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = client_for_url_with_timeout(url, timeout)?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Upstream for ResponsesClient {
    async fn send(&self, payload: &ResponsesRequest, api_key: &str) -> UpstreamOutcome {
        let response = match self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .header("Accept", "application/json")
            .json(payload)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return classify_reqwest_error(&e),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => UpstreamOutcome::Success { status, body },
            Err(e) => classify_reqwest_error(&e),
        }
    }
}

fn classify_reqwest_error(err: &reqwest::Error) -> UpstreamOutcome {
    if err.is_timeout() {
        return UpstreamOutcome::TimedOut;
    }
    let kind = if err.is_connect() {
        "ConnectError"
    } else if err.is_redirect() {
        "RedirectError"
    } else if err.is_body() || err.is_decode() {
        "BodyError"
    } else if err.is_request() {
        "RequestError"
    } else {
        "TransportError"
    };
    UpstreamOutcome::TransportError(format!("{}: {}", kind, error_chain(err)))
}

fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
