pub mod client;
pub mod payload;
pub mod types;

pub use client::{ResponsesClient, Upstream, UpstreamOutcome};
pub use payload::{ModelClass, REASONING_MODELS, build_payload};
pub use types::{InputMessage, ReasoningOptions, ResponsesRequest};
