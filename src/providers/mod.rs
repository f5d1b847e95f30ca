pub mod openai;

pub use openai::{ResponsesClient, Upstream, UpstreamOutcome};
