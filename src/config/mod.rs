pub mod settings;

pub use settings::{Credentials, ModelPolicy, ServerConfig, Settings, UpstreamConfig};
