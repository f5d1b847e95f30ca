use serde::Deserialize;
use serde_json::Value;

/// Raw `/reason` body as received. Fields stay untyped until the token has
/// been checked, so a malformed body still fails as `auth` first.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReasonBody {
    #[serde(default)]
    pub token: Value,
    #[serde(default)]
    pub prompt: Value,
    #[serde(default)]
    pub model: Value,
    #[serde(default)]
    pub temperature: Value,
}

/// Validated request handed to the payload builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonRequest {
    pub prompt: String,
    pub model: String,
    pub temperature: Option<f64>,
}

impl ReasonBody {
    /// Anything that is not a JSON object becomes an empty body.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_str()
    }

    pub fn validate(&self) -> Result<ReasonRequest, String> {
        let prompt = match &self.prompt {
            Value::String(s) => s.clone(),
            _ => return Err("Invalid field: prompt must be a string".into()),
        };
        let model = match &self.model {
            Value::String(s) if !s.is_empty() => s.clone(),
            _ => return Err("Invalid field: model must be a non-empty string".into()),
        };
        let temperature = match &self.temperature {
            Value::Null => None,
            Value::Number(n) => n.as_f64(),
            _ => return Err("Invalid field: temperature must be a number".into()),
        };
        Ok(ReasonRequest {
            prompt,
            model,
            temperature,
        })
    }
}
