//! Best-effort extraction of answer text and token usage from a Responses API
//! body. The upstream shape differs between model families and is not stable,
//! so every step here is total: a mismatch yields `None` and the next step is
//! tried, down to a raw dump of whatever came back.

use serde_json::Value;

use crate::server::util::truncate_chars;

pub const RAW_TEXT_FALLBACK_CHARS: usize = 300;
pub const JSON_DUMP_FALLBACK_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub tokens_used: u64,
    /// False when the body was not JSON and `text` is a raw prefix of it.
    pub parsed: bool,
}

type Extractor = fn(&Value) -> Option<String>;

const EXTRACTORS: [Extractor; 2] = [output_text, first_output_content_text];

pub fn normalize(raw: &str) -> Normalized {
    let value: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(_) => {
            return Normalized {
                text: truncate_chars(raw, RAW_TEXT_FALLBACK_CHARS).to_string(),
                tokens_used: 0,
                parsed: false,
            };
        }
    };

    let text = EXTRACTORS
        .iter()
        .find_map(|extract| extract(&value))
        .unwrap_or_else(|| json_dump(&value));

    Normalized {
        text,
        tokens_used: total_tokens(&value),
        parsed: true,
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_string()) }
}

// {"output_text": "..."}
fn output_text(value: &Value) -> Option<String> {
    value.get("output_text")?.as_str().and_then(non_empty)
}

// {"output": [{"content": [{"text": "..."}]}]}
fn first_output_content_text(value: &Value) -> Option<String> {
    value
        .get("output")?
        .as_array()?
        .first()?
        .get("content")?
        .as_array()?
        .first()?
        .get("text")?
        .as_str()
        .and_then(non_empty)
}

fn json_dump(value: &Value) -> String {
    let rendered = value.to_string();
    truncate_chars(&rendered, JSON_DUMP_FALLBACK_CHARS).to_string()
}

fn total_tokens(value: &Value) -> u64 {
    value
        .get("usage")
        .and_then(|u| u.get("total_tokens"))
        .and_then(Value::as_u64)
        .unwrap_or(0)
}
