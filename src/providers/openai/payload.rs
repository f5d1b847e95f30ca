use super::types::{InputMessage, ReasoningOptions, ResponsesRequest};

/// Models that take a reasoning budget instead of a sampling temperature.
pub const REASONING_MODELS: [&str; 3] = ["o3", "o3-pro", "gpt-5-thinking"];

pub const REASONING_EFFORT: &str = "medium";
pub const REASONING_MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelClass {
    Reasoning,
    Conventional,
}

impl ModelClass {
    /// Exact, case-sensitive membership in [`REASONING_MODELS`].
    pub fn of(model: &str) -> Self {
        if REASONING_MODELS.contains(&model) {
            ModelClass::Reasoning
        } else {
            ModelClass::Conventional
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelClass::Reasoning => "reasoning",
            ModelClass::Conventional => "conventional",
        }
    }
}

pub fn build_payload(model: &str, prompt: &str, temperature: Option<f64>) -> ResponsesRequest {
    let input = vec![InputMessage::user(prompt)];
    match ModelClass::of(model) {
        ModelClass::Conventional => ResponsesRequest {
            model: model.to_string(),
            input,
            temperature,
            reasoning: None,
            max_output_tokens: None,
        },
        // temperature is dropped: reasoning models reject it upstream
        ModelClass::Reasoning => ResponsesRequest {
            model: model.to_string(),
            input,
            temperature: None,
            reasoning: Some(ReasoningOptions {
                effort: REASONING_EFFORT,
            }),
            max_output_tokens: Some(REASONING_MAX_OUTPUT_TOKENS),
        },
    }
}
