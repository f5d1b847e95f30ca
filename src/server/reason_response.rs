use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::server::util::truncate_chars;

pub const MAX_ERROR_CHARS: usize = 500;

/// Pipeline stage a failure is attributed to; serialized as the `where` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Auth,
    Input,
    Env,
    OpenAI,
}

impl FailureStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureStage::Auth => "auth",
            FailureStage::Input => "input",
            FailureStage::Env => "env",
            FailureStage::OpenAI => "openai",
        }
    }
}

/// The only value `/reason` ever returns.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedResult {
    Success {
        text: String,
        tokens_used: u64,
        model_used: String,
    },
    Failure {
        stage: FailureStage,
        error: String,
        status: Option<u16>,
    },
}

impl NormalizedResult {
    pub fn success(text: String, tokens_used: u64, model_used: impl Into<String>) -> Self {
        NormalizedResult::Success {
            text,
            tokens_used,
            model_used: model_used.into(),
        }
    }

    pub fn failure(stage: FailureStage, error: impl AsRef<str>) -> Self {
        NormalizedResult::Failure {
            stage,
            error: truncate_chars(error.as_ref(), MAX_ERROR_CHARS).to_string(),
            status: None,
        }
    }

    pub fn upstream_failure(status: u16, error: impl AsRef<str>) -> Self {
        NormalizedResult::Failure {
            stage: FailureStage::OpenAI,
            error: truncate_chars(error.as_ref(), MAX_ERROR_CHARS).to_string(),
            status: Some(status),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, NormalizedResult::Success { .. })
    }

    pub fn stage(&self) -> Option<FailureStage> {
        match self {
            NormalizedResult::Success { .. } => None,
            NormalizedResult::Failure { stage, .. } => Some(*stage),
        }
    }
}

impl Serialize for NormalizedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NormalizedResult::Success {
                text,
                tokens_used,
                model_used,
            } => {
                let mut s = serializer.serialize_struct("NormalizedResult", 4)?;
                s.serialize_field("ok", &true)?;
                s.serialize_field("text", text)?;
                s.serialize_field("tokens_used", tokens_used)?;
                s.serialize_field("model_used", model_used)?;
                s.end()
            }
            NormalizedResult::Failure {
                stage,
                error,
                status,
            } => {
                let len = if status.is_some() { 4 } else { 3 };
                let mut s = serializer.serialize_struct("NormalizedResult", len)?;
                s.serialize_field("ok", &false)?;
                s.serialize_field("where", stage.as_str())?;
                if let Some(code) = status {
                    s.serialize_field("status", code)?;
                }
                s.serialize_field("error", error)?;
                s.end()
            }
        }
    }
}
