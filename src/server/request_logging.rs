use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::providers::openai::ModelClass;
use crate::server::reason_response::NormalizedResult;

// 记录 /reason 请求日志（耗时、结果阶段与 token 使用情况），不包含任何密钥或提示词
pub fn log_reason_request(
    request_id: Uuid,
    start_time: DateTime<Utc>,
    model: Option<&str>,
    result: &NormalizedResult,
) {
    let response_time_ms = (Utc::now() - start_time).num_milliseconds();
    let model_class = model.map(|m| ModelClass::of(m).as_str());

    match result {
        NormalizedResult::Success { tokens_used, .. } => {
            tracing::info!(
                request_id = %request_id,
                model = model.unwrap_or("-"),
                model_class = model_class.unwrap_or("-"),
                tokens_used = *tokens_used,
                response_time_ms,
                "reason request completed"
            );
        }
        NormalizedResult::Failure { stage, status, .. } => {
            tracing::warn!(
                request_id = %request_id,
                model = model.unwrap_or("-"),
                model_class = model_class.unwrap_or("-"),
                stage = stage.as_str(),
                upstream_status = status.map(i64::from).unwrap_or(-1),
                response_time_ms,
                "reason request failed"
            );
        }
    }
}
