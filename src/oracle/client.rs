//! 评分服务客户端（基础设施层）
//!
//! 唯一的网络出口。请求失败、超时、非成功状态码都向上传播，绝不在
//! 这一层转换成 0 分结果。

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{AppError, AppResult, OracleError};
use crate::models::{OracleResponse, ReconciledEvaluationRequest};

/// 评分服务客户端
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: u64,
}

impl OracleClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout_secs,
        }
    }

    /// 提交评估请求并解析响应
    pub async fn evaluate(&self, request: &ReconciledEvaluationRequest) -> AppResult<OracleResponse> {
        debug!(
            "提交评估请求: {} (选择题 {} 条, 简答题 {} 条)",
            self.endpoint,
            request.student_submission.mcqs.len(),
            request.student_submission.short_questions.len()
        );

        let send = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send();

        let response = tokio::time::timeout(Duration::from_secs(self.timeout_secs), send)
            .await
            .map_err(|_| AppError::oracle_timeout(&self.endpoint, self.timeout_secs))?
            .map_err(|e| AppError::oracle_request_failed(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Oracle(OracleError::BadStatus {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            }));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::oracle_request_failed(&self.endpoint, e))?;
        let parsed: OracleResponse = serde_json::from_str(&body)?;

        info!("✅ 评分服务返回成功: {}", self.endpoint);
        Ok(parsed)
    }
}
