//! 文本生成服务抽象
//!
//! 所有后端（OpenAI 兼容 / Mock / Scripted）实现 LlmClient::complete；
//! TimedLlmClient 在外层统一施加超时，保证任何一次调用都不会让会话无限挂起。

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::time::timeout;

use crate::llm::Message;

/// 生成服务调用失败（传输 / 服务端 / 超时 / 空响应）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("generation service error: {0}")]
    Api(String),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation service returned an empty response")]
    EmptyResponse,
}

/// LLM 客户端 trait：非流式完成，返回原始文本
///
/// 多个会话共享同一个句柄，因此必须 Send + Sync 且无会话内状态。
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError>;

    /// 累计 token 使用：(prompt, completion, total)；默认 (0, 0, 0)
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}

/// 超时包装：超时或空白响应都视为失败
#[derive(Clone)]
pub struct TimedLlmClient {
    inner: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl TimedLlmClient {
    pub fn new(inner: Arc<dyn LlmClient>, timeout_secs: u64) -> Self {
        Self::with_timeout(inner, Duration::from_secs(timeout_secs))
    }

    pub fn with_timeout(inner: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn token_usage(&self) -> (u64, u64, u64) {
        self.inner.token_usage()
    }

    /// 在超时内调用底层客户端；`purpose` 仅用于日志
    pub async fn complete(&self, purpose: &str, messages: &[Message]) -> Result<String, LlmError> {
        let start = Instant::now();
        let result = timeout(self.timeout, self.inner.complete(messages)).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let outcome = match result {
            Ok(Ok(text)) if text.trim().is_empty() => Err(LlmError::EmptyResponse),
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(LlmError::Timeout(self.timeout)),
        };

        match &outcome {
            Ok(text) => tracing::debug!(purpose, duration_ms, chars = text.len(), "generation ok"),
            Err(e) => tracing::warn!(purpose, duration_ms, error = %e, "generation failed"),
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ScriptedLlmClient, SlowLlmClient};

    #[tokio::test]
    async fn test_timed_client_passes_through() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Ok("hello".to_string())]));
        let client = TimedLlmClient::new(scripted, 5);
        let out = client.complete("test", &[Message::user("hi")]).await;
        assert_eq!(out, Ok("hello".to_string()));
    }

    #[tokio::test]
    async fn test_timed_client_blank_is_empty_response() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Ok("   \n".to_string())]));
        let client = TimedLlmClient::new(scripted, 5);
        let out = client.complete("test", &[Message::user("hi")]).await;
        assert_eq!(out, Err(LlmError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_timed_client_reports_inner_usage() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Ok("x".to_string())]));
        let client = TimedLlmClient::new(scripted, 5);
        client.complete("test", &[Message::user("hi")]).await.unwrap();
        assert_eq!(client.token_usage(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_timed_client_times_out() {
        let slow = Arc::new(SlowLlmClient::new(Duration::from_secs(30)));
        let client = TimedLlmClient::with_timeout(slow, Duration::from_millis(20));
        let out = client.complete("test", &[Message::user("hi")]).await;
        assert_eq!(out, Err(LlmError::Timeout(Duration::from_millis(20))));
    }
}
