//! Mock / 脚本化 LLM 客户端（用于测试与离线演示，无需 API）

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::llm::{LlmClient, LlmError, Message, Role};
use crate::prompts;

/// Mock 客户端：出题请求回一个 JSON 数组，评分请求回一段固定的 HEARS 点评
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("");

        if prompts::is_question_prompt(last_user) {
            return Ok(r#"```json
[
  "Tell me about a project on your resume where you had to recover from a setback.",
  "Describe a time you had to explain a technical decision to a non-technical stakeholder.",
  "Give an example of a goal you set for yourself at work and how you measured it."
]
```"#
                .to_string());
        }

        Ok("**H (Headline):** 6/10\n**E (Events):** 6/10\n**A (Actions):** 7/10\n\
            **R (Results):** 5/10\n**S (Significance):** 6/10\n\n\
            **Overall Score:** 6/10 (mock feedback)"
            .to_string())
    }
}

/// 脚本化客户端：按顺序返回预设结果，并记录收到的每条 user prompt
///
/// 脚本耗尽后返回 `LlmError::Api`。
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmClient {
    pub fn new(replies: Vec<Result<String, LlmError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 追加一条预设结果
    pub async fn push(&self, reply: Result<String, LlmError>) {
        self.replies.lock().await.push_back(reply);
    }

    /// 至今收到的 user prompt（按调用顺序）
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.prompts.lock().await.len()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let prompt = messages
            .iter()
            .filter(|m| matches!(m.role, Role::User))
            .map(|m| m.content.clone())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().await.push(prompt);

        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Api("script exhausted".to_string())))
    }
}

/// 永远比超时慢的客户端，用于验证超时路径
#[derive(Debug)]
pub struct SlowLlmClient {
    delay: Duration,
}

impl SlowLlmClient {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl LlmClient for SlowLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, LlmError> {
        tokio::time::sleep(self.delay).await;
        Ok("too late".to_string())
    }
}
