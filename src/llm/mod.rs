//! 文本生成服务层：客户端抽象与实现（OpenAI 兼容 / Mock / Scripted）

pub mod message;
pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use message::{Message, Role};
pub use mock::{MockLlmClient, ScriptedLlmClient, SlowLlmClient};
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::{LlmClient, LlmError, TimedLlmClient};

use crate::config::LlmSection;

/// 按配置创建客户端：provider = mock 时不访问网络
pub fn create_client(cfg: &LlmSection) -> Arc<dyn LlmClient> {
    match cfg.provider.as_str() {
        "mock" => {
            tracing::info!("Using mock generation client");
            Arc::new(MockLlmClient)
        }
        provider => {
            let base_url = cfg
                .base_url
                .clone()
                .or_else(|| default_base_url(provider).map(String::from));
            tracing::info!(provider, model = %cfg.model, "Using OpenAI-compatible generation client");
            Arc::new(OpenAiClient::new(base_url.as_deref(), &cfg.model, cfg.api_key.as_deref()))
        }
    }
}

/// 已知 provider 的默认端点；openai 使用 async_openai 自带默认值
fn default_base_url(provider: &str) -> Option<&'static str> {
    match provider {
        "gemini" => Some("https://generativelanguage.googleapis.com/v1beta/openai"),
        "ollama" => Some("http://localhost:11434/v1"),
        _ => None,
    }
}
