//! Hears Coach - 限时行为面试练习核心
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 会话模型、存储、计时器、阶段状态机
//! - **feedback**: 单题点评与整场总评（失败时降级为占位文本）
//! - **llm**: 文本生成客户端抽象与实现（OpenAI 兼容 / Mock / Scripted）
//! - **observability**: tracing 初始化
//! - **prompts**: HEARS 提示词模板
//! - **questions**: 容错列表解析、兜底题库、出题与作答推进
//! - **resume**: 简历上传校验与文本抽取

pub mod config;
pub mod core;
pub mod feedback;
pub mod llm;
pub mod observability;
pub mod prompts;
pub mod questions;
pub mod resume;

pub use crate::core::{ControllerBuilder, InterviewController, InterviewError, ResetKind, Stage};
