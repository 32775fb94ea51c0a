//! 会话错误类型
//!
//! 校验失败（Validation）不改变状态；外部服务失败（Extraction / Generation）让会话停留在调用前的阶段。
//! 反馈生成失败不会出现在这里：FeedbackAggregator 直接吸收成占位文本。

use std::fmt;

use thiserror::Error;

use crate::core::session::Stage;
use crate::llm::LlmError;
use crate::resume::ExtractError;

/// 阶段守卫未满足的具体条件
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("job title is required")]
    MissingTitle,

    #[error("company name is required")]
    MissingCompany,

    #[error("job description is required")]
    MissingDescription,

    #[error("required experience must be between 0 and 50 years, got {0}")]
    ExperienceOutOfRange(u8),

    #[error("select an interview duration first")]
    NoDurationSelected,

    #[error("no resume has been uploaded")]
    MissingResume,

    #[error("question generation returned no questions")]
    EmptyQuestionList,

    #[error("answer must not be blank")]
    BlankAnswer,

    #[error("there is no question waiting for an answer")]
    NoPendingQuestion,

    #[error("{0} question(s) still unanswered")]
    UnansweredQuestions(usize),
}

/// 多个校验问题的展示包装
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issues(pub Vec<ValidationIssue>);

impl fmt::Display for Issues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("; "))
    }
}

/// 控制器操作可能返回的错误
#[derive(Error, Debug)]
pub enum InterviewError {
    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("operation requires stage {expected}, session is in {actual}")]
    WrongStage { expected: Stage, actual: Stage },

    #[error("validation failed: {0}")]
    Validation(Issues),

    #[error("resume extraction failed: {0}")]
    Extraction(#[from] ExtractError),

    #[error("question generation failed: {0}")]
    Generation(#[from] LlmError),

    /// 本次调用前截止时间已到，会话已被强制切到 Feedback
    #[error("interview time is up")]
    DeadlineExpired,
}

impl InterviewError {
    pub fn validation(issues: Vec<ValidationIssue>) -> Self {
        InterviewError::Validation(Issues(issues))
    }

    /// 校验问题列表（非校验错误时为空）
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            InterviewError::Validation(Issues(issues)) => issues,
            _ => &[],
        }
    }

    /// 用户可以原地重试（状态未变）
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InterviewError::Validation(_)
                | InterviewError::Extraction(_)
                | InterviewError::Generation(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, InterviewError>;
