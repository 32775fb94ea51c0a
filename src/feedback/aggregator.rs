//! 反馈聚合
//!
//! 生成失败从不向上传播：单题失败得到带题号的占位文本，总评失败得到固定占位文本，
//! 会话照常推进。跳过的题目不调用服务。

use crate::core::session::{IndividualFeedback, JobDetails, ResponseRecord};
use crate::llm::TimedLlmClient;
use crate::prompts;

/// 总评生成失败时的占位文本
pub const OVERALL_PLACEHOLDER: &str =
    "Overall feedback could not be generated. Individual answers are still available below.";

#[derive(Clone)]
pub struct FeedbackAggregator {
    llm: TimedLlmClient,
}

impl FeedbackAggregator {
    pub fn new(llm: TimedLlmClient) -> Self {
        Self { llm }
    }

    /// 单题点评；失败时返回占位
    pub async fn score_answer(
        &self,
        question_number: usize,
        question: &str,
        answer: &str,
        job: &JobDetails,
    ) -> IndividualFeedback {
        let messages = prompts::answer_feedback(question, answer, job);
        match self.llm.complete("answer_feedback", &messages).await {
            Ok(text) => IndividualFeedback {
                question_number,
                feedback: text.trim().to_string(),
                placeholder: false,
            },
            Err(e) => {
                tracing::warn!(question_number, error = %e, "answer feedback unavailable, using placeholder");
                Self::unavailable(question_number)
            }
        }
    }

    /// 跳过题目的本地占位反馈
    pub fn skipped_feedback(question_number: usize) -> IndividualFeedback {
        IndividualFeedback {
            question_number,
            feedback: format!(
                "Question {question_number} was skipped, so there is no substantive answer to evaluate."
            ),
            placeholder: true,
        }
    }

    fn unavailable(question_number: usize) -> IndividualFeedback {
        IndividualFeedback {
            question_number,
            feedback: format!("Unable to generate feedback for question {question_number}."),
            placeholder: true,
        }
    }

    /// 整场总评；失败时返回 OVERALL_PLACEHOLDER
    pub async fn score_session(&self, responses: &[ResponseRecord], job: &JobDetails) -> String {
        let messages = prompts::session_feedback(responses, job);
        match self.llm.complete("session_feedback", &messages).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                tracing::warn!(responses = responses.len(), error = %e, "overall feedback unavailable, using placeholder");
                OVERALL_PLACEHOLDER.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;

    use crate::llm::{LlmError, ScriptedLlmClient, SlowLlmClient};

    fn job() -> JobDetails {
        JobDetails {
            title: "Nurse".into(),
            company: "City Hospital".into(),
            description: "Ward care".into(),
            required_experience_years: 1,
            industry: None,
            duration_secs: 900,
        }
    }

    fn record(n: usize, answer: &str, skipped: bool) -> ResponseRecord {
        ResponseRecord {
            question_number: n,
            question: format!("Question {n}"),
            answer: answer.into(),
            skipped,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_score_answer_success() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Ok("  Solid answer. 8/10\n".into())]));
        let agg = FeedbackAggregator::new(TimedLlmClient::new(scripted.clone(), 5));
        let fb = agg.score_answer(2, "Why nursing?", "I like people", &job()).await;
        assert_eq!(fb.question_number, 2);
        assert_eq!(fb.feedback, "Solid answer. 8/10");
        assert!(!fb.placeholder);
        assert!(scripted.prompts().await[0].contains("I like people"));
    }

    #[tokio::test]
    async fn test_score_answer_failure_is_placeholder() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Err(LlmError::Api("boom".into()))]));
        let agg = FeedbackAggregator::new(TimedLlmClient::new(scripted, 5));
        let fb = agg.score_answer(3, "Q", "A", &job()).await;
        assert!(fb.placeholder);
        assert_eq!(fb.feedback, "Unable to generate feedback for question 3.");
    }

    #[tokio::test]
    async fn test_score_answer_timeout_is_placeholder() {
        let slow = Arc::new(SlowLlmClient::new(Duration::from_secs(5)));
        let agg = FeedbackAggregator::new(TimedLlmClient::with_timeout(slow, Duration::from_millis(20)));
        let fb = agg.score_answer(1, "Q", "A", &job()).await;
        assert!(fb.placeholder);
    }

    #[test]
    fn test_skipped_feedback() {
        let fb = FeedbackAggregator::skipped_feedback(4);
        assert!(fb.placeholder);
        assert_eq!(fb.question_number, 4);
        assert!(fb.feedback.contains("skipped"));
    }

    #[tokio::test]
    async fn test_score_session_success_and_failure() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![
            Ok("# OVERALL INTERVIEW FEEDBACK REPORT".into()),
            Err(LlmError::EmptyResponse),
        ]));
        let agg = FeedbackAggregator::new(TimedLlmClient::new(scripted.clone(), 5));
        let responses = vec![record(1, "answer", false), record(2, "[Skipped]", true)];

        let report = agg.score_session(&responses, &job()).await;
        assert_eq!(report, "# OVERALL INTERVIEW FEEDBACK REPORT");
        assert!(scripted.prompts().await[0].contains("TOTAL QUESTIONS ANSWERED: 1"));

        let report = agg.score_session(&responses, &job()).await;
        assert_eq!(report, OVERALL_PLACEHOLDER);
    }
}
