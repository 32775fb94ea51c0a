//! 出题与作答推进
//!
//! 出题：prompt → 生成服务 → parse_list(N)。作答：Submit / Skip 都追加一条 ResponseRecord 并把索引加一，
//! 索引只增不减，没有修改或重答。评分由控制器交给 FeedbackAggregator。

use chrono::{DateTime, Utc};

use crate::core::error::ValidationIssue;
use crate::core::session::{CompletionReason, JobDetails, ResponseRecord, Session, SKIP_SENTINEL};
use crate::llm::{LlmError, TimedLlmClient};
use crate::prompts;
use crate::questions::parser::{parse_list, ParsedList};

/// 出题与作答推进；不持有会话状态，可在会话间共享
#[derive(Clone)]
pub struct QuestionSequencer {
    llm: TimedLlmClient,
}

impl QuestionSequencer {
    pub fn new(llm: TimedLlmClient) -> Self {
        Self { llm }
    }

    /// 生成 target 道题；服务失败向上返回，解析从不失败
    pub async fn generate(
        &self,
        resume_text: &str,
        job: &JobDetails,
        target: usize,
    ) -> Result<ParsedList, LlmError> {
        let messages = prompts::question_generation(resume_text, job, target);
        let raw = self.llm.complete("questions", &messages).await?;
        let parsed = parse_list(&raw, target);

        let shortfall = parsed.shortfall(target);
        if shortfall > 0 {
            tracing::warn!(
                target,
                got = parsed.items.len(),
                shortfall,
                "fallback pool exhausted, continuing with fewer questions"
            );
        } else if parsed.padded > 0 {
            tracing::info!(
                extracted = parsed.extracted,
                padded = parsed.padded,
                strategy = ?parsed.strategy,
                "padded generated questions from fallback pool"
            );
        } else {
            tracing::debug!(strategy = ?parsed.strategy, count = parsed.items.len(), "questions parsed");
        }
        Ok(parsed)
    }

    /// 记录一次作答（去掉首尾空白）；空白答案或没有待答题目时不改变状态
    pub fn submit(
        session: &mut Session,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ResponseRecord, ValidationIssue> {
        let answer = text.trim();
        if answer.is_empty() {
            return Err(ValidationIssue::BlankAnswer);
        }
        Self::record(session, answer.to_string(), false, now)
    }

    /// 跳过当前题目，答案记为 SKIP_SENTINEL
    pub fn skip(session: &mut Session, now: DateTime<Utc>) -> Result<ResponseRecord, ValidationIssue> {
        Self::record(session, SKIP_SENTINEL.to_string(), true, now)
    }

    fn record(
        session: &mut Session,
        answer: String,
        skipped: bool,
        now: DateTime<Utc>,
    ) -> Result<ResponseRecord, ValidationIssue> {
        let (number, question) = session
            .current_question()
            .map(|(n, q)| (n, q.to_string()))
            .ok_or(ValidationIssue::NoPendingQuestion)?;

        let record = ResponseRecord {
            question_number: number,
            question,
            answer,
            skipped,
            created_at: now,
        };
        session.responses.push(record.clone());
        session.current_question_index += 1;

        if session.all_answered() {
            session.completed = true;
            session.completion_reason = Some(CompletionReason::AllAnswered);
        } else {
            session.timer.start_question(now);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::session::Stage;
    use crate::llm::ScriptedLlmClient;
    use crate::questions::pool::FALLBACK_QUESTIONS;

    fn job() -> JobDetails {
        JobDetails {
            title: "PM".into(),
            company: "Initech".into(),
            description: "Own the roadmap".into(),
            required_experience_years: 4,
            industry: None,
            duration_secs: 900,
        }
    }

    fn interview_session(questions: &[&str]) -> Session {
        let now = Utc::now();
        let mut s = Session::new("s".into(), now);
        s.stage = Stage::Interview;
        s.questions = questions.iter().map(|q| q.to_string()).collect();
        s.timer.start_interview(now);
        s.timer.start_question(now);
        s
    }

    #[tokio::test]
    async fn test_generate_parses_to_target() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Ok(
            r#"["A?", "B?", "C?"]"#.to_string()
        )]));
        let sequencer = QuestionSequencer::new(TimedLlmClient::new(scripted.clone(), 5));
        let parsed = sequencer.generate("resume text", &job(), 3).await.unwrap();
        assert_eq!(parsed.items, vec!["A?", "B?", "C?"]);
        let prompts = scripted.prompts().await;
        assert!(prompts[0].contains("Generate exactly 3"));
        assert!(prompts[0].contains("resume text"));
    }

    #[tokio::test]
    async fn test_generate_pads_short_output() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Ok("- Only one?".to_string())]));
        let sequencer = QuestionSequencer::new(TimedLlmClient::new(scripted, 5));
        let parsed = sequencer.generate("resume", &job(), 2).await.unwrap();
        assert_eq!(parsed.items, vec!["Only one?", FALLBACK_QUESTIONS[0]]);
    }

    #[tokio::test]
    async fn test_generate_propagates_service_error() {
        let scripted = Arc::new(ScriptedLlmClient::new(vec![Err(LlmError::Api("503".into()))]));
        let sequencer = QuestionSequencer::new(TimedLlmClient::new(scripted, 5));
        let err = sequencer.generate("resume", &job(), 2).await.unwrap_err();
        assert_eq!(err, LlmError::Api("503".into()));
    }

    #[test]
    fn test_submit_trims_and_advances() {
        let mut s = interview_session(&["Q1", "Q2"]);
        let record = QuestionSequencer::submit(&mut s, "  my answer \n", Utc::now()).unwrap();
        assert_eq!(record.answer, "my answer");
        assert_eq!(record.question_number, 1);
        assert_eq!(record.question, "Q1");
        assert!(!record.skipped);
        assert_eq!(s.current_question_index, 1);
        assert_eq!(s.responses.len(), 1);
        assert!(!s.completed);
    }

    #[test]
    fn test_blank_submit_changes_nothing() {
        let mut s = interview_session(&["Q1"]);
        let err = QuestionSequencer::submit(&mut s, "  \t\n", Utc::now()).unwrap_err();
        assert_eq!(err, ValidationIssue::BlankAnswer);
        assert_eq!(s.current_question_index, 0);
        assert!(s.responses.is_empty());
    }

    #[test]
    fn test_skip_records_sentinel() {
        let mut s = interview_session(&["Q1", "Q2"]);
        let record = QuestionSequencer::skip(&mut s, Utc::now()).unwrap();
        assert_eq!(record.answer, SKIP_SENTINEL);
        assert!(record.skipped);
        assert_eq!(s.current_question_index, 1);
        assert_eq!(s.current_question().map(|(n, _)| n), Some(2));
    }

    #[test]
    fn test_last_answer_completes_and_no_more_questions() {
        let mut s = interview_session(&["Q1"]);
        QuestionSequencer::submit(&mut s, "done", Utc::now()).unwrap();
        assert!(s.completed);
        assert_eq!(s.completion_reason, Some(CompletionReason::AllAnswered));
        assert_eq!(
            QuestionSequencer::skip(&mut s, Utc::now()).unwrap_err(),
            ValidationIssue::NoPendingQuestion
        );
        assert_eq!(s.responses.len(), 1);
        assert_eq!(s.responses.len(), s.current_question_index);
    }
}
