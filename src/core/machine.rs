//! 面试主控：阶段状态机
//!
//! Upload → Details → Interview → Feedback，Feedback 只能通过重置回到 Details 或 Upload。
//! 每个操作先取得会话的 Mutex 并持有到结束（包括外部调用），然后检查截止时间：
//! Interview 阶段一旦到点，先强制进入 Feedback，再处理本次请求。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use crate::core::error::{InterviewError, Result, ValidationIssue};
use crate::core::session::{
    CompletionReason, IndividualFeedback, InterviewLength, JobDetails, JobDetailsForm,
    ResponseRecord, Session, SessionId, SessionSnapshot, SessionView, Stage, MAX_EXPERIENCE_YEARS,
};
use crate::core::store::{SessionHandle, SessionStore};
use crate::core::timer::Clock;
use crate::feedback::FeedbackAggregator;
use crate::questions::QuestionSequencer;
use crate::resume::{ensure_meaningful, validate_upload, DocumentExtractor, ExtractError, UploadLimits};

/// 重置方式（只能在 Feedback 阶段使用）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetKind {
    /// 同一职位再练一次 → Details
    RetrySameJob,
    /// 换职位：清除职位信息与时长选择 → Details
    NewPosition,
    /// 全部清空 → Upload
    FullRestart,
}

/// 一次作答或跳过的结果
#[derive(Clone, Debug)]
pub struct AnswerOutcome {
    pub record: ResponseRecord,
    pub feedback: IndividualFeedback,
    /// 是否已答完全部题目（阶段仍为 Interview，等待请求报告）
    pub completed: bool,
}

pub struct InterviewController {
    store: Arc<SessionStore>,
    sequencer: QuestionSequencer,
    feedback: FeedbackAggregator,
    extractor: Arc<dyn DocumentExtractor>,
    clock: Arc<dyn Clock>,
    limits: UploadLimits,
    extract_timeout: Duration,
}

impl InterviewController {
    pub fn new(
        store: Arc<SessionStore>,
        sequencer: QuestionSequencer,
        feedback: FeedbackAggregator,
        extractor: Arc<dyn DocumentExtractor>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            sequencer,
            feedback,
            extractor,
            clock,
            limits: UploadLimits::default(),
            extract_timeout: Duration::from_secs(20),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_extract_timeout(mut self, extract_timeout: Duration) -> Self {
        self.extract_timeout = extract_timeout;
        self
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// 第一次接触时以给定 id 创建会话；已知 id 原样返回，未给出时生成新 id
    pub async fn open_session(&self, id: Option<&str>) -> SessionId {
        self.store.get_or_create(id).await
    }

    pub async fn close_session(&self, id: &str) -> bool {
        let removed = self.store.remove(id).await;
        if removed {
            tracing::info!(session_id = %id, "session closed");
        }
        removed
    }

    /// 当前状态投影；Interview 阶段到点时会先强制进入 Feedback
    pub async fn view(&self, id: &str) -> Result<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.enforce_deadline(&mut session).await;
        let now = self.clock.now();
        session.touch(now);
        Ok(session.view(now))
    }

    /// Upload → Details：校验格式与大小，抽取文本（带超时），检查最少字符数
    pub async fn upload_resume(&self, id: &str, bytes: Vec<u8>, extension: &str) -> Result<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.enforce_deadline(&mut session).await;
        expect_stage(&session, Stage::Upload)?;

        let format = validate_upload(bytes.len(), extension, &self.limits)?;
        let extractor = Arc::clone(&self.extractor);
        let task = tokio::task::spawn_blocking(move || extractor.extract(&bytes, format));
        let text = match timeout(self.extract_timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => {
                return Err(ExtractError::Corrupt(format!("extractor task failed: {join_err}")).into())
            }
            Err(_) => return Err(ExtractError::Timeout(self.extract_timeout).into()),
        };
        let text = ensure_meaningful(&text, &self.limits)?;

        let now = self.clock.now();
        tracing::info!(session_id = %session.id, ext = %format, chars = text.chars().count(), "resume accepted");
        session.resume_text = Some(text);
        session.stage = Stage::Details;
        session.touch(now);
        Ok(session.view(now))
    }

    /// 选择时长预设（Details 阶段，可多次修改）
    pub async fn select_duration(&self, id: &str, length: InterviewLength) -> Result<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.enforce_deadline(&mut session).await;
        expect_stage(&session, Stage::Details)?;

        session.select_length(length);
        let now = self.clock.now();
        session.touch(now);
        tracing::debug!(session_id = %session.id, minutes = length.minutes(), questions = length.question_count(), "duration selected");
        Ok(session.view(now))
    }

    /// Details → Interview：字段校验全部通过后调用出题服务，得到非空题目列表才切换阶段
    pub async fn start_interview(&self, id: &str, form: JobDetailsForm) -> Result<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.enforce_deadline(&mut session).await;
        expect_stage(&session, Stage::Details)?;

        let issues = validate_details(&session, &form);
        if !issues.is_empty() {
            return Err(InterviewError::validation(issues));
        }
        let resume_text = session
            .resume_text
            .clone()
            .ok_or_else(|| InterviewError::validation(vec![ValidationIssue::MissingResume]))?;

        let job = JobDetails {
            title: form.title.trim().to_string(),
            company: form.company.trim().to_string(),
            description: form.description.trim().to_string(),
            required_experience_years: form.required_experience_years,
            industry: form.industry,
            duration_secs: session.duration_secs,
        };

        let target = session.requested_question_count;
        let parsed = self.sequencer.generate(&resume_text, &job, target).await?;
        if parsed.items.is_empty() {
            return Err(InterviewError::validation(vec![ValidationIssue::EmptyQuestionList]));
        }

        let now = self.clock.now();
        session.job_details = Some(job);
        session.questions = parsed.items;
        session.current_question_index = 0;
        session.stage = Stage::Interview;
        session.timer.start_interview(now);
        session.timer.start_question(now);
        session.touch(now);
        tracing::info!(
            session_id = %session.id,
            questions = session.questions.len(),
            duration_secs = session.duration_secs,
            "interview started"
        );
        Ok(session.view(now))
    }

    /// 提交当前题目的答案并立即评分
    pub async fn submit_answer(&self, id: &str, text: &str) -> Result<AnswerOutcome> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.guard_interview(&mut session).await?;

        let job = session
            .job_details
            .clone()
            .ok_or_else(|| InterviewError::validation(vec![ValidationIssue::NoPendingQuestion]))?;
        let record = QuestionSequencer::submit(&mut session, text, self.clock.now())
            .map_err(|issue| InterviewError::validation(vec![issue]))?;
        let feedback = self
            .feedback
            .score_answer(record.question_number, &record.question, &record.answer, &job)
            .await;
        Ok(self.finish_answer(&mut session, record, feedback))
    }

    /// 跳过当前题目；不调用生成服务
    pub async fn skip_question(&self, id: &str) -> Result<AnswerOutcome> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.guard_interview(&mut session).await?;

        let record = QuestionSequencer::skip(&mut session, self.clock.now())
            .map_err(|issue| InterviewError::validation(vec![issue]))?;
        let feedback = FeedbackAggregator::skipped_feedback(record.question_number);
        Ok(self.finish_answer(&mut session, record, feedback))
    }

    /// Interview → Feedback：全部题目作答后由用户请求。已在 Feedback（含截止时间已到）时直接返回报告视图
    pub async fn request_report(&self, id: &str) -> Result<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        let expired = self.enforce_deadline(&mut session).await;
        if !expired && session.stage() != Stage::Feedback {
            expect_stage(&session, Stage::Interview)?;
            if !session.all_answered() {
                return Err(InterviewError::validation(vec![
                    ValidationIssue::UnansweredQuestions(session.unanswered_count()),
                ]));
            }
            self.enter_feedback(&mut session, CompletionReason::AllAnswered).await;
        }
        let now = self.clock.now();
        session.touch(now);
        Ok(session.view(now))
    }

    /// Feedback → Details / Upload
    pub async fn reset(&self, id: &str, kind: ResetKind) -> Result<SessionView> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.enforce_deadline(&mut session).await;
        expect_stage(&session, Stage::Feedback)?;

        let now = self.clock.now();
        match kind {
            ResetKind::RetrySameJob => session.reset_retry_same_job(),
            ResetKind::NewPosition => session.reset_new_position(),
            ResetKind::FullRestart => session.reset_full(now),
        }
        session.touch(now);
        tracing::info!(session_id = %session.id, ?kind, stage = %session.stage, "session reset");
        Ok(session.view(now))
    }

    /// 报告导出用快照，仅 Feedback 阶段可用
    pub async fn snapshot(&self, id: &str) -> Result<SessionSnapshot> {
        let handle = self.handle(id).await?;
        let mut session = handle.lock().await;
        self.enforce_deadline(&mut session).await;
        expect_stage(&session, Stage::Feedback)?;
        session.touch(self.clock.now());
        Ok(session.snapshot())
    }

    async fn handle(&self, id: &str) -> Result<SessionHandle> {
        self.store
            .get(id)
            .await
            .ok_or_else(|| InterviewError::SessionNotFound(id.to_string()))
    }

    /// Interview 阶段操作的公共前置：截止检查 + 阶段检查
    async fn guard_interview(&self, session: &mut Session) -> Result<()> {
        if self.enforce_deadline(session).await {
            return Err(InterviewError::DeadlineExpired);
        }
        expect_stage(session, Stage::Interview)
    }

    fn finish_answer(
        &self,
        session: &mut Session,
        record: ResponseRecord,
        feedback: IndividualFeedback,
    ) -> AnswerOutcome {
        session.individual_feedback.push(feedback.clone());
        session.touch(self.clock.now());
        if session.completed {
            tracing::info!(session_id = %session.id, answered = session.responses.len(), "all questions answered");
        }
        AnswerOutcome {
            record,
            feedback,
            completed: session.completed,
        }
    }

    /// Interview 阶段到点时强制进入 Feedback；返回本次是否发生了强制切换
    async fn enforce_deadline(&self, session: &mut Session) -> bool {
        if session.stage != Stage::Interview || !session.timer.is_expired(self.clock.now()) {
            return false;
        }
        tracing::info!(
            session_id = %session.id,
            answered = session.responses.len(),
            unanswered = session.unanswered_count(),
            "interview deadline reached, moving to feedback"
        );
        self.enter_feedback(session, CompletionReason::DeadlineExpired).await;
        true
    }

    /// 进入 Feedback；总评最多生成一次
    async fn enter_feedback(&self, session: &mut Session, reason: CompletionReason) {
        if session.stage == Stage::Feedback {
            return;
        }
        session.stage = Stage::Feedback;
        session.completed = true;
        session.completion_reason.get_or_insert(reason);

        if session.overall_feedback.is_none() {
            let report = match &session.job_details {
                Some(job) => self.feedback.score_session(&session.responses, job).await,
                None => crate::feedback::OVERALL_PLACEHOLDER.to_string(),
            };
            session.overall_feedback = Some(report);
        }

        let now = self.clock.now();
        session.feedback_entered_at = Some(now);
        tracing::info!(session_id = %session.id, reason = ?session.completion_reason, "entered feedback");
    }
}

fn expect_stage(session: &Session, expected: Stage) -> Result<()> {
    if session.stage != expected {
        return Err(InterviewError::WrongStage {
            expected,
            actual: session.stage,
        });
    }
    Ok(())
}

/// Details 阶段的全部字段条件，一次性报告所有未满足项
fn validate_details(session: &Session, form: &JobDetailsForm) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    if form.title.trim().is_empty() {
        issues.push(ValidationIssue::MissingTitle);
    }
    if form.company.trim().is_empty() {
        issues.push(ValidationIssue::MissingCompany);
    }
    if form.description.trim().is_empty() {
        issues.push(ValidationIssue::MissingDescription);
    }
    if form.required_experience_years > MAX_EXPERIENCE_YEARS {
        issues.push(ValidationIssue::ExperienceOutOfRange(form.required_experience_years));
    }
    if !session.duration_selected {
        issues.push(ValidationIssue::NoDurationSelected);
    }
    if session.resume_text.is_none() {
        issues.push(ValidationIssue::MissingResume);
    }
    issues
}
