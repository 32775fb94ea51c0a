//! 会话数据模型
//!
//! Session 只由 InterviewController 修改（按会话 id 串行化）；对外只暴露只读的 SessionView / SessionSnapshot。

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::timer::{format_mmss, IntervalTimer, TimerLevel};

/// 跳过题目时记录的固定答案
pub const SKIP_SENTINEL: &str = "[Skipped]";

/// 会话 ID
pub type SessionId = String;

/// 会话阶段
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Stage {
    Upload,
    Details,
    Interview,
    Feedback,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Upload => "upload",
            Stage::Details => "details",
            Stage::Interview => "interview",
            Stage::Feedback => "feedback",
        };
        f.write_str(name)
    }
}

/// 面试时长预设：时长与题量绑定
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum InterviewLength {
    /// 15 分钟 / 3 题
    Quick,
    /// 30 分钟 / 6 题
    Standard,
    /// 45 分钟 / 9 题
    Comprehensive,
    /// 60 分钟 / 12 题
    Extended,
}

impl InterviewLength {
    pub const ALL: [InterviewLength; 4] = [
        InterviewLength::Quick,
        InterviewLength::Standard,
        InterviewLength::Comprehensive,
        InterviewLength::Extended,
    ];

    pub fn minutes(self) -> u64 {
        match self {
            InterviewLength::Quick => 15,
            InterviewLength::Standard => 30,
            InterviewLength::Comprehensive => 45,
            InterviewLength::Extended => 60,
        }
    }

    pub fn question_count(self) -> usize {
        match self {
            InterviewLength::Quick => 3,
            InterviewLength::Standard => 6,
            InterviewLength::Comprehensive => 9,
            InterviewLength::Extended => 12,
        }
    }

    pub fn duration_secs(self) -> u64 {
        self.minutes() * 60
    }

    pub fn label(self) -> &'static str {
        match self {
            InterviewLength::Quick => "Quick Practice",
            InterviewLength::Standard => "Standard Interview",
            InterviewLength::Comprehensive => "Comprehensive",
            InterviewLength::Extended => "Extended Session",
        }
    }
}

/// 行业（可选）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Industry {
    Technology,
    Healthcare,
    Finance,
    Marketing,
    Sales,
    Education,
    Manufacturing,
    Retail,
    Other,
}

impl Industry {
    pub const ALL: [Industry; 9] = [
        Industry::Technology,
        Industry::Healthcare,
        Industry::Finance,
        Industry::Marketing,
        Industry::Sales,
        Industry::Education,
        Industry::Manufacturing,
        Industry::Retail,
        Industry::Other,
    ];

    /// 按名称查找（大小写不敏感）
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|i| i.to_string().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// 允许填写的最大工作年限
pub const MAX_EXPERIENCE_YEARS: u8 = 50;

/// 用户在 Details 阶段填写的职位信息（未校验）
#[derive(Clone, Debug, Default)]
pub struct JobDetailsForm {
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_experience_years: u8,
    pub industry: Option<Industry>,
}

/// 已提交的职位信息，提交后不可变
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobDetails {
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_experience_years: u8,
    pub industry: Option<Industry>,
    pub duration_secs: u64,
}

impl JobDetails {
    pub fn duration_minutes(&self) -> u64 {
        self.duration_secs / 60
    }
}

/// 一条作答记录
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResponseRecord {
    /// 从 1 开始
    pub question_number: usize,
    pub question: String,
    pub answer: String,
    pub skipped: bool,
    pub created_at: DateTime<Utc>,
}

/// 单题反馈；placeholder 表示生成失败或跳过后的本地占位
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IndividualFeedback {
    pub question_number: usize,
    pub feedback: String,
    pub placeholder: bool,
}

/// 进入 Feedback 的原因
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CompletionReason {
    AllAnswered,
    DeadlineExpired,
}

/// 单个面试会话
#[derive(Debug)]
pub struct Session {
    pub(crate) id: SessionId,
    pub(crate) stage: Stage,
    pub(crate) resume_text: Option<String>,
    pub(crate) job_details: Option<JobDetails>,
    pub(crate) duration_secs: u64,
    pub(crate) requested_question_count: usize,
    pub(crate) duration_selected: bool,
    pub(crate) questions: Vec<String>,
    pub(crate) current_question_index: usize,
    pub(crate) responses: Vec<ResponseRecord>,
    pub(crate) individual_feedback: Vec<IndividualFeedback>,
    pub(crate) overall_feedback: Option<String>,
    pub(crate) completed: bool,
    pub(crate) completion_reason: Option<CompletionReason>,
    pub(crate) timer: IntervalTimer,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) last_active: DateTime<Utc>,
    pub(crate) feedback_entered_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        let default_length = InterviewLength::Quick;
        Self {
            id,
            stage: Stage::Upload,
            resume_text: None,
            job_details: None,
            duration_secs: default_length.duration_secs(),
            requested_question_count: default_length.question_count(),
            duration_selected: false,
            questions: Vec::new(),
            current_question_index: 0,
            responses: Vec::new(),
            individual_feedback: Vec::new(),
            overall_feedback: None,
            completed: false,
            completion_reason: None,
            timer: IntervalTimer::new(default_length.duration_secs()),
            created_at: now,
            last_active: now,
            feedback_entered_at: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn individual_feedback(&self) -> &[IndividualFeedback] {
        &self.individual_feedback
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }

    /// 当前待答题目：(题号, 题目)
    pub fn current_question(&self) -> Option<(usize, &str)> {
        self.questions
            .get(self.current_question_index)
            .map(|q| (self.current_question_index + 1, q.as_str()))
    }

    pub fn all_answered(&self) -> bool {
        !self.questions.is_empty() && self.current_question_index >= self.questions.len()
    }

    pub fn unanswered_count(&self) -> usize {
        self.questions.len().saturating_sub(self.current_question_index)
    }

    /// 选择时长预设
    pub(crate) fn select_length(&mut self, length: InterviewLength) {
        self.duration_secs = length.duration_secs();
        self.requested_question_count = length.question_count();
        self.duration_selected = true;
        self.timer = IntervalTimer::new(self.duration_secs);
    }

    /// 清除本轮面试产物（题目、作答、反馈、计时、完成状态）
    fn clear_interview(&mut self) {
        self.questions.clear();
        self.current_question_index = 0;
        self.responses.clear();
        self.individual_feedback.clear();
        self.overall_feedback = None;
        self.completed = false;
        self.completion_reason = None;
        self.feedback_entered_at = None;
        self.timer = IntervalTimer::new(self.duration_secs);
    }

    /// 同一职位再练一次：保留简历、职位信息与时长选择
    pub(crate) fn reset_retry_same_job(&mut self) {
        self.clear_interview();
        self.stage = Stage::Details;
    }

    /// 换一个职位：额外清除职位信息与时长选择
    pub(crate) fn reset_new_position(&mut self) {
        self.clear_interview();
        let default_length = InterviewLength::Quick;
        self.job_details = None;
        self.duration_secs = default_length.duration_secs();
        self.requested_question_count = default_length.question_count();
        self.duration_selected = false;
        self.timer = IntervalTimer::new(self.duration_secs);
        self.stage = Stage::Details;
    }

    /// 完全重来：除 id 与创建时间外全部清空
    pub(crate) fn reset_full(&mut self, now: DateTime<Utc>) {
        let created_at = self.created_at;
        *self = Session::new(std::mem::take(&mut self.id), now);
        self.created_at = created_at;
    }

    /// 当前状态的只读投影
    pub fn view(&self, now: DateTime<Utc>) -> SessionView {
        let remaining = self.timer.remaining(now);
        SessionView {
            id: self.id.clone(),
            stage: self.stage,
            resume_loaded: self.resume_text.is_some(),
            duration_selected: self.duration_selected,
            duration_secs: self.duration_secs,
            requested_question_count: self.requested_question_count,
            job_details: self.job_details.clone(),
            remaining_secs: remaining,
            remaining_display: format_mmss(remaining),
            timer_level: self.timer.level(now),
            question_elapsed_secs: self.timer.question_elapsed(now),
            current_question: self.current_question().map(|(number, text)| CurrentQuestion {
                number,
                total: self.questions.len(),
                text: text.to_string(),
            }),
            answered: self.responses.len(),
            total_questions: self.questions.len(),
            feedback_ready: self.individual_feedback.len(),
            completed: self.completed,
            completion_reason: self.completion_reason,
            overall_feedback: self.overall_feedback.clone(),
        }
    }

    /// 导出用快照（报告序列化由外部负责）
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            job_details: self.job_details.clone(),
            requested_question_count: self.requested_question_count,
            questions: self.questions.clone(),
            responses: self.responses.clone(),
            individual_feedback: self.individual_feedback.clone(),
            overall_feedback: self.overall_feedback.clone(),
            completion_reason: self.completion_reason,
            started_at: self.timer.session_start(),
            feedback_entered_at: self.feedback_entered_at,
        }
    }
}

/// 当前展示的题目
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CurrentQuestion {
    pub number: usize,
    pub total: usize,
    pub text: String,
}

/// UI 看到的「投影」状态
#[derive(Clone, Debug, Serialize)]
pub struct SessionView {
    pub id: SessionId,
    pub stage: Stage,
    pub resume_loaded: bool,
    pub duration_selected: bool,
    pub duration_secs: u64,
    pub requested_question_count: usize,
    pub job_details: Option<JobDetails>,
    pub remaining_secs: u64,
    pub remaining_display: String,
    pub timer_level: TimerLevel,
    pub question_elapsed_secs: u64,
    pub current_question: Option<CurrentQuestion>,
    pub answered: usize,
    pub total_questions: usize,
    pub feedback_ready: usize,
    pub completed: bool,
    pub completion_reason: Option<CompletionReason>,
    pub overall_feedback: Option<String>,
}

/// 已完成会话的只读快照，供报告导出
#[derive(Clone, Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub job_details: Option<JobDetails>,
    pub requested_question_count: usize,
    pub questions: Vec<String>,
    pub responses: Vec<ResponseRecord>,
    pub individual_feedback: Vec<IndividualFeedback>,
    pub overall_feedback: Option<String>,
    pub completion_reason: Option<CompletionReason>,
    pub started_at: Option<DateTime<Utc>>,
    pub feedback_entered_at: Option<DateTime<Utc>>,
}
