//! 核心编排层：会话模型、存储、计时、错误与阶段状态机

pub mod builder;
pub mod error;
pub mod machine;
pub mod session;
pub mod store;
pub mod timer;

pub use builder::ControllerBuilder;
pub use error::{InterviewError, Issues, ValidationIssue};
pub use machine::{AnswerOutcome, InterviewController, ResetKind};
pub use session::{
    CompletionReason, CurrentQuestion, IndividualFeedback, Industry, InterviewLength, JobDetails,
    JobDetailsForm, ResponseRecord, Session, SessionId, SessionSnapshot, SessionView, Stage,
    MAX_EXPERIENCE_YEARS, SKIP_SENTINEL,
};
pub use store::{SessionHandle, SessionStore};
pub use timer::{format_mmss, Clock, IntervalTimer, ManualClock, SystemClock, TimerLevel};
