//! 面试计时：会话级硬截止 + 单题用时
//!
//! 不保存倒计时变量，剩余时间始终由 (session_start, now, duration) 推导；
//! 时间通过 Clock 注入，测试用 ManualClock 精确推进。

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// 时钟抽象
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟：只在调用 advance/set 时前进
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    pub fn advance_secs(&self, secs: i64) {
        self.millis.fetch_add(secs * 1000, Ordering::SeqCst);
    }

    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, at: DateTime<Utc>) {
        self.millis.store(at.timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        let millis = self.millis.load(Ordering::SeqCst);
        Utc.timestamp_millis_opt(millis)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

/// 剩余时间档位（展示用颜色）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TimerLevel {
    /// 剩余 ≥ 50%
    Normal,
    /// 剩余 < 50%
    Warning,
    /// 剩余 < 25%
    Critical,
}

/// 会话计时器，与 Session 一一对应
#[derive(Clone, Debug)]
pub struct IntervalTimer {
    session_start: Option<DateTime<Utc>>,
    question_start: Option<DateTime<Utc>>,
    duration_secs: u64,
}

impl IntervalTimer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            session_start: None,
            question_start: None,
            duration_secs,
        }
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn session_start(&self) -> Option<DateTime<Utc>> {
        self.session_start
    }

    /// 只在第一次调用时记录开始时间；返回是否真的开始了
    pub fn start_interview(&mut self, now: DateTime<Utc>) -> bool {
        if self.session_start.is_some() {
            return false;
        }
        self.session_start = Some(now);
        true
    }

    /// 每展示一道新题调用一次
    pub fn start_question(&mut self, now: DateTime<Utc>) {
        self.question_start = Some(now);
    }

    fn remaining_millis(&self, now: DateTime<Utc>) -> i64 {
        let total = self.duration_secs as i64 * 1000;
        match self.session_start {
            None => total,
            Some(start) => {
                let elapsed = (now - start).num_milliseconds().max(0);
                (total - elapsed).clamp(0, total)
            }
        }
    }

    /// 剩余秒数（向上取整，只有真正到点才为 0）；未开始时返回完整时长
    pub fn remaining(&self, now: DateTime<Utc>) -> u64 {
        let millis = self.remaining_millis(now) as u64;
        millis.div_ceil(1000)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.session_start.is_some() && self.remaining_millis(now) == 0
    }

    /// 当前题目已用秒数；未开始答题时为 0
    pub fn question_elapsed(&self, now: DateTime<Utc>) -> u64 {
        self.question_start
            .map(|start| (now - start).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }

    pub fn level(&self, now: DateTime<Utc>) -> TimerLevel {
        let remaining = self.remaining(now) as f64;
        let total = self.duration_secs as f64;
        if remaining < total * 0.25 {
            TimerLevel::Critical
        } else if remaining < total * 0.5 {
            TimerLevel::Warning
        } else {
            TimerLevel::Normal
        }
    }
}

/// 总秒数格式化为 mm:ss
pub fn format_mmss(total_secs: u64) -> String {
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}
