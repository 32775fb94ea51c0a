//! 控制器构建器：从配置组装存储、生成客户端、抽取器与时钟

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::machine::InterviewController;
use crate::core::store::SessionStore;
use crate::core::timer::{Clock, SystemClock};
use crate::feedback::FeedbackAggregator;
use crate::llm::{create_client, LlmClient, TimedLlmClient};
use crate::questions::QuestionSequencer;
use crate::resume::{DocumentExtractor, PdfTextExtractor, UploadLimits};

/// 未显式指定的部件按配置创建：客户端走 create_client，抽取器支持 pdf / txt，时钟为系统时钟
pub struct ControllerBuilder {
    config: AppConfig,
    llm: Option<Arc<dyn LlmClient>>,
    extractor: Option<Arc<dyn DocumentExtractor>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ControllerBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            llm: None,
            extractor: None,
            clock: None,
        }
    }

    /// 使用指定的生成客户端（测试时传入 Scripted / Mock）
    pub fn with_llm(mut self, llm: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// 使用宿主提供的抽取器（例如支持 pdf / docx 的实现）
    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn build(self) -> InterviewController {
        let cfg = self.config;
        let llm = self.llm.unwrap_or_else(|| create_client(&cfg.llm));
        let timed = TimedLlmClient::new(llm, cfg.llm.timeouts.request);
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let extractor: Arc<dyn DocumentExtractor> = self
            .extractor
            .unwrap_or_else(|| Arc::new(PdfTextExtractor));
        let store = Arc::new(SessionStore::new(cfg.app.session_timeout_secs, Arc::clone(&clock)));

        tracing::debug!(
            provider = %cfg.llm.provider,
            request_timeout = cfg.llm.timeouts.request,
            session_timeout = cfg.app.session_timeout_secs,
            "building interview controller"
        );

        InterviewController::new(
            store,
            QuestionSequencer::new(timed.clone()),
            FeedbackAggregator::new(timed),
            extractor,
            clock,
        )
        .with_limits(UploadLimits::from(&cfg.interview))
        .with_extract_timeout(Duration::from_secs(cfg.llm.timeouts.extract))
    }
}
