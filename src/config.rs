//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `INTERVIEW__*` 覆盖（双下划线表示嵌套，如 `INTERVIEW__LLM__PROVIDER=mock`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub interview: InterviewSection,
}

/// [app] 段：应用名、会话过期与清理周期
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    pub name: Option<String>,
    /// 会话空闲多久后被清理（秒）
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    /// 后台清理任务的间隔（秒）
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            name: None,
            session_timeout_secs: default_session_timeout_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_session_timeout_secs() -> u64 {
    3600
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// [llm] 段：后端选择与超时
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：openai / gemini / ollama / mock
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub base_url: Option<String>,
    /// 未设置时读取 OPENAI_API_KEY
    pub api_key: Option<String>,
    #[serde(default)]
    pub timeouts: LlmTimeoutsSection,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            base_url: None,
            api_key: None,
            timeouts: LlmTimeoutsSection::default(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmTimeoutsSection {
    /// 单次生成请求超时（秒）
    #[serde(default = "default_request_timeout")]
    pub request: u64,
    /// 简历抽取超时（秒）
    #[serde(default = "default_extract_timeout")]
    pub extract: u64,
}

impl Default for LlmTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
            extract: default_extract_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

fn default_extract_timeout() -> u64 {
    20
}

/// [interview] 段：上传限制
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewSection {
    /// 简历文本最少字符数
    #[serde(default = "default_min_resume_chars")]
    pub min_resume_chars: usize,
    /// 上传文件大小上限（字节）
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for InterviewSection {
    fn default() -> Self {
        Self {
            min_resume_chars: default_min_resume_chars(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_min_resume_chars() -> usize {
    50
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// 从 config 目录加载配置，环境变量 INTERVIEW__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 INTERVIEW__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("INTERVIEW")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
