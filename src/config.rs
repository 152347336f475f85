use crate::error::{AppResult, ConfigError};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 默认配置文件名（位于当前工作目录）
pub const CONFIG_FILE_NAME: &str = "resume_extract.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 模型目录（为空时使用用户数据目录下的 resume-extract/models）
    pub model_dir: Option<PathBuf>,
    /// 模型文件名
    pub model_file: String,
    // --- 本地推理服务配置 ---
    pub llm_api_base_url: String,
    pub llm_api_key: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// 单次推理超时（秒），0 表示不限制
    pub inference_timeout_secs: u64,
    /// 单批最多处理的简历数量，0 表示不限制
    pub max_batch_size: usize,
    /// 送入模型的简历文本最大字符数
    pub max_document_chars: usize,
    /// 导出的表格文件
    pub output_file: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: None,
            model_file: "qwen2.5-3b-instruct-q4_k_m.gguf".to_string(),
            llm_api_base_url: "http://127.0.0.1:8080/v1".to_string(),
            llm_api_key: "local".to_string(),
            llm_temperature: 0.1,
            llm_max_tokens: 512,
            inference_timeout_secs: 120,
            max_batch_size: 10,
            max_document_chars: 12_000,
            output_file: "resumes.csv".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 配置文件（可选）→ 环境变量
    pub fn load() -> AppResult<Self> {
        let path = std::env::var("RESUME_EXTRACT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE_NAME));

        let base = if path.exists() {
            Self::from_toml_file(&path)?
        } else {
            Self::default()
        };

        Ok(base.with_env())
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// 仅使用默认值和环境变量
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// 用环境变量覆盖当前配置，无法解析的值保持原样
    pub fn with_env(self) -> Self {
        let base = self;
        Self {
            model_dir: std::env::var("MODEL_DIR").ok().map(PathBuf::from).or(base.model_dir),
            model_file: std::env::var("MODEL_FILE").unwrap_or(base.model_file),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(base.llm_api_base_url),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(base.llm_api_key),
            llm_temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.llm_temperature),
            llm_max_tokens: std::env::var("LLM_MAX_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.llm_max_tokens),
            inference_timeout_secs: std::env::var("INFERENCE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.inference_timeout_secs),
            max_batch_size: std::env::var("MAX_BATCH_SIZE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_batch_size),
            max_document_chars: std::env::var("MAX_DOCUMENT_CHARS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_document_chars),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(base.output_file),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
        }
    }

    /// 推理超时，0 表示不限制
    pub fn inference_timeout(&self) -> Option<std::time::Duration> {
        (self.inference_timeout_secs > 0)
            .then(|| std::time::Duration::from_secs(self.inference_timeout_secs))
    }
}
