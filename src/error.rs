use std::path::PathBuf;
use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 文档文本提取错误（仅影响单份简历）
    #[error("文档错误: {0}")]
    Extract(#[from] ExtractError),
    /// 模型准备错误（整个批次无法开始）
    #[error("模型错误: {0}")]
    Model(#[from] ModelError),
    /// 推理调用错误（仅影响单份简历）
    #[error("推理错误: {0}")]
    Inference(#[from] InferenceError),
    /// 批次选择错误
    #[error("批次错误: {0}")]
    Batch(#[from] BatchError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 文档文本提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 文件无法读取（不存在、无权限等）
    #[error("无法读取文件 {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 文件可读，但解码失败（损坏的 PDF / DOCX）
    #[error("无法解析 {format} 文件 {}: {message}", path.display())]
    Decode {
        path: PathBuf,
        format: &'static str,
        message: String,
    },
}

/// 模型准备错误
#[derive(Debug, Error)]
pub enum ModelError {
    /// 模型文件不在用户模型目录中
    #[error("未找到模型文件: {}，请将模型文件放到该位置后重试", path.display())]
    NotFound { path: PathBuf },
    /// 模型加载失败
    #[error("模型加载失败 ({}): {message}", path.display())]
    Load { path: PathBuf, message: String },
    /// 模型目录无法创建
    #[error("无法创建模型目录 {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 无法确定用户数据目录
    #[error("无法确定用户数据目录，请通过 MODEL_DIR 指定模型目录")]
    NoDataDir,
}

/// 推理调用错误
#[derive(Debug, Error)]
pub enum InferenceError {
    /// 会话尚未就绪
    #[error("推理会话尚未就绪")]
    NotReady,
    /// 底层引擎调用失败
    #[error("模型调用失败 (模型: {model}): {message}")]
    Engine { model: String, message: String },
    /// 模型返回内容为空
    #[error("模型返回内容为空 (模型: {model})")]
    EmptyReply { model: String },
    /// 调用超时
    #[error("模型调用超时 ({limit:?})")]
    Timeout { limit: std::time::Duration },
}

/// 批次选择错误
#[derive(Debug, Error)]
pub enum BatchError {
    /// 选择的文件数量超过上限
    #[error("一次最多处理 {max} 份简历，当前选择了 {selected} 份")]
    TooLarge { selected: usize, max: usize },
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("写入文件失败 ({}): {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("写入表格失败 ({}): {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({}): {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("解析配置文件失败 ({}): {source}", path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::Extract(ExtractError::Io {
            path: path.into(),
            source,
        })
    }

    /// 创建模型调用错误
    pub fn engine_failed(model: impl Into<String>, message: impl ToString) -> Self {
        AppError::Inference(InferenceError::Engine {
            model: model.into(),
            message: message.to_string(),
        })
    }

    /// 是否属于批次级别的错误（模型无法就绪、选择超限、配置错误）
    ///
    /// 单份简历的错误（文件、推理）不会终止批次。
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            AppError::Model(_) | AppError::Batch(_) | AppError::Config(_)
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
