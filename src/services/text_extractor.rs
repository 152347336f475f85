//! 文本提取服务 - 业务能力层
//!
//! 只负责"把一份简历文件变成纯文本"能力，按扩展名分发到具体的解码器

use phf::phf_map;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::ExtractError;

/// 支持的文档格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn name(self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::Docx => "DOCX",
            DocumentFormat::PlainText => "TXT",
        }
    }
}

/// 扩展名（小写）到格式的映射
static FORMATS: phf::Map<&'static str, DocumentFormat> = phf_map! {
    "pdf" => DocumentFormat::Pdf,
    "docx" => DocumentFormat::Docx,
    "txt" => DocumentFormat::PlainText,
};

/// 根据扩展名识别格式（不区分大小写）
pub fn detect_format(path: &Path) -> Option<DocumentFormat> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    FORMATS.get(ext.as_str()).copied()
}

/// 文本提取服务
///
/// 职责：
/// - 读取单个文件并提取纯文本
/// - 不认识的扩展名返回空文本，而不是报错
/// - 不关心批次
#[derive(Debug, Clone)]
pub struct TextExtractor {
    max_chars: usize,
}

impl TextExtractor {
    /// `max_chars` 为 0 表示不截断
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// 提取文件文本
    ///
    /// 文件无法读取时返回 [`ExtractError::Io`]；文件可读但解码失败时返回
    /// [`ExtractError::Decode`]。
    pub async fn extract_text(&self, path: &Path) -> Result<String, ExtractError> {
        // 先确认文件可读，区分 IO 错误与解码错误
        tokio::fs::File::open(path)
            .await
            .map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let Some(format) = detect_format(path) else {
            warn!("不支持的文件格式，按空文本处理: {}", path.display());
            return Ok(String::new());
        };

        let owned = path.to_path_buf();
        let raw = tokio::task::spawn_blocking(move || decode(&owned, format))
            .await
            .map_err(|e| ExtractError::Decode {
                path: path.to_path_buf(),
                format: format.name(),
                message: e.to_string(),
            })??;

        let text = truncate_chars(normalize_whitespace(&raw), self.max_chars);
        debug!(
            "提取 {} 文本完成: {} ({} 字符)",
            format.name(),
            path.display(),
            text.chars().count()
        );
        Ok(text)
    }
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(0)
    }
}

fn decode(path: &Path, format: DocumentFormat) -> Result<String, ExtractError> {
    let decode_failed = |message: String| ExtractError::Decode {
        path: path.to_path_buf(),
        format: format.name(),
        message,
    };

    match format {
        DocumentFormat::Pdf => pdf_extract::extract_text(path).map_err(|e| decode_failed(e.to_string())),
        DocumentFormat::Docx => docx_lite::extract_text(path).map_err(|e| decode_failed(e.to_string())),
        DocumentFormat::PlainText => std::fs::read(path)
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .map_err(|source| ExtractError::Io {
                path: path.to_path_buf(),
                source,
            }),
    }
}

/// 规整空白：统一换行、去掉行尾空白、合并连续空行
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

/// 按字符截断，0 表示不截断
fn truncate_chars(text: String, max_chars: usize) -> String {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text;
    }
    text.chars().take(max_chars).collect()
}
