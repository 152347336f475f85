//! 简历处理上下文
//!
//! 封装"我正在处理批次中的第几份简历"这一信息

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 简历处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 文档标识（文件路径）
    pub document_id: String,

    /// 文件路径
    pub path: PathBuf,

    /// 在批次中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 批次总数
    pub total: usize,
}

impl DocumentCtx {
    /// 创建新的简历上下文
    pub fn new(path: impl Into<PathBuf>, index: usize, total: usize) -> Self {
        let path = path.into();
        Self {
            document_id: path.to_string_lossy().into_owned(),
            path,
            index,
            total,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件名（日志显示用）
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.document_id.clone())
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[简历 {}/{} {}]", self.index, self.total, self.file_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_file_name() {
        let ctx = DocumentCtx::new("/home/hr/简历/张三.pdf", 2, 5);
        assert_eq!(ctx.document_id, "/home/hr/简历/张三.pdf");
        assert_eq!(ctx.to_string(), "[简历 2/5 张三.pdf]");
    }
}
