//! 结果导出服务 - 业务能力层
//!
//! 只负责"把批次结果写成表格"能力，不关心流程

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ExportError;
use crate::models::{BatchItem, BatchStatus};

/// UTF-8 BOM，表格软件据此识别编码
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const HEADER: [&str; 9] = ["文件", "姓名", "性别", "年龄", "学历", "电话", "邮箱", "状态", "备注"];

/// 结果导出服务
///
/// 职责：
/// - 将 `{文档, 记录}` 列表写入 CSV 表格
/// - 空字段写为空单元格
/// - 不解析简历
pub struct ResultExporter {
    output_path: PathBuf,
}

impl ResultExporter {
    /// 创建新的导出服务
    pub fn new() -> Self {
        Self {
            output_path: PathBuf::from("resumes.csv"),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// 写入全部结果（覆盖已有文件）
    ///
    /// # 返回
    /// 返回写入的数据行数
    pub fn export(&self, items: &[BatchItem]) -> Result<usize, ExportError> {
        let io_err = |source| ExportError::Io {
            path: self.output_path.clone(),
            source,
        };
        let csv_err = |source| ExportError::Csv {
            path: self.output_path.clone(),
            source,
        };

        let mut file = File::create(&self.output_path).map_err(io_err)?;
        file.write_all(UTF8_BOM).map_err(io_err)?;

        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(HEADER).map_err(csv_err)?;

        for item in items {
            debug!("导出: {} ({})", item.document_id, item.status.name());
            writer.write_record(row(item)).map_err(csv_err)?;
        }

        writer.flush().map_err(io_err)?;
        info!(
            "✓ 已导出 {} 条结果到 {}",
            items.len(),
            self.output_path.display()
        );
        Ok(items.len())
    }
}

impl Default for ResultExporter {
    fn default() -> Self {
        Self::new()
    }
}

fn row(item: &BatchItem) -> [String; 9] {
    let record = item.record.clone().unwrap_or_default();

    let (status, note) = match item.status {
        BatchStatus::Failed => ("失败", item.error.clone().unwrap_or_default()),
        _ if record.is_degraded() => ("待核对", record.raw_reply.clone().unwrap_or_default()),
        status => (status.name(), String::new()),
    };

    [
        item.document_id.clone(),
        record.name.unwrap_or_default(),
        record.gender.map(|g| g.name().to_string()).unwrap_or_default(),
        record.age.map(|a| a.to_string()).unwrap_or_default(),
        record.education.unwrap_or_default(),
        record.phone.unwrap_or_default(),
        record.email.unwrap_or_default(),
        status.to_string(),
        note,
    ]
}
