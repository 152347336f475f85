use serde::Serialize;

use super::resume::ResumeRecord;

/// 单份简历在批次中的状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// 等待处理
    Pending,
    /// 解析完成
    Parsed,
    /// 处理失败
    Failed,
}

impl BatchStatus {
    pub fn name(self) -> &'static str {
        match self {
            BatchStatus::Pending => "等待中",
            BatchStatus::Parsed => "已解析",
            BatchStatus::Failed => "失败",
        }
    }
}

/// 批次中的一份简历及其结果
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    /// 文档标识（文件路径）
    pub document_id: String,
    pub record: Option<ResumeRecord>,
    pub status: BatchStatus,
    /// 失败原因
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl BatchItem {
    pub fn pending(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
            record: None,
            status: BatchStatus::Pending,
            error: None,
            elapsed_ms: 0,
        }
    }

    /// 标记为解析完成。只允许从 `Pending` 转换一次。
    pub fn mark_parsed(&mut self, record: ResumeRecord, elapsed_ms: u64) {
        debug_assert_eq!(self.status, BatchStatus::Pending);
        self.record = Some(record);
        self.status = BatchStatus::Parsed;
        self.elapsed_ms = elapsed_ms;
    }

    /// 标记为失败，记录保持为空。只允许从 `Pending` 转换一次。
    pub fn mark_failed(&mut self, error: impl ToString, elapsed_ms: u64) {
        debug_assert_eq!(self.status, BatchStatus::Pending);
        self.record = None;
        self.status = BatchStatus::Failed;
        self.error = Some(error.to_string());
        self.elapsed_ms = elapsed_ms;
    }

    pub fn is_parsed(&self) -> bool {
        self.status == BatchStatus::Parsed
    }

    /// 是否为降级结果（已完成，但模型回复无法解析）
    pub fn is_degraded(&self) -> bool {
        self.record.as_ref().is_some_and(ResumeRecord::is_degraded)
    }
}

/// 批次事件，按输入顺序发布
#[derive(Debug, Clone)]
pub enum BatchEvent {
    /// 批次开始（会话已就绪）
    Started { total: usize },
    /// 一份简历处理完成（成功或失败）
    Item(BatchItem),
    /// 批次结束
    Completed { parsed: usize, failed: usize },
}

/// 批次统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub parsed: usize,
    /// 已解析但为降级结果的数量（包含在 parsed 中）
    pub degraded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        let mut summary = Self {
            total: items.len(),
            ..Default::default()
        };
        for item in items {
            match item.status {
                BatchStatus::Parsed => {
                    summary.parsed += 1;
                    if item.is_degraded() {
                        summary.degraded += 1;
                    }
                }
                BatchStatus::Failed => summary.failed += 1,
                BatchStatus::Pending => {}
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_lifecycle() {
        let mut item = BatchItem::pending("/tmp/a.pdf");
        assert_eq!(item.status, BatchStatus::Pending);
        assert!(item.record.is_none());

        item.mark_failed("文件不存在", 3);
        assert_eq!(item.status, BatchStatus::Failed);
        assert!(item.record.is_none());
        assert_eq!(item.error.as_deref(), Some("文件不存在"));
    }

    #[test]
    fn test_summary_counts_degraded_as_parsed() {
        let mut ok = BatchItem::pending("a");
        ok.mark_parsed(ResumeRecord::default(), 1);
        let mut degraded = BatchItem::pending("b");
        degraded.mark_parsed(ResumeRecord::degraded("???"), 1);
        let mut failed = BatchItem::pending("c");
        failed.mark_failed("boom", 1);

        let summary = BatchSummary::from_items(&[ok, degraded, failed]);
        assert_eq!(
            summary,
            BatchSummary {
                total: 3,
                parsed: 2,
                degraded: 1,
                failed: 1
            }
        );
    }
}
