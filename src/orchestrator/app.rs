//! 应用外壳 - 编排层
//!
//! 命令行入口使用的应用结构：负责选择校验、后台预热、打印进度、导出结果。

use anyhow::Result;
use futures::StreamExt;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::BatchError;
use crate::models::{BatchEvent, BatchSummary};
use crate::orchestrator::batch_processor::BatchProcessor;
use crate::services::{InferenceSessionManager, ResultExporter};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    processor: Arc<BatchProcessor>,
    exporter: ResultExporter,
}

impl App {
    /// 初始化应用，并在后台预热模型
    pub fn initialize(config: Config) -> Result<Self> {
        logging::log_startup(&config);

        let session = Arc::new(InferenceSessionManager::from_config(&config)?);
        info!("📁 模型目录: {}", session.store().dir().display());

        // 预热失败不在这里处理，批次开始时会再次尝试并报告
        let _warm_up = session.warm_up();

        let processor = Arc::new(BatchProcessor::from_config(session, &config));
        let exporter = ResultExporter::with_path(&config.output_file);

        Ok(Self {
            config,
            processor,
            exporter,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self, paths: Vec<PathBuf>) -> Result<BatchSummary> {
        let paths = select_documents(paths, self.config.max_batch_size)?;

        if paths.is_empty() {
            warn!("⚠️ 没有选择任何简历文件，程序结束");
            return Ok(BatchSummary::default());
        }

        let run = Arc::clone(&self.processor).spawn_batch(paths);
        let (events, handle) = run.into_stream();
        futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            match event {
                BatchEvent::Started { total } => info!("📋 共 {} 份简历", total),
                BatchEvent::Item(item) => logging::log_item_event(&item),
                BatchEvent::Completed { parsed, failed } => {
                    info!("🏁 批次结束: 解析 {} 份，失败 {} 份", parsed, failed)
                }
            }
        }

        let items = handle.await??;
        self.exporter.export(&items)?;

        let summary = BatchSummary::from_items(&items);
        logging::print_final_stats(&summary, &self.exporter.output_path().display().to_string());
        Ok(summary)
    }
}

/// 校验选择的文件：去重（保留首次出现的顺序），并检查数量上限
///
/// `max` 为 0 表示不限制。
pub fn select_documents(paths: Vec<PathBuf>, max: usize) -> Result<Vec<PathBuf>, BatchError> {
    let mut seen = HashSet::new();
    let unique: Vec<PathBuf> = paths
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect();

    if max > 0 && unique.len() > max {
        return Err(BatchError::TooLarge {
            selected: unique.len(),
            max,
        });
    }

    Ok(unique)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_documents_dedupes_in_order() {
        let paths = vec![
            PathBuf::from("b.pdf"),
            PathBuf::from("a.pdf"),
            PathBuf::from("b.pdf"),
        ];
        let selected = select_documents(paths, 10).unwrap();
        assert_eq!(selected, vec![PathBuf::from("b.pdf"), PathBuf::from("a.pdf")]);
    }

    #[test]
    fn test_select_documents_enforces_limit() {
        let paths: Vec<PathBuf> = (0..11).map(|i| PathBuf::from(format!("{i}.pdf"))).collect();
        let err = select_documents(paths.clone(), 10).unwrap_err();
        assert!(matches!(err, BatchError::TooLarge { selected: 11, max: 10 }));

        assert_eq!(select_documents(paths, 0).unwrap().len(), 11);
    }
}
