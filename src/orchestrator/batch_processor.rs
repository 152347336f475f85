//! 批量简历处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块负责一批简历的调度和结果发布。
//!
//! ## 核心功能
//!
//! 1. **会话准备**：第一份简历之前确保推理会话就绪，失败则整批失败
//! 2. **串行处理**：严格按输入顺序逐份处理，第 N+1 份在第 N 份完成后才开始
//! 3. **失败隔离**：单份简历的错误记为失败，继续处理下一份
//! 4. **事件发布**：每完成一份发布一个事件，最后发布结束事件
//! 5. **最终结果**：返回与输入一一对应的 `Vec<BatchItem>`
//!
//! ## 设计特点
//!
//! - **单一工作者**：所有简历共享同一个推理会话，不做并发
//! - **会话注入**：会话由调用方创建并传入，不使用全局变量
//! - **向下委托**：委托 `ResumeFlow` 处理单份简历

use futures::stream::{self, Stream};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::{BatchEvent, BatchItem, BatchSummary};
use crate::services::InferenceSessionManager;
use crate::utils::logging;
use crate::workflow::{DocumentCtx, ResumeFlow};

/// 批量简历处理器
pub struct BatchProcessor {
    session: Arc<InferenceSessionManager>,
    flow: ResumeFlow,
}

/// 后台运行中的批次
pub struct BatchRun {
    /// 按输入顺序到达的事件
    pub events: mpsc::UnboundedReceiver<BatchEvent>,
    /// 最终结果
    pub handle: JoinHandle<AppResult<Vec<BatchItem>>>,
}

impl BatchRun {
    /// 把事件接收端转换为 `Stream`
    pub fn into_stream(
        self,
    ) -> (
        impl Stream<Item = BatchEvent>,
        JoinHandle<AppResult<Vec<BatchItem>>>,
    ) {
        let events = stream::unfold(self.events, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });
        (events, self.handle)
    }
}

impl BatchProcessor {
    pub fn new(session: Arc<InferenceSessionManager>, flow: ResumeFlow) -> Self {
        Self { session, flow }
    }

    pub fn from_config(session: Arc<InferenceSessionManager>, config: &Config) -> Self {
        Self::new(session, ResumeFlow::new(config))
    }

    pub fn session(&self) -> &Arc<InferenceSessionManager> {
        &self.session
    }

    /// 在后台运行一批简历
    pub fn spawn_batch(self: Arc<Self>, paths: Vec<PathBuf>) -> BatchRun {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move { self.run_batch(paths, &tx).await });
        BatchRun { events: rx, handle }
    }

    /// 运行一批简历
    ///
    /// 空批次直接返回空列表并发布结束事件，不会加载模型。
    /// 只有会话在第一份简历之前无法就绪时返回错误。
    pub async fn run_batch(
        &self,
        paths: Vec<PathBuf>,
        events: &mpsc::UnboundedSender<BatchEvent>,
    ) -> AppResult<Vec<BatchItem>> {
        if paths.is_empty() {
            info!("空批次，无需处理");
            publish(events, BatchEvent::Completed { parsed: 0, failed: 0 });
            return Ok(Vec::new());
        }

        let total = paths.len();
        logging::log_batch_start(total);

        // 会话必须在第一份简历之前就绪，失败时不发布任何事件
        self.session.ensure_ready().await?;
        publish(events, BatchEvent::Started { total });

        let mut items: Vec<BatchItem> = paths
            .iter()
            .map(|p| BatchItem::pending(p.to_string_lossy()))
            .collect();

        // ========== 逐份处理（严格串行） ==========
        for (idx, (path, item)) in paths.into_iter().zip(items.iter_mut()).enumerate() {
            let ctx = DocumentCtx::new(path, idx + 1, total);
            let started = Instant::now();

            match self.flow.run(&self.session, &ctx).await {
                Ok(record) => {
                    item.mark_parsed(record, elapsed_ms(started));
                }
                Err(e) => {
                    error!("{} ❌ 处理失败: {}", ctx, e);
                    item.mark_failed(&e, elapsed_ms(started));
                }
            }

            logging::log_document_complete(&ctx, item);
            publish(events, BatchEvent::Item(item.clone()));
        }

        let summary = BatchSummary::from_items(&items);
        publish(
            events,
            BatchEvent::Completed {
                parsed: summary.parsed,
                failed: summary.failed,
            },
        );

        Ok(items)
    }
}

/// 发布事件，接收方已关闭时忽略
fn publish(events: &mpsc::UnboundedSender<BatchEvent>, event: BatchEvent) {
    if events.send(event).is_err() {
        debug!("事件接收方已关闭，继续处理");
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
