//! 简历处理流程 - 流程层
//!
//! 核心职责：定义"一份简历"的完整处理流程
//!
//! 流程顺序：
//! 1. 提取文本
//! 2. 重置对话 → 构建提示词 → 推理（独占会话）
//! 3. 解析回复 → 依据校验

use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::ResumeRecord;
use crate::services::{
    build_prompt, enforce_evidence, InferenceSessionManager, ReplyNormalizer, TextExtractor,
};
use crate::utils::logging::truncate_text;
use crate::workflow::resume_ctx::DocumentCtx;

/// 简历处理流程
///
/// - 编排单份简历的完整处理流程
/// - 不持有会话（由调用方传入）
/// - 只依赖业务能力（services）
pub struct ResumeFlow {
    extractor: TextExtractor,
    normalizer: ReplyNormalizer,
    verbose_logging: bool,
}

impl ResumeFlow {
    /// 创建新的简历处理流程
    pub fn new(config: &Config) -> Self {
        Self {
            extractor: TextExtractor::new(config.max_document_chars),
            normalizer: ReplyNormalizer::new(),
            verbose_logging: config.verbose_logging,
        }
    }

    pub fn with_parts(extractor: TextExtractor, normalizer: ReplyNormalizer) -> Self {
        Self {
            extractor,
            normalizer,
            verbose_logging: false,
        }
    }

    /// 处理一份简历
    ///
    /// 文件读取失败、会话无法就绪、推理失败时返回错误；
    /// 回复无法解析不算错误，返回降级记录。
    pub async fn run(
        &self,
        session: &InferenceSessionManager,
        ctx: &DocumentCtx,
    ) -> AppResult<ResumeRecord> {
        // ========== 步骤 1: 提取文本 ==========
        let text = self.extractor.extract_text(ctx.path()).await?;

        if text.trim().is_empty() {
            info!("{} 未提取到文本，跳过模型调用", ctx);
            return Ok(ResumeRecord::default());
        }

        if self.verbose_logging {
            debug!("{} 文本预览: {}", ctx, truncate_text(&text, 80));
        }

        // ========== 步骤 2: 推理（整个轮次独占会话） ==========
        let reply = {
            let mut turn = session.turn().await?;
            turn.reset();
            let prompt = build_prompt(&text);
            info!("{} 🧠 正在调用模型...", ctx);
            turn.complete(&prompt).await?
        };

        if self.verbose_logging {
            debug!("{} 模型回复: {}", ctx, truncate_text(&reply, 200));
        }

        // ========== 步骤 3: 解析回复 ==========
        let record = enforce_evidence(self.normalizer.normalize(&reply), &text);
        Ok(record)
    }
}
