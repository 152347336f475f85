//! # Resume Extract
//!
//! 一个用于从简历文件（PDF / DOCX）中提取候选人信息的 Rust 应用程序，
//! 文本理解交给本地部署的大模型完成
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（模型），只暴露能力
//! - `ModelStore` - 定位用户模型目录中的模型文件
//! - `ChatEngine` / `ModelLoader` - 加载模型，根据对话历史生成回复
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单份简历
//! - `TextExtractor` - 按扩展名提取文本
//! - `InferenceSessionManager` - 唯一持有推理会话，串行化所有推理
//! - `build_prompt` - 构建提取提示词
//! - `ReplyNormalizer` - 把模型回复还原为结构化记录
//! - `enforce_evidence` - 清除原文中没有依据的字段
//! - `ResultExporter` - 导出表格
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份简历"的完整处理流程
//! - `DocumentCtx` - 上下文封装（文件 + 批次序号）
//! - `ResumeFlow` - 流程编排（extract → reset → prompt → infer → normalize）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量简历处理器，串行处理并发布事件
//! - `orchestrator/app` - 命令行应用外壳
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{ChatEngine, ChatMessage, ModelArtifact, ModelLoader, ModelStore};
pub use models::{BatchEvent, BatchItem, BatchStatus, BatchSummary, Gender, ResumeRecord};
pub use orchestrator::{App, BatchProcessor, BatchRun};
pub use services::{InferenceSessionManager, ReplyNormalizer, SessionPhase, TextExtractor};
pub use workflow::{DocumentCtx, ResumeFlow};
