//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量简历处理器
//! - 确保推理会话在第一份简历之前就绪
//! - 严格按顺序逐份处理（共享同一个推理会话）
//! - 隔离单份简历的失败
//! - 按输入顺序发布事件，返回最终结果列表
//!
//! ### `app` - 应用外壳
//! - 校验选择的文件（去重、数量上限）
//! - 后台预热模型
//! - 打印进度、导出表格、输出统计
//!
//! ## 层次关系
//!
//! ```text
//! app (命令行入口)
//!     ↓
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! workflow::ResumeFlow (处理单份简历)
//!     ↓
//! services (能力层：extract / prompt / session / normalize / export)
//!     ↓
//! infrastructure (基础设施：ModelStore / ChatEngine)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，ResumeFlow 管单份
//! 2. **资源隔离**：推理会话只由 InferenceSessionManager 持有
//! 3. **向下依赖**：编排层 → workflow → services → infrastructure
//! 4. **无业务逻辑**：只做调度和统计，不做具体解析

pub mod app;
pub mod batch_processor;

// 重新导出主要类型
pub use app::{select_documents, App};
pub use batch_processor::{BatchProcessor, BatchRun};
