/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::{info, warn};

use crate::config::Config;
use crate::models::{BatchItem, BatchStatus, BatchSummary};
use crate::workflow::DocumentCtx;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 简历信息提取");
    info!("🧠 模型文件: {}", config.model_file);
    info!("🔌 推理服务: {}", config.llm_api_base_url);
    if config.max_batch_size > 0 {
        info!("📊 单批上限: {} 份", config.max_batch_size);
    }
    info!("{}", "=".repeat(60));
}

/// 记录批次开始信息
pub fn log_batch_start(total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理 {} 份简历（逐份处理）", total);
    info!("{}", "=".repeat(60));
}

/// 记录单份简历完成信息
pub fn log_document_complete(ctx: &DocumentCtx, item: &BatchItem) {
    match item.status {
        BatchStatus::Parsed if item.is_degraded() => {
            warn!("{} ⚠️ 完成，但模型回复无法解析 ({} ms)", ctx, item.elapsed_ms)
        }
        BatchStatus::Parsed => info!("{} ✓ 解析完成 ({} ms)", ctx, item.elapsed_ms),
        BatchStatus::Failed => warn!("{} ❌ 失败 ({} ms)", ctx, item.elapsed_ms),
        BatchStatus::Pending => {}
    }
}

/// 打印事件中的单份结果
pub fn log_item_event(item: &BatchItem) {
    let Some(record) = &item.record else {
        info!(
            "  {} | {} | {}",
            item.document_id,
            item.status.name(),
            item.error.as_deref().unwrap_or_default()
        );
        return;
    };

    info!(
        "  {} | 姓名: {} | 性别: {} | 年龄: {} | 学历: {} | 电话: {} | 邮箱: {}",
        item.document_id,
        record.name.as_deref().unwrap_or("-"),
        record.gender.map(|g| g.name()).unwrap_or("-"),
        record.age.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string()),
        record.education.as_deref().unwrap_or("-"),
        record.phone.as_deref().unwrap_or("-"),
        record.email.as_deref().unwrap_or("-"),
    );
}

/// 打印最终统计信息
pub fn print_final_stats(summary: &BatchSummary, output_path: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 解析: {}/{}", summary.parsed, summary.total);
    if summary.degraded > 0 {
        info!("⚠️ 待核对: {}", summary.degraded);
    }
    info!("❌ 失败: {}", summary.failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已导出至: {}", output_path);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("张三李四王五", 4), "张三李四...");
        assert_eq!(truncate_text("短", 4), "短");
    }
}
