//! 日志工具
//!
//! 初始化 tracing，并提供批处理各阶段的日志输出

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing（`RUST_LOG` 优先，默认 info）
///
/// 重复初始化会被忽略
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}

/// 初始化日志文件（写入表头）
pub async fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n试卷解析日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    tokio::fs::write(log_file_path, log_header)
        .await
        .with_context(|| format!("无法写入日志文件: {}", log_file_path))?;
    Ok(())
}

pub fn log_startup(max_concurrent: usize, input_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 多线程试卷解析模式");
    info!("📁 试卷目录: {}", input_folder);
    info!("📊 最大并发数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

pub fn log_papers_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 份待解析的试卷", total);
    info!("📋 将以每批 {} 份的方式处理", max_concurrent);
}

pub fn log_batch_start(
    batch_num: usize,
    total_batches: usize,
    start: usize,
    end: usize,
    total: usize,
) {
    info!("{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批试卷: {}-{} / 共 {} 份", start, end, total);
    info!("{}", "=".repeat(60));
}

pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("{}", "─".repeat(60));
    info!("✓ 第 {} 批完成: 成功 {}/{}", batch_num, success, total);
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
pub fn print_final_stats(
    success: usize,
    incomplete: usize,
    failed: usize,
    total: usize,
    log_file_path: &str,
) {
    info!("{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("⚠️ 题号不完整: {}", incomplete);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("日志已保存至: {}", log_file_path);
}

/// 截断长文本用于日志显示
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
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("下列何者正確", 4), "下列何者...");
        assert_eq!(truncate_text("短", 4), "短");
    }

    #[tokio::test]
    async fn test_log_file_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        init_log_file(&path.to_string_lossy()).await.unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("试卷解析日志"));
    }
}
