//! 警告写入服务
//!
//! 只负责"写 warn.txt"，不关心流程

use anyhow::{Context, Result};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// 警告写入服务
///
/// 没解析出题目、或者题号不完整的试卷记到 warn 文件，留给人工检查
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    /// 追加一条警告：`试卷 <name> | <reason>`
    pub async fn write(&self, paper_name: &str, reason: &str) -> Result<()> {
        debug!("写入警告: 试卷 {} | {}", paper_name, reason);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .with_context(|| format!("无法打开警告文件: {}", self.warn_file_path))?;

        let warn_msg = format!("试卷 {} | {}\n", paper_name, reason);
        file.write_all(warn_msg.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
