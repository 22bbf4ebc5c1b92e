use crate::error::AppError;
use crate::workflow::ParsingContext;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载解析策略参数
///
/// 文件中未出现的字段使用默认值，例如只写：
///
/// ```toml
/// min_question_length = 15
///
/// [essay]
/// gate_threshold = 0.7
/// ```
pub async fn load_parsing_policy(policy_file_path: &Path) -> Result<ParsingContext> {
    if !fs::try_exists(policy_file_path).await.unwrap_or(false) {
        return Err(AppError::not_found(policy_file_path.display().to_string()).into());
    }

    let content = fs::read_to_string(policy_file_path)
        .await
        .with_context(|| format!("无法读取策略文件: {}", policy_file_path.display()))?;

    let ctx = ParsingContext::from_toml_str(&content)
        .with_context(|| format!("无法解析策略文件: {}", policy_file_path.display()))?;

    tracing::info!(
        "已加载策略文件: {}",
        policy_file_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
    );

    Ok(ctx)
}
