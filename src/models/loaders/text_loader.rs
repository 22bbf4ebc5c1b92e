use crate::error::AppError;
use crate::models::paper::PaperInput;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 答案文件命名约定：`<试卷名>_答案.txt`
pub const ANSWER_FILE_SUFFIX: &str = "_答案";

/// 加载单份试卷文本，同时查找同目录下的答案文件
pub async fn load_paper(text_file_path: &Path) -> Result<PaperInput> {
    let text = fs::read_to_string(text_file_path)
        .await
        .map_err(|e| AppError::file_read_failed(text_file_path.display().to_string(), e))?;

    let mut paper = PaperInput::new(text_file_path.to_string_lossy().to_string(), text);

    let answer_path = answer_path_for(text_file_path);
    if fs::try_exists(&answer_path).await.unwrap_or(false) {
        let answer_text = fs::read_to_string(&answer_path)
            .await
            .with_context(|| format!("无法读取答案文本: {}", answer_path.display()))?;
        paper.answer_text = Some(answer_text);
    }

    Ok(paper)
}

/// 从文件夹中加载所有试卷文本（按文件名排序）
///
/// 答案文件本身不会被当作试卷
pub async fn load_all_papers(folder_path: &str) -> Result<Vec<PaperInput>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        return Err(AppError::directory_not_found(folder_path).into());
    }

    let mut text_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("txt") && !is_answer_file(&path) {
            text_files.push(path);
        }
    }
    text_files.sort();

    let mut papers = Vec::new();
    for path in text_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_paper(&path).await {
            Ok(paper) => {
                tracing::info!(
                    "成功加载 {} 个字符{}",
                    paper.text.chars().count(),
                    if paper.answer_text.is_some() { "（含答案）" } else { "" }
                );
                papers.push(paper);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {}", path.display(), e);
            }
        }
    }

    Ok(papers)
}

fn answer_path_for(text_file_path: &Path) -> PathBuf {
    let stem = text_file_path
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();
    text_file_path.with_file_name(format!("{}{}.txt", stem, ANSWER_FILE_SUFFIX))
}

fn is_answer_file(path: &Path) -> bool {
    path.file_stem()
        .map(|s| s.to_string_lossy().ends_with(ANSWER_FILE_SUFFIX))
        .unwrap_or(false)
}
