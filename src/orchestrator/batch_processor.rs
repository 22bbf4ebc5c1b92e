//! 批量试卷处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、策略参数、输出目录
//! 2. **批量加载**：扫描目录中的试卷文本及对应答案
//! 3. **并发控制**：Semaphore 限制并发数，每份试卷在 `spawn_blocking` 中独占一个线程
//! 4. **分批处理**：一批全部完成后再开始下一批
//! 5. **结果输出**：每份试卷一个 JSON，有问题的试卷写入 warn 文件
//! 6. **全局统计**

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::models::{load_all_papers, load_parsing_policy, PaperInput};
use crate::orchestrator::paper_processor::{self, PaperResult};
use crate::services::WarnWriter;
use crate::utils::logging;
use crate::workflow::ParsingContext;

/// 应用主结构
pub struct App {
    config: Config,
    ctx: ParsingContext,
    warn_writer: WarnWriter,
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 解析出题目且题号完整
    pub success: usize,
    /// 解析出题目但题号不完整
    pub incomplete: usize,
    /// 没有题目、任务失败或写文件失败
    pub failed: usize,
    pub total: usize,
}

/// 单份试卷的最终状态
enum PaperStatus {
    Success,
    Incomplete,
    Failed,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        logging::init_log_file(&config.output_log_file).await?;
        logging::log_startup(config.max_concurrent_papers, &config.input_folder);

        let ctx = match &config.policy_file {
            Some(path) => load_parsing_policy(Path::new(path)).await?,
            None => ParsingContext::default(),
        };

        tokio::fs::create_dir_all(&config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", config.output_folder))?;

        let warn_writer = WarnWriter::with_path(config.warn_file.clone());
        Ok(Self {
            config,
            ctx,
            warn_writer,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        info!("📁 正在扫描待解析的试卷...");
        let all_papers = load_all_papers(&self.config.input_folder).await?;

        if all_papers.is_empty() {
            warn!("⚠️ 没有找到待解析的试卷文本，程序结束");
            return Ok(ProcessingStats::default());
        }

        logging::log_papers_loaded(all_papers.len(), self.config.max_concurrent_papers);
        let stats = self.process_all_papers(all_papers).await?;

        logging::print_final_stats(
            stats.success,
            stats.incomplete,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );
        Ok(stats)
    }

    async fn process_all_papers(&self, all_papers: Vec<PaperInput>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_papers.max(1);
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_papers = all_papers.len();
        let total_batches = total_papers.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_papers,
            ..Default::default()
        };

        for (batch_index, batch) in all_papers.chunks(batch_size).enumerate() {
            let batch_start = batch_index * batch_size;
            logging::log_batch_start(
                batch_index + 1,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                total_papers,
            );

            let statuses = self.process_batch(batch, semaphore.clone()).await?;
            let mut batch_success = 0;
            for status in statuses {
                match status {
                    PaperStatus::Success => {
                        stats.success += 1;
                        batch_success += 1;
                    }
                    PaperStatus::Incomplete => stats.incomplete += 1,
                    PaperStatus::Failed => stats.failed += 1,
                }
            }

            logging::log_batch_complete(batch_index + 1, batch_success, batch.len());
        }

        Ok(stats)
    }

    /// 处理单个批次：每份试卷一个阻塞任务，全部完成后统一写结果
    async fn process_batch(
        &self,
        batch: &[PaperInput],
        semaphore: Arc<Semaphore>,
    ) -> Result<Vec<PaperStatus>> {
        let mut handles = Vec::with_capacity(batch.len());
        for paper in batch {
            let permit = semaphore.clone().acquire_owned().await?;
            let paper = paper.clone();
            let ctx = self.ctx.clone();

            handles.push(tokio::task::spawn_blocking(move || {
                let _permit = permit;
                paper_processor::process_paper(&paper, &ctx)
            }));
        }

        let mut statuses = Vec::with_capacity(batch.len());
        for (paper, joined) in batch.iter().zip(join_all(handles).await) {
            let status = match joined {
                Ok(result) => self.finish_paper(&result).await,
                Err(e) => {
                    error!("[试卷 {}] ❌ 任务执行失败: {}", paper.name, e);
                    self.write_warning(&paper.name, &format!("任务执行失败: {}", e))
                        .await;
                    PaperStatus::Failed
                }
            };
            statuses.push(status);
        }
        Ok(statuses)
    }

    /// 写 JSON、必要时写 warn 文件，返回试卷状态
    async fn finish_paper(&self, result: &PaperResult) -> PaperStatus {
        if let Err(e) = self.write_result(result).await {
            error!("[试卷 {}] ❌ 写入结果失败: {:#}", result.paper, e);
            return PaperStatus::Failed;
        }

        match result.warning() {
            None => PaperStatus::Success,
            Some(reason) => {
                self.write_warning(&result.paper, &reason).await;
                if result.questions.is_empty() {
                    PaperStatus::Failed
                } else {
                    PaperStatus::Incomplete
                }
            }
        }
    }

    async fn write_result(&self, result: &PaperResult) -> Result<PathBuf> {
        let path = Path::new(&self.config.output_folder).join(format!("{}.json", result.paper));
        let json = serde_json::to_string_pretty(result)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        if self.config.verbose_logging {
            info!("[试卷 {}] 结果已写入 {}", result.paper, path.display());
        }
        Ok(path)
    }

    async fn write_warning(&self, paper_name: &str, reason: &str) {
        if let Err(e) = self.warn_writer.write(paper_name, reason).await {
            error!("[试卷 {}] 写入警告文件失败: {:#}", paper_name, e);
        }
    }
}
