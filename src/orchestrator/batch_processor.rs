//! 批量评估处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文档对的评估和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、创建评估流程
//! 2. **批量加载**：扫描输入目录并把文档配成对（`Vec<DocumentPair>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将文档对分批次评估，每批完成后再开始下一批
//! 5. **结果落盘**：每对评估结果写入 `<学生卷主干>_result.json`
//! 6. **全局统计**：汇总所有文档对的评估结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单对文档的细节
//! - **向下委托**：委托 EvaluationFlow 评估单对文档

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::orchestrator::pair_scanner::{self, DocumentPair};
use crate::workflow::{EvaluationCtx, EvaluationFlow, EvaluationOutcome};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<EvaluationFlow>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> AppResult<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let flow = Arc::new(EvaluationFlow::new(&config)?);

        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> AppResult<()> {
        // 扫描并配对所有待评估的文档
        let all_pairs = self.load_pairs().await?;

        if all_pairs.is_empty() {
            warn!("⚠️ 没有找到可配对的文档，程序结束");
            return Ok(());
        }

        let total_pairs = all_pairs.len();
        log_pairs_loaded(total_pairs, self.config.max_concurrent_evaluations);

        // 评估所有文档对
        let stats = self.process_all_pairs(all_pairs).await?;

        // 输出最终统计
        print_final_stats(&stats, &self.config);

        Ok(())
    }

    /// 扫描并配对文档
    async fn load_pairs(&self) -> AppResult<Vec<DocumentPair>> {
        info!("\n📁 正在扫描待评估的文档...");
        pair_scanner::scan_document_pairs(&self.config.input_folder).await
    }

    /// 评估所有文档对
    async fn process_all_pairs(&self, all_pairs: Vec<DocumentPair>) -> AppResult<ProcessingStats> {
        let concurrency = self.config.max_concurrent_evaluations.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));
        let total_pairs = all_pairs.len();
        let mut stats = ProcessingStats {
            total: total_pairs,
            ..Default::default()
        };

        // 分批处理
        for batch_start in (0..total_pairs).step_by(concurrency) {
            let batch_end = (batch_start + concurrency).min(total_pairs);
            let batch_pairs = &all_pairs[batch_start..batch_end];
            let batch_num = (batch_start / concurrency) + 1;
            let total_batches = (total_pairs + concurrency - 1) / concurrency;

            log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_pairs,
            );

            // 处理本批
            let batch_result = self
                .process_batch(batch_pairs, batch_start, semaphore.clone())
                .await?;

            stats.success += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(batch_num, &batch_result);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_pairs: &[DocumentPair],
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> AppResult<BatchResult> {
        let mut batch_handles = Vec::new();

        // 为本批创建并发任务
        for (idx, pair) in batch_pairs.iter().enumerate() {
            let pair_index = batch_start + idx + 1;
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Other(format!("并发信号量已关闭: {}", e)))?;

            let flow = self.flow.clone();
            let pair = pair.clone();
            let ctx = EvaluationCtx::new(
                pair_index,
                pair.submission_name.clone(),
                pair.key_name.clone(),
            );

            let handle = tokio::spawn(async move {
                let _permit = permit;
                match flow.run(&ctx, &pair.submission_path, &pair.key_path).await {
                    Ok(outcome) => {
                        write_outcome(&pair, &outcome).await?;
                        Ok(())
                    }
                    Err(e) => {
                        error!("[文档对 {}] ❌ 评估过程中发生错误: {}", pair_index, e);
                        Err(e)
                    }
                }
            });
            batch_handles.push((pair_index, handle));
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();
        let (indices, handles): (Vec<_>, Vec<_>) = batch_handles.into_iter().unzip();

        for (pair_index, joined) in indices.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(Ok(())) => {
                    result.success += 1;
                }
                Ok(Err(_)) => {
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[文档对 {}] 任务执行失败: {}", pair_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 评估结果写入学生卷旁边的 `<主干>_result.json`
async fn write_outcome(pair: &DocumentPair, outcome: &EvaluationOutcome) -> AppResult<()> {
    let stem = pair
        .submission_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "evaluation".to_string());
    let mut path: PathBuf = pair
        .submission_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_default();
    path.push(format!("{}_result.json", stem));

    let json = serde_json::to_string_pretty(outcome)?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

    info!("💾 评估结果已写入: {}", path.display());
    Ok(())
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    success: usize,
    failed: usize,
    total: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

// ========== 日志辅助函数 ==========

fn init_log_file(log_file_path: &str) -> AppResult<()> {
    let log_header = format!(
        "{}\n文档评估日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, &log_header)
        .map_err(|e| AppError::file_write_failed(log_file_path, e))?;
    Ok(())
}

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量文档评估模式");
    info!("📊 最大并发数: {}", config.max_concurrent_evaluations);
    info!("🌐 评分服务: {}", config.oracle_api_base_url);
    info!("{}", "=".repeat(60));
}

fn log_pairs_loaded(total: usize, max_concurrent: usize) {
    info!("✓ 找到 {} 对待评估的文档", total);
    info!("📋 将以每批 {} 对的方式处理", max_concurrent);
    info!("💡 每批完成后再开始下一批\n");
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批文档对: {}-{} / 共 {} 对", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, result: &BatchResult) {
    info!("\n{}", "─".repeat(60));
    info!(
        "✓ 第 {} 批完成: 成功 {}/{}",
        batch_num,
        result.success,
        result.success + result.failed
    );
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部评估完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.failed);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
