//! 评估流程 - 流程层
//!
//! 核心职责：定义"一对文档"的完整评估流程
//!
//! 流程顺序：
//! 1. 并行提取并切分学生卷和答案卷
//! 2. 答案核对（角色归一 + 兜底合成）
//! 3. 构建评估请求并提交评分服务
//! 4. 聚合评分结果

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::extract::{self, ExtractionError};
use crate::models::{
    DocumentExtractionResult, DocumentMetadata, QuestionResult, ScoreSummary,
};
use crate::oracle::{build_evaluation_request, OracleClient};
use crate::reconcile::AnswerReconciler;
use crate::score;
use crate::segmenter::policy::DefaultTemplatePolicy;
use crate::segmenter::QuestionSegmenter;
use crate::workflow::evaluation_ctx::EvaluationCtx;

/// 单对文档的评估结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationOutcome {
    pub summary: ScoreSummary,
    pub mcq_results: Vec<QuestionResult>,
    pub short_question_results: Vec<QuestionResult>,
}

/// 评估流程
///
/// - 编排完整的单对文档评估流程
/// - 决定何时提取、何时核对、何时提交
/// - 不持有文件系统状态，路径由编排层传入
pub struct EvaluationFlow {
    segmenter: QuestionSegmenter,
    reconciler: AnswerReconciler,
    oracle: OracleClient,
    extract_timeout_secs: u64,
    verbose_logging: bool,
}

impl EvaluationFlow {
    /// 创建新的评估流程
    pub fn new(config: &Config) -> AppResult<Self> {
        let segmenter = QuestionSegmenter::with_policy(
            Box::new(DefaultTemplatePolicy::default()),
            config.key_lookahead_window,
        )
        .map_err(|e| AppError::Other(format!("切分器正则编译失败: {}", e)))?;
        let reconciler = AnswerReconciler::new()
            .map_err(|e| AppError::Other(format!("核对器正则编译失败: {}", e)))?;

        Ok(Self {
            segmenter,
            reconciler,
            oracle: OracleClient::new(
                &config.oracle_api_base_url,
                &config.oracle_api_key,
                config.oracle_timeout_secs,
            ),
            extract_timeout_secs: config.extract_timeout_secs,
            verbose_logging: config.verbose_logging,
        })
    }

    pub async fn run(
        &self,
        ctx: &EvaluationCtx,
        submission_path: &Path,
        key_path: &Path,
    ) -> AppResult<EvaluationOutcome> {
        info!("[文档对 {}] 📄 开始提取并切分两份文档...", ctx.pair_index);

        // ========== 阶段 1: 并行提取并切分 ==========
        let (submission, key) = tokio::try_join!(
            self.extract_and_segment(submission_path, &ctx.submission_name, false),
            self.extract_and_segment(key_path, &ctx.key_name, true),
        )?;

        info!(
            "[文档对 {}] ✓ 切分完成: 学生卷 选择题 {} / 简答题 {}, 答案卷 选择题 {} / 简答题 {}",
            ctx.pair_index,
            submission.mcqs.len(),
            submission.short_questions.len(),
            key.mcqs.len(),
            key.short_questions.len()
        );

        if self.verbose_logging {
            self.log_segment_preview(ctx.pair_index, &submission);
        }

        // ========== 阶段 2: 核对 ==========
        let lists = self.reconciler.reconcile(&submission, &key);

        if lists.student_mcqs.is_empty() && lists.student_short_questions.is_empty() {
            warn!(
                "[文档对 {}] ⚠️ 学生卷没有切分出任何题目，仍按空卷提交评估",
                ctx.pair_index
            );
        }

        // ========== 阶段 3: 构建请求并提交评分服务 ==========
        let request = build_evaluation_request(
            &lists,
            DocumentMetadata {
                file_name: ctx.submission_name.clone(),
                ..Default::default()
            },
            DocumentMetadata {
                file_name: ctx.key_name.clone(),
                ..Default::default()
            },
        );

        info!("[文档对 {}] 📤 正在提交评估请求...", ctx.pair_index);
        let response = self.oracle.evaluate(&request).await?;

        // ========== 阶段 4: 聚合 ==========
        let summary = score::aggregate(&response);
        info!(
            "[文档对 {}] ✓ 评估完成: 总分 {}/{} ({}%)",
            ctx.pair_index,
            summary.total_obtained,
            summary.total_marks,
            summary.overall_percentage()
        );

        Ok(EvaluationOutcome {
            summary,
            mcq_results: response.mcq_results,
            short_question_results: response.short_question_results,
        })
    }

    /// 读取文件、在阻塞线程上提取文本并切分
    ///
    /// 提取是 CPU 密集的同步解码，放到 spawn_blocking 里并套超时，
    /// 防止单个损坏文档拖死整批任务。
    async fn extract_and_segment(
        &self,
        path: &Path,
        file_name: &str,
        is_answer_sheet_hint: bool,
    ) -> AppResult<DocumentExtractionResult> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;

        let owned_name = file_name.to_string();
        let extraction = tokio::time::timeout(
            Duration::from_secs(self.extract_timeout_secs),
            tokio::task::spawn_blocking(move || extract::extract_text(&bytes, &owned_name)),
        )
        .await
        .map_err(|_| {
            AppError::Extraction(ExtractionError::Timeout {
                file_name: file_name.to_string(),
                seconds: self.extract_timeout_secs,
            })
        })?
        .map_err(|e| AppError::Other(format!("提取任务被中断: {}", e)))??;

        Ok(self.segmenter.segment(&extraction, is_answer_sheet_hint))
    }

    // ========== 日志辅助方法 ==========

    /// 显示学生卷切分预览
    fn log_segment_preview(&self, pair_index: usize, submission: &DocumentExtractionResult) {
        for record in submission.mcqs.iter().take(3) {
            info!(
                "[文档对 {}]   Q{} 选择: {:?}",
                pair_index, record.question_number, record.selected_answer
            );
        }
        for record in submission.short_questions.iter().take(2) {
            let preview = crate::utils::truncate_text(&record.answer, 60);
            info!(
                "[文档对 {}]   Q{} 简答: {}",
                pair_index, record.question_number, preview
            );
        }
    }
}
