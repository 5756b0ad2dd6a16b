//! # Exam Paper Eval
//!
//! 一个用于批量评估考试文档的 Rust 应用程序：提取学生卷和答案卷的
//! 文本，切分出题目结构，核对答案后提交外部评分服务并聚合结果。
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `extract/` - 文档字节到纯文本的解码（PDF / DOCX）
//! - `oracle/client` - 唯一的网络出口，评分服务 HTTP 客户端
//!
//! ### ② 业务能力层（Services）
//! - `segmenter/` - 纯文本到题目记录的切分能力
//! - `reconcile/` - 学生卷 × 答案卷的核对能力
//! - `oracle/request` - 评估请求构建能力
//! - `score/` - 评分响应聚合能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一对文档"的完整评估流程
//! - `EvaluationCtx` - 上下文封装（pair_index + 文件名）
//! - `EvaluationFlow` - 流程编排（extract → segment → reconcile → oracle → aggregate）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/pair_scanner` - 目录扫描与文件名配对
//! - `orchestrator/batch_processor` - 批量评估处理器，管理并发和结果落盘
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod oracle;
pub mod orchestrator;
pub mod reconcile;
pub mod score;
pub mod segmenter;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{
    DocumentExtractionResult, McqRecord, OracleResponse, ScoreSummary, ShortAnswerRecord,
};
pub use orchestrator::App;
pub use reconcile::AnswerReconciler;
pub use segmenter::QuestionSegmenter;
pub use workflow::{EvaluationCtx, EvaluationFlow, EvaluationOutcome};
