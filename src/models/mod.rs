//! 数据模型
//!
//! 流水线各阶段共享的记录类型与评分服务的请求/响应结构。

pub mod oracle;
pub mod record;

pub use oracle::{OracleResponse, OracleScoreSummary, QuestionResult};
pub use record::{
    percentage, DocumentExtractionResult, DocumentMetadata, DocumentPayload, McqOption, McqRecord,
    ReconciledEvaluationRequest, ScoreSummary, ShortAnswerRecord, UNKNOWN_ANSWER,
};
