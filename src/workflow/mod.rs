//! 流程层：单对文档的评估流程编排

pub mod evaluation_ctx;
pub mod evaluation_flow;

pub use evaluation_ctx::EvaluationCtx;
pub use evaluation_flow::{EvaluationFlow, EvaluationOutcome};
