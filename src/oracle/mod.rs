//! 评分服务对接：请求构建 + HTTP 客户端

pub mod client;
pub mod request;

pub use client::OracleClient;
pub use request::{build_evaluation_request, DEFAULT_MCQ_MARKS, DEFAULT_SHORT_MARKS};
