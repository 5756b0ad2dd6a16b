//! 评估上下文
//!
//! 封装"我正在评估第几对文档"这一信息

use std::fmt::Display;

/// 评估上下文
///
/// 包含评估单对文档所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct EvaluationCtx {
    /// 文档对索引（仅用于日志显示）
    pub pair_index: usize,

    /// 学生卷文件名
    pub submission_name: String,

    /// 答案卷文件名
    pub key_name: String,
}

impl EvaluationCtx {
    /// 创建新的评估上下文
    pub fn new(pair_index: usize, submission_name: String, key_name: String) -> Self {
        Self {
            pair_index,
            submission_name,
            key_name,
        }
    }
}

impl Display for EvaluationCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[文档对 #{} 学生卷#{} 答案卷#{}]",
            self.pair_index, self.submission_name, self.key_name
        )
    }
}
