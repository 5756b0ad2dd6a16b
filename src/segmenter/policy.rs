/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    /// 选择题
    Mcq,
    /// 简答题
    Short,
}

/// 题型判定时可用的上下文
#[derive(Debug, Clone, Copy)]
pub struct ClassifyContext<'a> {
    /// 当前题号
    pub question_number: u32,
    /// 当前区段标签（来自 `Section X:` 标签行）
    pub current_section: Option<&'a str>,
    /// 当前题型模式（来自区段标签或答案卷区段标记）
    pub current_kind: Option<QuestionKind>,
}

/// 题型判定策略
///
/// 由调用方注入，不同试卷模板可以提供自己的规则。
pub trait QuestionTypePolicy: Send + Sync {
    fn classify(&self, ctx: &ClassifyContext<'_>) -> QuestionKind;
}

/// 默认模板策略
///
/// 判定为简答题的条件依次是：区段为 B、当前模式为简答、题号达到
/// 阈值（默认 4，即前三题视为选择题）。题号阈值沿用既有模板的
/// 约定，对形状不同的试卷已知会误判，所以才做成可注入的策略。
pub struct DefaultTemplatePolicy {
    /// 题号达到该值即判定为简答题
    pub short_threshold: u32,
}

impl Default for DefaultTemplatePolicy {
    fn default() -> Self {
        Self { short_threshold: 4 }
    }
}

impl QuestionTypePolicy for DefaultTemplatePolicy {
    fn classify(&self, ctx: &ClassifyContext<'_>) -> QuestionKind {
        if ctx.current_section == Some("B")
            || ctx.current_kind == Some(QuestionKind::Short)
            || ctx.question_number >= self.short_threshold
        {
            QuestionKind::Short
        } else {
            QuestionKind::Mcq
        }
    }
}
