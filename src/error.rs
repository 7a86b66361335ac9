use thiserror::Error;

use crate::token::Span;

/// 过滤器编译错误，任何一种错误都会使整个过滤器被拒绝
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unexpected token `{token}` at {span}")]
    UnexpectedToken { token: String, span: Span },

    #[error("malformed expression: {message}")]
    MalformedExpression { message: String, span: Option<Span> },

    #[error("unknown attribute `{name}`")]
    UnknownAttribute { name: String },

    #[error("failed to serialize filter tree: {0}")]
    Json(#[from] serde_json::Error),
}

impl FilterError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FilterError::MalformedExpression { message: message.into(), span: None }
    }

    pub(crate) fn malformed_at(message: impl Into<String>, span: Span) -> Self {
        FilterError::MalformedExpression { message: message.into(), span: Some(span) }
    }

    /// 错误在过滤器文本中的位置
    pub fn span(&self) -> Option<Span> {
        match self {
            FilterError::UnexpectedToken { span, .. } => Some(*span),
            FilterError::MalformedExpression { span, .. } => *span,
            FilterError::UnknownAttribute { .. } | FilterError::Json(_) => None,
        }
    }
}
