use serde::{Deserialize, Serialize};

/// 后端 case 过滤器的表达式树节点
///
/// 序列化时以 `type` 字段区分节点种类，例如：
/// `{"type":"EQ","key":"status","value":"ACTUAL"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Expression {
    /// 相等比较, 这是表达式树的叶子节点
    Eq { key: String, value: Literal },
    /// 不等比较
    Neq { key: String, value: Literal },
    /// 逻辑非运算 (NOT)
    Not { left: Box<Expression> },
    /// 逻辑与运算 (AND)
    And { left: Box<Expression>, right: Box<Expression> },
    /// 逻辑或运算 (OR)
    Or { left: Box<Expression>, right: Box<Expression> },
    /// IN (...) 包含检查，只由简单过滤语法产生
    In { key: String, value: Vec<Literal> },
}

impl Expression {
    pub fn not(inner: Expression) -> Self {
        Expression::Not { left: Box::new(inner) }
    }

    pub fn and(left: Expression, right: Expression) -> Self {
        Expression::And { left: Box::new(left), right: Box::new(right) }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Expression::Or { left: Box::new(left), right: Box::new(right) }
    }
}

/// 字面量值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// `EMPTY`
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Literal {
    /// 裸字面量：能解析为 JSON 数字的作为数字，其余作为字符串
    pub fn from_bare(text: &str) -> Self {
        match text.parse::<serde_json::Number>() {
            Ok(n) => Literal::Number(n),
            Err(_) => Literal::String(text.to_string()),
        }
    }
}
