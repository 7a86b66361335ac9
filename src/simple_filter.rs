//! 简单过滤语法：`title=value&title=v1,v2`
//!
//! 每个 `&` 分隔的部分是一个条件：单个值生成 `EQ`，逗号分隔的多个值生成 `IN`。
//! 所有条件用 `AND` 组合成一棵平衡树，例如四个条件生成
//! `AND(AND(c1, c2), AND(c3, c4))`。

use crate::ast::{Expression, Literal};
use crate::error::FilterError;
use crate::resolver::{resolve_key, AttributeResolver};

/// 解析简单过滤语法，空字符串返回 `None`
pub fn parse_simple_filter<R: AttributeResolver + ?Sized>(
    resolver: &R,
    filter_text: &str,
) -> Result<Option<Expression>, FilterError> {
    if filter_text.is_empty() {
        return Ok(None);
    }

    let conditions = filter_text
        .split('&')
        .map(|part| parse_condition(resolver, part))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Some(combine_balanced(conditions)))
}

/// 解析单个条件 `title=value` 或 `title=v1,v2,...`
fn parse_condition<R: AttributeResolver + ?Sized>(
    resolver: &R,
    part: &str,
) -> Result<Expression, FilterError> {
    let (title, values) = part
        .split_once('=')
        .ok_or_else(|| FilterError::malformed(format!("condition `{}` has no `=`", part)))?;

    let key = resolve_key(resolver, title)?;
    let mut values: Vec<Literal> = values
        .split(',')
        .map(|v| Literal::String(v.to_string()))
        .collect();

    if values.len() > 1 {
        Ok(Expression::In { key, value: values })
    } else {
        // split 至少返回一个元素
        let value = values.pop().unwrap_or(Literal::String(String::new()));
        Ok(Expression::Eq { key, value })
    }
}

/// 将条件列表组合成平衡的 AND 树，左半部分取 ceil(n/2) 个条件
fn combine_balanced(mut conditions: Vec<Expression>) -> Expression {
    if conditions.len() == 1 {
        return conditions.remove(0);
    }

    let center = conditions.len().div_ceil(2);
    let right = conditions.split_off(center);
    Expression::and(combine_balanced(conditions), combine_balanced(right))
}
