//! 表达式树生成器：从后缀 token 序列构建后端过滤器表达式树
//!
//! 后缀序列被当作栈从尾部弹出，最后一个 token 是整棵树的根运算符。
//! 生成过程使用显式的待处理帧栈而不是递归，树的深度受 [`MAX_NESTING_DEPTH`] 限制：
//! 序列化和释放 `Box` 树都是递归的，过深的树会耗尽调用栈。

use crate::ast::{Expression, Literal};
use crate::error::FilterError;
use crate::resolver::{resolve_key, AttributeResolver};
use crate::token::{Token, TokenKind};

/// 表达式树允许的最大深度（根节点深度为 1）
///
/// `a = "1" OR b = "2" OR ...` 这样的链是左结合的，每多一个条件树就深一层。
pub const MAX_NESTING_DEPTH: usize = 512;

/// 等待子节点的运算符
enum Pending {
    /// NOT，等待唯一的操作数
    Not,
    /// AND / OR，等待右操作数（后缀序列中右操作数先弹出）
    Right { operator: TokenKind<'static> },
    /// AND / OR，右操作数已生成，等待左操作数
    Left { operator: TokenKind<'static>, right: Expression },
}

pub struct TreeEmitter<'r, R: AttributeResolver + ?Sized> {
    resolver: &'r R,
}

impl<'r, R: AttributeResolver + ?Sized> TreeEmitter<'r, R> {
    pub fn new(resolver: &'r R) -> Self {
        Self { resolver }
    }

    /// 将整个后缀序列生成为一棵树
    ///
    /// 根节点生成后仍有剩余 token，说明过滤器中有未连接的操作数。
    pub fn emit(&self, mut postfix: Vec<Token<'_>>) -> Result<Expression, FilterError> {
        let root = self.emit_tree(&mut postfix)?;

        if let Some(extra) = postfix.last() {
            return Err(FilterError::malformed_at(
                format!("`{}` is not joined to the rest of the filter", extra.kind.lexeme()),
                extra.span,
            ));
        }

        Ok(root)
    }

    fn emit_tree(&self, stack: &mut Vec<Token<'_>>) -> Result<Expression, FilterError> {
        let mut pending: Vec<Pending> = Vec::new();
        // 下一个要生成的节点的深度
        let mut depth = 1;

        loop {
            // 向下：弹出运算符，直到得到一个比较节点
            let operator = stack
                .pop()
                .ok_or_else(|| FilterError::malformed("missing operand"))?;
            if depth > MAX_NESTING_DEPTH {
                return Err(FilterError::malformed_at(
                    format!("filter is nested deeper than {} levels", MAX_NESTING_DEPTH),
                    operator.span,
                ));
            }

            let mut node = match operator.kind {
                TokenKind::Eq => {
                    let (key, value) = self.emit_comparison(stack, &operator)?;
                    Expression::Eq { key, value }
                }
                TokenKind::NotEq => {
                    let (key, value) = self.emit_comparison(stack, &operator)?;
                    Expression::Neq { key, value }
                }
                TokenKind::Not => {
                    pending.push(Pending::Not);
                    depth += 1;
                    continue;
                }
                TokenKind::And => {
                    pending.push(Pending::Right { operator: TokenKind::And });
                    depth += 1;
                    continue;
                }
                TokenKind::Or => {
                    pending.push(Pending::Right { operator: TokenKind::Or });
                    depth += 1;
                    continue;
                }
                _ => {
                    return Err(FilterError::malformed_at(
                        format!("expected an operator, found `{}`", operator.kind.lexeme()),
                        operator.span,
                    ));
                }
            };

            // 向上：把完成的节点交给等待它的运算符
            loop {
                match pending.pop() {
                    None => return Ok(node),
                    Some(Pending::Not) => {
                        depth -= 1;
                        node = Expression::not(node);
                    }
                    Some(Pending::Right { operator }) => {
                        // 左操作数与右操作数同一深度
                        pending.push(Pending::Left { operator, right: node });
                        break;
                    }
                    Some(Pending::Left { operator, right }) => {
                        depth -= 1;
                        node = match operator {
                            TokenKind::And => Expression::and(node, right),
                            _ => Expression::or(node, right),
                        };
                    }
                }
            }
        }
    }

    /// 为 `=` / `!=` 节点依次弹出 value 和 key
    fn emit_comparison(
        &self,
        stack: &mut Vec<Token<'_>>,
        operator: &Token<'_>,
    ) -> Result<(String, Literal), FilterError> {
        let value = pop_terminal(stack, operator)?;
        let key = pop_terminal(stack, operator)?;

        let key = resolve_key(self.resolver, &key_name(&key.kind))?;
        Ok((key, value_literal(&value.kind)))
    }
}

fn pop_terminal<'a>(
    stack: &mut Vec<Token<'a>>,
    operator: &Token<'_>,
) -> Result<Token<'a>, FilterError> {
    match stack.pop() {
        Some(token) if token.kind.is_terminal() => Ok(token),
        Some(token) => Err(FilterError::malformed_at(
            format!(
                "`{}` cannot be an operand of `{}`",
                token.kind.lexeme(),
                operator.kind.lexeme()
            ),
            token.span,
        )),
        None => Err(FilterError::malformed_at(
            format!("`{}` is missing an operand", operator.kind.lexeme()),
            operator.span,
        )),
    }
}

/// key 去掉引号后的名字
fn key_name(kind: &TokenKind<'_>) -> String {
    match kind {
        TokenKind::Quoted(s) | TokenKind::Word(s) => s.to_string(),
        other => other.lexeme(),
    }
}

fn value_literal(kind: &TokenKind<'_>) -> Literal {
    match kind {
        TokenKind::Empty => Literal::Null,
        TokenKind::Bool(b) => Literal::Bool(*b),
        TokenKind::Quoted(s) => Literal::String(s.to_string()),
        TokenKind::Word(s) => Literal::from_bare(s),
        other => Literal::String(other.lexeme()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::postfix::to_postfix;
    use std::collections::HashMap;

    fn create_test_resolver() -> HashMap<String, String> {
        let mut mapping = HashMap::new();
        mapping.insert("Priority".to_string(), "p1".to_string());
        mapping.insert("Test type".to_string(), "t1".to_string());
        mapping
    }

    fn emit(input: &str) -> Result<Expression, FilterError> {
        let resolver = create_test_resolver();
        let postfix = to_postfix(tokenize(input))?;
        TreeEmitter::new(&resolver).emit(postfix)
    }

    fn eq(key: &str, value: &str) -> Expression {
        Expression::Eq { key: key.to_string(), value: Literal::String(value.to_string()) }
    }

    #[test]
    fn test_literal_field_comparison() {
        assert_eq!(emit(r#"status = "ACTUAL""#).unwrap(), eq("status", "ACTUAL"));
    }

    #[test]
    fn test_attribute_key_is_resolved() {
        assert_eq!(emit(r#""Test type" != "smoke""#).unwrap(), Expression::Neq {
            key: "attributes.t1".to_string(),
            value: Literal::String("smoke".to_string()),
        });
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(
            emit("Priority = EMPTY").unwrap(),
            Expression::Eq { key: "attributes.p1".to_string(), value: Literal::Null }
        );
        assert_eq!(
            emit("isAutotest = false").unwrap(),
            Expression::Eq { key: "isAutotest".to_string(), value: Literal::Bool(false) }
        );
        assert_eq!(
            emit("Priority = 3").unwrap(),
            Expression::Eq {
                key: "attributes.p1".to_string(),
                value: Literal::Number(serde_json::Number::from(3u64)),
            }
        );
        assert_eq!(emit("Priority = High").unwrap(), eq("attributes.p1", "High"));
    }

    #[test]
    fn test_and_or_operand_order() {
        let expr = emit(r#"status = "A" AND Priority = "B" OR isAutotest = true"#).unwrap();
        let expected = Expression::or(
            Expression::and(eq("status", "A"), eq("attributes.p1", "B")),
            Expression::Eq { key: "isAutotest".to_string(), value: Literal::Bool(true) },
        );
        assert_eq!(expr, expected);
    }

    #[test]
    fn test_nested_not() {
        assert_eq!(
            emit(r#"NOT NOT status = "A""#).unwrap(),
            Expression::not(Expression::not(eq("status", "A")))
        );
    }

    #[test]
    fn test_missing_operands() {
        for input in [r#"status = "A" AND"#, r#"= "A""#, "NOT", "", r#"AND status = "A""#] {
            match emit(input) {
                Err(FilterError::MalformedExpression { .. }) => {}
                other => panic!("Expected MalformedExpression for {:?}, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn test_operator_as_operand() {
        match emit(r#"status = "A" = "B""#) {
            Err(FilterError::MalformedExpression { message, span }) => {
                assert!(message.contains("cannot be an operand"));
                assert_eq!(span.map(|s| s.start), Some(7));
            }
            other => panic!("Expected MalformedExpression, got {:?}", other),
        }
    }

    #[test]
    fn test_dangling_operands() {
        match emit(r#""X" status = "A""#) {
            Err(FilterError::MalformedExpression { message, span }) => {
                assert!(message.contains("not joined"));
                assert_eq!(span.map(|s| s.start), Some(0));
            }
            other => panic!("Expected MalformedExpression, got {:?}", other),
        }
        assert!(matches!(
            emit(r#"status = "A" Priority = "B""#),
            Err(FilterError::MalformedExpression { .. })
        ));
    }

    #[test]
    fn test_unknown_attribute() {
        match emit(r#"status = "A" AND Owner = "me""#) {
            Err(FilterError::UnknownAttribute { name }) => assert_eq!(name, "Owner"),
            other => panic!("Expected UnknownAttribute, got {:?}", other),
        }
    }

    fn or_chain(terms: usize) -> String {
        vec![r#"status = "ACTUAL""#; terms].join(" OR ")
    }

    #[test]
    fn test_long_or_chain_within_limit() {
        let expr = emit(&or_chain(MAX_NESTING_DEPTH)).unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        assert!(json.starts_with(r#"{"type":"OR","left":{"type":"OR""#));
    }

    #[test]
    fn test_too_deep_or_chain_is_rejected() {
        match emit(&or_chain(10_000)) {
            Err(FilterError::MalformedExpression { message, span }) => {
                assert!(message.contains("nested deeper"));
                assert!(span.is_some());
            }
            other => panic!("Expected MalformedExpression, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_too_deep_not_is_rejected() {
        let input = format!(r#"{}status = "A""#, "NOT ".repeat(10_000));
        assert!(matches!(emit(&input), Err(FilterError::MalformedExpression { .. })));

        let input = format!(r#"{}status = "A""#, "NOT ".repeat(MAX_NESTING_DEPTH - 1));
        assert!(emit(&input).is_ok());
    }

    #[test]
    fn test_deep_parenthesized_and() {
        // 右侧嵌套的括号同样计入深度
        let mut input = String::from(r#"status = "A""#);
        for _ in 0..1_000 {
            input = format!(r#"status = "A" AND ({})"#, input);
        }
        assert!(matches!(emit(&input), Err(FilterError::MalformedExpression { .. })));
    }
}
