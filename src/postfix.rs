//! 中缀 token 序列到后缀（逆波兰）序列的转换器
//!
//! ## 转换流程（Dijkstra 调度场算法）
//!
//! ```text
//! to_postfix()
//!   ├─ 终结符 (字面量 / 引号字面量 / EMPTY / true / false) → 直接输出
//!   ├─ 二元运算符 → 弹出栈顶优先级 >= 当前运算符的运算符到输出，再入栈
//!   ├─ NOT → 直接入栈（前缀运算符）
//!   ├─ "(" → 入栈
//!   ├─ ")" → 弹出运算符直到遇到 "("，"(" 丢弃
//!   ├─ 非法 token → UnexpectedToken
//!   └─ 输入结束 → 弹出剩余运算符，剩余 "(" 视为括号不匹配
//! ```
//!
//! ## 运算符优先级（从高到低）
//!
//! 1. **比较操作** `=`, `!=`
//! 2. **NOT操作**
//! 3. **AND操作**
//! 4. **OR操作**
//!
//! 同一优先级的二元运算符左结合，`NOT` 右结合（`NOT NOT x`）。
//!
//! ## 转换示例
//!
//! ```text
//! a = "1" OR b = "2" AND c = "3"
//!   → a "1" = b "2" = c "3" = AND OR
//!
//! (a = "1" OR b = "2") AND c = "3"
//!   → a "1" = b "2" = OR c "3" = AND
//! ```

use crate::error::FilterError;
use crate::token::{Token, TokenKind};

/// 将中缀 token 序列转换为后缀序列
///
/// 返回的序列按逆波兰顺序排列，最后一个元素是整棵表达式树的根运算符。
pub fn to_postfix<'a, I>(tokens: I) -> Result<Vec<Token<'a>>, FilterError>
where
    I: IntoIterator<Item = Token<'a>>,
{
    let mut output = Vec::new();
    let mut stack: Vec<Token<'a>> = Vec::new();

    for token in tokens {
        if token.kind.is_terminal() {
            output.push(token);
            continue;
        }

        match token.kind {
            TokenKind::Illegal(text) => {
                return Err(FilterError::UnexpectedToken {
                    token: text.to_string(),
                    span: token.span,
                });
            }
            TokenKind::LParen => stack.push(token),
            TokenKind::RParen => {
                loop {
                    match stack.pop() {
                        Some(top) if top.kind == TokenKind::LParen => break,
                        Some(top) => output.push(top),
                        None => {
                            return Err(FilterError::malformed_at(
                                "wrong parentheses construction: not found (",
                                token.span,
                            ));
                        }
                    }
                }
            }
            TokenKind::Not => {
                // 前缀运算符左侧没有操作数，不能弹出任何运算符
                stack.push(token);
            }
            _ => {
                // 剩下的只可能是二元运算符
                let rank = token.kind.precedence().unwrap_or_default();
                while let Some(top) = stack.last() {
                    match top.kind.precedence() {
                        Some(top_rank) if top_rank >= rank => {
                            if let Some(op) = stack.pop() {
                                output.push(op);
                            }
                        }
                        _ => break,
                    }
                }
                stack.push(token);
            }
        }
    }

    while let Some(top) = stack.pop() {
        if top.kind == TokenKind::LParen {
            return Err(FilterError::malformed_at(
                "wrong parentheses construction: not found )",
                top.span,
            ));
        }
        output.push(top);
    }

    Ok(output)
}
