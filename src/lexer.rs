//! Filter的词法分析器
//!
//! `!=`、`=`、`(`、`)` 无论两侧是否有空白都会被切分为独立的 token；
//! 双引号包围的字面量是原子的，内部可以包含空格和运算符字符。

use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    input: &'a str,
    /// 输入字符串中的当前位置（字节索引）
    position: usize,
}

/// 对整个输入进行分词
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// 读取一个单词时收集到的信息，用于最终分类
#[derive(Default)]
struct WordShape {
    quoted_parts: usize,
    bare_chars: usize,
    unterminated: bool,
    illegal_char: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, position: 0 }
    }

    /// 返回当前位置的字符，不推进位置
    fn peek(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    /// 返回下一个位置的字符，不推进位置
    fn peek_next(&self) -> Option<char> {
        self.input[self.position..].chars().nth(1)
    }

    /// 推进位置一个字符并返回该字符
    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if let Some(c) = c {
            self.position += c.len_utf8();
        }
        c
    }

    /// 跳过空白字符
    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// 当前位置是否是单词的边界（空白、括号或比较运算符）
    fn at_word_boundary(&self) -> bool {
        match self.peek() {
            None => true,
            Some(c) if c.is_whitespace() => true,
            Some('(') | Some(')') | Some('=') => true,
            Some('!') => self.peek_next() == Some('='),
            Some(_) => false,
        }
    }

    /// 消费一段双引号字面量
    /// 注意：开始的引号已经被调用者消费
    fn skip_quoted(&mut self, shape: &mut WordShape) {
        shape.quoted_parts += 1;
        loop {
            match self.bump() {
                Some('"') => return,
                Some(_) => {}
                None => {
                    shape.unterminated = true;
                    return;
                }
            }
        }
    }

    /// 读取一个单词：裸字面量、引号字面量或关键字
    fn read_word(&mut self, start: usize) -> Token<'a> {
        let mut shape = WordShape::default();

        while !self.at_word_boundary() {
            match self.bump() {
                Some('"') => self.skip_quoted(&mut shape),
                Some(c) => {
                    shape.bare_chars += 1;
                    if !is_bare_char(c) {
                        shape.illegal_char = true;
                    }
                }
                None => break,
            }
        }

        let literal = &self.input[start..self.position];
        let kind = classify_word(literal, &shape);
        Token { kind, span: Span::new(start, self.position) }
    }
}

fn is_bare_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '/' | '@' | '+')
}

fn classify_word<'a>(literal: &'a str, shape: &WordShape) -> TokenKind<'a> {
    if shape.unterminated {
        return TokenKind::Illegal(literal);
    }
    if shape.quoted_parts > 0 {
        // 只有完整的 "..." 才是合法的引号字面量，例如 abc"d" 是非法的
        if shape.quoted_parts == 1 && shape.bare_chars == 0 {
            return TokenKind::Quoted(&literal[1..literal.len() - 1]);
        }
        return TokenKind::Illegal(literal);
    }
    if shape.illegal_char {
        return TokenKind::Illegal(literal);
    }
    match_keyword(literal)
}

/// 关键字区分大小写，`and` 只是普通的字面量
fn match_keyword(s: &str) -> TokenKind {
    match s {
        "AND" => TokenKind::And,
        "OR" => TokenKind::Or,
        "NOT" => TokenKind::Not,
        "EMPTY" => TokenKind::Empty,
        "true" => TokenKind::Bool(true),
        "false" => TokenKind::Bool(false),
        _ => TokenKind::Word(s),
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.peek()? {
            '=' => {
                self.bump();
                Token { kind: TokenKind::Eq, span: Span::new(start, self.position) }
            }
            '(' => {
                self.bump();
                Token { kind: TokenKind::LParen, span: Span::new(start, self.position) }
            }
            ')' => {
                self.bump();
                Token { kind: TokenKind::RParen, span: Span::new(start, self.position) }
            }
            '!' if self.peek_next() == Some('=') => {
                self.bump();
                self.bump();
                Token { kind: TokenKind::NotEq, span: Span::new(start, self.position) }
            }
            _ => self.read_word(start),
        };
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind<'_>> {
        Lexer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_comparison() {
        let mut lexer = Lexer::new(r#"status = "ACTUAL""#);

        assert_eq!(lexer.next().unwrap().kind, TokenKind::Word("status"));
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Eq);
        assert_eq!(lexer.next().unwrap().kind, TokenKind::Quoted("ACTUAL"));
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_operators_without_whitespace() {
        assert_eq!(
            kinds(r#"(a="1")AND(b!="2")"#),
            vec![
                TokenKind::LParen,
                TokenKind::Word("a"),
                TokenKind::Eq,
                TokenKind::Quoted("1"),
                TokenKind::RParen,
                TokenKind::And,
                TokenKind::LParen,
                TokenKind::Word("b"),
                TokenKind::NotEq,
                TokenKind::Quoted("2"),
                TokenKind::RParen,
            ]
        );
    }

    #[test]
    fn test_not_eq_is_not_split() {
        assert_eq!(
            kinds("isAutotest!=true"),
            vec![TokenKind::Word("isAutotest"), TokenKind::NotEq, TokenKind::Bool(true)]
        );
    }

    #[test]
    fn test_quoted_literal_is_atomic() {
        assert_eq!(
            kinds(r#""Test type" = "smoke (manual) = yes""#),
            vec![
                TokenKind::Quoted("Test type"),
                TokenKind::Eq,
                TokenKind::Quoted("smoke (manual) = yes"),
            ]
        );
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(
            kinds("AND OR NOT EMPTY true false and Not"),
            vec![
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Empty,
                TokenKind::Bool(true),
                TokenKind::Bool(false),
                TokenKind::Word("and"),
                TokenKind::Word("Not"),
            ]
        );
    }

    #[test]
    fn test_illegal_tokens() {
        assert_eq!(
            kinds(r#"a & b ! "open abc"d"#),
            vec![
                TokenKind::Word("a"),
                TokenKind::Illegal("&"),
                TokenKind::Word("b"),
                TokenKind::Illegal("!"),
                TokenKind::Illegal(r#""open abc"d"#),
            ]
        );
        assert_eq!(kinds(r#""unterminated"#), vec![TokenKind::Illegal(r#""unterminated"#)]);
    }

    #[test]
    fn test_spans() {
        let tokens = tokenize(r#"Priority != "High""#);
        assert_eq!(tokens[0].span, Span::new(0, 8));
        assert_eq!(tokens[1].span, Span::new(9, 11));
        assert_eq!(tokens[2].span, Span::new(12, 18));
    }

    #[test]
    fn test_unicode_words() {
        assert_eq!(
            kinds("Приоритет=Высокий"),
            vec![TokenKind::Word("Приоритет"), TokenKind::Eq, TokenKind::Word("Высокий")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("   ").is_empty());
    }
}
