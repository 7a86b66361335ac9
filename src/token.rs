//! The token definition for the filter language.

use std::fmt;

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Operators
    Eq,    // =
    NotEq, // !=
    Not,   // NOT
    And,   // AND
    Or,    // OR

    // Grouping
    LParen, // (
    RParen, // )

    // Terminals
    Word(&'a str),   // bare literal, e.g. status, Priority, 42
    Quoted(&'a str), // contents of a double-quoted literal, quotes removed
    Empty,           // EMPTY
    Bool(bool),      // true / false

    // Special
    Illegal(&'a str), // anything the language does not accept, kept verbatim
}

impl<'a> TokenKind<'a> {
    /// Binding strength of an operator. Higher binds tighter.
    pub fn precedence(&self) -> Option<u8> {
        match self {
            TokenKind::Eq | TokenKind::NotEq => Some(3),
            TokenKind::Not => Some(2),
            TokenKind::And => Some(1),
            TokenKind::Or => Some(0),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TokenKind::Word(_) | TokenKind::Quoted(_) | TokenKind::Empty | TokenKind::Bool(_)
        )
    }

    /// The text of the token as it would be written in a filter.
    pub fn lexeme(&self) -> String {
        match self {
            TokenKind::Eq => "=".to_string(),
            TokenKind::NotEq => "!=".to_string(),
            TokenKind::Not => "NOT".to_string(),
            TokenKind::And => "AND".to_string(),
            TokenKind::Or => "OR".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::Word(s) | TokenKind::Illegal(s) => s.to_string(),
            TokenKind::Quoted(s) => format!("\"{}\"", s),
            TokenKind::Empty => "EMPTY".to_string(),
            TokenKind::Bool(b) => b.to_string(),
        }
    }
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        let eq = TokenKind::Eq.precedence().unwrap();
        let not_eq = TokenKind::NotEq.precedence().unwrap();
        let not = TokenKind::Not.precedence().unwrap();
        let and = TokenKind::And.precedence().unwrap();
        let or = TokenKind::Or.precedence().unwrap();

        assert_eq!(eq, not_eq);
        assert!(eq > not);
        assert!(not > and);
        assert!(and > or);
    }

    #[test]
    fn test_grouping_and_terminals_have_no_precedence() {
        assert_eq!(TokenKind::LParen.precedence(), None);
        assert_eq!(TokenKind::RParen.precedence(), None);
        assert_eq!(TokenKind::Word("status").precedence(), None);
        assert!(TokenKind::Quoted("a b").is_terminal());
        assert!(TokenKind::Empty.is_terminal());
        assert!(!TokenKind::Illegal("&").is_terminal());
        assert!(!TokenKind::LParen.is_terminal());
    }

    #[test]
    fn test_lexeme() {
        assert_eq!(TokenKind::NotEq.lexeme(), "!=");
        assert_eq!(TokenKind::Quoted("In progress").lexeme(), "\"In progress\"");
        assert_eq!(TokenKind::Bool(false).lexeme(), "false");
    }
}
