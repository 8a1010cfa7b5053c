//! Token types produced by the lexer (spec.md §3, §4.2).
//!
//! A token tree's root is an implicit [`TokenType::Group`]; every nested
//! bracketed region becomes a child of the operand token that opened it.

/// Lexical category of a token, tracked by the tokenizer's `expected` state
/// (spec.md §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCategory {
    Prefix,
    Operand,
    Postfix,
    Infix,
}

/// Lexical type of a token (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Number,
    Variable,
    Collection,
    Operator,
    Separator,
    Group,
    Set,
    Sequence,
    FunctionCall,
    Aggregation,
    IndexedVariable,
}

/// A single token. `children` is nonempty only for the nesting-capable
/// types (`Group`, `Set`, `Sequence`, `FunctionCall`, `Aggregation`,
/// `IndexedVariable`).
#[derive(Debug, Clone)]
pub struct Token {
    pub category: TokenCategory,
    pub token_type: TokenType,
    pub value: String,
    pub children: Vec<Token>,
}

impl Token {
    pub fn leaf(category: TokenCategory, token_type: TokenType, value: impl Into<String>) -> Self {
        Self {
            category,
            token_type,
            value: value.into(),
            children: Vec::new(),
        }
    }

    pub fn group(
        category: TokenCategory,
        token_type: TokenType,
        value: impl Into<String>,
        children: Vec<Token>,
    ) -> Self {
        Self {
            category,
            token_type,
            value: value.into(),
            children,
        }
    }
}
