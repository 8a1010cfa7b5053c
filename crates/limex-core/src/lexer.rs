//! Tokenizer: one left-to-right pass over the input producing a tree of
//! tokens grouped by bracket/ternary structure (spec.md §4.2).

use crate::error::{Error, LexError, Result};
use crate::tables;
use crate::token::{Token, TokenCategory, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    Paren,
    Brace,
    Bracket,
    Then,
    Colon,
    Else,
    EndOfInput,
}

impl Terminator {
    fn lexeme(self) -> Option<&'static str> {
        match self {
            Terminator::Paren => Some(")"),
            Terminator::Brace => Some("}"),
            Terminator::Bracket => Some("]"),
            Terminator::Then => Some(tables::TERNARY_THEN),
            Terminator::Colon => Some(":"),
            Terminator::Else => Some(tables::TERNARY_ELSE),
            Terminator::EndOfInput => None,
        }
    }
}

struct Frame {
    token_type: TokenType,
    category: TokenCategory,
    value: String,
    terminator: Terminator,
    children: Vec<Token>,
}

impl Frame {
    fn root() -> Self {
        Self {
            token_type: TokenType::Group,
            category: TokenCategory::Operand,
            value: String::new(),
            terminator: Terminator::EndOfInput,
            children: Vec::new(),
        }
    }

    fn finish(self) -> Token {
        Token::group(self.category, self.token_type, self.value, self.children)
    }
}

pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn rest_starts_with_boundary(&self, word: &str) -> bool {
        let word_len = word.chars().count();
        if !self.rest_starts_with(word) {
            return false;
        }
        if !tables::requires_word_boundary(word) {
            return true;
        }
        match self.chars.get(self.pos + word_len) {
            Some(c) => !tables::is_identifier_char(*c),
            None => true,
        }
    }

    fn rest_starts_with(&self, needle: &str) -> bool {
        let needle: Vec<char> = needle.chars().collect();
        if self.pos + needle.len() > self.chars.len() {
            return false;
        }
        self.chars[self.pos..self.pos + needle.len()] == needle[..]
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.chars.get(self.pos) {
            if c.is_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn advance(&mut self, n_chars: usize) {
        self.pos += n_chars;
    }

    /// Longest match against a candidate set, honoring word-boundary rules
    /// for textual operators.
    fn match_longest(&self, candidates: &[&'static str]) -> Option<&'static str> {
        let mut best: Option<&'static str> = None;
        for candidate in candidates {
            if self.rest_starts_with_boundary(candidate) {
                if best.map(|b| candidate.len() > b.len()).unwrap_or(true) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn push_child(stack: &mut [Frame], token: Token) {
        stack.last_mut().expect("root frame always present").children.push(token);
    }

    pub fn tokenize(mut self) -> Result<Token> {
        let mut stack = vec![Frame::root()];
        let mut expected = TokenCategory::Prefix;

        loop {
            self.skip_ws();
            if self.eof() {
                break;
            }

            if expected == TokenCategory::Prefix {
                if let Some(op) = self.match_longest(tables::PREFIX_OPS) {
                    self.advance(op.chars().count());
                    Self::push_child(&mut stack, Token::leaf(TokenCategory::Prefix, TokenType::Operator, op));
                }
                expected = TokenCategory::Operand;
            }

            if expected == TokenCategory::Operand {
                expected = self.lex_operand(&mut stack)?;
            }

            if expected == TokenCategory::Postfix {
                if let Some(op) = self.match_longest(tables::POSTFIX_OPS) {
                    self.advance(op.chars().count());
                    Self::push_child(&mut stack, Token::leaf(TokenCategory::Postfix, TokenType::Operator, op));
                }
                expected = TokenCategory::Infix;
            }

            self.skip_ws();
            if let Some(next) = self.try_closure(&mut stack)? {
                expected = next;
                continue;
            }

            if expected == TokenCategory::Infix {
                expected = self.lex_infix(&mut stack)?;
            }
        }

        if stack.len() != 1 {
            return Err(Error::Lex(LexError::Unbalanced));
        }
        Ok(stack.pop().expect("checked len == 1").finish())
    }

    /// Handles spec.md §4.2 step 3. Returns the `expected` category for the
    /// next round.
    fn lex_operand(&mut self, stack: &mut Vec<Frame>) -> Result<TokenCategory> {
        for (word, value) in tables::KEYWORDS {
            if self.rest_starts_with_boundary(word) {
                self.advance(word.chars().count());
                Self::push_child(
                    stack,
                    Token::leaf(TokenCategory::Operand, TokenType::Number, value.to_string()),
                );
                return Ok(TokenCategory::Infix);
            }
        }

        if self.rest_starts_with_boundary(tables::TERNARY_IF) {
            self.advance(tables::TERNARY_IF.chars().count());
            stack.push(Frame {
                token_type: TokenType::Group,
                category: TokenCategory::Prefix,
                value: String::new(),
                terminator: Terminator::Then,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }

        // Look-ahead only: don't consume, let the closure step (6) resolve it.
        if self.rest_starts_with_boundary(tables::TERNARY_THEN)
            || self.rest_starts_with_boundary(tables::TERNARY_ELSE)
        {
            return Ok(TokenCategory::Infix);
        }

        if let Some(c) = self.chars.get(self.pos).copied() {
            if c.is_ascii_digit() || c == '.' {
                let text = self.read_number();
                Self::push_child(stack, Token::leaf(TokenCategory::Operand, TokenType::Number, text));
                return Ok(TokenCategory::Postfix);
            }

            if tables::is_identifier_start(c) {
                let name = self.read_identifier();
                return self.lex_named_operand(stack, name);
            }

            if let Some(alias) = tables::symbolic_name_alias(c) {
                self.advance(1);
                return self.lex_symbolic_operand(stack, alias);
            }

            match c {
                '(' => {
                    self.advance(1);
                    stack.push(Frame {
                        token_type: TokenType::Group,
                        category: TokenCategory::Operand,
                        value: String::new(),
                        terminator: Terminator::Paren,
                        children: Vec::new(),
                    });
                    return Ok(TokenCategory::Prefix);
                }
                '{' => {
                    self.advance(1);
                    stack.push(Frame {
                        token_type: TokenType::Set,
                        category: TokenCategory::Operand,
                        value: String::new(),
                        terminator: Terminator::Brace,
                        children: Vec::new(),
                    });
                    return Ok(TokenCategory::Prefix);
                }
                '[' => {
                    self.advance(1);
                    stack.push(Frame {
                        token_type: TokenType::Sequence,
                        category: TokenCategory::Operand,
                        value: String::new(),
                        terminator: Terminator::Bracket,
                        children: Vec::new(),
                    });
                    return Ok(TokenCategory::Prefix);
                }
                _ => {}
            }
        }

        Err(Error::Lex(LexError::UnexpectedOperand { position: self.pos }))
    }

    fn lex_named_operand(&mut self, stack: &mut Vec<Frame>, name: String) -> Result<TokenCategory> {
        if self.rest_starts_with("(") {
            self.advance(1);
            stack.push(Frame {
                token_type: TokenType::FunctionCall,
                category: TokenCategory::Operand,
                value: name,
                terminator: Terminator::Paren,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }
        if self.rest_starts_with("[]") {
            self.advance(2);
            Self::push_child(
                stack,
                Token::leaf(TokenCategory::Operand, TokenType::Collection, name),
            );
            // Deliberately stays at OPERAND rather than advancing to
            // POSTFIX: `name[]` is only legal as a lone call/aggregation
            // argument, immediately followed by the closing terminator.
            return Ok(TokenCategory::Operand);
        }
        if self.rest_starts_with("[") {
            self.advance(1);
            stack.push(Frame {
                token_type: TokenType::IndexedVariable,
                category: TokenCategory::Operand,
                value: name,
                terminator: Terminator::Bracket,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }
        if self.rest_starts_with("{") {
            self.advance(1);
            stack.push(Frame {
                token_type: TokenType::Aggregation,
                category: TokenCategory::Operand,
                value: name,
                terminator: Terminator::Brace,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }
        Self::push_child(
            stack,
            Token::leaf(TokenCategory::Operand, TokenType::Variable, name),
        );
        Ok(TokenCategory::Postfix)
    }

    fn lex_symbolic_operand(&mut self, stack: &mut Vec<Frame>, alias: &'static str) -> Result<TokenCategory> {
        if self.rest_starts_with("(") {
            self.advance(1);
            stack.push(Frame {
                token_type: TokenType::FunctionCall,
                category: TokenCategory::Operand,
                value: alias.to_string(),
                terminator: Terminator::Paren,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }
        if self.rest_starts_with("{") {
            self.advance(1);
            stack.push(Frame {
                token_type: TokenType::Aggregation,
                category: TokenCategory::Operand,
                value: alias.to_string(),
                terminator: Terminator::Brace,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }
        Err(Error::Lex(LexError::SymbolicNameNeedsBrackets {
            name: alias.to_string(),
        }))
    }

    fn read_number(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.chars.get(self.pos) {
            if c.is_ascii_digit() || *c == '.' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.chars.get(self.pos) {
            if tables::is_identifier_char(*c) {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Handles spec.md §4.2 step 6. Returns `Some(next_expected)` if a
    /// closure fired, `None` if the current input doesn't start with the
    /// top-of-stack terminator.
    fn try_closure(&mut self, stack: &mut Vec<Frame>) -> Result<Option<TokenCategory>> {
        let top = stack.last().expect("root frame always present");
        let terminator = top.terminator;

        let matches_terminator = match terminator {
            Terminator::EndOfInput => false,
            Terminator::Then | Terminator::Else => {
                self.rest_starts_with_boundary(terminator.lexeme().unwrap())
            }
            _ => self.rest_starts_with(terminator.lexeme().unwrap()),
        };
        if !matches_terminator {
            return Ok(None);
        }

        match terminator {
            Terminator::Then => {
                self.advance(tables::TERNARY_THEN.chars().count());
                let finished = stack.pop().expect("just matched its terminator").finish();
                Self::push_child(stack, finished);
                stack.push(Frame {
                    token_type: TokenType::Group,
                    category: TokenCategory::Infix,
                    value: String::new(),
                    terminator: Terminator::Else,
                    children: Vec::new(),
                });
                Ok(Some(TokenCategory::Prefix))
            }
            Terminator::Colon | Terminator::Else => {
                let op_value = terminator.lexeme().unwrap().to_string();
                self.advance(op_value.chars().count());
                let finished = stack.pop().expect("just matched its terminator").finish();
                Self::push_child(stack, finished);
                Self::push_child(
                    stack,
                    Token::leaf(TokenCategory::Infix, TokenType::Operator, op_value),
                );
                Ok(Some(TokenCategory::Prefix))
            }
            Terminator::Paren | Terminator::Brace | Terminator::Bracket => {
                self.advance(1);
                let finished = stack.pop().expect("just matched its terminator").finish();
                Self::push_child(stack, finished);
                Ok(Some(TokenCategory::Postfix))
            }
            Terminator::EndOfInput => unreachable!("matches_terminator is false for EndOfInput"),
        }
    }

    /// Handles spec.md §4.2 step 7.
    fn lex_infix(&mut self, stack: &mut Vec<Frame>) -> Result<TokenCategory> {
        if self.rest_starts_with(",") {
            self.advance(1);
            Self::push_child(
                stack,
                Token::leaf(TokenCategory::Infix, TokenType::Separator, ","),
            );
            return Ok(TokenCategory::Prefix);
        }
        if self.rest_starts_with("?") {
            self.advance(1);
            stack.push(Frame {
                token_type: TokenType::Group,
                category: TokenCategory::Infix,
                value: String::new(),
                terminator: Terminator::Colon,
                children: Vec::new(),
            });
            return Ok(TokenCategory::Prefix);
        }
        if let Some(op) = self.match_longest(tables::INFIX_OPS) {
            self.advance(op.chars().count());
            Self::push_child(
                stack,
                Token::leaf(TokenCategory::Infix, TokenType::Operator, op),
            );
            return Ok(TokenCategory::Prefix);
        }
        Err(Error::Lex(LexError::UnexpectedCharacter {
            position: self.pos,
            found: self.chars[self.pos],
        }))
    }
}

pub fn tokenize(input: &str) -> Result<Token> {
    Lexer::new(input).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn children(input: &str) -> Vec<Token> {
        tokenize(input).unwrap().children
    }

    #[test]
    fn number_then_operator_then_number() {
        let c = children("3+5");
        assert_eq!(c.len(), 3);
        assert_eq!(c[0].token_type, TokenType::Number);
        assert_eq!(c[0].value, "3");
        assert_eq!(c[1].category, TokenCategory::Infix);
        assert_eq!(c[1].value, "+");
        assert_eq!(c[2].value, "5");
    }

    #[test]
    fn postfix_requires_no_intervening_whitespace() {
        let c = children("3²");
        assert_eq!(c.len(), 2);
        assert_eq!(c[1].category, TokenCategory::Postfix);
        assert_eq!(c[1].value, "²");

        // A space between operand and postfix glyph means the glyph is
        // lexed as its own (here: unrecognized) token, not folded in.
        let err = tokenize("3 ²").unwrap_err();
        assert!(matches!(err, Error::Lex(LexError::UnexpectedCharacter { .. })));
    }

    #[test]
    fn prefix_minus_wraps_following_operand() {
        let c = children("-x");
        assert_eq!(c[0].category, TokenCategory::Prefix);
        assert_eq!(c[0].value, "-");
        assert_eq!(c[1].token_type, TokenType::Variable);
    }

    #[test]
    fn longest_match_prefers_compound_operators() {
        let c = children("a <= b");
        assert_eq!(c[1].value, "<=");
    }

    #[test]
    fn word_boundary_rejects_prefix_of_identifier() {
        // "iffy" must not be mistaken for the keyword "if".
        let c = children("iffy");
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].token_type, TokenType::Variable);
        assert_eq!(c[0].value, "iffy");
    }

    #[test]
    fn if_then_else_opens_three_sibling_tokens() {
        let c = children("if a then b else c");
        assert_eq!(c.len(), 4);
        assert_eq!(c[0].category, TokenCategory::Prefix);
        assert_eq!(c[1].category, TokenCategory::Infix);
        assert_eq!(c[2].value, "else");
        assert_eq!(c[3].token_type, TokenType::Variable);
    }

    #[test]
    fn unbalanced_brackets_error() {
        let err = tokenize("(1 + 2").unwrap_err();
        assert!(matches!(err, Error::Lex(LexError::Unbalanced)));
    }

    #[test]
    fn bare_collection_as_sole_call_argument() {
        let c = children("sum(data[])");
        assert_eq!(c[0].token_type, TokenType::FunctionCall);
        assert_eq!(c[0].children.len(), 1);
        assert_eq!(c[0].children[0].token_type, TokenType::Collection);
    }

    #[test]
    fn aggregation_uses_brace_syntax() {
        let c = children("sum{data[]}");
        assert_eq!(c[0].token_type, TokenType::Aggregation);
        assert_eq!(c[0].value, "sum");
    }

    #[test]
    fn bare_collection_followed_by_an_operator_errors() {
        // `name[]` only transitions back to OPERAND, not POSTFIX/INFIX: it
        // is legal only as a lone call/aggregation argument.
        let err = tokenize("data[] + 1").unwrap_err();
        assert!(matches!(err, Error::Lex(LexError::UnexpectedOperand { .. })));
    }

    #[test]
    fn symbolic_name_without_brackets_errors() {
        let err = tokenize("√").unwrap_err();
        assert!(matches!(
            err,
            Error::Lex(LexError::SymbolicNameNeedsBrackets { .. })
        ));
    }
}
