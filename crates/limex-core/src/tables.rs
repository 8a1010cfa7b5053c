//! Static lexical tables (spec.md §4.1): keywords, ternary words, operator
//! sets by category, symbolic-name aliases, and the operator precedence map.

/// Operands that denote boolean literals.
pub const KEYWORDS: &[(&str, f64)] = &[("true", 1.0), ("false", 0.0)];

pub const TERNARY_IF: &str = "if";
pub const TERNARY_THEN: &str = "then";
pub const TERNARY_ELSE: &str = "else";

/// Prefix operators (spec.md §4.1).
pub const PREFIX_OPS: &[&str] = &["!", "¬", "-"];

/// Postfix operators (spec.md §4.1).
pub const POSTFIX_OPS: &[&str] = &["²", "³"];

/// Infix operator lexemes, in the match-order spec.md §4.1 lists (longer
/// lexemes that share a prefix with a shorter one must be tried first; we
/// additionally sort candidates by length when matching so this table's
/// order only has to break ties, not carry correctness).
///
/// `,` and `?` are lexically infix-category triggers but are handled by
/// dedicated tokenizer rules (separator, ternary group) rather than through
/// this table. `:` appears here for completeness (spec.md §4.1) but is
/// always consumed as a group terminator during closure (spec.md §4.2 step
/// 6), never dispatched as a standalone infix operator.
pub const INFIX_OPS: &[&str] = &[
    "==", "!=", "<=", ">=", "<", ">", ":=", "≔", "+=", "-=", "*=", "/=", "+", "-", "*", "/", "^",
    "&&", "||", "and", "or", "not in", "in", "≠", "≤", "≥", "∧", "∨", "∈", "∉",
];

/// Textual operators that require a word-boundary check: the character
/// immediately following the match must not be an identifier character
/// (spec.md §4.2 "Word-boundary rule").
pub fn requires_word_boundary(lexeme: &str) -> bool {
    matches!(
        lexeme,
        "and" | "or" | "in" | "not in" | "if" | "then" | "else" | "true" | "false"
    )
}

/// Single-glyph operand aliases that require an immediate `(` (function) or
/// `{` (aggregation).
pub fn symbolic_name_alias(glyph: char) -> Option<&'static str> {
    match glyph {
        '∑' => Some("sum"),
        '√' => Some("sqrt"),
        '∛' => Some("cbrt"),
        _ => None,
    }
}

/// The semantic kind of an infix operator, independent of which glyph or
/// ASCII spelling produced it (`≠` and `!=` both map to `NotEqualTo`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Exponentiate,
    LogicalAnd,
    LogicalOr,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    EqualTo,
    NotEqualTo,
    ElementOf,
    NotElementOf,
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
}

impl InfixOp {
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            InfixOp::Assign
                | InfixOp::AddAssign
                | InfixOp::SubtractAssign
                | InfixOp::MultiplyAssign
                | InfixOp::DivideAssign
        )
    }
}

/// Resolve a matched infix lexeme to its semantic kind. Returns `None` for
/// `:`, which never reaches the tree builder as a standalone operator.
pub fn infix_op_kind(lexeme: &str) -> Option<InfixOp> {
    use InfixOp::*;
    Some(match lexeme {
        "+" => Add,
        "-" => Subtract,
        "*" => Multiply,
        "/" => Divide,
        "^" => Exponentiate,
        "&&" | "and" | "∧" => LogicalAnd,
        "||" | "or" | "∨" => LogicalOr,
        "<" => LessThan,
        "<=" | "≤" => LessOrEqual,
        ">" => GreaterThan,
        ">=" | "≥" => GreaterOrEqual,
        "==" => EqualTo,
        "!=" | "≠" => NotEqualTo,
        "in" | "∈" => ElementOf,
        "not in" | "∉" => NotElementOf,
        ":=" | "≔" => Assign,
        "+=" => AddAssign,
        "-=" => SubtractAssign,
        "*=" => MultiplyAssign,
        "/=" => DivideAssign,
        _ => return None,
    })
}

/// Precedence map (spec.md §4.1). Smaller binds tighter. Brackets/calls/
/// aggregation/index (precedence 1) never reach this table: they are
/// resolved structurally by the token tree, not by precedence climbing.
pub fn precedence(op: InfixOp) -> u8 {
    use InfixOp::*;
    match op {
        Exponentiate => 2,
        Multiply | Divide | LogicalAnd => 4,
        Add | Subtract | LogicalOr => 5,
        LessThan | LessOrEqual | GreaterThan | GreaterOrEqual | EqualTo | NotEqualTo
        | ElementOf | NotElementOf => 7,
        Assign | AddAssign | SubtractAssign | MultiplyAssign | DivideAssign => 8,
    }
}

/// Precedence of the ternary family (`if ... then ... else`, `? :`).
pub const TERNARY_PRECEDENCE: u8 = 6;

/// Precedence of unary prefix operators (`-`, `!`, `¬`).
pub const UNARY_PRECEDENCE: u8 = 3;

/// Precedence of postfix operators (`²`, `³`) and exponentiation.
pub const POSTFIX_PRECEDENCE: u8 = 2;

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn is_identifier_start(c: char) -> bool {
    (c.is_alphabetic() || c == '_') && !c.is_ascii_digit()
}
