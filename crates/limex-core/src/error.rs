//! Error types for the LIMEX engine

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// LIMEX errors
///
/// Errors are always fatal at the call site: the library never attempts
/// local recovery. Parsing errors unwind before an `Expression` exists;
/// evaluation errors unwind out of `Expression::evaluate`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Internal error: {0}")]
    Logic(String),
}

/// Tokenizer-level failures (spec.md §4.2)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unbalanced parentheses/brackets/braces")]
    Unbalanced,

    #[error("unexpected character at position {position}: {found:?}")]
    UnexpectedCharacter { position: usize, found: char },

    #[error("unexpected operand at position {position}")]
    UnexpectedOperand { position: usize },

    #[error("symbolic name '{name}' must be followed by '(' or '{{'")]
    SymbolicNameNeedsBrackets { name: String },

    #[error("prefix operator '{operator}' has no operand")]
    PrefixWithoutOperand { operator: String },
}

/// Tree-builder-level failures (spec.md §4.3)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("missing operand for operator '{operator}'")]
    MissingOperand { operator: String },

    #[error("malformed ternary expression")]
    MalformedTernary,

    #[error("assignment operator '{operator}' must be the first operator applied to its operand")]
    AssignmentNotInitial { operator: String },

    #[error("assignment target must be a simple variable")]
    AssignmentTargetNotVariable,

    #[error("unknown callable '{name}'")]
    UnknownCallable { name: String },
}

/// Evaluator-level failures (spec.md §4.4)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("'{kind}' cannot be evaluated directly")]
    NotEvaluable { kind: &'static str },

    #[error("collection index {index} out of range (collection has {len} elements)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("callable index {index} out of range ({len} callables registered)")]
    CallableIndexOutOfRange { index: usize, len: usize },

    #[error("callable '{name}' expects {expected}, got {actual} argument(s)")]
    Arity {
        name: &'static str,
        expected: &'static str,
        actual: usize,
    },

    #[error("callable '{name}' is a reserved placeholder in this configuration")]
    ReservedPlaceholder { name: &'static str },

    #[error("callable '{name}': {message}")]
    Domain { name: &'static str, message: String },

    #[error("variable index {index} out of range ({len} variables bound)")]
    VariableOutOfRange { index: usize, len: usize },

    #[error("collection '{index}' out of range ({len} collections bound)")]
    CollectionOutOfRange { index: usize, len: usize },
}
