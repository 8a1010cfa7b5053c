//! Lexer, tree builder, and evaluator for LIMEX expressions: Unicode-rich
//! math/logical expressions with a user-extensible table of named
//! callables.
//!
//! ```
//! use limex_core::{Expression, Handle};
//!
//! let handle = Handle::<f64>::default();
//! let expr = Expression::parse("3*5", &handle).unwrap();
//! assert_eq!(expr.evaluate(&[], &[]).unwrap(), 15.0);
//! ```

mod ast;
mod engine;
mod error;
mod expression;
mod handle;
mod lexer;
mod numeric;
mod parser;
mod tables;
mod token;

pub use ast::Node;
pub use error::{Error, EvalError, LexError, ParseError, Result};
pub use expression::Expression;
pub use handle::{Builtin, Callable, Handle, BUILTIN_COUNT};
pub use numeric::Numeric;
pub use token::{Token, TokenCategory, TokenType};
