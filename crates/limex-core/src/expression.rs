//! The public façade over lex → build → evaluate (spec.md §6).

use tracing::instrument;

use crate::ast::Node;
use crate::engine;
use crate::error::Result;
use crate::handle::Handle;
use crate::lexer;
use crate::numeric::Numeric;
use crate::parser::TreeBuilder;

/// A parsed LIMEX expression, bound to the [`Handle`] that resolved its
/// callable references at parse time.
///
/// `variables()`/`collections()` list the names the expression reads, in
/// first-seen order; `evaluate` takes values positioned against those same
/// tables.
#[derive(Debug)]
pub struct Expression<'h, N: Numeric> {
    source: String,
    variables: Vec<String>,
    collections: Vec<String>,
    target: Option<String>,
    root: Node<N>,
    handle: &'h Handle<N>,
}

impl<'h, N: Numeric> Expression<'h, N> {
    /// Lex and build `source` against `handle`. Fails fast: lexer errors,
    /// parse errors, and unknown callable references are all fatal here,
    /// before an `Expression` ever exists (spec.md §7).
    #[instrument(skip(handle), fields(len = source.len()))]
    pub fn parse(source: &str, handle: &'h Handle<N>) -> Result<Self> {
        let root_token = lexer::tokenize(source)?;

        let mut variables = Vec::new();
        let mut collections = Vec::new();
        let mut target = None;
        let root = {
            let mut builder = TreeBuilder::new(handle, &mut variables, &mut collections, &mut target);
            builder.build_single(&root_token.children)?
        };

        tracing::debug!(
            variables = ?variables,
            collections = ?collections,
            target = ?target,
            "parsed expression"
        );

        Ok(Self {
            source: source.to_string(),
            variables,
            collections,
            target,
            root,
            handle,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names the expression reads, in first-seen order. Does not
    /// include an assignment target unless the right-hand side also reads
    /// it (spec.md §8 "Target semantics").
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Collection names the expression references, in first-seen order.
    pub fn collections(&self) -> &[String] {
        &self.collections
    }

    /// The assignment target name, if the expression's outermost operator
    /// is an assignment family member.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    pub fn root(&self) -> &Node<N> {
        &self.root
    }

    /// Parenthesized prefix-notation rendering of the AST (spec.md §6).
    pub fn stringify(&self) -> String {
        self.root.stringify(&self.variables, &self.collections)
    }

    /// Evaluate against positional variable/collection values, indexed the
    /// same way `variables()`/`collections()` enumerate them.
    #[instrument(skip(self, variable_values, collection_values))]
    pub fn evaluate(&self, variable_values: &[N], collection_values: &[Vec<N>]) -> Result<N> {
        engine::evaluate(&self.root, variable_values, collection_values, self.handle)
    }
}
