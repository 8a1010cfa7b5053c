//! The AST (spec.md §3 "Node kinds").
//!
//! A single tagged enum: each kind either carries an inline payload
//! (literal value, name-table index, callable-table index) or a list of
//! child nodes. This is the systems-language rendering of the closed
//! tagged variant spec.md describes — see spec.md §9 "Tagged variant AST".

use crate::numeric::Numeric;

/// An AST node. Generic over the numeric type the expression evaluates to
/// (see [`crate::numeric::Numeric`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Node<N: Numeric> {
    Literal(N),
    /// Index into the expression's variable-name table.
    Variable(usize),
    /// Index into the expression's collection-name table. Only legal as a
    /// bare argument to `FunctionCall`/`Aggregation` (spec.md §4.4).
    Collection(usize),

    Group(Box<Node<N>>),
    Set(Vec<Node<N>>),
    Sequence(Vec<Node<N>>),

    /// `callable` indexes into the handle; `args` are the argument subtrees.
    FunctionCall { callable: usize, args: Vec<Node<N>> },
    Aggregation { callable: usize, args: Vec<Node<N>> },

    /// `collection` indexes into the collection-name table.
    Index {
        collection: usize,
        index: Box<Node<N>>,
    },

    Negate(Box<Node<N>>),
    LogicalNot(Box<Node<N>>),
    Square(Box<Node<N>>),
    Cube(Box<Node<N>>),

    Add(Box<Node<N>>, Box<Node<N>>),
    Subtract(Box<Node<N>>, Box<Node<N>>),
    Multiply(Box<Node<N>>, Box<Node<N>>),
    Divide(Box<Node<N>>, Box<Node<N>>),
    Exponentiate(Box<Node<N>>, Box<Node<N>>),

    LogicalAnd(Box<Node<N>>, Box<Node<N>>),
    LogicalOr(Box<Node<N>>, Box<Node<N>>),

    LessThan(Box<Node<N>>, Box<Node<N>>),
    LessOrEqual(Box<Node<N>>, Box<Node<N>>),
    GreaterThan(Box<Node<N>>, Box<Node<N>>),
    GreaterOrEqual(Box<Node<N>>, Box<Node<N>>),
    EqualTo(Box<Node<N>>, Box<Node<N>>),
    NotEqualTo(Box<Node<N>>, Box<Node<N>>),

    /// `probe` is the left-hand side; `set` holds the set's element
    /// subtrees (spec.md §3 "RHS = set subtree whose children are the set
    /// elements").
    ElementOf { probe: Box<Node<N>>, set: Vec<Node<N>> },
    NotElementOf { probe: Box<Node<N>>, set: Vec<Node<N>> },

    IfThenElse(Box<Node<N>>, Box<Node<N>>, Box<Node<N>>),

    /// RHS only; the LHS name is carried out of band as `Expression::target`.
    Assign(Box<Node<N>>),
    AddAssign(Box<Node<N>>, Box<Node<N>>),
    SubtractAssign(Box<Node<N>>, Box<Node<N>>),
    MultiplyAssign(Box<Node<N>>, Box<Node<N>>),
    DivideAssign(Box<Node<N>>, Box<Node<N>>),
}

impl<N: Numeric> Node<N> {
    /// Render in parenthesized `kind(operand, operand, …)` prefix notation
    /// (spec.md §6 `stringify`), resolving variable/collection indices
    /// through the name tables rather than storing a back-pointer to the
    /// owning expression (spec.md §9 "Cyclic back-reference").
    pub fn stringify(&self, variables: &[String], collections: &[String]) -> String {
        use Node::*;
        match self {
            Literal(v) => format!("{v}"),
            Variable(i) => variables[*i].clone(),
            Collection(i) => collections[*i].clone(),
            Group(inner) => format!("group({})", inner.stringify(variables, collections)),
            Set(items) => format!("set({})", join(items, variables, collections)),
            Sequence(items) => format!("sequence({})", join(items, variables, collections)),
            FunctionCall { callable, args } => {
                format!("function_call({callable}{})", prefixed_join(args, variables, collections))
            }
            Aggregation { callable, args } => {
                format!("aggregation({callable}{})", prefixed_join(args, variables, collections))
            }
            Index { collection, index } => format!(
                "index({}, {})",
                collections[*collection],
                index.stringify(variables, collections)
            ),
            Negate(a) => format!("negate({})", a.stringify(variables, collections)),
            LogicalNot(a) => format!("logical_not({})", a.stringify(variables, collections)),
            Square(a) => format!("square({})", a.stringify(variables, collections)),
            Cube(a) => format!("cube({})", a.stringify(variables, collections)),
            Add(a, b) => bin("add", a, b, variables, collections),
            Subtract(a, b) => bin("subtract", a, b, variables, collections),
            Multiply(a, b) => bin("multiply", a, b, variables, collections),
            Divide(a, b) => bin("divide", a, b, variables, collections),
            Exponentiate(a, b) => bin("exponentiate", a, b, variables, collections),
            LogicalAnd(a, b) => bin("logical_and", a, b, variables, collections),
            LogicalOr(a, b) => bin("logical_or", a, b, variables, collections),
            LessThan(a, b) => bin("less_than", a, b, variables, collections),
            LessOrEqual(a, b) => bin("less_or_equal", a, b, variables, collections),
            GreaterThan(a, b) => bin("greater_than", a, b, variables, collections),
            GreaterOrEqual(a, b) => bin("greater_or_equal", a, b, variables, collections),
            EqualTo(a, b) => bin("equal_to", a, b, variables, collections),
            NotEqualTo(a, b) => bin("not_equal_to", a, b, variables, collections),
            ElementOf { probe, set } => format!(
                "element_of({}{})",
                probe.stringify(variables, collections),
                prefixed_join(set, variables, collections)
            ),
            NotElementOf { probe, set } => format!(
                "not_element_of({}{})",
                probe.stringify(variables, collections),
                prefixed_join(set, variables, collections)
            ),
            IfThenElse(c, t, e) => format!(
                "if_then_else({}, {}, {})",
                c.stringify(variables, collections),
                t.stringify(variables, collections),
                e.stringify(variables, collections)
            ),
            Assign(rhs) => format!("assign({})", rhs.stringify(variables, collections)),
            AddAssign(a, b) => bin("add_assign", a, b, variables, collections),
            SubtractAssign(a, b) => bin("subtract_assign", a, b, variables, collections),
            MultiplyAssign(a, b) => bin("multiply_assign", a, b, variables, collections),
            DivideAssign(a, b) => bin("divide_assign", a, b, variables, collections),
        }
    }
}

fn bin<N: Numeric>(
    kind: &str,
    a: &Node<N>,
    b: &Node<N>,
    variables: &[String],
    collections: &[String],
) -> String {
    format!(
        "{kind}({}, {})",
        a.stringify(variables, collections),
        b.stringify(variables, collections)
    )
}

fn join<N: Numeric>(items: &[Node<N>], variables: &[String], collections: &[String]) -> String {
    items
        .iter()
        .map(|n| n.stringify(variables, collections))
        .collect::<Vec<_>>()
        .join(", ")
}

fn prefixed_join<N: Numeric>(
    items: &[Node<N>],
    variables: &[String],
    collections: &[String],
) -> String {
    if items.is_empty() {
        String::new()
    } else {
        format!(", {}", join(items, variables, collections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringify_resolves_names_through_tables() {
        let vars = vec!["x".to_string(), "y".to_string()];
        let cols: Vec<String> = Vec::new();
        let node: Node<f64> = Node::Add(
            Box::new(Node::Variable(0)),
            Box::new(Node::Multiply(Box::new(Node::Literal(2.0)), Box::new(Node::Variable(1)))),
        );
        assert_eq!(node.stringify(&vars, &cols), "add(x, multiply(2, y))");
    }

    #[test]
    fn stringify_function_call_includes_callable_index() {
        let vars: Vec<String> = Vec::new();
        let cols: Vec<String> = Vec::new();
        let node: Node<f64> = Node::FunctionCall {
            callable: 4,
            args: vec![Node::Literal(9.0)],
        };
        assert_eq!(node.stringify(&vars, &cols), "function_call(4, 9)");
    }

    #[test]
    fn stringify_index_resolves_collection_name() {
        let vars: Vec<String> = Vec::new();
        let cols = vec!["data".to_string()];
        let node: Node<f64> = Node::Index {
            collection: 0,
            index: Box::new(Node::Literal(1.0)),
        };
        assert_eq!(node.stringify(&vars, &cols), "index(data, 1)");
    }
}
