//! Tree builder: consumes the token tree and produces an AST using
//! precedence climbing, with explicit handling of ternary and assignment
//! (spec.md §4.3).

use crate::ast::Node;
use crate::error::{Error, ParseError, Result};
use crate::handle::Handle;
use crate::numeric::Numeric;
use crate::tables::{self, InfixOp};
use crate::token::{Token, TokenCategory, TokenType};

/// An operand on the build stack, tagged with how it was produced. The tag
/// only matters to the ternary `_else` apply rule (spec.md §4.3): it
/// decides whether the operand gets rewritten to `group` when the ternary
/// resolves. `if_`/`_then_`/`_else` never appear in the finished AST
/// (spec.md §3) — they exist only as this transient tag.
enum Tagged<N: Numeric> {
    Plain(Node<N>),
    IfCondition(Node<N>),
    ThenBranch(Node<N>),
}

impl<N: Numeric> Tagged<N> {
    fn into_node(self) -> Node<N> {
        match self {
            Tagged::Plain(n) | Tagged::IfCondition(n) | Tagged::ThenBranch(n) => n,
        }
    }

    fn into_condition_node(self) -> Node<N> {
        match self {
            Tagged::IfCondition(n) => Node::Group(Box::new(n)),
            Tagged::Plain(n) | Tagged::ThenBranch(n) => n,
        }
    }

    fn into_then_result_node(self) -> Node<N> {
        Node::Group(Box::new(self.into_node()))
    }
}

/// An entry on the operator stack. `ThenBarrier` and `TernaryElse` are the
/// parser-internal markers spec.md §3 calls `if_`/`_then_`/`_else`.
#[derive(Clone, Copy)]
enum StackOp {
    Real(InfixOp),
    ThenBarrier,
    TernaryElse,
}

impl StackOp {
    fn precedence(self) -> u8 {
        match self {
            StackOp::Real(op) => tables::precedence(op),
            StackOp::ThenBarrier | StackOp::TernaryElse => tables::TERNARY_PRECEDENCE,
        }
    }

    /// Only exponentiation is right-associative; the ternary family gets
    /// its right-associativity from the `_then_` barrier instead (spec.md
    /// §4.3 "the `_then_` barrier makes ternary right-associative").
    fn is_left_associative(self) -> bool {
        !matches!(self, StackOp::Real(InfixOp::Exponentiate))
    }
}

pub struct TreeBuilder<'h, N: Numeric> {
    handle: &'h Handle<N>,
    variables: &'h mut Vec<String>,
    collections: &'h mut Vec<String>,
    target: &'h mut Option<String>,
}

fn register(list: &mut Vec<String>, name: &str) -> usize {
    match list.iter().position(|n| n == name) {
        Some(i) => i,
        None => {
            list.push(name.to_string());
            list.len() - 1
        }
    }
}

impl<'h, N: Numeric> TreeBuilder<'h, N> {
    pub fn new(
        handle: &'h Handle<N>,
        variables: &'h mut Vec<String>,
        collections: &'h mut Vec<String>,
        target: &'h mut Option<String>,
    ) -> Self {
        Self {
            handle,
            variables,
            collections,
            target,
        }
    }

    /// Build a single node from a comma-free region (group/if-condition/
    /// then-branch/index-expression contexts).
    pub fn build_single(&mut self, children: &[Token]) -> Result<Node<N>> {
        let mut segments = self.build_segments(children)?;
        if segments.len() != 1 {
            return Err(Error::Parse(ParseError::MalformedTernary));
        }
        Ok(segments.remove(0))
    }

    /// Build the comma-separated segment list (set/sequence/function-call/
    /// aggregation-argument contexts). Also used by `build_single`, which
    /// requires the result to have exactly one segment.
    pub fn build_segments(&mut self, children: &[Token]) -> Result<Vec<Node<N>>> {
        let mut segments = Vec::new();
        let mut operands: Vec<Tagged<N>> = Vec::new();
        let mut operators: Vec<StackOp> = Vec::new();

        let mut i = 0;
        while i < children.len() {
            let token = &children[i];
            match (token.category, token.token_type) {
                (TokenCategory::Prefix, TokenType::Operator) => {
                    // Consumed via look-back when the next operand is built.
                    i += 1;
                }
                (TokenCategory::Infix, TokenType::Separator) => {
                    self.flush(&mut operands, &mut operators)?;
                    if operands.len() != 1 {
                        return Err(Error::Parse(ParseError::MissingOperand {
                            operator: ",".to_string(),
                        }));
                    }
                    segments.push(operands.pop().unwrap().into_node());
                    i += 1;
                }
                (TokenCategory::Prefix, TokenType::Group) => {
                    let condition = self.build_single(&token.children)?;
                    operands.push(Tagged::IfCondition(condition));
                    i += 1;
                }
                (TokenCategory::Infix, TokenType::Group) => {
                    let then_value = self.build_single(&token.children)?;
                    operands.push(Tagged::ThenBranch(then_value));
                    operators.push(StackOp::ThenBarrier);
                    i += 1;
                }
                (TokenCategory::Infix, TokenType::Operator) => {
                    self.push_infix_operator(token, &mut operands, &mut operators)?;
                    i += 1;
                }
                (TokenCategory::Operand, _) => {
                    let mut node = self.build_operand(token)?;
                    let mut consumed = 1;

                    // Postfix wraps inner, prefix wraps outer (spec.md §4.3
                    // lists the POSTFIX bullet before the PREFIX bullet —
                    // `-3²` is `-(3²)`, not `(-3)²`).
                    if let Some(next) = children.get(i + 1) {
                        if next.category == TokenCategory::Postfix
                            && next.token_type == TokenType::Operator
                        {
                            node = wrap_postfix(&next.value, node)?;
                            consumed += 1;
                        }
                    }

                    if i > 0 {
                        if let (TokenCategory::Prefix, TokenType::Operator) =
                            (children[i - 1].category, children[i - 1].token_type)
                        {
                            node = wrap_prefix(&children[i - 1].value, node)?;
                        }
                    }

                    operands.push(Tagged::Plain(node));
                    i += consumed;
                }
                _ => return Err(Error::Logic("unexpected token shape in tree builder".to_string())),
            }
        }

        self.flush(&mut operands, &mut operators)?;
        if operands.len() != 1 {
            return Err(Error::Parse(ParseError::MissingOperand {
                operator: "<end of expression>".to_string(),
            }));
        }
        segments.push(operands.pop().unwrap().into_node());
        Ok(segments)
    }

    fn build_operand(&mut self, token: &Token) -> Result<Node<N>> {
        match token.token_type {
            TokenType::Number => {
                let value = N::from_literal(&token.value).ok_or_else(|| {
                    Error::Logic(format!("literal '{}' is not a valid numeral", token.value))
                })?;
                Ok(Node::Literal(value))
            }
            TokenType::Variable => {
                let index = register(self.variables, &token.value);
                Ok(Node::Variable(index))
            }
            TokenType::Collection => {
                let index = register(self.collections, &token.value);
                Ok(Node::Collection(index))
            }
            TokenType::Group => {
                let inner = self.build_single(&token.children)?;
                Ok(Node::Group(Box::new(inner)))
            }
            TokenType::Set => {
                let elements = self.build_segments(&token.children)?;
                Ok(Node::Set(elements))
            }
            TokenType::Sequence => {
                let elements = self.build_segments(&token.children)?;
                Ok(Node::Sequence(elements))
            }
            TokenType::FunctionCall => {
                let callable = self.handle.get_index(&token.value)?;
                let args = self.build_segments(&token.children)?;
                Ok(Node::FunctionCall { callable, args })
            }
            TokenType::Aggregation => {
                let callable = self.handle.get_index(&token.value)?;
                let args = self.build_segments(&token.children)?;
                Ok(Node::Aggregation { callable, args })
            }
            TokenType::IndexedVariable => {
                let collection = register(self.collections, &token.value);
                let index = self.build_single(&token.children)?;
                Ok(Node::Index {
                    collection,
                    index: Box::new(index),
                })
            }
            TokenType::Operator | TokenType::Separator => {
                Err(Error::Logic("operator/separator token reached build_operand".to_string()))
            }
        }
    }

    fn push_infix_operator(
        &mut self,
        token: &Token,
        operands: &mut Vec<Tagged<N>>,
        operators: &mut Vec<StackOp>,
    ) -> Result<()> {
        if token.value == ":" || token.value == tables::TERNARY_ELSE {
            pop_while_tighter(operands, operators, StackOp::TernaryElse)?;
            operators.push(StackOp::TernaryElse);
            return Ok(());
        }

        let kind = tables::infix_op_kind(&token.value)
            .ok_or_else(|| Error::Logic(format!("unrecognized infix operator '{}'", token.value)))?;

        if kind.is_assignment() {
            if operands.len() != 1 || !operators.is_empty() {
                return Err(Error::Parse(ParseError::AssignmentNotInitial {
                    operator: token.value.clone(),
                }));
            }
            let variable_index = match operands.last() {
                Some(Tagged::Plain(Node::Variable(i))) => *i,
                _ => return Err(Error::Parse(ParseError::AssignmentTargetNotVariable)),
            };
            let name = self.variables[variable_index].clone();
            *self.target = Some(name);
            if kind == InfixOp::Assign {
                self.variables.remove(variable_index);
            }
        }

        pop_while_tighter(operands, operators, StackOp::Real(kind))?;
        operators.push(StackOp::Real(kind));
        Ok(())
    }

    fn flush(&mut self, operands: &mut Vec<Tagged<N>>, operators: &mut Vec<StackOp>) -> Result<()> {
        while let Some(op) = operators.pop() {
            apply(operands, operators, op)?;
        }
        Ok(())
    }
}

fn pop_while_tighter<N: Numeric>(
    operands: &mut Vec<Tagged<N>>,
    operators: &mut Vec<StackOp>,
    incoming: StackOp,
) -> Result<()> {
    loop {
        match operators.last() {
            None => break,
            Some(StackOp::ThenBarrier) => break,
            Some(top) => {
                let should_pop = top.precedence() < incoming.precedence()
                    || (top.precedence() == incoming.precedence() && incoming.is_left_associative());
                if !should_pop {
                    break;
                }
                let top = operators.pop().unwrap();
                apply(operands, operators, top)?;
            }
        }
    }
    Ok(())
}

fn apply<N: Numeric>(
    operands: &mut Vec<Tagged<N>>,
    operators: &mut Vec<StackOp>,
    op: StackOp,
) -> Result<()> {
    match op {
        StackOp::ThenBarrier => Err(Error::Parse(ParseError::MalformedTernary)),
        StackOp::TernaryElse => {
            match operators.pop() {
                Some(StackOp::ThenBarrier) => {}
                _ => return Err(Error::Parse(ParseError::MalformedTernary)),
            }
            let else_result = pop_operand(operands)?.into_node();
            let then_result = pop_operand(operands)?.into_then_result_node();
            let condition = pop_operand(operands)?.into_condition_node();
            operands.push(Tagged::Plain(Node::IfThenElse(
                Box::new(condition),
                Box::new(then_result),
                Box::new(else_result),
            )));
            Ok(())
        }
        StackOp::Real(kind) if kind.is_assignment() => {
            let right = pop_operand(operands)?.into_node();
            let left = pop_operand(operands)?.into_node();
            let Node::Variable(_) = left else {
                return Err(Error::Parse(ParseError::AssignmentTargetNotVariable));
            };
            let node = match kind {
                InfixOp::Assign => Node::Assign(Box::new(right)),
                InfixOp::AddAssign => Node::AddAssign(Box::new(left), Box::new(right)),
                InfixOp::SubtractAssign => Node::SubtractAssign(Box::new(left), Box::new(right)),
                InfixOp::MultiplyAssign => Node::MultiplyAssign(Box::new(left), Box::new(right)),
                InfixOp::DivideAssign => Node::DivideAssign(Box::new(left), Box::new(right)),
                _ => unreachable!("guarded by is_assignment()"),
            };
            operands.push(Tagged::Plain(node));
            Ok(())
        }
        StackOp::Real(kind) => {
            let right = pop_operand(operands)?.into_node();
            let left = pop_operand(operands)?.into_node();
            let node = match kind {
                InfixOp::Add => Node::Add(Box::new(left), Box::new(right)),
                InfixOp::Subtract => Node::Subtract(Box::new(left), Box::new(right)),
                InfixOp::Multiply => Node::Multiply(Box::new(left), Box::new(right)),
                InfixOp::Divide => Node::Divide(Box::new(left), Box::new(right)),
                InfixOp::Exponentiate => Node::Exponentiate(Box::new(left), Box::new(right)),
                InfixOp::LogicalAnd => Node::LogicalAnd(Box::new(left), Box::new(right)),
                InfixOp::LogicalOr => Node::LogicalOr(Box::new(left), Box::new(right)),
                InfixOp::LessThan => Node::LessThan(Box::new(left), Box::new(right)),
                InfixOp::LessOrEqual => Node::LessOrEqual(Box::new(left), Box::new(right)),
                InfixOp::GreaterThan => Node::GreaterThan(Box::new(left), Box::new(right)),
                InfixOp::GreaterOrEqual => Node::GreaterOrEqual(Box::new(left), Box::new(right)),
                InfixOp::EqualTo => Node::EqualTo(Box::new(left), Box::new(right)),
                InfixOp::NotEqualTo => Node::NotEqualTo(Box::new(left), Box::new(right)),
                InfixOp::ElementOf => Node::ElementOf {
                    probe: Box::new(left),
                    set: set_elements(right),
                },
                InfixOp::NotElementOf => Node::NotElementOf {
                    probe: Box::new(left),
                    set: set_elements(right),
                },
                InfixOp::Assign
                | InfixOp::AddAssign
                | InfixOp::SubtractAssign
                | InfixOp::MultiplyAssign
                | InfixOp::DivideAssign => unreachable!("handled above"),
            };
            operands.push(Tagged::Plain(node));
            Ok(())
        }
    }
}

/// `in`/`not in`'s RHS is whatever the tree builder produced for that
/// position; if it's a literal `{...}` set, use its elements directly,
/// otherwise treat the single value as a one-element set.
fn set_elements<N: Numeric>(node: Node<N>) -> Vec<Node<N>> {
    match node {
        Node::Set(elements) | Node::Sequence(elements) => elements,
        other => vec![other],
    }
}

fn pop_operand<N: Numeric>(operands: &mut Vec<Tagged<N>>) -> Result<Tagged<N>> {
    operands
        .pop()
        .ok_or(Error::Parse(ParseError::MissingOperand {
            operator: "<unknown>".to_string(),
        }))
}

fn wrap_prefix<N: Numeric>(lexeme: &str, node: Node<N>) -> Result<Node<N>> {
    match lexeme {
        "-" => Ok(Node::Negate(Box::new(node))),
        "!" | "¬" => Ok(Node::LogicalNot(Box::new(node))),
        other => Err(Error::Logic(format!("unrecognized prefix operator '{other}'"))),
    }
}

fn wrap_postfix<N: Numeric>(lexeme: &str, node: Node<N>) -> Result<Node<N>> {
    match lexeme {
        "²" => Ok(Node::Square(Box::new(node))),
        "³" => Ok(Node::Cube(Box::new(node))),
        other => Err(Error::Logic(format!("unrecognized postfix operator '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn build(input: &str) -> (Node<f64>, Vec<String>, Vec<String>, Option<String>) {
        let handle = Handle::<f64>::default();
        let root_token = lexer::tokenize(input).unwrap();
        let mut variables = Vec::new();
        let mut collections = Vec::new();
        let mut target = None;
        let node = {
            let mut builder = TreeBuilder::new(&handle, &mut variables, &mut collections, &mut target);
            builder.build_single(&root_token.children).unwrap()
        };
        (node, variables, collections, target)
    }

    #[test]
    fn multiply_binds_tighter_than_add() {
        let (node, ..) = build("3+5*2");
        assert_eq!(
            node,
            Node::Add(
                Box::new(Node::Literal(3.0)),
                Box::new(Node::Multiply(Box::new(Node::Literal(5.0)), Box::new(Node::Literal(2.0))))
            )
        );
    }

    #[test]
    fn exponentiation_is_right_associative() {
        let (node, ..) = build("2^3^2");
        assert_eq!(
            node,
            Node::Exponentiate(
                Box::new(Node::Literal(2.0)),
                Box::new(Node::Exponentiate(Box::new(Node::Literal(3.0)), Box::new(Node::Literal(2.0))))
            )
        );
    }

    #[test]
    fn prefix_negate_wraps_outside_postfix_square() {
        let (node, ..) = build("-3²");
        assert_eq!(node, Node::Negate(Box::new(Node::Square(Box::new(Node::Literal(3.0))))));
    }

    #[test]
    fn comparisons_chain_left_to_right() {
        let (node, vars, ..) = build("3 <= x < y");
        assert_eq!(vars, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(
            node,
            Node::LessThan(
                Box::new(Node::LessOrEqual(
                    Box::new(Node::Literal(3.0)),
                    Box::new(Node::Variable(0))
                )),
                Box::new(Node::Variable(1))
            )
        );
    }

    #[test]
    fn ternary_binds_tighter_than_comparison() {
        let (node, vars, ..) = build("a < b ? x : y");
        assert_eq!(vars, vec!["a", "b", "x", "y"]);
        assert_eq!(
            node,
            Node::LessThan(
                Box::new(Node::Variable(0)),
                Box::new(Node::IfThenElse(
                    Box::new(Node::Variable(1)),
                    Box::new(Node::Group(Box::new(Node::Variable(2)))),
                    Box::new(Node::Variable(3))
                ))
            )
        );
    }

    #[test]
    fn if_then_else_rewrites_condition_and_then_branch_to_group() {
        let (node, ..) = build("if a then x else y");
        match node {
            Node::IfThenElse(c, t, e) => {
                assert!(matches!(*c, Node::Group(_)));
                assert!(matches!(*t, Node::Group(_)));
                assert!(matches!(*e, Node::Variable(_)));
            }
            other => panic!("expected IfThenElse, got {other:?}"),
        }
    }

    #[test]
    fn plain_assign_clears_target_from_variable_table_unless_reread() {
        let (node, vars, _, target) = build("x := 2 + 3");
        assert_eq!(target.as_deref(), Some("x"));
        assert!(vars.is_empty());
        assert_eq!(
            node,
            Node::Assign(Box::new(Node::Add(
                Box::new(Node::Literal(2.0)),
                Box::new(Node::Literal(3.0))
            )))
        );

        let (_, vars, _, target) = build("x := x + 1");
        assert_eq!(target.as_deref(), Some("x"));
        assert_eq!(vars, vec!["x".to_string()]);
    }

    #[test]
    fn compound_assign_retains_target_as_a_read() {
        let (node, vars, _, target) = build("z -= 1");
        assert_eq!(target.as_deref(), Some("z"));
        assert_eq!(vars, vec!["z".to_string()]);
        assert!(matches!(node, Node::SubtractAssign(..)));
    }

    #[test]
    fn assignment_must_be_the_first_operator() {
        let handle = Handle::<f64>::default();
        let root_token = lexer::tokenize("1 + x := 2").unwrap();
        let mut variables = Vec::new();
        let mut collections = Vec::new();
        let mut target = None;
        let mut builder = TreeBuilder::new(&handle, &mut variables, &mut collections, &mut target);
        let err = builder.build_single(&root_token.children).unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::AssignmentNotInitial { .. })));
    }

    #[test]
    fn indexed_variable_lowers_to_index_node() {
        let (node, _, collections, _) = build("a[1]");
        assert_eq!(collections, vec!["a".to_string()]);
        assert_eq!(
            node,
            Node::Index {
                collection: 0,
                index: Box::new(Node::Literal(1.0)),
            }
        );
    }

    #[test]
    fn membership_set_literal_supplies_elements() {
        let (node, vars, ..) = build("x in {1, 2, y}");
        assert_eq!(vars, vec!["x".to_string(), "y".to_string()]);
        match node {
            Node::ElementOf { probe, set } => {
                assert!(matches!(*probe, Node::Variable(0)));
                assert_eq!(set.len(), 3);
            }
            other => panic!("expected ElementOf, got {other:?}"),
        }
    }
}
