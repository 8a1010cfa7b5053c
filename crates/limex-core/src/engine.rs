//! Recursive AST evaluator (spec.md §4.4).

use crate::ast::Node;
use crate::error::{EvalError, Result};
use crate::handle::{Builtin, Handle};
use crate::numeric::Numeric;

/// Evaluate `node` against bound variable/collection values, dispatching
/// function/aggregation calls and the ternary/element-of builtins through
/// `handle`.
pub fn evaluate<N: Numeric>(
    node: &Node<N>,
    variables: &[N],
    collections: &[Vec<N>],
    handle: &Handle<N>,
) -> Result<N> {
    use Node::*;
    match node {
        Literal(v) => Ok(*v),
        Variable(i) => variables.get(*i).copied().ok_or_else(|| {
            EvalError::VariableOutOfRange {
                index: *i,
                len: variables.len(),
            }
            .into()
        }),
        Collection(_) => Err(EvalError::NotEvaluable { kind: "collection" }.into()),
        Group(inner) => evaluate(inner, variables, collections, handle),
        Set(_) => Err(EvalError::NotEvaluable { kind: "set" }.into()),
        Sequence(_) => Err(EvalError::NotEvaluable { kind: "sequence" }.into()),

        FunctionCall { callable, args } | Aggregation { callable, args } => {
            let values = evaluate_args(args, variables, collections, handle)?;
            handle.call(*callable, &values)
        }

        Index { collection, index } => evaluate_index(*collection, index, variables, collections, handle),

        Negate(a) => Ok(-evaluate(a, variables, collections, handle)?),
        LogicalNot(a) => {
            let v = evaluate(a, variables, collections, handle)?;
            Ok(N::from_bool(!v.is_truthy()))
        }
        Square(a) => {
            let v = evaluate(a, variables, collections, handle)?;
            Ok(v * v)
        }
        Cube(a) => {
            let v = evaluate(a, variables, collections, handle)?;
            Ok(v * v * v)
        }

        Add(a, b) => binary(a, b, variables, collections, handle, |x, y| Ok(x + y)),
        Subtract(a, b) => binary(a, b, variables, collections, handle, |x, y| Ok(x - y)),
        Multiply(a, b) => binary(a, b, variables, collections, handle, |x, y| Ok(x * y)),
        Divide(a, b) => binary(a, b, variables, collections, handle, |x, y| {
            if N::is_plain_arithmetic() {
                x.checked_div(&y).ok_or(EvalError::DivisionByZero)
            } else {
                Ok(x / y)
            }
        }),
        Exponentiate(a, b) => {
            let x = evaluate(a, variables, collections, handle)?;
            let y = evaluate(b, variables, collections, handle)?;
            handle.call(Builtin::Pow as usize, &[x, y])
        }

        LogicalAnd(a, b) => binary(a, b, variables, collections, handle, |x, y| {
            Ok(N::from_bool(x.is_truthy() && y.is_truthy()))
        }),
        LogicalOr(a, b) => binary(a, b, variables, collections, handle, |x, y| {
            Ok(N::from_bool(x.is_truthy() || y.is_truthy()))
        }),

        LessThan(a, b) => compare(a, b, variables, collections, handle, |x, y| x < y),
        LessOrEqual(a, b) => compare(a, b, variables, collections, handle, |x, y| x <= y),
        GreaterThan(a, b) => compare(a, b, variables, collections, handle, |x, y| x > y),
        GreaterOrEqual(a, b) => compare(a, b, variables, collections, handle, |x, y| x >= y),
        EqualTo(a, b) => compare(a, b, variables, collections, handle, |x, y| x == y),
        NotEqualTo(a, b) => compare(a, b, variables, collections, handle, |x, y| x != y),

        ElementOf { probe, set } => evaluate_membership(Builtin::ElementOf, probe, set, variables, collections, handle),
        NotElementOf { probe, set } => {
            evaluate_membership(Builtin::NotElementOf, probe, set, variables, collections, handle)
        }

        IfThenElse(c, t, e) => {
            let cv = evaluate(c, variables, collections, handle)?;
            let tv = evaluate(t, variables, collections, handle)?;
            let ev = evaluate(e, variables, collections, handle)?;
            handle.call(Builtin::IfThenElse as usize, &[cv, tv, ev])
        }

        Assign(rhs) => evaluate(rhs, variables, collections, handle),
        AddAssign(left, right) => binary(left, right, variables, collections, handle, |x, y| Ok(x + y)),
        SubtractAssign(left, right) => binary(left, right, variables, collections, handle, |x, y| Ok(x - y)),
        MultiplyAssign(left, right) => binary(left, right, variables, collections, handle, |x, y| Ok(x * y)),
        DivideAssign(left, right) => binary(left, right, variables, collections, handle, |x, y| {
            if N::is_plain_arithmetic() {
                x.checked_div(&y).ok_or(EvalError::DivisionByZero)
            } else {
                Ok(x / y)
            }
        }),
    }
}

fn binary<N: Numeric>(
    a: &Node<N>,
    b: &Node<N>,
    variables: &[N],
    collections: &[Vec<N>],
    handle: &Handle<N>,
    combine: impl FnOnce(N, N) -> std::result::Result<N, EvalError>,
) -> Result<N> {
    let x = evaluate(a, variables, collections, handle)?;
    let y = evaluate(b, variables, collections, handle)?;
    Ok(combine(x, y)?)
}

fn compare<N: Numeric>(
    a: &Node<N>,
    b: &Node<N>,
    variables: &[N],
    collections: &[Vec<N>],
    handle: &Handle<N>,
    relate: impl FnOnce(N, N) -> bool,
) -> Result<N> {
    let x = evaluate(a, variables, collections, handle)?;
    let y = evaluate(b, variables, collections, handle)?;
    Ok(N::from_bool(relate(x, y)))
}

/// Evaluate a function/aggregation argument list. A single bare `collection`
/// argument passes the collection's whole value sequence through directly
/// rather than being evaluated as a scalar (spec.md §4.4).
fn evaluate_args<N: Numeric>(
    args: &[Node<N>],
    variables: &[N],
    collections: &[Vec<N>],
    handle: &Handle<N>,
) -> Result<Vec<N>> {
    if let [Node::Collection(index)] = args {
        return collection_values(*index, collections).cloned();
    }
    args.iter()
        .map(|a| evaluate(a, variables, collections, handle))
        .collect()
}

fn evaluate_membership<N: Numeric>(
    builtin: Builtin,
    probe: &Node<N>,
    set: &[Node<N>],
    variables: &[N],
    collections: &[Vec<N>],
    handle: &Handle<N>,
) -> Result<N> {
    let mut values = Vec::with_capacity(set.len() + 1);
    values.push(evaluate(probe, variables, collections, handle)?);
    for element in set {
        values.push(evaluate(element, variables, collections, handle)?);
    }
    handle.call(builtin as usize, &values)
}

fn collection_values<N: Numeric>(index: usize, collections: &[Vec<N>]) -> Result<&Vec<N>> {
    collections.get(index).ok_or_else(|| {
        EvalError::CollectionOutOfRange {
            index,
            len: collections.len(),
        }
        .into()
    })
}

/// `index` lowers from `name[expr]` regardless of configuration (spec.md
/// §4.3/§4.4): a literal integer index addresses 1-based, a runtime value
/// that casts to an integer does the same, and one that only supports
/// equality falls back to scanning the collection for a positional match
/// (spec.md §4.4 "n-ary if whose (condition, value) pairs enumerate
/// evaluated_index == i ? collection[i-1]").
fn evaluate_index<N: Numeric>(
    collection: usize,
    index: &Node<N>,
    variables: &[N],
    collections: &[Vec<N>],
    handle: &Handle<N>,
) -> Result<N> {
    let values = collection_values(collection, collections)?;
    let probe = evaluate(index, variables, collections, handle)?;

    if let Some(i) = probe.try_into_index() {
        return lookup_one_based(values, i);
    }

    for (position, element) in values.iter().enumerate() {
        let ordinal = N::from_literal(&(position + 1).to_string()).ok_or_else(|| {
            EvalError::Domain {
                name: "index",
                message: "collection position does not fit the numeric type".to_string(),
            }
        })?;
        if probe == ordinal {
            return Ok(*element);
        }
    }
    Err(EvalError::IndexOutOfRange {
        index: -1,
        len: values.len(),
    }
    .into())
}

fn lookup_one_based<N: Numeric>(values: &[N], index: i64) -> Result<N> {
    if index >= 1 && (index as usize) <= values.len() {
        Ok(values[(index - 1) as usize])
    } else {
        Err(EvalError::IndexOutOfRange {
            index,
            len: values.len(),
        }
        .into())
    }
}
