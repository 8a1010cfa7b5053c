//! The handle: a user-extensible table of named callables over the numeric
//! type, seeded with built-ins (spec.md §4.5).

use std::fmt;
use std::sync::Arc;

use crate::error::{EvalError, Result};
use crate::numeric::Numeric;

/// A callable invoked with an ordered sequence of argument values.
pub type Callable<N> = Arc<dyn Fn(&[N]) -> std::result::Result<N, EvalError> + Send + Sync>;

/// Fixed positions of the seeded built-ins (spec.md §4.5). Reserved so the
/// evaluator can index them by an enumerated constant instead of a name
/// lookup on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum Builtin {
    IfThenElse = 0,
    NAryIf = 1,
    Abs = 2,
    Pow = 3,
    Sqrt = 4,
    Cbrt = 5,
    Sum = 6,
    Avg = 7,
    Count = 8,
    Min = 9,
    Max = 10,
    ElementOf = 11,
    NotElementOf = 12,
    At = 13,
}

pub const BUILTIN_COUNT: usize = 14;

/// Name -> implementation table. Names are unique; positions
/// `0..BUILTIN_COUNT` are the built-ins, in the fixed order spec.md §4.5
/// lists them.
pub struct Handle<N: Numeric> {
    names: Vec<String>,
    callables: Vec<Callable<N>>,
}

impl<N: Numeric> fmt::Debug for Handle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle").field("names", &self.names).finish()
    }
}

impl<N: Numeric> Default for Handle<N> {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl<N: Numeric> Handle<N> {
    /// An empty handle with no callables registered at all, not even the
    /// built-ins. Mostly useful for tests that want to assert the reserved
    /// positions really are required.
    pub fn empty() -> Self {
        Self {
            names: Vec::new(),
            callables: Vec::new(),
        }
    }

    /// A handle seeded with the built-in callables in their fixed order.
    pub fn with_builtins() -> Self {
        let mut handle = Self::empty();
        handle.add_unchecked("if_then_else", Arc::new(builtin_if_then_else));
        handle.add_unchecked("n_ary_if", Arc::new(builtin_n_ary_if));
        handle.add_unchecked("abs", Arc::new(builtin_abs));
        handle.add_unchecked("pow", Arc::new(builtin_pow));
        handle.add_unchecked("sqrt", Arc::new(builtin_sqrt));
        handle.add_unchecked("cbrt", Arc::new(builtin_cbrt));
        handle.add_unchecked("sum", Arc::new(builtin_sum));
        handle.add_unchecked("avg", Arc::new(builtin_avg));
        handle.add_unchecked("count", Arc::new(builtin_count));
        handle.add_unchecked("min", Arc::new(builtin_min));
        handle.add_unchecked("max", Arc::new(builtin_max));
        handle.add_unchecked("element_of", Arc::new(builtin_element_of));
        handle.add_unchecked("not_element_of", Arc::new(builtin_not_element_of));
        handle.add_unchecked("at", Arc::new(builtin_at_placeholder));
        debug_assert_eq!(handle.names.len(), BUILTIN_COUNT);
        handle
    }

    fn add_unchecked(&mut self, name: &str, implementation: Callable<N>) {
        self.names.push(name.to_string());
        self.callables.push(implementation);
    }

    /// Register a new callable. Errors if `name` is already registered
    /// (spec.md §4.5 "Users may add more callables by unique name;
    /// duplicates are rejected.").
    pub fn add(&mut self, name: &str, implementation: Callable<N>) -> Result<()> {
        if self.names.iter().any(|n| n == name) {
            return Err(crate::error::Error::Logic(format!(
                "callable '{name}' is already registered"
            )));
        }
        self.add_unchecked(name, implementation);
        Ok(())
    }

    /// Replace an already-registered callable's implementation (used to
    /// supply a real `at` implementation for a custom-element `Numeric`
    /// type; spec.md §4.5 "in the custom-element configuration it performs
    /// a user-provided indexed evaluation").
    pub fn replace(&mut self, name: &str, implementation: Callable<N>) -> Result<()> {
        let index = self.get_index(name)?;
        self.callables[index] = implementation;
        Ok(())
    }

    /// Look up a callable's index by name. Fatal (per spec.md §7) on an
    /// unknown name, since an unresolved callable reference should never
    /// survive parsing.
    pub fn get_index(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| crate::error::Error::Parse(crate::error::ParseError::UnknownCallable {
                name: name.to_string(),
            }))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn call(&self, index: usize, args: &[N]) -> Result<N> {
        let implementation = self.callables.get(index).ok_or_else(|| {
            crate::error::Error::Eval(EvalError::CallableIndexOutOfRange {
                index,
                len: self.callables.len(),
            })
        })?;
        implementation(args).map_err(crate::error::Error::Eval)
    }
}

fn builtin_if_then_else<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [c, a, b] => Ok(if c.is_truthy() { *a } else { *b }),
        _ => Err(EvalError::Arity {
            name: "if_then_else",
            expected: "exactly 3",
            actual: args.len(),
        }),
    }
}

fn builtin_n_ary_if<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    if args.len() < 3 || args.len() % 2 == 0 {
        return Err(EvalError::Arity {
            name: "n_ary_if",
            expected: "an odd number >= 3",
            actual: args.len(),
        });
    }
    let pairs = (args.len() - 1) / 2;
    for i in 0..pairs {
        if args[2 * i].is_truthy() {
            return Ok(args[2 * i + 1]);
        }
    }
    Ok(args[args.len() - 1])
}

fn builtin_abs<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [x] => Ok(x.abs()),
        _ => Err(EvalError::Arity {
            name: "abs",
            expected: "exactly 1",
            actual: args.len(),
        }),
    }
}

fn builtin_pow<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [x, y] => Ok(x.powf(*y)),
        _ => Err(EvalError::Arity {
            name: "pow",
            expected: "exactly 2",
            actual: args.len(),
        }),
    }
}

fn builtin_sqrt<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [x] => Ok(x.sqrt()),
        _ => Err(EvalError::Arity {
            name: "sqrt",
            expected: "exactly 1",
            actual: args.len(),
        }),
    }
}

fn builtin_cbrt<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [x] => Ok(x.cbrt()),
        _ => Err(EvalError::Arity {
            name: "cbrt",
            expected: "exactly 1",
            actual: args.len(),
        }),
    }
}

fn builtin_sum<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    Ok(args.iter().fold(N::ZERO, |acc, v| acc + *v))
}

fn builtin_avg<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    if args.is_empty() {
        return Err(EvalError::Domain {
            name: "avg",
            message: "average of an empty argument list is undefined".to_string(),
        });
    }
    let count = N::from_literal(&args.len().to_string()).unwrap_or(N::ONE);
    let sum = args.iter().fold(N::ZERO, |acc, v| acc + *v);
    Ok(match sum.checked_div(&count) {
        Some(v) => v,
        None => sum / count,
    })
}

fn builtin_count<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    N::from_literal(&args.len().to_string()).ok_or(EvalError::Domain {
        name: "count",
        message: "result does not fit the numeric type".to_string(),
    })
}

fn builtin_min<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    args.iter()
        .copied()
        .reduce(|a, b| if b < a { b } else { a })
        .ok_or(EvalError::Domain {
            name: "min",
            message: "minimum of an empty argument list is undefined".to_string(),
        })
}

fn builtin_max<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    args.iter()
        .copied()
        .reduce(|a, b| if b > a { b } else { a })
        .ok_or(EvalError::Domain {
            name: "max",
            message: "maximum of an empty argument list is undefined".to_string(),
        })
}

fn builtin_element_of<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [] => Err(EvalError::Arity {
            name: "element_of",
            expected: "at least 1",
            actual: 0,
        }),
        [probe, rest @ ..] => Ok(N::from_bool(rest.iter().any(|e| e == probe))),
    }
}

fn builtin_not_element_of<N: Numeric>(args: &[N]) -> std::result::Result<N, EvalError> {
    match args {
        [] => Err(EvalError::Arity {
            name: "not_element_of",
            expected: "at least 1",
            actual: 0,
        }),
        [probe, rest @ ..] => Ok(N::from_bool(!rest.iter().any(|e| e == probe))),
    }
}

fn builtin_at_placeholder<N: Numeric>(_args: &[N]) -> std::result::Result<N, EvalError> {
    Err(EvalError::ReservedPlaceholder { name: "at" })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_ins_are_seeded_in_fixed_order() {
        let handle = Handle::<f64>::with_builtins();
        assert_eq!(handle.names().len(), BUILTIN_COUNT);
        assert_eq!(handle.get_index("if_then_else").unwrap(), Builtin::IfThenElse as usize);
        assert_eq!(handle.get_index("at").unwrap(), Builtin::At as usize);
    }

    #[test]
    fn unknown_callable_is_fatal() {
        let handle = Handle::<f64>::with_builtins();
        assert!(handle.get_index("nope").is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut handle = Handle::<f64>::with_builtins();
        let err = handle.add("sum", Arc::new(builtin_sum));
        assert!(err.is_err());
    }

    #[test]
    fn at_errors_by_default_and_is_replaceable() {
        let mut handle = Handle::<f64>::with_builtins();
        assert!(handle.call(Builtin::At as usize, &[1.0, 2.0]).is_err());
        handle
            .replace("at", Arc::new(|args: &[f64]| Ok(args[0])))
            .unwrap();
        assert_eq!(handle.call(Builtin::At as usize, &[7.0]).unwrap(), 7.0);
    }

    #[test]
    fn avg_errors_on_empty_and_averages_otherwise() {
        assert!(builtin_avg::<f64>(&[]).is_err());
        assert_eq!(builtin_avg::<f64>(&[2.0, 4.0]).unwrap(), 3.0);
    }

    #[test]
    fn n_ary_if_returns_first_truthy_branch_or_default() {
        assert_eq!(
            builtin_n_ary_if::<f64>(&[0.0, 10.0, 1.0, 20.0, 99.0]).unwrap(),
            20.0
        );
        assert_eq!(builtin_n_ary_if::<f64>(&[0.0, 10.0, 0.0, 20.0, 99.0]).unwrap(), 99.0);
    }

    #[test]
    fn element_of_accepts_empty_set() {
        assert_eq!(builtin_element_of::<f64>(&[3.0]).unwrap(), 0.0);
        assert_eq!(builtin_element_of::<f64>(&[3.0, 1.0, 3.0]).unwrap(), 1.0);
    }
}
