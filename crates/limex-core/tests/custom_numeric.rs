//! Exercises the "custom collection-element" configuration: a numeric type
//! with equality but no meaningful integer cast, so `index` must fall back
//! to the position-equality scan rather than a host-array lookup.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

use limex_core::{Expression, Handle, Numeric};

/// An opaque element identified by an ordinal. Arithmetic exists only to
/// satisfy the trait bound; nothing in this suite relies on its result
/// beyond `sum`/`avg` over ordinals.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
struct Tag(i64);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Tag {
    type Output = Tag;
    fn add(self, rhs: Tag) -> Tag {
        Tag(self.0 + rhs.0)
    }
}
impl Sub for Tag {
    type Output = Tag;
    fn sub(self, rhs: Tag) -> Tag {
        Tag(self.0 - rhs.0)
    }
}
impl Mul for Tag {
    type Output = Tag;
    fn mul(self, rhs: Tag) -> Tag {
        Tag(self.0 * rhs.0)
    }
}
impl Div for Tag {
    type Output = Tag;
    fn div(self, rhs: Tag) -> Tag {
        if rhs.0 == 0 {
            Tag(0)
        } else {
            Tag(self.0 / rhs.0)
        }
    }
}
impl Neg for Tag {
    type Output = Tag;
    fn neg(self) -> Tag {
        Tag(-self.0)
    }
}

impl Numeric for Tag {
    const ZERO: Tag = Tag(0);
    const ONE: Tag = Tag(1);

    fn from_literal(text: &str) -> Option<Tag> {
        text.parse::<i64>().ok().map(Tag)
    }

    fn from_bool(value: bool) -> Tag {
        Tag(if value { 1 } else { 0 })
    }

    fn is_truthy(&self) -> bool {
        self.0 != 0
    }

    fn abs(&self) -> Tag {
        Tag(self.0.abs())
    }

    fn powf(&self, _exponent: Tag) -> Tag {
        *self
    }

    fn sqrt(&self) -> Tag {
        *self
    }

    fn cbrt(&self) -> Tag {
        *self
    }

    fn is_plain_arithmetic() -> bool {
        false
    }

    /// No meaningful cast from an ordinal tag to a host index; the
    /// evaluator must fall back to scanning for a position match.
    fn try_into_index(&self) -> Option<i64> {
        None
    }
}

#[test]
fn indexing_falls_back_to_a_position_equality_scan() {
    let handle = Handle::<Tag>::with_builtins();
    let expr = Expression::parse("data[x]", &handle).unwrap();
    assert_eq!(expr.variables(), &["x".to_string()]);
    assert_eq!(expr.collections(), &["data".to_string()]);

    let collections = vec![vec![Tag(10), Tag(20), Tag(30)]];
    // x == Tag(2) matches the *position* ordinal, not any element's value
    // (no element here equals 2) — this is the point of the fallback.
    let result = expr.evaluate(&[Tag(2)], &collections).unwrap();
    assert_eq!(result, Tag(20));
}

#[test]
fn out_of_range_position_errors() {
    let handle = Handle::<Tag>::with_builtins();
    let expr = Expression::parse("data[x]", &handle).unwrap();
    let collections = vec![vec![Tag(10), Tag(20), Tag(30)]];
    assert!(expr.evaluate(&[Tag(4)], &collections).is_err());
}

#[test]
fn element_of_uses_value_equality_not_position() {
    let handle = Handle::<Tag>::with_builtins();
    let expr = Expression::parse("x in [10, 20, 30]", &handle).unwrap();
    assert_eq!(expr.variables(), &["x".to_string()]);
    assert_eq!(expr.evaluate(&[Tag(20)], &[]).unwrap(), Tag(1));
    assert_eq!(expr.evaluate(&[Tag(2)], &[]).unwrap(), Tag(0));
}

#[test]
fn at_is_reserved_by_default_and_replaceable_for_this_configuration() {
    let mut handle = Handle::<Tag>::with_builtins();
    let index = handle.get_index("at").unwrap();
    assert!(handle.call(index, &[Tag(10), Tag(20)]).is_err());

    handle
        .replace(
            "at",
            std::sync::Arc::new(|args: &[Tag]| Ok(Tag(args[0].0 + args[1].0))),
        )
        .unwrap();
    assert_eq!(handle.call(index, &[Tag(10), Tag(20)]).unwrap(), Tag(30));
}
