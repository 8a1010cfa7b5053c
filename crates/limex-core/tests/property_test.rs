//! Property-based tests for the testable properties listed alongside the
//! expression grammar: associativity, word-boundary parsing, and set
//! membership.

use limex_core::{Expression, Handle};
use quickcheck::{QuickCheck, TestResult};

fn eval_literal(source: &str) -> f64 {
    let handle = Handle::<f64>::with_builtins();
    let expr = Expression::parse(source, &handle).unwrap();
    expr.evaluate(&[], &[]).unwrap()
}

#[test]
fn prop_additive_operators_are_left_associative() {
    fn property(a: i16, b: i16, c: i16) -> TestResult {
        let (a, b, c) = (a as f64, b as f64, c as f64);
        let chained = eval_literal(&format!("{a} - {b} - {c}"));
        let explicit = eval_literal(&format!("({a} - {b}) - {c}"));
        TestResult::from_bool((chained - explicit).abs() < 1e-9)
    }
    QuickCheck::new().quickcheck(property as fn(i16, i16, i16) -> TestResult);
}

#[test]
fn prop_exponentiation_is_right_associative() {
    fn property(a: u8, b: u8, c: u8) -> TestResult {
        if a == 0 || b > 4 || c > 4 {
            return TestResult::discard();
        }
        let (a, b, c) = (a as f64, b as f64, c as f64);
        let chained = eval_literal(&format!("{a}^{b}^{c}"));
        let explicit = eval_literal(&format!("{a}^({b}^{c})"));
        TestResult::from_bool((chained - explicit).abs() < 1e-6 || (chained.is_nan() && explicit.is_nan()))
    }
    QuickCheck::new().quickcheck(property as fn(u8, u8, u8) -> TestResult);
}

#[test]
fn prop_ternary_is_right_associative() {
    fn property(a: bool, b: bool) -> TestResult {
        let a_lit = if a { "1" } else { "0" };
        let b_lit = if b { "1" } else { "0" };
        let chained = eval_literal(&format!("{a_lit} ? 10 : {b_lit} ? 20 : 30"));
        let explicit = eval_literal(&format!("{a_lit} ? 10 : ({b_lit} ? 20 : 30)"));
        TestResult::from_bool(chained == explicit)
    }
    QuickCheck::new().quickcheck(property as fn(bool, bool) -> TestResult);
}

#[test]
fn prop_identifier_beginning_with_a_keyword_is_a_variable() {
    let handle = Handle::<f64>::with_builtins();
    for name in ["orange", "india", "andrew", "ifx"] {
        let expr = Expression::parse(&format!("{name} + 1"), &handle).unwrap();
        assert_eq!(expr.variables(), &[name.to_string()]);
    }
}

#[test]
fn prop_set_membership_matches_an_existential_equality_scan() {
    fn property(probe: i8, elements: Vec<i8>) -> TestResult {
        if elements.len() > 8 {
            return TestResult::discard();
        }
        let set = elements
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let source = format!("{probe} in [{set}]");
        let expected = elements.iter().any(|e| *e == probe);
        TestResult::from_bool(eval_literal(&source) == if expected { 1.0 } else { 0.0 })
    }
    QuickCheck::new().quickcheck(property as fn(i8, Vec<i8>) -> TestResult);
}
