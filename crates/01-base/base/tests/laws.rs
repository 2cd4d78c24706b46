//! Monad law property tests for the Option/Result vocabulary.

use base::{err, none, ok, some, OptionExt, ResultExt};
use proptest::prelude::*;

fn halve(v: i64) -> Option<i64> {
    if v % 2 == 0 {
        Some(v / 2)
    } else {
        None
    }
}

fn dec(v: i64) -> Option<i64> {
    v.checked_sub(1)
}

fn checked_halve(v: i64) -> Result<i64, String> {
    if v % 2 == 0 {
        Ok(v / 2)
    } else {
        Err(format!("{v} is odd"))
    }
}

fn checked_neg(v: i64) -> Result<i64, String> {
    v.checked_neg().ok_or_else(|| "overflow".to_string())
}

fn arb_option() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![Just(None), any::<i64>().prop_map(Some)]
}

fn arb_result() -> impl Strategy<Value = Result<i64, String>> {
    prop_oneof![
        any::<i64>().prop_map(Ok),
        "[a-z]{0,8}".prop_map(Err),
    ]
}

proptest! {
    /// `some` is a left identity for `then_some`.
    #[test]
    fn option_left_identity(v in any::<i64>()) {
        prop_assert_eq!(some(v).then_some(halve), halve(v));
    }

    /// `some` is a right identity for `then_some`.
    #[test]
    fn option_right_identity(x in arb_option()) {
        prop_assert_eq!(x.then_some(some), x);
    }

    /// Chained binds associate.
    #[test]
    fn option_associativity(x in arb_option()) {
        let nested = x.then_some(halve).then_some(dec);
        let flattened = x.then_some(|v| halve(v).then_some(dec));
        prop_assert_eq!(nested, flattened);
    }

    /// `None` absorbs any bind.
    #[test]
    fn option_none_short_circuits(_v in any::<i64>()) {
        prop_assert_eq!(none::<i64>().then_some(halve), None);
    }

    /// `ok` is a left identity for `then_ok`.
    #[test]
    fn result_left_identity(v in any::<i64>()) {
        prop_assert_eq!(ok::<i64, String>(v).then_ok(checked_halve), checked_halve(v));
    }

    /// `ok` is a right identity for `then_ok`.
    #[test]
    fn result_right_identity(x in arb_result()) {
        prop_assert_eq!(x.clone().then_ok(ok), x);
    }

    /// Chained binds associate.
    #[test]
    fn result_associativity(x in arb_result()) {
        let nested = x.clone().then_ok(checked_halve).then_ok(checked_neg);
        let flattened = x.then_ok(|v| checked_halve(v).then_ok(checked_neg));
        prop_assert_eq!(nested, flattened);
    }

    /// Errors pass through `then_ok` untouched.
    #[test]
    fn result_err_passes_through(e in "[a-z]{1,8}") {
        prop_assert_eq!(err::<i64, String>(e.clone()).then_ok(checked_halve), Err(e));
    }

    /// `map_some` agrees with binding a wrapped function.
    #[test]
    fn map_is_bind_of_wrapped(x in arb_option()) {
        prop_assert_eq!(
            x.map_some(|v| v.wrapping_mul(3)),
            x.then_some(|v| some(v.wrapping_mul(3)))
        );
    }
}
