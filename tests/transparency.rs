//! Property tests: a proxy behaves like its inner value, apart from the log.

mod common;

use common::{ev, triples};
use proptest::prelude::*;
use tracked::{CmpOp, EventLog, FloorDiv, SurfaceRegistry, Tracked, Value};

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        (-50_i128..50).prop_map(Value::Int),
        (-50.0_f64..50.0).prop_map(Value::Float),
        "[a-c]{0,3}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..3).prop_map(Value::Bytes),
    ]
}

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

proptest! {
    #[test]
    fn comparisons_agree_with_bare_values(a in any::<i64>(), b in any::<i64>()) {
        let log = EventLog::new();
        let ta = Tracked::wrap(a, "a", &log);
        let tb = Tracked::wrap(b, "b", &log);

        prop_assert_eq!(ta < tb, a < b);
        prop_assert_eq!(ta > b, a > b);
        prop_assert_eq!(ta <= tb, a <= b);
        prop_assert_eq!(ta >= b, a >= b);
        prop_assert_eq!(ta == tb, a == b);
        prop_assert_eq!(ta.cmp(&tb), a.cmp(&b));

        // Four ordering events, then two for equal values or three when the
        // equality check also evaluates `a < b`.
        prop_assert_eq!(log.len(), if a == b { 6 } else { 7 });
        prop_assert!(log.snapshot().iter().all(|e| e.subject().name() == "a"));
    }

    #[test]
    fn recorded_tags_follow_the_compression_rules(a in -20_i32..20, b in -20_i32..20) {
        let log = EventLog::new();
        let ta = Tracked::wrap(a, "a", &log);
        let _ = ta <= b;
        let _ = ta >= b;
        prop_assert_eq!(
            triples(&log),
            vec![ev("a", '>', a > b), ev("a", '<', a < b)]
        );
    }

    #[test]
    fn equality_records_the_ordering_of_unequal_values(a in -20_i32..20, b in -20_i32..20) {
        let log = EventLog::new();
        let ta = Tracked::wrap(a, "a", &log);
        let equal = ta == b;
        prop_assert_eq!(equal, a == b);
        let expected = if equal {
            vec![ev("a", '<', false), ev("a", '>', false)]
        } else {
            vec![ev("a", '<', a < b), ev("a", '<', a < b), ev("a", '>', a > b)]
        };
        prop_assert_eq!(triples(&log), expected);
    }

    #[test]
    fn std_and_dynamic_equality_agree(a in arb_value(), b in arb_value()) {
        let std_log = EventLog::new();
        let dyn_log = EventLog::new();
        let via_std = Tracked::wrap(a.clone(), "a", &std_log) == b;
        let via_surface = Tracked::wrap(a, "a", &dyn_log).try_eq(&b).map(|v| v.as_bool());
        prop_assert_eq!(Ok(Some(via_std)), via_surface);
        prop_assert_eq!(triples(&std_log), triples(&dyn_log));
    }

    #[test]
    fn inequality_negates_equality(a in arb_value(), b in arb_value()) {
        let log = EventLog::new();
        let ta = Tracked::wrap(a, "a", &log);
        let eq = ta.try_eq(&b).map(|v| v.as_bool());
        let ne = ta.try_ne(&b).map(|v| v.as_bool());
        prop_assert_eq!(eq.map(|v| v.map(|e| !e)), ne);
    }

    #[test]
    fn dynamic_comparisons_match_the_bare_surface(a in arb_value(), b in arb_value()) {
        let registry = std::sync::Arc::new(SurfaceRegistry::new());
        let surface = registry.surface::<Value>();
        let log = EventLog::new();
        let ta = Tracked::wrap_with(&registry, a.clone(), "a", &log);

        let proxied = ta.try_lt(&b).map(|v| v.as_bool());
        let bare = surface
            .compare(&a, CmpOp::Lt, &b, "Value")
            .map(|v| v.as_bool());
        prop_assert_eq!(proxied, bare);
    }

    #[test]
    fn orderable_flag_is_monotone(values in prop::collection::vec(arb_value(), 1..12)) {
        let log = EventLog::new();
        let subject = Tracked::wrap(Value::Int(0), "v", &log);
        let mut was_orderable = true;
        for value in &values {
            let _ = subject.try_eq(value);
            let now = subject.is_orderable();
            prop_assert!(was_orderable || !now, "orderable came back after dropping");
            was_orderable = now;
        }
    }

    #[test]
    fn named_operations_match_the_bare_value(
        haystack in "[a-d]{0,8}",
        needle in "[a-d]{0,2}",
    ) {
        let registry = std::sync::Arc::new(SurfaceRegistry::new());
        let surface = registry.surface::<String>();
        let log = EventLog::new();
        let proxy = Tracked::wrap_with(&registry, haystack.clone(), "h", &log);

        for (name, args) in [
            ("contains", vec![Value::Text(needle.clone())]),
            ("starts_with", vec![Value::Text(needle.clone())]),
            ("to_uppercase", vec![]),
            ("len", vec![]),
            ("is_empty", vec![Value::Int(1)]),
        ] {
            prop_assert_eq!(proxy.call(name, &args), surface.call(&haystack, name, &args));
        }
        prop_assert_eq!(proxy.to_bytes(), surface.to_bytes(&haystack));
        prop_assert_eq!(proxy.len(), haystack.len());
        prop_assert!(log.is_empty());
    }

    #[test]
    fn operators_compose_labels_and_values(
        x in arb_name(),
        y in arb_name(),
        a in -1000_i64..1000,
        b in 1_i64..1000,
    ) {
        let log = EventLog::new();
        let ta = Tracked::wrap(a, x.as_str(), &log);
        let tb = Tracked::wrap(b, y.as_str(), &log);

        let sum = &ta + &tb;
        prop_assert_eq!(sum.name(), format!("{x} + {y}"));
        prop_assert_eq!(*sum.inner(), a + b);

        let quotient = (&ta).floor_div(&tb);
        prop_assert_eq!(quotient.name(), format!("{x} // {y}"));
        prop_assert_eq!(*quotient.inner(), a.div_euclid(b));

        let rem = ta % tb;
        prop_assert_eq!(rem.name(), format!("{x} % {y}"));
        prop_assert_eq!(rem.into_inner(), a % b);
        prop_assert!(log.is_empty());
    }
}
