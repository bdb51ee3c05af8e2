//! End-to-end tracking scenarios: wrap, evaluate a predicate, read the log.

mod common;

use common::{ev, init_tracing, triples};
use tracked::{
    CmpOp, Complex, EventLog, Label, OpError, Provenance, SurfaceBuilder, SurfaceRegistry,
    Trackable, Tracked, TrackerConfig, Value, Verdict, label_for,
};

// ---------------------------------------------------------------------------
// Basic scenarios
// ---------------------------------------------------------------------------

#[test]
fn less_than_records_one_event() {
    init_tracing();
    let log = EventLog::new();
    let a = Tracked::wrap(3_i32, "a", &log);
    assert!(a < 5_i32);
    assert_eq!(triples(&log), [ev("a", '<', true)]);
}

#[test]
fn equal_values_record_both_strict_relations_false() {
    init_tracing();
    let log = EventLog::new();
    let a = Tracked::wrap(3_i32, "a", &log);
    assert!(a == 3_i32);
    assert_eq!(triples(&log), [ev("a", '<', false), ev("a", '>', false)]);
}

#[test]
fn unequal_values_record_the_ordering_they_checked() {
    init_tracing();
    let log = EventLog::new();
    let a = Tracked::wrap(3_i32, "a", &log);
    assert!(a != 7_i32);
    assert_eq!(
        triples(&log),
        [ev("a", '<', true), ev("a", '<', true), ev("a", '>', false)]
    );
}

#[test]
fn numeric_values_are_equal_across_kinds() {
    init_tracing();
    let log = EventLog::new();
    let a = Tracked::wrap(Value::Int(2), "a", &log);
    assert!(a == Value::Float(2.0));
    assert_eq!(triples(&log), [ev("a", '<', false), ev("a", '>', false)]);
}

#[test]
fn text_against_integer_is_not_comparable() {
    init_tracing();
    let log = EventLog::new();
    let s = Tracked::wrap(String::from("x"), "s", &log);
    let err = s.try_lt(&5_i32).unwrap_err();
    assert_eq!(
        err,
        OpError::NotComparable {
            op: CmpOp::Lt,
            lhs: std::any::type_name::<String>(),
            rhs: std::any::type_name::<i32>(),
        }
    );
    assert!(log.is_empty());
    assert!(s.is_orderable());
}

#[test]
fn equality_events_do_not_depend_on_the_other_label() {
    init_tracing();
    let log = EventLog::new();
    let a = Tracked::wrap(String::from("v"), "a", &log);
    let a2 = Tracked::wrap(String::from("v"), "a2", &log);
    assert!(a == a2);
    let events = triples(&log);
    assert_eq!(events, [ev("a", '<', false), ev("a", '>', false)]);
}

#[test]
fn orderable_flag_only_ever_drops() {
    init_tracing();
    let log = EventLog::new();
    let z = Tracked::wrap(Complex::new(0.0, 1.0), "z", &log);
    assert!(z.is_orderable());
    assert_eq!(z.try_ne(&Complex::new(0.0, 2.0)).unwrap().as_bool(), Some(true));
    assert!(!z.is_orderable());
    for im in [1.0, 2.0, 3.0] {
        let _ = z.try_eq(&Complex::new(0.0, im));
        assert!(!z.is_orderable());
    }
    assert_eq!(triples(&log), [ev("z", '<', false), ev("z", '>', false)]);
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

fn sum_exceeds_and_sorted(x: &Tracked<i64>, y: &Tracked<i64>) -> bool {
    (x + y) > 10_i64 && x < y
}

#[test]
fn predicate_over_derived_values_is_explained() {
    init_tracing();
    let log = EventLog::new();
    let x = Tracked::wrap(4_i64, "x", &log);
    let y = Tracked::wrap(9_i64, "y", &log);
    assert!(sum_exceeds_and_sorted(&x, &y));
    assert_eq!(
        triples(&log),
        [ev("x + y", '>', true), ev("x", '<', true)]
    );
}

#[test]
fn short_circuited_comparisons_are_not_recorded() {
    init_tracing();
    let log = EventLog::new();
    let x = Tracked::wrap(1_i64, "x", &log);
    let y = Tracked::wrap(2_i64, "y", &log);
    assert!(!sum_exceeds_and_sorted(&x, &y));
    assert_eq!(triples(&log), [ev("x + y", '>', false)]);
}

#[test]
fn composite_label_wraps_the_exact_result() {
    let log = EventLog::new();
    let x = Tracked::wrap(2.5_f64, "x", &log);
    let y = Tracked::wrap(0.5_f64, "y", &log);
    let sum = x + y;
    assert_eq!(sum.name(), "x + y");
    assert!((sum.into_inner() - 3.0).abs() < f64::EPSILON);
}

#[test]
fn untracked_operand_stops_tracking() {
    let log = EventLog::new();
    let x = Tracked::wrap(6_u32, "x", &log);
    let raw: u32 = x * 7_u32;
    assert_eq!(raw, 42);
    assert!(log.is_empty());
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, PartialOrd)]
struct Reading {
    celsius: f64,
}

impl Trackable for Reading {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .native("celsius", |r| Value::Float(r.celsius));
    }
}

#[test]
fn non_literal_values_are_labelled_by_provenance() {
    let log = EventLog::new();
    let reading = Reading { celsius: 21.0 };
    let label = label_for(&reading, Provenance::here("reading"));
    assert!(matches!(&label, Label::Origin(origin) if origin.file.ends_with("scenarios.rs")));

    let r = Tracked::wrap(reading, label, &log);
    assert_eq!(r.attribute("celsius"), Ok(Value::Float(21.0)));
    assert!(r > Reading { celsius: 20.0 });
    assert_eq!(triples(&log), [ev("reading", '>', true)]);
}

#[test]
fn tracked_values_label_each_other_by_reference() {
    let log = EventLog::new();
    let a = Tracked::wrap(1_u8, "a", &log);
    let alias = Tracked::wrap(*a, label_for(&a, Provenance::here("unused")), &log);
    assert_eq!(alias.label(), &Label::Tracked(a.label_handle()));
    assert_eq!(alias.name(), "a");
}

// ---------------------------------------------------------------------------
// Deferred verdicts
// ---------------------------------------------------------------------------

/// Element-wise comparison mask.
#[derive(Debug, PartialEq)]
struct Mask(Vec<bool>);

struct Samples(Vec<f64>);

impl Trackable for Samples {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface.compare_with::<f64, _>(|samples, threshold, op| {
            Ok(Verdict::deferred(Mask(
                samples.0.iter().map(|x| op.apply(x, threshold)).collect(),
            )))
        });
    }
}

#[test]
fn deferred_verdicts_pass_through_unrecorded() {
    init_tracing();
    let log = EventLog::new();
    let s = Tracked::wrap(Samples(vec![1.0, 5.0]), Provenance::here("s"), &log);

    let lt = s.try_lt(&2.0_f64).unwrap();
    assert_eq!(lt.downcast_ref::<Mask>(), Some(&Mask(vec![true, false])));

    let eq = s.try_eq(&5.0_f64).unwrap();
    assert_eq!(eq.downcast_ref::<Mask>(), Some(&Mask(vec![false, true])));

    let ne = s.try_ne(&5.0_f64).unwrap();
    assert_eq!(ne.downcast_ref::<Mask>(), Some(&Mask(vec![true, false])));

    assert!(log.is_empty());
    assert!(s.is_orderable());
}

// ---------------------------------------------------------------------------
// Configuration and serialization
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq, PartialOrd)]
struct Gauge(i32);

impl Trackable for Gauge {
    fn describe(surface: &mut SurfaceBuilder<Self>) {
        surface
            .ordered()
            .native("level", |g| Value::from(g.0))
            .method("reset", &[], |_, _| Ok(Value::Unit));
    }
}

#[test]
fn configured_registry_hides_denied_operations() {
    let config = TrackerConfig::parse("[surface]\ndeny = [\"reset\"]\n[log]\ninitial_capacity = 4\n")
        .unwrap();
    let registry = std::sync::Arc::new(SurfaceRegistry::with_config(&config.surface));
    let log = EventLog::with_config(&config.log);
    let g = Tracked::wrap_with(&registry, Gauge(3), "g", &log);

    assert_eq!(g.attribute("level"), Ok(Value::Int(3)));
    assert_eq!(
        g.call("reset", &[]),
        Err(OpError::UnknownOperation {
            type_name: std::any::type_name::<Gauge>(),
            name: "reset".to_owned(),
        })
    );
    assert_eq!(g.surface().denied(), ["reset"]);
}

#[test]
fn finished_log_serializes_for_a_renderer() {
    let log = EventLog::new();
    let a = Tracked::wrap(3_i32, "a", &log);
    let b = Tracked::wrap(8_i32, 8_i32, &log);
    let _ = a <= b;
    drop(a);
    drop(b);

    let events = log.finish();
    let json = serde_json::to_value(&events).unwrap();
    assert_eq!(json[0]["relation"], ">");
    assert_eq!(json[0]["outcome"], false);
    assert_eq!(json[0]["subject"]["literal"]["value"], "a");

    let back: Vec<tracked::ComparisonEvent> = serde_json::from_value(json).unwrap();
    assert_eq!(back, events);
}
