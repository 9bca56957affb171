//! Arm selection of conditioned constructors.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::v;
use sutra_construct::ast::{List, Node, Object, TypeFlags};
use sutra_construct::construct::{
    generify_list, generify_object, list_conditions, object_conditions, ConditionedBuilder,
    ConditionedConstructor, Constructor, SelectionMode,
};
use sutra_construct::diagnostics::{ReportCollector, Reporter};

const A: &str = "list {size: at least 1, 0: primitive}";
const B: &str = "list {size: at most 1}";

/// Arms `A` (first element is a primitive) and `B` (at most one element),
/// counting how often each constructor runs.
fn arms(
    builder: ConditionedBuilder<List, &'static str>,
    calls: &Arc<AtomicUsize>,
) -> ConditionedBuilder<List, &'static str> {
    let (a_calls, b_calls) = (calls.clone(), calls.clone());
    builder
        .add(
            |c| c.min_size(1).element_type(0, TypeFlags::PRIMITIVE),
            move |_: &List, _: Reporter<'_>| {
                a_calls.fetch_add(1, Ordering::SeqCst);
                Some("A")
            },
        )
        .add(
            |c| c.max_size(1),
            move |_: &List, _: Reporter<'_>| {
                b_calls.fetch_add(1, Ordering::SeqCst);
                Some("B")
            },
        )
}

fn only_match() -> (impl Constructor<Node, &'static str>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let constructor = list_conditions(|b| arms(b, &calls)).unwrap();
    (generify_list(constructor), calls)
}

#[test]
fn only_match_runs_the_single_matching_arm() {
    let (constructor, _) = only_match();
    let sink = ReportCollector::new();
    assert_eq!(constructor.construct(&Node::list([v("x"), v("y")]), sink.reporter()), Some("A"));
    assert_eq!(constructor.construct(&Node::list([]), sink.reporter()), Some("B"));
    assert!(sink.is_empty());
}

#[test]
fn only_match_reports_when_nothing_matches() {
    let (constructor, calls) = only_match();
    let sink = ReportCollector::new();
    let neither = Node::list([Node::list([]), Node::list([])]);
    assert_eq!(constructor.construct(&neither, sink.reporter()), None);
    assert_eq!(
        sink.messages(),
        [format!("None of the defined constructor rules match the parameter\n  {A}\n  {B}")]
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn only_match_reports_ambiguity_without_constructing() {
    let (constructor, calls) = only_match();
    let sink = ReportCollector::new();
    let both = Node::list([v("x")]);
    assert_eq!(constructor.construct(&both, sink.reporter()), None);
    assert_eq!(
        sink.messages(),
        [format!("Matched by multiple conditions:\n  {A}\n  {B}")]
    );
    assert_eq!(constructor.construct(&both, Reporter::silent()), None);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn first_match_prefers_declaration_order() {
    let calls = Arc::new(AtomicUsize::new(0));
    let constructor = list_conditions(|b| arms(b.first_match(), &calls)).unwrap();
    assert_eq!(constructor.mode(), SelectionMode::FirstMatch);
    let sink = ReportCollector::new();
    let Node::List(both) = Node::list([v("x")]) else {
        unreachable!()
    };
    assert_eq!(constructor.construct(&both, sink.reporter()), Some("A"));
    assert!(sink.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn single_arm_explains_its_mismatch() {
    let constructor = list_conditions(|b| {
        b.add(|c| c.size(2), |_: &List, _: Reporter<'_>| Some(()))
    })
    .unwrap();
    let sink = ReportCollector::new();
    let Node::List(list) = Node::list([v("1")]) else {
        unreachable!()
    };
    assert_eq!(constructor.construct(&list, sink.reporter()), None);
    assert_eq!(sink.messages(), ["Wrong size: expected exactly 2, provided 1"]);
}

#[test]
fn empty_constructor_is_a_configuration_defect() {
    let constructor: ConditionedConstructor<List, ()> = list_conditions(|b| b).unwrap();
    assert!(constructor.is_empty());
    let sink = ReportCollector::new();
    let Node::List(list) = Node::list([]) else {
        unreachable!()
    };
    assert_eq!(constructor.construct(&list, sink.reporter()), None);
    assert_eq!(
        sink.messages(),
        ["Invalid conditioned constructor: no rules specified."]
    );
}

#[test]
fn selected_arm_surfaces_its_warnings() {
    let constructor = list_conditions(|b| {
        b.strict_unary(|_, _| Some("unary"))
            .binary(|_, _, _| Some("binary"))
    })
    .unwrap();
    let sink = ReportCollector::new();
    let Node::List(list) = Node::list([v("1"), v("2"), v("3")]) else {
        unreachable!()
    };
    assert_eq!(constructor.construct(&list, sink.reporter()), Some("binary"));
    assert_eq!(
        sink.messages(),
        ["Binary operations only need two elements, 3 provided"]
    );
}

#[test]
fn ternary_sugar_passes_elements() {
    let constructor = list_conditions(|b| {
        b.strict_ternary(|a, b, c, _| Some(format!("{a}{b}{c}")))
    })
    .unwrap();
    let Node::List(list) = Node::list([v("x"), v("y"), v("z")]) else {
        unreachable!()
    };
    assert_eq!(
        constructor.construct(&list, Reporter::silent()).as_deref(),
        Some("xyz")
    );
}

#[test]
fn object_arms_dispatch_on_properties() {
    let constructor = object_conditions(|b| {
        b.add(
            |c| c.property("radius", TypeFlags::PRIMITIVE),
            |o: &Object, _: Reporter<'_>| Some(format!("circle {}", o.expect_property("radius"))),
        )
        .add(
            |c| {
                c.property("w", TypeFlags::PRIMITIVE)
                    .property("h", TypeFlags::PRIMITIVE)
            },
            |o: &Object, _: Reporter<'_>| {
                Some(format!(
                    "rect {}x{}",
                    o.expect_property("w"),
                    o.expect_property("h")
                ))
            },
        )
    })
    .unwrap();
    let shape = generify_object(constructor);
    let silent = Reporter::silent();
    assert_eq!(
        shape.construct(&Node::object([("radius", v("2"))]), silent).as_deref(),
        Some("circle 2")
    );
    assert_eq!(
        shape
            .construct(&Node::object([("w", v("3")), ("h", v("4"))]), silent)
            .as_deref(),
        Some("rect 3x4")
    );

    let sink = ReportCollector::new();
    let both = Node::object([("radius", v("1")), ("w", v("3")), ("h", v("4"))]);
    assert_eq!(shape.construct(&both, sink.reporter()), None);
    assert!(sink.messages()[0].starts_with("Matched by multiple conditions:"));
}
