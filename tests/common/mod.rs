//! # Construct Test Harness
//!
//! Sample schemas shared by the integration tests, plus a loader for YAML
//! fixtures under `tests/fixtures`.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use walkdir::WalkDir;

use sutra_construct::ast::{List, Node, Object, TypeFlags};
use sutra_construct::construct::condition::ObjectConditionBuilder;
use sutra_construct::construct::constructors::{double, int, value};
use sutra_construct::construct::{
    generify_list, generify_object, list_condition, list_of, list_or_element_of, object_condition,
    ConstructRule, Constructor,
};
use sutra_construct::diagnostics::Reporter;

// ============================================================================
// SAMPLE SCHEMAS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub name: String,
    pub age: i32,
    pub notes: Vec<String>,
}

/// `{name, age, [notes]}`; unknown properties are reported as warnings.
pub fn person() -> impl Constructor<Node, Person> {
    let condition = |c: ObjectConditionBuilder| {
        c.property("name", TypeFlags::PRIMITIVE)
            .property("age", TypeFlags::PRIMITIVE)
            .optional_property("notes", TypeFlags::PRIMITIVE | TypeFlags::UNNAMED_LIST)
            .warn_other_properties()
    };
    let person = object_condition(condition, |obj: &Object, reports: Reporter<'_>| {
        let name = value().construct(obj.expect_property("name"), reports)?;
        let age = int().construct(obj.expect_property("age"), reports)?;
        let notes = match obj.property("notes") {
            Some(notes) => list_or_element_of(value()).construct(notes, reports)?,
            None => Vec::new(),
        };
        Some(Person { name, age, notes })
    })
    .expect("person schema");
    generify_object(person)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pos2 {
    pub x: f64,
    pub y: f64,
}

/// `[x, y]` or `{x, y}`.
pub fn pos2() -> ConstructRule<Pos2> {
    let list = list_condition(
        |c| c.size(2).all_elements(TypeFlags::PRIMITIVE),
        |list: &List, reports: Reporter<'_>| {
            let x = double().construct(&list[0], reports)?;
            let y = double().construct(&list[1], reports)?;
            Some(Pos2 { x, y })
        },
    )
    .expect("pos2 list schema");
    let object = object_condition(
        |c| {
            c.property("x", TypeFlags::PRIMITIVE)
                .property("y", TypeFlags::PRIMITIVE)
        },
        |obj: &Object, reports: Reporter<'_>| {
            let x = double().construct(obj.expect_property("x"), reports)?;
            let y = double().construct(obj.expect_property("y"), reports)?;
            Some(Pos2 { x, y })
        },
    )
    .expect("pos2 object schema");
    ConstructRule::builder()
        .list("", list)
        .object("", object)
        .error_message("Expected a position")
        .build()
        .expect("pos2 rule")
}

pub type Matrix33 = [[f64; 3]; 3];

/// Three unnamed rows of three numbers. Longer rows are accepted with a
/// warning and truncated.
pub fn matrix33() -> impl Constructor<Node, Matrix33> {
    let row = list_condition(
        |c| {
            c.min_size(3)
                .warn_size(3)
                .all_elements(TypeFlags::PRIMITIVE)
        },
        |list: &List, reports: Reporter<'_>| {
            let mut row = [0.0; 3];
            for (slot, item) in row.iter_mut().zip(list) {
                *slot = double().construct(item, reports)?;
            }
            Some(row)
        },
    )
    .expect("row schema");
    let rows = list_of(generify_list(row), true);
    let matrix = list_condition(
        |c| c.size(3).all_elements(TypeFlags::UNNAMED_LIST),
        move |list: &List, reports: Reporter<'_>| {
            let rows = rows.construct(list, reports)?;
            Some([rows[0], rows[1], rows[2]])
        },
    )
    .expect("matrix schema");
    generify_list(matrix)
}

/// Runs the sample schema called `target`, returning the constructed value
/// in debug form.
pub fn construct_target(target: &str, node: &Node, reports: Reporter<'_>) -> Option<String> {
    match target {
        "int" => int().construct(node, reports).map(|v| format!("{v:?}")),
        "list_or_element_of_int" => list_or_element_of(int())
            .construct(node, reports)
            .map(|v| format!("{v:?}")),
        "person" => person().construct(node, reports).map(|v| format!("{v:?}")),
        "pos2" => pos2().construct(node, reports).map(|v| format!("{v:?}")),
        "matrix" => matrix33().construct(node, reports).map(|v| format!("{v:?}")),
        other => panic!("unknown fixture target '{other}'"),
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A single YAML fixture.
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    #[serde(skip)]
    pub path: PathBuf,
    /// Name of the sample schema to run.
    pub target: String,
    pub input: Node,
    /// Debug form of the expected value, when the fixture checks it.
    #[serde(default)]
    pub value: Option<String>,
    /// Every expected diagnostic message, in order.
    #[serde(default)]
    pub messages: Vec<String>,
}

/// Loads every `.yaml` fixture under `dir`, sorted by path.
pub fn load_fixtures(dir: &Path) -> Result<Vec<Fixture>> {
    let mut fixtures = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.into_diagnostic()?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |e| e != "yaml") {
            continue;
        }
        let source = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read fixture '{}'", path.display()))?;
        let mut fixture: Fixture = serde_yaml::from_str(&source)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to parse fixture '{}'", path.display()))?;
        fixture.path = path.to_path_buf();
        fixtures.push(fixture);
    }
    Ok(fixtures)
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

// ============================================================================
// NODE SHORTHANDS
// ============================================================================

pub fn v(text: &str) -> Node {
    Node::value(text)
}

pub fn op(name: &str, items: impl IntoIterator<Item = Node>) -> Node {
    Node::named_list(name, items)
}
