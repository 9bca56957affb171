//! Name-keyed construct rules with base-rule delegation.
//!
//! A [`ConstructRule`] routes a node by shape and name tag:
//!
//! 1. primitives by exact value, then the generic primitive constructor;
//! 2. lists by name (unnamed lists use the empty name), then the generic
//!    list constructor;
//! 3. objects by name, then the generic object constructor.
//!
//! Exact entries are searched through the whole base chain, nearest rule
//! first, before any generic entry is considered; a generic constructor in a
//! derived rule therefore never hides a name its base registers. Only when
//! the whole chain has nothing for the node's shape is the `any` constructor
//! tried, again nearest rule first. A derived rule delegates to its base; it
//! never merges with it, so a name registered in both resolves to the
//! derived entry alone.
//!
//! ```rust
//! use std::sync::Arc;
//! use sutra_construct::ast::Node;
//! use sutra_construct::construct::{ConstructRule, Constructor};
//! use sutra_construct::diagnostics::Reporter;
//!
//! let base = Arc::new(
//!     ConstructRule::builder()
//!         .primitive("yes", || true)
//!         .primitive("no", || false)
//!         .build()
//!         .unwrap(),
//! );
//! let derived = ConstructRule::extend(&base).primitive("no", || true).build().unwrap();
//! assert_eq!(derived.construct(&Node::value("yes"), Reporter::silent()), Some(true));
//! assert_eq!(derived.construct(&Node::value("no"), Reporter::silent()), Some(true));
//! ```

use std::fmt;
use std::sync::Arc;

use im::HashMap;
use tracing::trace;

use super::conditioned::ConditionedBuilder;
use super::{Constructor, SharedConstructor};
use crate::ast::{List, Node, Object, Primitive};
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

/// Produces the value registered for an exact primitive.
pub type Supplier<T> = Arc<dyn Fn() -> T + Send + Sync>;

const DEFAULT_ERROR_MESSAGE: &str = "None of the rules match given object";

/// Immutable dispatch table from node shape and name to constructor.
pub struct ConstructRule<T> {
    base: Option<Arc<ConstructRule<T>>>,
    primitives: HashMap<String, Supplier<T>>,
    generic_primitive: Option<SharedConstructor<Primitive, T>>,
    lists: HashMap<String, SharedConstructor<List, T>>,
    generic_list: Option<SharedConstructor<List, T>>,
    objects: HashMap<String, SharedConstructor<Object, T>>,
    generic_object: Option<SharedConstructor<Object, T>>,
    any: Option<SharedConstructor<Node, T>>,
    error_message: Option<String>,
}

impl<T> ConstructRule<T> {
    pub fn builder() -> ConstructRuleBuilder<T> {
        ConstructRuleBuilder::new(None)
    }

    /// Starts a rule that delegates to `base` on every miss.
    pub fn extend(base: &Arc<ConstructRule<T>>) -> ConstructRuleBuilder<T> {
        ConstructRuleBuilder::new(Some(Arc::clone(base)))
    }

    pub fn base(&self) -> Option<&Arc<ConstructRule<T>>> {
        self.base.as_ref()
    }

    /// The message reported when nothing in the chain matches.
    pub fn error_message(&self) -> &str {
        self.chain()
            .find_map(|rule| rule.error_message.as_deref())
            .unwrap_or(DEFAULT_ERROR_MESSAGE)
    }

    /// This rule followed by its bases, nearest first.
    fn chain(&self) -> impl Iterator<Item = &ConstructRule<T>> {
        std::iter::successors(Some(self), |rule| rule.base.as_deref())
    }

    /// The entry `select` finds nearest in the chain, with its depth.
    fn nearest<'a, E: ?Sized>(
        &'a self,
        select: impl Fn(&'a ConstructRule<T>) -> Option<&'a E>,
    ) -> Option<(usize, &'a E)> {
        self.chain()
            .enumerate()
            .find_map(|(depth, rule)| select(rule).map(|entry| (depth, entry)))
    }

    /// Runs the shape-specific entry for `node`, if the chain has one.
    /// Exact entries anywhere in the chain precede generic ones.
    fn dispatch_shape(&self, node: &Node, reports: Reporter<'_>) -> Option<Option<T>> {
        match node {
            Node::Primitive(p) => {
                let exact = self.nearest(|rule| rule.primitives.get(p.value()));
                if let Some((depth, supplier)) = exact {
                    trace!(depth, value = p.value(), "rule resolved exact primitive");
                    return Some(Some(supplier()));
                }
                let (depth, constructor) = self.nearest(|rule| rule.generic_primitive.as_ref())?;
                trace!(depth, "rule resolved generic primitive");
                Some(constructor.construct(p, reports))
            }
            Node::List(l) => {
                let name = l.name().unwrap_or("");
                if let Some((depth, constructor)) = self.nearest(|rule| rule.lists.get(name)) {
                    trace!(depth, name, "rule resolved list");
                    return Some(constructor.construct(l, reports));
                }
                let (depth, constructor) = self.nearest(|rule| rule.generic_list.as_ref())?;
                trace!(depth, "rule resolved generic list");
                Some(constructor.construct(l, reports))
            }
            Node::Object(o) => {
                let name = o.name().unwrap_or("");
                if let Some((depth, constructor)) = self.nearest(|rule| rule.objects.get(name)) {
                    trace!(depth, name, "rule resolved object");
                    return Some(constructor.construct(o, reports));
                }
                let (depth, constructor) = self.nearest(|rule| rule.generic_object.as_ref())?;
                trace!(depth, "rule resolved generic object");
                Some(constructor.construct(o, reports))
            }
        }
    }
}

impl<T> Constructor<Node, T> for ConstructRule<T> {
    fn construct(&self, node: &Node, reports: Reporter<'_>) -> Option<T> {
        if let Some(result) = self.dispatch_shape(node, reports) {
            return result;
        }
        if let Some((depth, any)) = self.nearest(|rule| rule.any.as_ref()) {
            trace!(depth, "rule resolved any");
            return any.construct(node, reports);
        }
        trace!(shape = node.type_name(), "no rule matched");
        reports.error(node.span(), self.error_message());
        None
    }
}

impl<T> fmt::Debug for ConstructRule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lists: Vec<_> = self.lists.keys().collect();
        lists.sort();
        let mut objects: Vec<_> = self.objects.keys().collect();
        objects.sort();
        f.debug_struct("ConstructRule")
            .field("primitives", &self.primitives.len())
            .field("lists", &lists)
            .field("objects", &objects)
            .field("any", &self.any.is_some())
            .field("base", &self.base)
            .finish()
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Single-use builder for [`ConstructRule`]. Registering the same slot twice
/// is a schema fault returned by [`build`](ConstructRuleBuilder::build).
pub struct ConstructRuleBuilder<T> {
    rule: ConstructRule<T>,
    error: Option<SchemaError>,
}

impl<T> ConstructRuleBuilder<T> {
    fn new(base: Option<Arc<ConstructRule<T>>>) -> Self {
        Self {
            rule: ConstructRule {
                base,
                primitives: HashMap::new(),
                generic_primitive: None,
                lists: HashMap::new(),
                generic_list: None,
                objects: HashMap::new(),
                generic_object: None,
                any: None,
                error_message: None,
            },
            error: None,
        }
    }

    /// Maps an exact primitive value to a supplied result.
    pub fn primitive<F>(mut self, value: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let value = value.into();
        if self.rule.primitives.contains_key(&value) {
            self.fail(SchemaError::DuplicatePrimitive(value));
        } else {
            self.rule.primitives.insert(value, Arc::new(supplier));
        }
        self
    }

    pub fn generic_primitive<C>(mut self, constructor: C) -> Self
    where
        C: Constructor<Primitive, T> + 'static,
    {
        if self.rule.generic_primitive.is_some() {
            self.fail(SchemaError::DuplicateGeneric("primitives"));
        } else {
            self.rule.generic_primitive = Some(Arc::new(constructor));
        }
        self
    }

    /// Registers a list constructor by name; `""` targets unnamed lists.
    pub fn list<C>(self, name: impl Into<String>, constructor: C) -> Self
    where
        C: Constructor<List, T> + 'static,
    {
        self.list_shared(vec![name.into()], Arc::new(constructor))
    }

    /// Registers one list constructor under several names.
    pub fn list_aliases<C>(self, names: &[&str], constructor: C) -> Self
    where
        C: Constructor<List, T> + 'static,
    {
        let names = names.iter().map(|name| name.to_string()).collect();
        self.list_shared(names, Arc::new(constructor))
    }

    /// Registers an inline conditioned list constructor by name.
    pub fn list_arms<B>(mut self, name: impl Into<String>, arms: B) -> Self
    where
        B: FnOnce(ConditionedBuilder<List, T>) -> ConditionedBuilder<List, T>,
        T: 'static,
    {
        match arms(ConditionedBuilder::new()).build() {
            Ok(constructor) => self.list(name, constructor),
            Err(error) => {
                self.fail(error);
                self
            }
        }
    }

    /// Registers one inline conditioned list constructor under several names.
    pub fn list_aliases_arms<B>(mut self, names: &[&str], arms: B) -> Self
    where
        B: FnOnce(ConditionedBuilder<List, T>) -> ConditionedBuilder<List, T>,
        T: 'static,
    {
        match arms(ConditionedBuilder::new()).build() {
            Ok(constructor) => self.list_aliases(names, constructor),
            Err(error) => {
                self.fail(error);
                self
            }
        }
    }

    pub fn generic_list<C>(mut self, constructor: C) -> Self
    where
        C: Constructor<List, T> + 'static,
    {
        if self.rule.generic_list.is_some() {
            self.fail(SchemaError::DuplicateGeneric("lists"));
        } else {
            self.rule.generic_list = Some(Arc::new(constructor));
        }
        self
    }

    /// Registers an object constructor by name; `""` targets unnamed objects.
    pub fn object<C>(self, name: impl Into<String>, constructor: C) -> Self
    where
        C: Constructor<Object, T> + 'static,
    {
        self.object_shared(vec![name.into()], Arc::new(constructor))
    }

    pub fn object_aliases<C>(self, names: &[&str], constructor: C) -> Self
    where
        C: Constructor<Object, T> + 'static,
    {
        let names = names.iter().map(|name| name.to_string()).collect();
        self.object_shared(names, Arc::new(constructor))
    }

    pub fn object_arms<B>(mut self, name: impl Into<String>, arms: B) -> Self
    where
        B: FnOnce(ConditionedBuilder<Object, T>) -> ConditionedBuilder<Object, T>,
        T: 'static,
    {
        match arms(ConditionedBuilder::new()).build() {
            Ok(constructor) => self.object(name, constructor),
            Err(error) => {
                self.fail(error);
                self
            }
        }
    }

    pub fn object_aliases_arms<B>(mut self, names: &[&str], arms: B) -> Self
    where
        B: FnOnce(ConditionedBuilder<Object, T>) -> ConditionedBuilder<Object, T>,
        T: 'static,
    {
        match arms(ConditionedBuilder::new()).build() {
            Ok(constructor) => self.object_aliases(names, constructor),
            Err(error) => {
                self.fail(error);
                self
            }
        }
    }

    pub fn generic_object<C>(mut self, constructor: C) -> Self
    where
        C: Constructor<Object, T> + 'static,
    {
        if self.rule.generic_object.is_some() {
            self.fail(SchemaError::DuplicateGeneric("objects"));
        } else {
            self.rule.generic_object = Some(Arc::new(constructor));
        }
        self
    }

    /// Fallback for any node the shape tables do not cover.
    pub fn any<C>(mut self, constructor: C) -> Self
    where
        C: Constructor<Node, T> + 'static,
    {
        if self.rule.any.is_some() {
            self.fail(SchemaError::DuplicateGeneric("any node"));
        } else {
            self.rule.any = Some(Arc::new(constructor));
        }
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        if self.rule.error_message.is_some() {
            self.fail(SchemaError::DuplicateErrorMessage);
        } else {
            self.rule.error_message = Some(message.into());
        }
        self
    }

    pub fn build(self) -> Result<ConstructRule<T>, SchemaError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.rule),
        }
    }

    fn list_shared(mut self, names: Vec<String>, constructor: SharedConstructor<List, T>) -> Self {
        for name in names {
            if self.rule.lists.contains_key(&name) {
                self.fail(SchemaError::DuplicateList(name));
            } else {
                self.rule.lists.insert(name, Arc::clone(&constructor));
            }
        }
        self
    }

    fn object_shared(
        mut self,
        names: Vec<String>,
        constructor: SharedConstructor<Object, T>,
    ) -> Self {
        for name in names {
            if self.rule.objects.contains_key(&name) {
                self.fail(SchemaError::DuplicateObject(name));
            } else {
                self.rule.objects.insert(name, Arc::clone(&constructor));
            }
        }
        self
    }

    fn fail(&mut self, error: SchemaError) {
        self.error.get_or_insert(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::from_fn;
    use crate::diagnostics::ReportCollector;

    fn tag(text: &'static str) -> impl Fn(&List, Reporter<'_>) -> Option<String> + Send + Sync {
        move |_: &List, _: Reporter<'_>| Some(text.to_string())
    }

    #[test]
    fn exact_before_generic() {
        let rule = ConstructRule::builder()
            .primitive("zero", || 0)
            .generic_primitive(from_fn(|p: &Primitive, _: Reporter<'_>| p.as_int().ok()))
            .build()
            .unwrap();
        let silent = Reporter::silent();
        assert_eq!(rule.construct(&Node::value("zero"), silent), Some(0));
        assert_eq!(rule.construct(&Node::value("7"), silent), Some(7));
    }

    #[test]
    fn unnamed_lists_use_the_empty_name() {
        let rule = ConstructRule::builder()
            .list("", tag("unnamed"))
            .list("pair", tag("pair"))
            .build()
            .unwrap();
        let silent = Reporter::silent();
        assert_eq!(rule.construct(&Node::list([]), silent).as_deref(), Some("unnamed"));
        assert_eq!(
            rule.construct(&Node::named_list("pair", []), silent).as_deref(),
            Some("pair")
        );
    }

    #[test]
    fn base_exact_beats_derived_generic() {
        let base = Arc::new(
            ConstructRule::builder()
                .list("x", tag("base x"))
                .build()
                .unwrap(),
        );
        let derived = ConstructRule::extend(&base)
            .generic_list(tag("derived generic"))
            .build()
            .unwrap();
        let silent = Reporter::silent();
        assert_eq!(
            derived.construct(&Node::named_list("x", []), silent).as_deref(),
            Some("base x")
        );
        assert_eq!(
            derived.construct(&Node::named_list("y", []), silent).as_deref(),
            Some("derived generic")
        );
    }

    #[test]
    fn shape_entries_in_base_beat_any_in_derived() {
        let base = Arc::new(ConstructRule::builder().list("x", tag("base x")).build().unwrap());
        let derived = ConstructRule::extend(&base)
            .any(from_fn(|_: &Node, _: Reporter<'_>| Some("any".to_string())))
            .build()
            .unwrap();
        let silent = Reporter::silent();
        assert_eq!(
            derived.construct(&Node::named_list("x", []), silent).as_deref(),
            Some("base x")
        );
        assert_eq!(derived.construct(&Node::value("v"), silent).as_deref(), Some("any"));
    }

    #[test]
    fn aliases_share_one_constructor() {
        let rule = ConstructRule::builder()
            .list_aliases(&["^", "**"], tag("pow"))
            .build()
            .unwrap();
        let silent = Reporter::silent();
        assert_eq!(rule.construct(&Node::named_list("**", []), silent).as_deref(), Some("pow"));
        assert_eq!(rule.construct(&Node::named_list("^", []), silent).as_deref(), Some("pow"));
    }

    #[test]
    fn miss_reports_nearest_error_message() {
        let base = Arc::new(
            ConstructRule::<()>::builder()
                .error_message("Unknown shape")
                .build()
                .unwrap(),
        );
        let derived = ConstructRule::extend(&base).build().unwrap();
        let sink = ReportCollector::new();
        assert_eq!(derived.construct(&Node::value("v"), sink.reporter()), None);
        assert_eq!(sink.messages(), ["Unknown shape"]);

        let plain = ConstructRule::<()>::builder().build().unwrap();
        assert_eq!(plain.error_message(), "None of the rules match given object");
    }

    #[test]
    fn duplicates_are_schema_faults() {
        let err = ConstructRule::builder()
            .primitive("a", || 1)
            .primitive("a", || 2)
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicatePrimitive("a".into()));

        let err = ConstructRule::builder()
            .list_aliases(&["=", "=="], tag("eq"))
            .list("==", tag("eq again"))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateList("==".into()));

        let err = ConstructRule::<()>::builder()
            .error_message("a")
            .error_message("b")
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateErrorMessage);
    }

    #[test]
    fn inline_arms_record_condition_faults() {
        let err = ConstructRule::<()>::builder()
            .list_arms("bad", |b| b.add(|c| c.size_range(4, 2), |_: &List, _: Reporter<'_>| Some(())))
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::InvertedRange { min: 4, max: 2 });
    }
}
