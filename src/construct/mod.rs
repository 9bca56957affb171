//! Construction of typed values from nodes.
//!
//! A [`Constructor`] turns an input into `Option<T>`. `None` always means
//! failure that has already been reported to the [`Reporter`] when it was not
//! silent; callers never probe further. Constructors are built once, hold no
//! per-call state and may be shared freely between threads.
//!
//! Any `Fn(&I, Reporter) -> Option<T>` is a constructor. Use [`from_fn`] when
//! the closure's argument types need to be pinned down:
//!
//! ```rust
//! use sutra_construct::ast::Node;
//! use sutra_construct::construct::{from_fn, Constructor, ConstructorExt};
//! use sutra_construct::diagnostics::Reporter;
//!
//! let len = from_fn(|node: &Node, _| node.as_list().map(|l| l.len()));
//! let doubled = len.map(|n| n * 2);
//! let node = Node::list([Node::value("a")]);
//! assert_eq!(doubled.construct(&node, Reporter::silent()), Some(2));
//! ```

use std::any::type_name;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::diagnostics::Reporter;
use crate::errors::ConstructError;

pub mod adapters;
pub mod condition;
pub mod conditioned;
pub mod constructors;
pub mod rule;

pub use adapters::{
    generify_list, generify_object, generify_value, list_of, list_or_element_of, try_construct,
    try_construct_with, try_construct_with_message,
};
pub use conditioned::{
    list_condition, list_conditions, object_condition, object_conditions, ConditionedBuilder,
    ConditionedConstructor, SelectionMode,
};
pub use rule::{ConstructRule, ConstructRuleBuilder};

/// Transforms an input into a value, reporting why when it cannot.
pub trait Constructor<I: ?Sized, T>: Send + Sync {
    /// Constructs a value, or returns `None` after reporting the failure.
    fn construct(&self, input: &I, reports: Reporter<'_>) -> Option<T>;

    /// Like [`construct`](Constructor::construct), but turns `None` into an
    /// error for callers that have already guaranteed success.
    fn construct_expect(&self, input: &I, reports: Reporter<'_>) -> Result<T, ConstructError> {
        self.construct(input, reports)
            .ok_or(ConstructError::Failed {
                target: type_name::<T>(),
            })
    }

    /// Like [`construct`](Constructor::construct), with a fallback value.
    fn construct_or(&self, input: &I, fallback: T, reports: Reporter<'_>) -> T {
        self.construct(input, reports).unwrap_or(fallback)
    }
}

impl<I, T, F> Constructor<I, T> for F
where
    I: ?Sized,
    F: Fn(&I, Reporter<'_>) -> Option<T> + Send + Sync,
{
    fn construct(&self, input: &I, reports: Reporter<'_>) -> Option<T> {
        self(input, reports)
    }
}

/// Pins a closure to the constructor signature.
pub fn from_fn<I, T, F>(f: F) -> F
where
    I: ?Sized,
    F: Fn(&I, Reporter<'_>) -> Option<T> + Send + Sync,
{
    f
}

/// Type-erased, shareable constructor.
pub type SharedConstructor<I, T> = Arc<dyn Constructor<I, T>>;

/// Wraps a shared constructor so it can be passed where a constructor value
/// is expected.
pub fn shared<I, T>(constructor: SharedConstructor<I, T>) -> impl Constructor<I, T>
where
    I: ?Sized,
{
    from_fn(move |input: &I, reports| constructor.construct(input, reports))
}

/// Combinators available on every constructor.
pub trait ConstructorExt<I: ?Sized, T>: Constructor<I, T> + Sized {
    /// Feeds the produced value into `next`. `next` runs only when `self`
    /// produced something.
    fn then<U, C>(self, next: C) -> Then<Self, C, T>
    where
        C: Constructor<T, U>,
    {
        Then {
            first: self,
            second: next,
            _mid: PhantomData,
        }
    }

    /// Post-processes the produced value.
    fn map<U, F>(self, f: F) -> Map<Self, F, T>
    where
        F: Fn(T) -> U + Send + Sync,
    {
        Map {
            inner: self,
            f,
            _mid: PhantomData,
        }
    }

    /// Erases the constructor type.
    fn into_shared(self) -> SharedConstructor<I, T>
    where
        Self: 'static,
    {
        Arc::new(self)
    }
}

impl<I: ?Sized, T, C: Constructor<I, T>> ConstructorExt<I, T> for C {}

/// Sequential composition, see [`ConstructorExt::then`].
pub struct Then<A, B, M> {
    first: A,
    second: B,
    _mid: PhantomData<fn() -> M>,
}

impl<I, M, T, A, B> Constructor<I, T> for Then<A, B, M>
where
    I: ?Sized,
    A: Constructor<I, M>,
    B: Constructor<M, T>,
{
    fn construct(&self, input: &I, reports: Reporter<'_>) -> Option<T> {
        let mid = self.first.construct(input, reports)?;
        self.second.construct(&mid, reports)
    }
}

/// Post-transform, see [`ConstructorExt::map`].
pub struct Map<A, F, M> {
    inner: A,
    f: F,
    _mid: PhantomData<fn() -> M>,
}

impl<I, M, T, A, F> Constructor<I, T> for Map<A, F, M>
where
    I: ?Sized,
    A: Constructor<I, M>,
    F: Fn(M) -> T + Send + Sync,
{
    fn construct(&self, input: &I, reports: Reporter<'_>) -> Option<T> {
        self.inner.construct(input, reports).map(&self.f)
    }
}
