use std::collections::BTreeMap;
use std::fmt;

use super::{size_methods, Condition, ConditionBuilder, SizeCheck};
use crate::ast::{List, TypeFlags};
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

/// Size and element-type constraints over a list.
#[derive(Debug, Clone)]
pub struct ListCondition {
    sizes: SizeCheck,
    element_types: BTreeMap<usize, TypeFlags>,
    all_elements: TypeFlags,
}

impl ListCondition {
    pub fn builder() -> ListConditionBuilder {
        ListConditionBuilder::default()
    }

    pub fn sizes(&self) -> &SizeCheck {
        &self.sizes
    }

    /// Flags enforced at `index`.
    pub fn element_type(&self, index: usize) -> TypeFlags {
        self.element_types
            .get(&index)
            .copied()
            .unwrap_or(self.all_elements)
    }
}

impl Condition<List> for ListCondition {
    fn test(&self, list: &List, reports: Reporter<'_>) -> bool {
        if !self.sizes.check(list.len(), list.span(), reports) {
            return false;
        }
        let mut valid = true;
        for (index, item) in list.iter().enumerate() {
            let flags = self.element_type(index);
            if flags.is_any() || flags.matches(item) {
                continue;
            }
            if reports.is_silent() {
                return false;
            }
            reports.error(
                item.span(),
                format!(
                    "Expected {flags} at {index}, provided {}",
                    TypeFlags::of(item)
                ),
            );
            valid = false;
        }
        valid
    }
}

impl fmt::Display for ListCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.sizes.hard.is_unbounded() {
            parts.push(format!("size: {}", self.sizes.hard));
        }
        for (index, flags) in &self.element_types {
            parts.push(format!("{index}: {flags}"));
        }
        if !self.all_elements.is_any() {
            parts.push(format!("elements: {}", self.all_elements));
        }
        write!(f, "list {{{}}}", parts.join(", "))
    }
}

/// Builder for [`ListCondition`].
///
/// Schema faults are recorded as they happen and returned by [`build`].
///
/// [`build`]: ListConditionBuilder::build
#[derive(Debug, Default)]
pub struct ListConditionBuilder {
    sizes: SizeCheck,
    element_types: BTreeMap<usize, TypeFlags>,
    all_elements: Option<TypeFlags>,
    error: Option<SchemaError>,
}

impl ListConditionBuilder {
    size_methods!();

    /// Requires the element at `index` to match `flags`.
    ///
    /// `index` must be below the hard maximum size when one is set; indices
    /// below the minimum size are accepted.
    pub fn element_type(mut self, index: usize, flags: TypeFlags) -> Self {
        if flags.is_empty() {
            self.fail(SchemaError::ImpossibleType);
        } else if self.element_types.insert(index, flags).is_some() {
            self.fail(SchemaError::DuplicateIndex(index));
        }
        self
    }

    /// Requires every element without its own constraint to match `flags`.
    pub fn all_elements(mut self, flags: TypeFlags) -> Self {
        if flags.is_empty() {
            self.fail(SchemaError::ImpossibleType);
        } else {
            self.all_elements = Some(flags);
        }
        self
    }

    pub fn build(self) -> Result<ListCondition, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.sizes.validate()?;
        if let Some(max) = self.sizes.hard.max {
            if let Some(&index) = self.element_types.keys().find(|&&index| index >= max) {
                return Err(SchemaError::IndexOutOfRange { index, max });
            }
        }
        Ok(ListCondition {
            sizes: self.sizes,
            element_types: self.element_types,
            all_elements: self.all_elements.unwrap_or(TypeFlags::ANY),
        })
    }

    fn fail(&mut self, error: SchemaError) {
        self.error.get_or_insert(error);
    }
}

impl ConditionBuilder for ListConditionBuilder {
    type Condition = ListCondition;

    fn finish(self) -> Result<ListCondition, SchemaError> {
        self.build()
    }
}
