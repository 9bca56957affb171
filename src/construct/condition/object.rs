use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use super::{size_methods, Condition, ConditionBuilder, SizeCheck};
use crate::ast::{Node, Object, TypeFlags};
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

/// Custom text for the undeclared-properties warning, given their keys.
pub type PropertiesWarnText = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PropertyCheck {
    required: bool,
    flags: TypeFlags,
}

/// Size and property constraints over an object.
#[derive(Clone)]
pub struct ObjectCondition {
    sizes: SizeCheck,
    properties: IndexMap<String, PropertyCheck>,
    other_properties: TypeFlags,
    warn_other_properties: bool,
    others_text: Option<PropertiesWarnText>,
}

impl ObjectCondition {
    pub fn builder() -> ObjectConditionBuilder {
        ObjectConditionBuilder::default()
    }

    pub fn sizes(&self) -> &SizeCheck {
        &self.sizes
    }

    fn fails_other(&self, node: &Node) -> bool {
        !self.other_properties.is_any() && !self.other_properties.matches(node)
    }

    fn test_silent(&self, obj: &Object) -> bool {
        if !self.sizes.check(obj.len(), obj.span(), Reporter::silent()) {
            return false;
        }
        let declared_ok = self
            .properties
            .iter()
            .all(|(key, check)| match obj.property(key) {
                None => !check.required,
                Some(node) => check.flags.matches(node),
            });
        declared_ok
            && obj
                .properties()
                .filter(|(key, _)| !self.properties.contains_key(*key))
                .all(|(_, node)| !self.fails_other(node))
    }
}

impl Condition<Object> for ObjectCondition {
    fn test(&self, obj: &Object, reports: Reporter<'_>) -> bool {
        if reports.is_silent() {
            return self.test_silent(obj);
        }
        if !self.sizes.check(obj.len(), obj.span(), reports) {
            return false;
        }
        let mut valid = true;
        for (key, check) in &self.properties {
            match obj.property(key) {
                None if check.required => {
                    reports.error(obj.span(), format!("Missing property '{key}'"));
                    valid = false;
                }
                None => {}
                Some(node) if !check.flags.matches(node) => {
                    reports.error(
                        node.span(),
                        format!(
                            "Expected {} for property '{key}', provided {}",
                            check.flags,
                            TypeFlags::of(node)
                        ),
                    );
                    valid = false;
                }
                Some(_) => {}
            }
        }
        let mut redundant = Vec::new();
        for (key, node) in obj.properties() {
            if self.properties.contains_key(key) {
                continue;
            }
            if self.fails_other(node) {
                reports.error(
                    node.span(),
                    format!(
                        "Expected {} for property '{key}', provided {}",
                        self.other_properties,
                        TypeFlags::of(node)
                    ),
                );
                valid = false;
            } else if self.warn_other_properties {
                redundant.push(key.to_string());
            }
        }
        if !redundant.is_empty() {
            let text = match &self.others_text {
                Some(text) => text(&redundant),
                None => {
                    let mut text = format!("{} redundant properties", redundant.len());
                    for key in &redundant {
                        text.push_str("\n  ");
                        text.push_str(key);
                    }
                    text
                }
            };
            reports.warning(obj.span(), text);
        }
        valid
    }
}

impl fmt::Display for ObjectCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if !self.sizes.hard.is_unbounded() {
            parts.push(format!("size: {}", self.sizes.hard));
        }
        for (key, check) in &self.properties {
            if check.required {
                parts.push(format!("'{key}': {}", check.flags));
            } else {
                parts.push(format!("['{key}']: {}", check.flags));
            }
        }
        if !self.other_properties.is_any() {
            parts.push(format!("others: {}", self.other_properties));
        }
        write!(f, "object {{{}}}", parts.join(", "))
    }
}

impl fmt::Debug for ObjectCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectCondition")
            .field("sizes", &self.sizes)
            .field("properties", &self.properties)
            .field("other_properties", &self.other_properties)
            .field("warn_other_properties", &self.warn_other_properties)
            .finish()
    }
}

/// Builder for [`ObjectCondition`].
#[derive(Default)]
pub struct ObjectConditionBuilder {
    sizes: SizeCheck,
    properties: IndexMap<String, PropertyCheck>,
    other_properties: Option<TypeFlags>,
    warn_other_properties: bool,
    others_text: Option<PropertiesWarnText>,
    error: Option<SchemaError>,
}

impl ObjectConditionBuilder {
    size_methods!();

    /// Declares a required property of the given shape.
    pub fn property(self, key: impl Into<String>, flags: TypeFlags) -> Self {
        self.declare(key.into(), flags, true)
    }

    /// Declares a property that may be absent; when present it must match.
    pub fn optional_property(self, key: impl Into<String>, flags: TypeFlags) -> Self {
        self.declare(key.into(), flags, false)
    }

    /// Constrains every undeclared property.
    pub fn other_properties(mut self, flags: TypeFlags) -> Self {
        if flags.is_empty() {
            self.fail(SchemaError::ImpossibleType);
        } else {
            self.other_properties = Some(flags);
        }
        self
    }

    /// Emits one aggregated warning listing undeclared properties.
    pub fn warn_other_properties(mut self) -> Self {
        self.warn_other_properties = true;
        self
    }

    pub fn warn_other_properties_with<F>(mut self, text: F) -> Self
    where
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.warn_other_properties = true;
        self.others_text = Some(Arc::new(text));
        self
    }

    pub fn build(self) -> Result<ObjectCondition, SchemaError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.sizes.validate()?;
        if let Some(max) = self.sizes.hard.max {
            let required = self.properties.values().filter(|p| p.required).count();
            if required > max {
                return Err(SchemaError::TooManyProperties {
                    count: required,
                    max,
                });
            }
        }
        Ok(ObjectCondition {
            sizes: self.sizes,
            properties: self.properties,
            other_properties: self.other_properties.unwrap_or(TypeFlags::ANY),
            warn_other_properties: self.warn_other_properties,
            others_text: self.others_text,
        })
    }

    fn declare(mut self, key: String, flags: TypeFlags, required: bool) -> Self {
        if flags.is_empty() {
            self.fail(SchemaError::ImpossibleType);
        } else if self.properties.contains_key(&key) {
            self.fail(SchemaError::DuplicateProperty(key));
        } else {
            self.properties.insert(key, PropertyCheck { required, flags });
        }
        self
    }

    fn fail(&mut self, error: SchemaError) {
        self.error.get_or_insert(error);
    }
}

impl ConditionBuilder for ObjectConditionBuilder {
    type Condition = ObjectCondition;

    fn finish(self) -> Result<ObjectCondition, SchemaError> {
        self.build()
    }
}
