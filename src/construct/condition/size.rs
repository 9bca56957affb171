use std::fmt;
use std::sync::Arc;

use crate::ast::Span;
use crate::diagnostics::Reporter;
use crate::errors::SchemaError;

/// Custom size warning text, given the actual size.
pub type WarnText = Arc<dyn Fn(usize) -> String + Send + Sync>;

/// Inclusive size range; an absent bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SizeRange {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl SizeRange {
    pub const ANY: SizeRange = SizeRange {
        min: None,
        max: None,
    };

    pub fn exactly(size: usize) -> Self {
        Self {
            min: Some(size),
            max: Some(size),
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn contains(&self, size: usize) -> bool {
        self.min.map_or(true, |min| size >= min) && self.max.map_or(true, |max| size <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    fn is_inverted(&self) -> Option<(usize, usize)> {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => Some((min, max)),
            _ => None,
        }
    }
}

impl fmt::Display for SizeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min == max => write!(f, "exactly {min}"),
            (Some(min), Some(max)) => write!(f, "between {min} and {max}"),
            (Some(min), None) => write!(f, "at least {min}"),
            (None, Some(max)) => write!(f, "at most {max}"),
            (None, None) => f.write_str("any size"),
        }
    }
}

/// Hard and soft size constraints of a condition.
#[derive(Clone, Default)]
pub struct SizeCheck {
    pub hard: SizeRange,
    pub warn: SizeRange,
    pub warn_text: Option<WarnText>,
}

impl SizeCheck {
    /// Checks `size` against both ranges.
    ///
    /// A hard violation reports one error and fails. A soft violation
    /// reports exactly one warning and still passes.
    pub fn check(&self, size: usize, span: Span, reports: Reporter<'_>) -> bool {
        if !self.hard.contains(size) {
            if !reports.is_silent() {
                reports.error(
                    span,
                    format!("Wrong size: expected {}, provided {size}", self.hard),
                );
            }
            return false;
        }
        if !reports.is_silent() && !self.warn.contains(size) {
            let text = match &self.warn_text {
                Some(text) => text(size),
                None => format!("Unexpected size: expected {}, provided {size}", self.warn),
            };
            reports.warning(span, text);
        }
        true
    }

    pub(crate) fn validate(&self) -> Result<(), SchemaError> {
        if let Some((min, max)) = self.hard.is_inverted() {
            return Err(SchemaError::InvertedRange { min, max });
        }
        if let Some((min, max)) = self.warn.is_inverted() {
            return Err(SchemaError::InvertedWarnRange { min, max });
        }
        Ok(())
    }
}

impl fmt::Debug for SizeCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizeCheck")
            .field("hard", &self.hard)
            .field("warn", &self.warn)
            .field("warn_text", &self.warn_text.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ReportCollector;
    use proptest::prelude::*;

    #[test]
    fn range_display() {
        assert_eq!(SizeRange::exactly(2).to_string(), "exactly 2");
        assert_eq!(SizeRange::between(1, 3).to_string(), "between 1 and 3");
        assert_eq!(SizeRange::at_least(1).to_string(), "at least 1");
        assert_eq!(SizeRange::at_most(4).to_string(), "at most 4");
        assert_eq!(SizeRange::ANY.to_string(), "any size");
    }

    #[test]
    fn hard_violation_is_one_error() {
        let check = SizeCheck {
            hard: SizeRange::at_least(2),
            ..SizeCheck::default()
        };
        let sink = ReportCollector::new();
        assert!(!check.check(1, Span::new(0, 4), sink.reporter()));
        assert_eq!(
            sink.messages(),
            ["Wrong size: expected at least 2, provided 1"]
        );
    }

    #[test]
    fn custom_warn_text_gets_the_size() {
        let check = SizeCheck {
            hard: SizeRange::at_least(2),
            warn: SizeRange::exactly(2),
            warn_text: Some(Arc::new(|n| format!("{n} is too many"))),
        };
        let sink = ReportCollector::new();
        assert!(check.check(5, Span::default(), sink.reporter()));
        assert_eq!(sink.warnings().len(), 1);
        assert_eq!(sink.messages(), ["5 is too many"]);
    }

    #[test]
    fn inverted_ranges_are_schema_faults() {
        let check = SizeCheck {
            hard: SizeRange::between(3, 1),
            ..SizeCheck::default()
        };
        assert_eq!(
            check.validate(),
            Err(SchemaError::InvertedRange { min: 3, max: 1 })
        );
        let check = SizeCheck {
            warn: SizeRange::between(5, 2),
            ..SizeCheck::default()
        };
        assert_eq!(
            check.validate(),
            Err(SchemaError::InvertedWarnRange { min: 5, max: 2 })
        );
    }

    fn bound() -> impl Strategy<Value = Option<usize>> {
        prop::option::of(0usize..20)
    }

    proptest! {
        #[test]
        fn size_check_follows_the_range_law(
            min in bound(),
            max in bound(),
            warn_min in bound(),
            warn_max in bound(),
            size in 0usize..25,
        ) {
            let check = SizeCheck {
                hard: SizeRange { min, max },
                warn: SizeRange { min: warn_min, max: warn_max },
                warn_text: None,
            };
            let in_range = min.map_or(true, |m| size >= m) && max.map_or(true, |m| size <= m);
            let in_warn = warn_min.map_or(true, |m| size >= m) && warn_max.map_or(true, |m| size <= m);

            let sink = ReportCollector::new();
            let passed = check.check(size, Span::default(), sink.reporter());
            prop_assert_eq!(passed, in_range);
            prop_assert_eq!(check.check(size, Span::default(), Reporter::silent()), in_range);
            if in_range {
                prop_assert!(sink.errors().is_empty());
                prop_assert_eq!(sink.warnings().len(), usize::from(!in_warn));
            } else {
                prop_assert_eq!(sink.errors().len(), 1);
                prop_assert!(sink.warnings().is_empty());
            }
        }
    }
}
