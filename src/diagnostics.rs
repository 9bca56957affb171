//! Diagnostic reports and the sinks that receive them.
//!
//! Every check and constructor takes a [`Reporter`]. A reporter is either
//! *silent* (probe mode: nothing is recorded and checks may short-circuit) or
//! routes each [`Report`] to a [`ReportHandler`]. Silence is a first-class
//! value, so a constructor can ask `reports.is_silent()` before doing extra
//! work to build a message nobody will read.
//!
//! Reports are `miette` diagnostics: the error or warning severity maps to
//! [`miette::Severity`] and the span becomes the primary label, so a
//! [`RenderingReporter`] can print them against the original source text.
//!
//! ```rust
//! use sutra_construct::ast::Span;
//! use sutra_construct::diagnostics::{ReportCollector, Reporter};
//!
//! let sink = ReportCollector::new();
//! let reports = Reporter::to(&sink);
//! reports.warning(Span::new(0, 1), "Unexpected size");
//! assert_eq!(sink.warnings().len(), 1);
//! assert!(sink.errors().is_empty());
//! ```

use std::cell::RefCell;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, LabeledSpan, NamedSource, Severity,
};

use crate::ast::{Span, Spanned};

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Error,
    Warning,
}

/// One diagnostic: a severity, a human-readable message, the source span it
/// refers to and an optional underlying cause.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: ReportKind,
    pub message: String,
    pub span: Span,
    pub cause: Option<Arc<dyn Error + Send + Sync>>,
}

impl Report {
    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: ReportKind::Error,
            message: message.into(),
            span,
            cause: None,
        }
    }

    pub fn warning(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: ReportKind::Warning,
            message: message.into(),
            span,
            cause: None,
        }
    }

    /// Attaches the error that led to this report.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.cause = Some(Arc::new(cause));
        self
    }

    pub fn is_error(&self) -> bool {
        self.kind == ReportKind::Error
    }

    pub fn is_warning(&self) -> bool {
        self.kind == ReportKind::Warning
    }
}

impl Spanned for Report {
    fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for Report {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn Error + 'static))
    }
}

impl Diagnostic for Report {
    fn severity(&self) -> Option<Severity> {
        Some(match self.kind {
            ReportKind::Error => Severity::Error,
            ReportKind::Warning => Severity::Warning,
        })
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        // Multi-line messages are labelled by their headline only.
        let headline = self.message.lines().next().unwrap_or_default().to_string();
        let len = self.span.len().max(1);
        Some(Box::new(std::iter::once(LabeledSpan::new(
            Some(headline),
            self.span.start,
            len,
        ))))
    }
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives reports. Implemented by whatever collects or prints diagnostics.
pub trait ReportHandler {
    fn report(&self, report: Report);
}

impl<F> ReportHandler for F
where
    F: Fn(Report),
{
    fn report(&self, report: Report) {
        self(report)
    }
}

/// Optional diagnostic sink passed to every check and constructor.
///
/// Copying a reporter is free; all copies route to the same handler.
#[derive(Clone, Copy, Default)]
pub struct Reporter<'a> {
    handler: Option<&'a dyn ReportHandler>,
}

impl<'a> Reporter<'a> {
    /// Probe mode: reports are discarded.
    pub const fn silent() -> Self {
        Self { handler: None }
    }

    pub fn to(handler: &'a dyn ReportHandler) -> Self {
        Self {
            handler: Some(handler),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.handler.is_none()
    }

    pub fn report(&self, report: Report) {
        if let Some(handler) = self.handler {
            handler.report(report);
        }
    }

    pub fn error(&self, span: Span, message: impl Into<String>) {
        if let Some(handler) = self.handler {
            handler.report(Report::error(span, message));
        }
    }

    pub fn warning(&self, span: Span, message: impl Into<String>) {
        if let Some(handler) = self.handler {
            handler.report(Report::warning(span, message));
        }
    }
}

impl<'a, H: ReportHandler> From<&'a H> for Reporter<'a> {
    fn from(handler: &'a H) -> Self {
        Reporter::to(handler)
    }
}

impl fmt::Debug for Reporter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_silent() {
            f.write_str("Reporter(silent)")
        } else {
            f.write_str("Reporter(active)")
        }
    }
}

/// In-memory sink that keeps every report in arrival order.
#[derive(Debug, Default)]
pub struct ReportCollector {
    reports: RefCell<Vec<Report>>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reporter(&self) -> Reporter<'_> {
        Reporter::to(self)
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().clone()
    }

    pub fn errors(&self) -> Vec<Report> {
        self.filtered(ReportKind::Error)
    }

    pub fn warnings(&self) -> Vec<Report> {
        self.filtered(ReportKind::Warning)
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    /// Messages of all reports, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.reports
            .borrow()
            .iter()
            .map(|r| r.message.clone())
            .collect()
    }

    /// Drains the collector.
    pub fn take(&self) -> Vec<Report> {
        std::mem::take(&mut *self.reports.borrow_mut())
    }

    fn filtered(&self, kind: ReportKind) -> Vec<Report> {
        self.reports
            .borrow()
            .iter()
            .filter(|r| r.kind == kind)
            .cloned()
            .collect()
    }
}

impl ReportHandler for ReportCollector {
    fn report(&self, report: Report) {
        self.reports.borrow_mut().push(report);
    }
}

/// Sink that prints each report to stderr as a `miette` diagnostic rendered
/// against the named source text.
#[derive(Debug, Clone)]
pub struct RenderingReporter {
    name: String,
    source: Arc<String>,
}

impl RenderingReporter {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: Arc::new(source.into()),
        }
    }

    pub fn reporter(&self) -> Reporter<'_> {
        Reporter::to(self)
    }

    /// Renders a report the way it would be printed, without colors.
    pub fn render(&self, report: Report) -> String {
        let source = NamedSource::new(&self.name, self.source.as_ref().clone());
        let report = miette::Report::new(report).with_source_code(source);
        let handler = GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor());
        let mut out = String::new();
        match handler.render_report(&mut out, &*report) {
            Ok(()) => out,
            Err(_) => format!("{report}"),
        }
    }
}

impl ReportHandler for RenderingReporter {
    fn report(&self, report: Report) {
        eprintln!("{}", self.render(report));
    }
}
