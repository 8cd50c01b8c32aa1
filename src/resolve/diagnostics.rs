//! Diagnostics: user-facing resolution errors.
//!
//! Diagnostics are reported to a [`DiagnosticSink`] and never abort
//! resolution: the offending import simply contributes an empty scope.
//! The sink also receives reference records (which descriptor a name in
//! source resolved to).

use std::sync::Arc;

use crate::base::{FileId, FileRange, Name};
use crate::descriptors::Descriptor;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub location: FileRange,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(location: FileRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            location,
            severity: Severity::Error,
            code: None,
            message: message.into(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(location: FileRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(location, message)
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn file(&self) -> FileId {
        self.location.file
    }

    // ------------------------------------------------------------------
    // Resolution errors
    // ------------------------------------------------------------------

    pub fn unsupported(location: FileRange, what: &str) -> Self {
        Self::error(location, format!("unsupported: {what}")).with_code(codes::UNSUPPORTED)
    }

    pub fn unresolved_reference(location: FileRange, name: &Name) -> Self {
        Self::error(location, format!("unresolved reference: '{name}'"))
            .with_code(codes::UNRESOLVED_REFERENCE)
    }

    pub fn cannot_import_on_demand_from_singleton(location: FileRange, class: &Name) -> Self {
        Self::error(
            location,
            format!("cannot import-on-demand from object '{class}'"),
        )
        .with_code(codes::CANNOT_IMPORT_ON_DEMAND_FROM_SINGLETON)
    }

    pub fn cannot_import_from_element(location: FileRange, target: &Descriptor) -> Self {
        Self::error(
            location,
            format!(
                "cannot import from {} '{}'",
                target.kind_label(),
                target.name()
            ),
        )
        .with_code(codes::CANNOT_IMPORT_FROM_ELEMENT)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for import resolution.
pub mod codes {
    /// Unresolved reference (name not found).
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Construct that is recognized but not supported.
    pub const UNSUPPORTED: &str = "E0002";
    /// All-under import from an object or enum entry.
    pub const CANNOT_IMPORT_ON_DEMAND_FROM_SINGLETON: &str = "E0003";
    /// Import through something that has no importable members.
    pub const CANNOT_IMPORT_FROM_ELEMENT: &str = "E0004";
}

// ============================================================================
// SINKS
// ============================================================================

/// Receives diagnostics and reference records produced during resolution.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);

    /// Record that the name at `reference` resolved to `target`.
    fn record_reference(&mut self, _reference: FileRange, _target: Descriptor) {}
}

/// Collects diagnostics and references in report order.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    references: Vec<(FileRange, Descriptor)>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file() == file).collect()
    }

    pub fn references(&self) -> &[(FileRange, Descriptor)] {
        &self.references
    }

    /// Every descriptor recorded for the name at `reference`.
    pub fn reference_targets(&self, reference: FileRange) -> Vec<&Descriptor> {
        self.references
            .iter()
            .filter(|(range, _)| *range == reference)
            .map(|(_, target)| target)
            .collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Replay everything collected into `sink`, in order.
    pub fn replay_into(self, sink: &mut dyn DiagnosticSink) {
        for diagnostic in self.diagnostics {
            sink.report(diagnostic);
        }
        for (reference, target) in self.references {
            sink.record_reference(reference, target);
        }
    }
}

impl DiagnosticSink for DiagnosticCollector {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    fn record_reference(&mut self, reference: FileRange, target: Descriptor) {
        self.references.push((reference, target));
    }
}

/// Buffers reports on top of another sink. Nothing reaches the parent
/// unless [`commit`](Self::commit) is called.
pub struct TemporaryTrace<'a> {
    parent: &'a mut dyn DiagnosticSink,
    buffer: DiagnosticCollector,
}

impl<'a> TemporaryTrace<'a> {
    pub fn new(parent: &'a mut dyn DiagnosticSink) -> Self {
        Self {
            parent,
            buffer: DiagnosticCollector::new(),
        }
    }

    pub fn commit(self) {
        self.buffer.replay_into(self.parent);
    }
}

impl DiagnosticSink for TemporaryTrace<'_> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.buffer.report(diagnostic);
    }

    fn record_reference(&mut self, reference: FileRange, target: Descriptor) {
        self.buffer.record_reference(reference, target);
    }
}

/// Serialize diagnostics as a JSON array.
#[cfg(feature = "serde")]
pub fn to_json(diagnostics: &[Diagnostic]) -> serde_json::Result<String> {
    serde_json::to_string(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{TextRange, TextSize};

    fn at(start: u32, end: u32) -> FileRange {
        FileRange::new(FileId::new(0), TextRange::new(TextSize::from(start), TextSize::from(end)))
    }

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::unresolved_reference(at(3, 5), &Name::identifier("Foo"));
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.code.as_deref(), Some(codes::UNRESOLVED_REFERENCE));
        assert_eq!(&*diag.message, "unresolved reference: 'Foo'");
    }

    #[test]
    fn test_warning_keeps_location() {
        let diag = Diagnostic::warning(at(1, 2), "careful");
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.location, at(1, 2));
    }

    #[test]
    fn test_collector_counts() {
        let mut collector = DiagnosticCollector::new();
        collector.report(Diagnostic::unsupported(at(0, 1), "absolute import"));
        collector.report(Diagnostic::warning(at(0, 1), "w"));

        assert_eq!(collector.error_count(), 1);
        assert!(collector.has_errors());
        assert_eq!(collector.diagnostics_for_file(FileId::new(0)).len(), 2);
        assert!(collector.diagnostics_for_file(FileId::new(1)).is_empty());
    }

    #[test]
    fn test_temporary_trace_discards_unless_committed() {
        let mut collector = DiagnosticCollector::new();
        {
            let mut temp = TemporaryTrace::new(&mut collector);
            temp.report(Diagnostic::error(at(0, 1), "dropped"));
        }
        assert!(collector.diagnostics().is_empty());

        let mut temp = TemporaryTrace::new(&mut collector);
        temp.report(Diagnostic::error(at(0, 1), "kept"));
        temp.commit();
        assert_eq!(collector.diagnostics().len(), 1);
        assert_eq!(&*collector.diagnostics()[0].message, "kept");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_to_json() {
        let json = to_json(&[Diagnostic::unsupported(at(0, 1), "absolute import")]).unwrap();
        assert!(json.contains("\"E0002\""));
        assert!(json.contains("unsupported: absolute import"));
    }
}
