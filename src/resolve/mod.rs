//! Name resolution for import directives.
//!
//! [`ImportDirectiveProcessor`] turns a parsed directive into an
//! [`ImportScope`], using [`QualifiedExpressionResolver`] for each segment
//! that is not part of the package prefix. Problems are reported as
//! [`Diagnostic`]s to a [`DiagnosticSink`].

mod diagnostics;
mod imports;
mod qualified;
mod scopes;

#[cfg(feature = "serde")]
pub use diagnostics::to_json;
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticSink, Severity, TemporaryTrace, codes,
};
pub use imports::{
    ImportDirectiveProcessor, PackagePeel, can_all_under_import_from,
    can_all_under_import_from_class, can_import_members_from,
};
pub use qualified::{ImportOptions, LookupMode, QualifiedExpressionResolver};
pub use scopes::ImportScope;
