//! Import directive resolution.
//!
//! A directive `import a.b.C.D` is resolved in two phases:
//!
//! 1. **Package peel (right to left)**: the longest prefix that names an
//!    existing package becomes the starting point. `a.b.C.D`, then `a.b.C`,
//!    then `a.b`... until a package view exists. The root package always
//!    exists, so the peel terminates.
//! 2. **Member lookup (left to right)**: the peeled-off segments are looked
//!    up one after another, each as a member of every descriptor the
//!    previous segment resolved to.
//!
//! The resulting descriptors become either an all-under scope (`.*`) or a
//! single name bound to the whole candidate set.

use std::sync::Arc;

use rayon::prelude::*;

use crate::base::{FqName, InternalError, fatal};
use crate::descriptors::{ClassDescriptor, Descriptor, ModuleDescriptor, PackageViewDescriptor};
use crate::resolve::{
    Diagnostic, DiagnosticCollector, DiagnosticSink, ImportOptions, ImportScope, LookupMode,
    QualifiedExpressionResolver, TemporaryTrace,
};
use crate::syntax::{ImportDirective, NameReference};

/// Outcome of the right-to-left phase.
#[derive(Clone, Debug)]
pub struct PackagePeel<'d> {
    /// The deepest package named by a prefix of the directive.
    pub view: Arc<dyn PackageViewDescriptor>,
    /// Segments after that prefix, in source order.
    pub selectors: &'d [NameReference],
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ImportDirectiveProcessor {
    qualified: QualifiedExpressionResolver,
}

impl ImportDirectiveProcessor {
    pub fn new(qualified: QualifiedExpressionResolver) -> Self {
        Self { qualified }
    }

    /// Resolve one directive against `module`.
    ///
    /// Problems in the directive are reported to `sink` and produce an
    /// empty scope. Internal inconsistencies (a module without a root
    /// package) abort.
    pub fn process_import_reference(
        &self,
        directive: &ImportDirective,
        module: &ModuleDescriptor,
        sink: &mut dyn DiagnosticSink,
        options: ImportOptions,
    ) -> ImportScope {
        let _span = tracing::debug_span!("import", path = %directive.import_path()).entered();

        if directive.absolute_in_root_package {
            sink.report(Diagnostic::unsupported(
                directive.range,
                "imports relative to the root package",
            ));
            return ImportScope::Empty;
        }
        if directive.segments.is_empty() {
            return ImportScope::Empty;
        }

        let peel = self.resolve_packages_from_right_to_left(module, &directive.segments, sink);
        let descriptors = self.look_up_members_from_left_to_right(
            vec![Descriptor::PackageView(peel.view)],
            peel.selectors,
            sink,
            options,
        );

        let scope = if directive.all_under {
            self.all_under_scope(directive, descriptors, sink, options.lookup_mode)
        } else {
            match directive.alias_name() {
                Some(name) => ImportScope::single(name, descriptors),
                None => ImportScope::Empty,
            }
        };
        tracing::trace!(found = scope.descriptors().len(), "import resolved");
        scope
    }

    /// Resolve every import of a file in parallel.
    ///
    /// Each directive reports into its own collector; the collectors are
    /// replayed into `sink` in directive order, so the output does not
    /// depend on scheduling.
    pub fn process_file_imports(
        &self,
        directives: &[ImportDirective],
        module: &ModuleDescriptor,
        sink: &mut dyn DiagnosticSink,
        options: ImportOptions,
    ) -> Vec<ImportScope> {
        let resolved: Vec<(ImportScope, DiagnosticCollector)> = directives
            .par_iter()
            .map(|directive| {
                let mut collector = DiagnosticCollector::new();
                let scope = self.process_import_reference(directive, module, &mut collector, options);
                (scope, collector)
            })
            .collect();

        resolved
            .into_iter()
            .map(|(scope, collector)| {
                collector.replay_into(sink);
                scope
            })
            .collect()
    }

    /// Find the longest prefix of `segments` that names a package.
    ///
    /// Views along that prefix are recorded as reference targets, one per
    /// segment.
    pub fn resolve_packages_from_right_to_left<'d>(
        &self,
        module: &ModuleDescriptor,
        segments: &'d [NameReference],
        sink: &mut dyn DiagnosticSink,
    ) -> PackagePeel<'d> {
        let mut prefix = segments.len();
        loop {
            let fq_name = FqName::from_segments(segments[..prefix].iter().map(|s| &s.name));
            if let Some(view) = module.package(&fq_name) {
                record_package_views(&segments[..prefix], &view, sink);
                return PackagePeel {
                    view,
                    selectors: &segments[prefix..],
                };
            }
            if prefix == 0 {
                fatal(InternalError::MissingRootPackage {
                    module: module.name().clone(),
                });
            }
            prefix -= 1;
        }
    }

    /// Resolve `selectors` one by one, starting from `descriptors`.
    ///
    /// Stops with an empty result when an intermediate segment resolves to
    /// something members cannot be imported from.
    pub fn look_up_members_from_left_to_right(
        &self,
        descriptors: Vec<Descriptor>,
        selectors: &[NameReference],
        sink: &mut dyn DiagnosticSink,
        options: ImportOptions,
    ) -> Vec<Descriptor> {
        let mut current = descriptors;
        for (index, selector) in selectors.iter().enumerate() {
            let found = self
                .qualified
                .lookup_selector_descriptors(selector, &current, sink, options);
            let more_follow = index + 1 < selectors.len();
            if more_follow && !can_import_members_from(&found, selector, sink, options.lookup_mode) {
                return Vec::new();
            }
            current = found;
        }
        current
    }

    fn all_under_scope(
        &self,
        directive: &ImportDirective,
        descriptors: Vec<Descriptor>,
        sink: &mut dyn DiagnosticSink,
        lookup_mode: LookupMode,
    ) -> ImportScope {
        let Some(reference) = directive.last_reference() else {
            return ImportScope::Empty;
        };
        if !can_all_under_import_from(&descriptors) {
            if let Some(class) = descriptors.iter().find_map(Descriptor::as_class) {
                sink.report(Diagnostic::cannot_import_on_demand_from_singleton(
                    reference.range,
                    &class.name(),
                ));
            }
            return ImportScope::Empty;
        }
        if !can_import_members_from(&descriptors, reference, sink, lookup_mode) {
            return ImportScope::Empty;
        }
        ImportScope::all_under(descriptors)
    }
}

fn record_package_views(
    segments: &[NameReference],
    view: &Arc<dyn PackageViewDescriptor>,
    sink: &mut dyn DiagnosticSink,
) {
    let mut current = Some(Arc::clone(view));
    for segment in segments.iter().rev() {
        let Some(view) = current else {
            break;
        };
        current = view.containing_view();
        sink.record_reference(segment.range, Descriptor::PackageView(view));
    }
}

/// Whether `import <descriptors>.*` is allowed: false only when every
/// candidate is a singleton class.
pub fn can_all_under_import_from(descriptors: &[Descriptor]) -> bool {
    if descriptors.is_empty() {
        return true;
    }
    descriptors.iter().any(|d| match d {
        Descriptor::Class(class) => can_all_under_import_from_class(class.as_ref()),
        _ => true,
    })
}

pub fn can_all_under_import_from_class(class: &dyn ClassDescriptor) -> bool {
    !class.kind().is_singleton()
}

/// Whether members can be imported through `descriptors`.
///
/// With a single candidate, a rejection is reported on `reference` right
/// away. With several, rejections are reported only if every candidate is
/// rejected.
pub fn can_import_members_from(
    descriptors: &[Descriptor],
    reference: &NameReference,
    sink: &mut dyn DiagnosticSink,
    lookup_mode: LookupMode,
) -> bool {
    if lookup_mode.is_only_classes_and_packages() {
        return true;
    }
    if let [single] = descriptors {
        return can_import_members_from_one(single, reference, sink);
    }

    let mut trace = TemporaryTrace::new(sink);
    let mut can_import = false;
    for descriptor in descriptors {
        can_import |= can_import_members_from_one(descriptor, reference, &mut trace);
    }
    if !can_import {
        trace.commit();
    }
    can_import
}

fn can_import_members_from_one(
    descriptor: &Descriptor,
    reference: &NameReference,
    sink: &mut dyn DiagnosticSink,
) -> bool {
    if descriptor.is_package_or_class() {
        return true;
    }
    sink.report(Diagnostic::cannot_import_from_element(reference.range, descriptor));
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ClassId, FileId, Name};
    use crate::descriptors::{
        ClassBuilder, ClassKind, FunctionDescriptor, PackageFragment, PackageFragmentProviderImpl,
    };
    use crate::resolve::codes;

    const FILE: FileId = FileId::new(0);

    fn module() -> Arc<ModuleDescriptor> {
        let module = ModuleDescriptor::named(Name::special("app")).unwrap();
        module.add_dependency_on_module(&module).unwrap();

        let c_id = ClassId::top_level(FqName::new("a.b.c"), Name::identifier("C"));
        let d = ClassBuilder::new(c_id.nested(&Name::identifier("D")), ClassKind::Class).build();
        let c = ClassBuilder::new(c_id, ClassKind::Class).nested(d).build();
        let obj = ClassBuilder::new(
            ClassId::top_level(FqName::new("a.b.c"), Name::identifier("Obj")),
            ClassKind::Object,
        )
        .build();

        let fragments = vec![
            PackageFragment::builder(FqName::new("a.b.c"), module.name().clone())
                .class(c)
                .class(obj)
                .function(FunctionDescriptor::new(Name::identifier("f")))
                .build(),
        ];
        module
            .initialize_with_default_views(Arc::new(PackageFragmentProviderImpl::new(
                module.name(),
                fragments,
            )))
            .unwrap();
        module
    }

    fn directive(text: &str) -> ImportDirective {
        ImportDirective::parse(FILE, text).unwrap()
    }

    #[test]
    fn test_peel_stops_at_deepest_package() {
        let module = module();
        let processor = ImportDirectiveProcessor::default();
        let directive = directive("a.b.c.C.D");
        let mut sink = DiagnosticCollector::new();

        let peel = processor.resolve_packages_from_right_to_left(&module, &directive.segments, &mut sink);
        assert_eq!(peel.view.fq_name(), &FqName::new("a.b.c"));
        let selectors: Vec<_> = peel.selectors.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(selectors, vec!["C", "D"]);
        // a, b and c each point at their package.
        assert_eq!(sink.references().len(), 3);
        let a = sink.reference_targets(directive.segments[0].range);
        assert_eq!(a[0].as_package_view().unwrap().fq_name(), &FqName::new("a"));
    }

    #[test]
    fn test_single_import_of_nested_class() {
        let module = module();
        let processor = ImportDirectiveProcessor::default();
        let mut sink = DiagnosticCollector::new();

        let scope = processor.process_import_reference(
            &directive("a.b.c.C.D as E"),
            &module,
            &mut sink,
            ImportOptions::default(),
        );
        assert!(sink.diagnostics().is_empty());
        assert_eq!(scope.imported_name(), Some(&Name::identifier("E")));
        assert_eq!(scope.descriptors().len(), 1);
    }

    #[test]
    fn test_all_under_from_object_is_rejected() {
        let module = module();
        let processor = ImportDirectiveProcessor::default();
        let mut sink = DiagnosticCollector::new();

        let scope = processor.process_import_reference(
            &directive("a.b.c.Obj.*"),
            &module,
            &mut sink,
            ImportOptions::default(),
        );
        assert!(scope.is_empty());
        assert_eq!(
            sink.diagnostics()[0].code.as_deref(),
            Some(codes::CANNOT_IMPORT_ON_DEMAND_FROM_SINGLETON)
        );
    }

    #[test]
    fn test_import_through_function_is_rejected() {
        let module = module();
        let processor = ImportDirectiveProcessor::default();
        let mut sink = DiagnosticCollector::new();

        let scope = processor.process_import_reference(
            &directive("a.b.c.f.g"),
            &module,
            &mut sink,
            ImportOptions::default(),
        );
        assert!(scope.is_empty());
        assert_eq!(sink.error_count(), 1);
        assert_eq!(
            sink.diagnostics()[0].code.as_deref(),
            Some(codes::CANNOT_IMPORT_FROM_ELEMENT)
        );
    }

    #[test]
    fn test_absolute_import_is_unsupported() {
        let module = module();
        let processor = ImportDirectiveProcessor::default();
        let mut sink = DiagnosticCollector::new();

        let scope = processor.process_import_reference(
            &directive("package.a.b.c.C"),
            &module,
            &mut sink,
            ImportOptions::default(),
        );
        assert!(scope.is_empty());
        assert_eq!(sink.diagnostics()[0].code.as_deref(), Some(codes::UNSUPPORTED));
    }

    #[test]
    fn test_can_import_members_from_several_commits_only_on_failure() {
        let f = Descriptor::Function(Arc::new(FunctionDescriptor::new(Name::identifier("f"))));
        let class = Descriptor::Class(
            ClassBuilder::new(
                ClassId::top_level(FqName::new("p"), Name::identifier("C")),
                ClassKind::Class,
            )
            .build(),
        );
        let reference = directive("f").segments[0].clone();

        let mut sink = DiagnosticCollector::new();
        assert!(can_import_members_from(
            &[f.clone(), class],
            &reference,
            &mut sink,
            LookupMode::Everything
        ));
        assert!(sink.diagnostics().is_empty());

        assert!(!can_import_members_from(
            &[f.clone(), f.clone()],
            &reference,
            &mut sink,
            LookupMode::Everything
        ));
        assert_eq!(sink.error_count(), 2);

        assert!(can_import_members_from(
            &[f],
            &reference,
            &mut sink,
            LookupMode::OnlyClassesAndPackages
        ));
    }

    #[test]
    fn test_file_imports_keep_directive_order() {
        let module = module();
        let processor = ImportDirectiveProcessor::default();
        let mut sink = DiagnosticCollector::new();
        let directives = vec![directive("a.b.c.Missing"), directive("a.b.c.C"), directive("x.Y")];

        let scopes = processor.process_file_imports(&directives, &module, &mut sink, ImportOptions::default());
        assert_eq!(scopes.len(), 3);
        assert!(scopes[0].is_empty());
        assert!(!scopes[1].is_empty());
        assert_eq!(sink.error_count(), 2);
        assert!(sink.diagnostics()[0].message.contains("Missing"));
        assert!(sink.diagnostics()[1].message.contains("x"));
    }
}
