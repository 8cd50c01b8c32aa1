//! Lookup of one name segment inside a set of qualifier descriptors.

use crate::base::Name;
use crate::descriptors::{Descriptor, MemberScope};
use crate::resolve::{Diagnostic, DiagnosticSink};
use crate::syntax::NameReference;

/// What a qualified name may resolve to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LookupMode {
    /// Packages and classes only; members are never looked up.
    OnlyClassesAndPackages,
    /// Packages, classes, functions and properties.
    #[default]
    Everything,
}

impl LookupMode {
    pub fn is_everything(self) -> bool {
        self == LookupMode::Everything
    }

    pub fn is_only_classes_and_packages(self) -> bool {
        self == LookupMode::OnlyClassesAndPackages
    }
}

/// Options for resolving one import directive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportOptions {
    pub lookup_mode: LookupMode,
    /// Whether classes and members declared in the root package are visible.
    pub allow_root_classes: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            lookup_mode: LookupMode::Everything,
            allow_root_classes: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct QualifiedExpressionResolver;

impl QualifiedExpressionResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `reference` as a member of each descriptor in `qualifiers`.
    ///
    /// Subpackages and classifiers come first, then functions and properties
    /// when `options` allow members. An empty result is reported as an
    /// unresolved reference; anything found is recorded against `reference`.
    pub fn lookup_selector_descriptors(
        &self,
        reference: &NameReference,
        qualifiers: &[Descriptor],
        sink: &mut dyn DiagnosticSink,
        options: ImportOptions,
    ) -> Vec<Descriptor> {
        let name = &reference.name;
        let mut found: Vec<Descriptor> = Vec::new();
        let mut push = |descriptor: Descriptor| {
            if !found.iter().any(|d| d.same_as(&descriptor)) {
                found.push(descriptor);
            }
        };

        for qualifier in qualifiers {
            let Some(scope) = qualifier.member_scope() else {
                continue;
            };
            let members_visible = match qualifier {
                Descriptor::PackageView(view) => {
                    options.allow_root_classes || !view.fq_name().is_root()
                }
                _ => true,
            };

            if let Some(package) = scope.package(name) {
                push(Descriptor::PackageView(package));
            }
            if !members_visible {
                continue;
            }
            if let Some(class) = scope.classifier(name) {
                push(Descriptor::Class(class));
            }
            if options.lookup_mode.is_everything() {
                collect_callables(scope.as_ref(), name, &mut push);
            }
        }

        if found.is_empty() {
            sink.report(Diagnostic::unresolved_reference(reference.range, name));
        } else {
            for descriptor in &found {
                sink.record_reference(reference.range, descriptor.clone());
            }
        }
        found
    }
}

fn collect_callables(
    scope: &dyn MemberScope,
    name: &Name,
    push: &mut impl FnMut(Descriptor),
) {
    for function in scope.functions(name) {
        push(Descriptor::Function(function));
    }
    for property in scope.properties(name) {
        push(Descriptor::Property(property));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ClassId, FileId, FileRange, FqName, Name};
    use crate::descriptors::{
        ClassBuilder, ClassKind, FunctionDescriptor, ModuleDescriptor, PackageFragment,
        PackageFragmentProviderImpl,
    };
    use crate::resolve::DiagnosticCollector;
    use std::sync::Arc;

    fn reference(name: &str) -> NameReference {
        NameReference {
            name: Name::identifier(name),
            range: FileRange::detached(FileId::new(0)),
        }
    }

    fn module() -> Arc<ModuleDescriptor> {
        let module = ModuleDescriptor::named(Name::special("m")).unwrap();
        module.add_dependency_on_module(&module).unwrap();
        let root_class = ClassBuilder::new(
            ClassId::top_level(FqName::root(), Name::identifier("Top")),
            ClassKind::Class,
        )
        .build();
        let fragments = vec![
            PackageFragment::builder(FqName::root(), module.name().clone())
                .class(root_class)
                .build(),
            PackageFragment::builder(FqName::new("p"), module.name().clone())
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

    #[test]
    fn test_root_classes_hidden_unless_allowed() {
        let module = module();
        let root = vec![Descriptor::PackageView(module.package(&FqName::root()).unwrap())];
        let resolver = QualifiedExpressionResolver::new();

        let mut sink = DiagnosticCollector::new();
        let hidden = resolver.lookup_selector_descriptors(
            &reference("Top"),
            &root,
            &mut sink,
            ImportOptions::default(),
        );
        assert!(hidden.is_empty());
        assert_eq!(sink.error_count(), 1);

        let mut sink = DiagnosticCollector::new();
        let options = ImportOptions {
            allow_root_classes: true,
            ..ImportOptions::default()
        };
        let visible = resolver.lookup_selector_descriptors(&reference("Top"), &root, &mut sink, options);
        assert_eq!(visible.len(), 1);
        assert_eq!(sink.references().len(), 1);

        // Subpackages of the root are always visible.
        let package = resolver.lookup_selector_descriptors(
            &reference("p"),
            &root,
            &mut sink,
            ImportOptions::default(),
        );
        assert!(package[0].as_package_view().is_some());
    }

    #[test]
    fn test_callables_only_in_everything_mode() {
        let module = module();
        let p = vec![Descriptor::PackageView(module.package(&FqName::new("p")).unwrap())];
        let resolver = QualifiedExpressionResolver::new();
        let mut sink = DiagnosticCollector::new();

        let everything = resolver.lookup_selector_descriptors(
            &reference("f"),
            &p,
            &mut sink,
            ImportOptions::default(),
        );
        assert_eq!(everything.len(), 1);

        let options = ImportOptions {
            lookup_mode: LookupMode::OnlyClassesAndPackages,
            ..ImportOptions::default()
        };
        let classes_only = resolver.lookup_selector_descriptors(&reference("f"), &p, &mut sink, options);
        assert!(classes_only.is_empty());
    }
}
