//! Package views: one package name as seen from one module.
//!
//! A view merges the fragments of every module in the dependency list. Views
//! are cached by the [`PackageViewManager`]; fragment sets never change once
//! a module is sealed and initialized.

use std::fmt;
use std::sync::{Arc, Weak};

use super::{
    ChainedScope, ClassDescriptor, Descriptor, EmptyScope, FunctionDescriptor, MemberScope,
    ModuleDescriptor, PackageFragment, PropertyDescriptor,
};
use crate::base::{FqName, Name};
use crate::storage::{LazyValue, MemoizedFunction, NullableLazyValue};

/// The merged contents of one package.
pub trait PackageViewDescriptor: Send + Sync {
    fn fq_name(&self) -> &FqName;

    /// The module this view belongs to, unless it has been dropped.
    fn module(&self) -> Option<Arc<ModuleDescriptor>>;

    fn fragments(&self) -> Vec<Arc<PackageFragment>>;

    /// Members of all fragments, plus subpackages via [`MemberScope::package`].
    fn member_scope(&self) -> Arc<dyn MemberScope>;

    /// The enclosing package. `None` for the root.
    fn containing_view(&self) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.module()?
            .package_view_manager()
            .parent_view(self.fq_name())
    }

    fn name(&self) -> Name {
        self.fq_name()
            .short_name()
            .unwrap_or_else(|| Name::special("root"))
    }
}

impl fmt::Debug for dyn PackageViewDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageView({})", self.fq_name())
    }
}

/// Hands out package views for one module.
pub trait PackageViewManager: Send + Sync {
    fn package(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>>;

    fn sub_packages_of(&self, fq_name: &FqName, name_filter: &dyn Fn(&Name) -> bool)
    -> Vec<FqName>;

    /// A view of the package enclosing `fq_name`; `None` for the root.
    fn parent_view(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>>;
}

// ============================================================================
// VIEWS
// ============================================================================

/// A view over a known, non-empty list of fragments.
pub struct PackageViewImpl {
    fq_name: FqName,
    module: Weak<ModuleDescriptor>,
    fragments: Vec<Arc<PackageFragment>>,
    scope: LazyValue<Arc<dyn MemberScope>>,
}

impl PackageViewImpl {
    pub fn new(
        module: &Arc<ModuleDescriptor>,
        fq_name: FqName,
        fragments: Vec<Arc<PackageFragment>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            fq_name,
            module: Arc::downgrade(module),
            fragments,
            scope: LazyValue::new(),
        })
    }
}

impl PackageViewDescriptor for PackageViewImpl {
    fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    fn module(&self) -> Option<Arc<ModuleDescriptor>> {
        self.module.upgrade()
    }

    fn fragments(&self) -> Vec<Arc<PackageFragment>> {
        self.fragments.clone()
    }

    fn member_scope(&self) -> Arc<dyn MemberScope> {
        let scope = self.scope.get_or_compute(|| {
            let members = ChainedScope::new(
                self.fragments
                    .iter()
                    .map(|fragment| fragment.member_scope())
                    .collect(),
            );
            let scope: Arc<dyn MemberScope> = Arc::new(PackageViewScope {
                fq_name: self.fq_name.clone(),
                module: self.module.clone(),
                members,
            });
            scope
        });
        Arc::clone(scope)
    }
}

/// Fragment members, plus subpackages resolved through the owning module.
struct PackageViewScope {
    fq_name: FqName,
    module: Weak<ModuleDescriptor>,
    members: ChainedScope,
}

impl MemberScope for PackageViewScope {
    fn classifier(&self, name: &Name) -> Option<Arc<dyn ClassDescriptor>> {
        self.members.classifier(name)
    }

    fn functions(&self, name: &Name) -> Vec<Arc<FunctionDescriptor>> {
        self.members.functions(name)
    }

    fn properties(&self, name: &Name) -> Vec<Arc<PropertyDescriptor>> {
        self.members.properties(name)
    }

    fn package(&self, name: &Name) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.module.upgrade()?.package(&self.fq_name.child(name))
    }

    fn all_descriptors(&self) -> Vec<Descriptor> {
        self.members.all_descriptors()
    }
}

/// A view of a package known to exist whose fragments are looked up only
/// when its contents are first needed.
pub struct LazyPackageView {
    fq_name: FqName,
    module: Weak<ModuleDescriptor>,
    delegate: NullableLazyValue<Arc<dyn PackageViewDescriptor>>,
}

impl LazyPackageView {
    pub fn new(module: Weak<ModuleDescriptor>, fq_name: FqName) -> Self {
        Self {
            fq_name,
            module,
            delegate: LazyValue::new(),
        }
    }

    fn delegate(&self) -> Option<&Arc<dyn PackageViewDescriptor>> {
        self.delegate
            .get_or_compute(|| self.module.upgrade()?.package(&self.fq_name))
            .as_ref()
    }

    /// Whether the underlying view has been looked up yet.
    pub fn is_resolved(&self) -> bool {
        self.delegate.is_computed()
    }
}

impl PackageViewDescriptor for LazyPackageView {
    fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    fn module(&self) -> Option<Arc<ModuleDescriptor>> {
        self.module.upgrade()
    }

    fn fragments(&self) -> Vec<Arc<PackageFragment>> {
        self.delegate()
            .map(|view| view.fragments())
            .unwrap_or_default()
    }

    fn member_scope(&self) -> Arc<dyn MemberScope> {
        match self.delegate() {
            Some(view) => view.member_scope(),
            None => Arc::new(EmptyScope),
        }
    }
}

// ============================================================================
// MANAGER
// ============================================================================

/// The default manager: views come straight from the module's merged
/// fragment provider and are cached by name.
pub struct PackageViewManagerImpl {
    module: Weak<ModuleDescriptor>,
    views: MemoizedFunction<FqName, Option<Arc<dyn PackageViewDescriptor>>>,
}

impl PackageViewManagerImpl {
    pub fn new(module: &Arc<ModuleDescriptor>) -> Self {
        let owner = Arc::downgrade(module);
        let views = MemoizedFunction::new(move |fq_name: &FqName| {
            let module = owner.upgrade()?;
            let fragments = module.package_fragment_provider().package_fragments(fq_name);
            if fragments.is_empty() {
                tracing::trace!(module = %module.name(), package = %fq_name, "no such package");
                return None;
            }
            let view: Arc<dyn PackageViewDescriptor> =
                PackageViewImpl::new(&module, fq_name.clone(), fragments);
            Some(view)
        });
        Self {
            module: Arc::downgrade(module),
            views,
        }
    }
}

impl PackageViewManager for PackageViewManagerImpl {
    fn package(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.views.get(fq_name)
    }

    fn sub_packages_of(
        &self,
        fq_name: &FqName,
        name_filter: &dyn Fn(&Name) -> bool,
    ) -> Vec<FqName> {
        match self.module.upgrade() {
            Some(module) => module
                .package_fragment_provider()
                .sub_packages_of(fq_name, name_filter),
            None => Vec::new(),
        }
    }

    fn parent_view(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>> {
        let parent = fq_name.parent()?;
        Some(Arc::new(LazyPackageView::new(self.module.clone(), parent)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::ClassId;
    use crate::descriptors::{ClassBuilder, ClassKind, PackageFragmentProviderImpl};

    fn module_with(packages: Vec<Arc<PackageFragment>>) -> Arc<ModuleDescriptor> {
        let module = ModuleDescriptor::named(Name::special("m")).unwrap();
        module.add_dependency_on_module(&module).unwrap();
        let provider = PackageFragmentProviderImpl::new(module.name(), packages);
        module
            .initialize_with_default_views(Arc::new(provider))
            .unwrap();
        module
    }

    fn fragment(fq: &str, class: &str) -> Arc<PackageFragment> {
        let id = ClassId::top_level(FqName::new(fq), Name::identifier(class));
        PackageFragment::builder(FqName::new(fq), Name::special("m"))
            .class(ClassBuilder::new(id, ClassKind::Class).build())
            .build()
    }

    #[test]
    fn test_views_are_cached() {
        let module = module_with(vec![fragment("a.b", "C")]);
        let first = module.package(&FqName::new("a.b")).unwrap();
        let second = module.package(&FqName::new("a.b")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(module.package(&FqName::new("a.x")).is_none());
    }

    #[test]
    fn test_root_view_exists_and_has_no_parent() {
        let module = module_with(Vec::new());
        let root = module.package(&FqName::root()).unwrap();
        assert!(root.containing_view().is_none());
        assert_eq!(root.name().as_str(), "<root>");
    }

    #[test]
    fn test_parent_view_is_lazy() {
        let module = module_with(vec![fragment("a.b", "C")]);
        let view = module.package(&FqName::new("a.b")).unwrap();

        let parent = LazyPackageView::new(Arc::downgrade(&module), FqName::new("a"));
        assert!(!parent.is_resolved());
        assert_eq!(parent.fq_name(), &FqName::new("a"));
        assert!(!parent.is_resolved());
        assert_eq!(parent.fragments().len(), 1);
        assert!(parent.is_resolved());

        let containing = view.containing_view().unwrap();
        assert_eq!(containing.fq_name(), &FqName::new("a"));
        assert_eq!(
            containing.containing_view().unwrap().fq_name(),
            &FqName::root()
        );
    }

    #[test]
    fn test_scope_exposes_members_and_subpackages() {
        let module = module_with(vec![fragment("a.b", "C")]);
        let a = module.package(&FqName::new("a")).unwrap();
        let scope = a.member_scope();

        let b = scope.package(&Name::identifier("b")).unwrap();
        assert!(Arc::ptr_eq(&b, &module.package(&FqName::new("a.b")).unwrap()));
        assert!(b.member_scope().classifier(&Name::identifier("C")).is_some());
        assert!(scope.package(&Name::identifier("z")).is_none());
    }
}
