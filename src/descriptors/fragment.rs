//! Package fragments and the providers that hand them out.
//!
//! A fragment is the part of one package contributed by one module. A
//! provider answers "which fragments does this module have for `a.b`".

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::{
    ClassDescriptor, ClassDescriptorFactory, DeclaredScope, Descriptor, FunctionDescriptor,
    MemberScope, PropertyDescriptor,
};
use crate::base::{ClassId, FqName, InternalError, Name, fatal};
use crate::storage::MemoizedFunction;

// ============================================================================
// PACKAGE FRAGMENT
// ============================================================================

/// One module's contribution to a package.
pub struct PackageFragment {
    fq_name: FqName,
    module_name: Name,
    scope: Arc<FragmentScope>,
}

impl PackageFragment {
    pub fn builder(fq_name: FqName, module_name: Name) -> FragmentBuilder {
        FragmentBuilder {
            fq_name,
            module_name,
            declared: DeclaredScope::new(),
            factories: Vec::new(),
        }
    }

    /// A fragment with no members.
    pub fn empty(fq_name: FqName, module_name: Name) -> Arc<Self> {
        Self::builder(fq_name, module_name).build()
    }

    pub fn fq_name(&self) -> &FqName {
        &self.fq_name
    }

    /// Name of the module that contributed this fragment.
    pub fn module_name(&self) -> &Name {
        &self.module_name
    }

    pub fn member_scope(&self) -> Arc<dyn MemberScope> {
        self.scope.clone()
    }
}

impl fmt::Debug for PackageFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PackageFragment({} in {})", self.fq_name, self.module_name)
    }
}

pub struct FragmentBuilder {
    fq_name: FqName,
    module_name: Name,
    declared: DeclaredScope,
    factories: Vec<Arc<dyn ClassDescriptorFactory>>,
}

impl FragmentBuilder {
    pub fn class(mut self, class: Arc<dyn ClassDescriptor>) -> Self {
        self.declared.add_class(class);
        self
    }

    pub fn function(mut self, function: FunctionDescriptor) -> Self {
        self.declared.add_function(Arc::new(function));
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.declared.add_property(Arc::new(property));
        self
    }

    /// Register a factory consulted for names that are not declared.
    pub fn class_factory(mut self, factory: Arc<dyn ClassDescriptorFactory>) -> Self {
        self.factories.push(factory);
        self
    }

    pub fn build(self) -> Arc<PackageFragment> {
        let package = self.fq_name.clone();
        let factories = self.factories;
        let synthesized = MemoizedFunction::new(move |name: &Name| {
            let class_id = ClassId::top_level(package.clone(), name.clone());
            factories
                .iter()
                .find_map(|factory| factory.create_class(&class_id))
        });

        Arc::new(PackageFragment {
            fq_name: self.fq_name,
            module_name: self.module_name,
            scope: Arc::new(FragmentScope {
                declared: self.declared,
                synthesized,
            }),
        })
    }
}

/// Declared members first, then the (cached) class factories.
struct FragmentScope {
    declared: DeclaredScope,
    synthesized: MemoizedFunction<Name, Option<Arc<dyn ClassDescriptor>>>,
}

impl MemberScope for FragmentScope {
    fn classifier(&self, name: &Name) -> Option<Arc<dyn ClassDescriptor>> {
        self.declared
            .classifier(name)
            .or_else(|| self.synthesized.get(name))
    }

    fn functions(&self, name: &Name) -> Vec<Arc<FunctionDescriptor>> {
        self.declared.functions(name)
    }

    fn properties(&self, name: &Name) -> Vec<Arc<PropertyDescriptor>> {
        self.declared.properties(name)
    }

    fn all_descriptors(&self) -> Vec<Descriptor> {
        self.declared.all_descriptors()
    }
}

// ============================================================================
// PROVIDERS
// ============================================================================

/// Source of package fragments for one module (or a set of modules).
pub trait PackageFragmentProvider: Send + Sync {
    /// All fragments for `fq_name`. Fragments are immutable once handed out.
    fn package_fragments(&self, fq_name: &FqName) -> Vec<Arc<PackageFragment>>;

    /// Direct subpackages of `fq_name` whose short name passes `name_filter`.
    fn sub_packages_of(&self, fq_name: &FqName, name_filter: &dyn Fn(&Name) -> bool)
    -> Vec<FqName>;
}

/// The sole fragment `provider` holds for `fq_name`.
///
/// Zero or several fragments mean the library is malformed, which is fatal.
pub fn single_package_fragment(
    provider: &dyn PackageFragmentProvider,
    fq_name: &FqName,
) -> Arc<PackageFragment> {
    let mut fragments = provider.package_fragments(fq_name);
    if fragments.len() != 1 {
        fatal(InternalError::FragmentCount {
            package: fq_name.clone(),
            found: fragments.len(),
        });
    }
    fragments.swap_remove(0)
}

/// A fixed set of fragments belonging to one module.
///
/// Every ancestor of a supplied fragment's package (up to and including the
/// root) is known to exist; missing ancestors get empty fragments.
#[derive(Debug, Default)]
pub struct PackageFragmentProviderImpl {
    fragments: IndexMap<FqName, Vec<Arc<PackageFragment>>>,
}

impl PackageFragmentProviderImpl {
    pub fn new(
        module_name: &Name,
        fragments: impl IntoIterator<Item = Arc<PackageFragment>>,
    ) -> Self {
        let mut by_name: IndexMap<FqName, Vec<Arc<PackageFragment>>> = IndexMap::new();
        by_name.insert(FqName::root(), Vec::new());

        for fragment in fragments {
            let mut ancestor = fragment.fq_name().parent();
            while let Some(fq) = ancestor {
                ancestor = fq.parent();
                by_name.entry(fq).or_default();
            }
            by_name
                .entry(fragment.fq_name().clone())
                .or_default()
                .push(fragment);
        }

        for (fq_name, list) in by_name.iter_mut() {
            if list.is_empty() {
                list.push(PackageFragment::empty(fq_name.clone(), module_name.clone()));
            }
        }

        Self { fragments: by_name }
    }

    /// Every package this provider knows about.
    pub fn packages(&self) -> impl Iterator<Item = &FqName> {
        self.fragments.keys()
    }
}

impl PackageFragmentProvider for PackageFragmentProviderImpl {
    fn package_fragments(&self, fq_name: &FqName) -> Vec<Arc<PackageFragment>> {
        self.fragments.get(fq_name).cloned().unwrap_or_default()
    }

    fn sub_packages_of(
        &self,
        fq_name: &FqName,
        name_filter: &dyn Fn(&Name) -> bool,
    ) -> Vec<FqName> {
        self.fragments
            .keys()
            .filter(|candidate| candidate.parent().as_ref() == Some(fq_name))
            .filter(|candidate| candidate.short_name().is_some_and(|n| name_filter(&n)))
            .cloned()
            .collect()
    }
}

/// Concatenation of several providers, in order.
#[derive(Default)]
pub struct CompositePackageFragmentProvider {
    providers: Vec<Arc<dyn PackageFragmentProvider>>,
}

impl CompositePackageFragmentProvider {
    pub fn new(providers: Vec<Arc<dyn PackageFragmentProvider>>) -> Self {
        Self { providers }
    }
}

impl PackageFragmentProvider for CompositePackageFragmentProvider {
    fn package_fragments(&self, fq_name: &FqName) -> Vec<Arc<PackageFragment>> {
        self.providers
            .iter()
            .flat_map(|provider| provider.package_fragments(fq_name))
            .collect()
    }

    fn sub_packages_of(
        &self,
        fq_name: &FqName,
        name_filter: &dyn Fn(&Name) -> bool,
    ) -> Vec<FqName> {
        let mut result = IndexSet::new();
        for provider in &self.providers {
            result.extend(provider.sub_packages_of(fq_name, name_filter));
        }
        result.into_iter().collect()
    }
}
