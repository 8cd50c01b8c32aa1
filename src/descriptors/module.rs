//! Modules and their seal/initialize lifecycle.
//!
//! A module is configured up front (dependencies, friends), then sealed and
//! initialized in either order, then queried. Sealing happens implicitly on
//! the first content query.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{
    CompositePackageFragmentProvider, PackageFragmentProvider, PackageViewDescriptor,
    PackageViewManager, PackageViewManagerImpl,
};
use crate::base::{ClassId, FqName, ImportPath, InternalError, ModuleError, Name, fatal};
use crate::storage::LazyValue;

/// Maps platform classes (e.g. `java.lang.String`) to the language classes
/// they are seen as.
#[derive(Clone, Debug, Default)]
pub struct PlatformClassMap {
    mapping: FxHashMap<FqName, Vec<ClassId>>,
}

impl PlatformClassMap {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, platform_class: FqName, class_id: ClassId) {
        self.mapping.entry(platform_class).or_default().push(class_id);
    }

    pub fn map_platform_class(&self, platform_class: &FqName) -> &[ClassId] {
        self.mapping
            .get(platform_class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

/// A dependency edge. The name is kept so a dropped dependency can still be
/// reported.
#[derive(Clone)]
struct ModuleRef {
    name: Name,
    module: Weak<ModuleDescriptor>,
}

impl ModuleRef {
    fn new(module: &Arc<ModuleDescriptor>) -> Self {
        Self {
            name: module.name.clone(),
            module: Arc::downgrade(module),
        }
    }

    fn is(&self, module: &ModuleDescriptor) -> bool {
        std::ptr::eq(self.module.as_ptr(), module)
    }

    fn upgrade(&self) -> Arc<ModuleDescriptor> {
        self.module.upgrade().unwrap_or_else(|| {
            fatal(InternalError::DependencyDropped {
                module: self.name.clone(),
            })
        })
    }
}

#[derive(Default)]
struct ModuleState {
    sealed: bool,
    dependencies: Vec<ModuleRef>,
    friends: Vec<ModuleRef>,
    content: Option<Arc<dyn PackageFragmentProvider>>,
    view_manager: Option<Arc<dyn PackageViewManager>>,
}

/// A compilation unit: its own content plus a view over its dependencies.
pub struct ModuleDescriptor {
    name: Name,
    default_imports: Vec<ImportPath>,
    platform_class_map: PlatformClassMap,
    state: RwLock<ModuleState>,
    whole_module_provider: LazyValue<Arc<dyn PackageFragmentProvider>>,
}

impl ModuleDescriptor {
    /// Create an empty, unsealed, uninitialized module. `name` must be special.
    pub fn new(
        name: Name,
        default_imports: Vec<ImportPath>,
        platform_class_map: PlatformClassMap,
    ) -> Result<Arc<Self>, ModuleError> {
        if !name.is_special() {
            return Err(ModuleError::NameNotSpecial(name));
        }
        Ok(Arc::new(Self {
            name,
            default_imports,
            platform_class_map,
            state: RwLock::new(ModuleState::default()),
            whole_module_provider: LazyValue::new(),
        }))
    }

    /// A module with no default imports and an empty platform map.
    pub fn named(name: Name) -> Result<Arc<Self>, ModuleError> {
        Self::new(name, Vec::new(), PlatformClassMap::empty())
    }

    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn default_imports(&self) -> &[ImportPath] {
        &self.default_imports
    }

    pub fn platform_class_map(&self) -> &PlatformClassMap {
        &self.platform_class_map
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Add `dependency` (possibly this module itself) to the dependency list.
    pub fn add_dependency_on_module(
        &self,
        dependency: &Arc<ModuleDescriptor>,
    ) -> Result<(), ModuleError> {
        let mut state = self.state.write();
        if state.sealed {
            return Err(ModuleError::ModifySealed {
                module: self.name.clone(),
            });
        }
        if state.dependencies.iter().any(|d| d.is(dependency)) {
            return Err(ModuleError::DuplicateDependency {
                module: self.name.clone(),
                dependency: dependency.name.clone(),
            });
        }
        state.dependencies.push(ModuleRef::new(dependency));
        Ok(())
    }

    pub fn add_friend(&self, friend: &Arc<ModuleDescriptor>) -> Result<(), ModuleError> {
        if std::ptr::eq(Arc::as_ptr(friend), self) {
            return Err(ModuleError::FriendToSelf {
                module: self.name.clone(),
            });
        }
        let mut state = self.state.write();
        if state.sealed {
            return Err(ModuleError::FriendAfterSeal {
                module: self.name.clone(),
                friend: friend.name.clone(),
            });
        }
        if !state.friends.iter().any(|f| f.is(friend)) {
            state.friends.push(ModuleRef::new(friend));
        }
        Ok(())
    }

    /// Whether `other` may see this module's internal declarations.
    pub fn is_friend(&self, other: &ModuleDescriptor) -> bool {
        std::ptr::eq(other, self) || self.state.read().friends.iter().any(|f| f.is(other))
    }

    /// Freeze dependencies and friends. Idempotent.
    pub fn seal(&self) -> Result<(), ModuleError> {
        let mut state = self.state.write();
        if state.sealed {
            return Ok(());
        }
        if !state.dependencies.iter().any(|d| d.is(self)) {
            return Err(ModuleError::MissingSelfDependency {
                module: self.name.clone(),
            });
        }
        state.sealed = true;
        tracing::debug!(module = %self.name, dependencies = state.dependencies.len(), "module sealed");
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.state.read().sealed
    }

    /// Set the module's own content. Allowed exactly once, before or after sealing.
    pub fn initialize(
        &self,
        content: Arc<dyn PackageFragmentProvider>,
        view_manager: Arc<dyn PackageViewManager>,
    ) -> Result<(), ModuleError> {
        let mut state = self.state.write();
        if state.content.is_some() {
            return Err(ModuleError::AlreadyInitialized {
                module: self.name.clone(),
            });
        }
        state.content = Some(content);
        state.view_manager = Some(view_manager);
        tracing::debug!(module = %self.name, "module initialized");
        Ok(())
    }

    /// [`initialize`](Self::initialize) with a [`PackageViewManagerImpl`].
    pub fn initialize_with_default_views(
        self: &Arc<Self>,
        content: Arc<dyn PackageFragmentProvider>,
    ) -> Result<(), ModuleError> {
        let view_manager = Arc::new(PackageViewManagerImpl::new(self));
        self.initialize(content, view_manager)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().content.is_some()
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Dependencies in declaration order, this module included.
    pub fn dependencies(&self) -> Vec<Arc<ModuleDescriptor>> {
        let refs = self.state.read().dependencies.clone();
        refs.iter().map(ModuleRef::upgrade).collect()
    }

    /// This module's own content, without dependencies.
    pub fn content_provider(&self) -> Option<Arc<dyn PackageFragmentProvider>> {
        self.state.read().content.clone()
    }

    /// Fragments of this module and all its dependencies.
    ///
    /// Seals the module. Every dependency must be initialized by now.
    pub fn package_fragment_provider(&self) -> Arc<dyn PackageFragmentProvider> {
        let provider = self.whole_module_provider.get_or_compute(|| {
            self.compose_provider()
                .unwrap_or_else(|error| fatal(error.into()))
        });
        Arc::clone(provider)
    }

    fn compose_provider(&self) -> Result<Arc<dyn PackageFragmentProvider>, ModuleError> {
        self.seal()?;

        let (own_content, refs) = {
            let state = self.state.read();
            (state.content.clone(), state.dependencies.clone())
        };

        let mut providers = Vec::with_capacity(refs.len());
        for dependency in &refs {
            let content = if dependency.is(self) {
                own_content.clone()
            } else {
                dependency.upgrade().content_provider()
            };
            match content {
                Some(content) => providers.push(content),
                None if dependency.is(self) => {
                    return Err(ModuleError::NotInitialized {
                        module: self.name.clone(),
                    });
                }
                None => {
                    return Err(ModuleError::DependencyNotInitialized {
                        module: self.name.clone(),
                        dependency: dependency.name.clone(),
                    });
                }
            }
        }

        tracing::trace!(module = %self.name, providers = providers.len(), "composed module content");
        Ok(Arc::new(CompositePackageFragmentProvider::new(providers)))
    }

    pub fn package_view_manager(&self) -> Arc<dyn PackageViewManager> {
        let manager = self.state.read().view_manager.clone();
        manager.unwrap_or_else(|| {
            fatal(
                ModuleError::NotInitialized {
                    module: self.name.clone(),
                }
                .into(),
            )
        })
    }

    /// The view of `fq_name` as seen from this module, if the package exists.
    pub fn package(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.package_view_manager().package(fq_name)
    }

    pub fn sub_packages_of(
        &self,
        fq_name: &FqName,
        name_filter: &dyn Fn(&Name) -> bool,
    ) -> Vec<FqName> {
        self.package_view_manager().sub_packages_of(fq_name, name_filter)
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("sealed", &state.sealed)
            .field("initialized", &state.content.is_some())
            .field(
                "dependencies",
                &state.dependencies.iter().map(|d| &d.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptors::{PackageFragment, PackageFragmentProviderImpl};

    fn module(name: &str) -> Arc<ModuleDescriptor> {
        ModuleDescriptor::named(Name::special(name)).unwrap()
    }

    fn content(module: &Arc<ModuleDescriptor>, packages: &[&str]) -> Arc<dyn PackageFragmentProvider> {
        Arc::new(PackageFragmentProviderImpl::new(
            module.name(),
            packages
                .iter()
                .map(|p| PackageFragment::empty(FqName::new(p), module.name().clone())),
        ))
    }

    #[test]
    fn test_name_must_be_special() {
        let err = ModuleDescriptor::named(Name::identifier("main")).unwrap_err();
        assert_eq!(err, ModuleError::NameNotSpecial(Name::identifier("main")));
    }

    #[test]
    fn test_seal_requires_self_dependency() {
        let m = module("m");
        assert_eq!(
            m.seal(),
            Err(ModuleError::MissingSelfDependency {
                module: Name::special("m")
            })
        );
        assert!(!m.is_sealed());
    }

    #[test]
    fn test_seal_is_idempotent() {
        let m = module("m");
        m.add_dependency_on_module(&m).unwrap();
        m.seal().unwrap();
        m.seal().unwrap();
        assert!(m.is_sealed());
        assert_eq!(m.dependencies().len(), 1);
    }

    #[test]
    fn test_sealed_module_rejects_changes() {
        let m = module("m");
        let other = module("other");
        m.add_dependency_on_module(&m).unwrap();
        m.seal().unwrap();

        assert!(matches!(
            m.add_dependency_on_module(&other),
            Err(ModuleError::ModifySealed { .. })
        ));
        assert!(matches!(
            m.add_friend(&other),
            Err(ModuleError::FriendAfterSeal { .. })
        ));
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let m = module("m");
        let lib = module("lib");
        m.add_dependency_on_module(&lib).unwrap();
        assert!(matches!(
            m.add_dependency_on_module(&lib),
            Err(ModuleError::DuplicateDependency { .. })
        ));
    }

    #[test]
    fn test_friends() {
        let m = module("m");
        let tests = module("tests");
        let stranger = module("stranger");
        assert!(matches!(m.add_friend(&m), Err(ModuleError::FriendToSelf { .. })));
        m.add_friend(&tests).unwrap();

        assert!(m.is_friend(&m));
        assert!(m.is_friend(&tests));
        assert!(!m.is_friend(&stranger));
    }

    #[test]
    fn test_initialize_twice_fails() {
        let m = module("m");
        m.add_dependency_on_module(&m).unwrap();
        m.initialize_with_default_views(content(&m, &[])).unwrap();
        assert!(m.is_initialized());
        assert!(matches!(
            m.initialize_with_default_views(content(&m, &[])),
            Err(ModuleError::AlreadyInitialized { .. })
        ));
    }

    #[test]
    fn test_initialize_then_seal_in_any_order() {
        let m = module("m");
        m.initialize_with_default_views(content(&m, &["a"])).unwrap();
        m.add_dependency_on_module(&m).unwrap();
        assert!(!m.is_sealed());

        // Querying content seals implicitly.
        assert!(m.package(&FqName::new("a")).is_some());
        assert!(m.is_sealed());
    }

    #[test]
    fn test_provider_merges_dependencies() {
        let lib = module("lib");
        lib.add_dependency_on_module(&lib).unwrap();
        lib.initialize_with_default_views(content(&lib, &["a"])).unwrap();

        let m = module("m");
        m.add_dependency_on_module(&m).unwrap();
        m.add_dependency_on_module(&lib).unwrap();
        m.initialize_with_default_views(content(&m, &["a", "b"])).unwrap();

        let provider = m.package_fragment_provider();
        assert_eq!(provider.package_fragments(&FqName::new("a")).len(), 2);
        assert_eq!(provider.package_fragments(&FqName::new("b")).len(), 1);
        assert_eq!(
            m.sub_packages_of(&FqName::root(), &|_| true),
            vec![FqName::new("a"), FqName::new("b")]
        );
    }

    #[test]
    #[should_panic(expected = "dependency <lib> of module <m> is not initialized")]
    fn test_uninitialized_dependency_is_fatal() {
        let lib = module("lib");
        let m = module("m");
        m.add_dependency_on_module(&m).unwrap();
        m.add_dependency_on_module(&lib).unwrap();
        m.initialize_with_default_views(content(&m, &[])).unwrap();

        m.package_fragment_provider();
    }

    #[test]
    fn test_platform_class_map() {
        let mut map = PlatformClassMap::empty();
        let string = ClassId::top_level(FqName::new("kotlin"), Name::identifier("String"));
        map.insert(FqName::new("java.lang.String"), string.clone());

        assert_eq!(map.map_platform_class(&FqName::new("java.lang.String")), &[string]);
        assert!(map.map_platform_class(&FqName::new("java.lang.Object")).is_empty());
    }
}
