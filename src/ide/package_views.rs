//! Package views backed by the project index.
//!
//! In the editor, a package exists for a source module only if the project
//! index knows about it in the module's dependency scope. The built-ins
//! package is always visible through its library fragment.

use std::sync::{Arc, Weak};

use crate::base::{FqName, Name};
use crate::descriptors::{
    ModuleDescriptor, PackageFragment, PackageViewDescriptor, PackageViewImpl, PackageViewManager,
    PackageViewManagerImpl,
};
use crate::storage::{MemoizedFunction, SessionCache, SessionToken};

/// Where a module's content comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModuleInfo {
    /// Sources of a project module, production or test.
    Source { name: Name, tests: bool },
    /// A binary library.
    Library { name: Name },
    /// The platform SDK.
    Sdk,
}

impl ModuleInfo {
    pub fn is_source(&self) -> bool {
        matches!(self, ModuleInfo::Source { .. })
    }
}

/// The project's package index.
///
/// `session` identifies the index generation: when it changes, every answer
/// computed under the previous token is discarded.
pub trait ProjectPackageIndex: Send + Sync {
    fn session(&self) -> SessionToken;

    /// Whether `fq_name` has any content visible from `module` (its sources,
    /// dependencies and libraries). Never asked about the root package,
    /// which always exists.
    fn package_exists(&self, module: &ModuleInfo, fq_name: &FqName) -> bool;
}

type ViewTable = Arc<MemoizedFunction<FqName, Option<Arc<dyn PackageViewDescriptor>>>>;

/// Package view manager for source modules opened in the editor.
///
/// Views are memoized per session: a query under a new token drops the
/// whole table and starts over. Subpackage and parent queries go to the
/// default manager.
pub struct IdePackageViewManager {
    module: Weak<ModuleDescriptor>,
    info: ModuleInfo,
    index: Arc<dyn ProjectPackageIndex>,
    builtins_fragment: Arc<PackageFragment>,
    delegate: Arc<PackageViewManagerImpl>,
    packages: SessionCache<ViewTable>,
}

impl IdePackageViewManager {
    /// The manager to initialize `module` with: index-backed for source
    /// modules, the default manager for everything else.
    pub fn create(
        module: &Arc<ModuleDescriptor>,
        info: ModuleInfo,
        index: Arc<dyn ProjectPackageIndex>,
        builtins_fragment: Arc<PackageFragment>,
    ) -> Arc<dyn PackageViewManager> {
        let delegate = Arc::new(PackageViewManagerImpl::new(module));
        if !info.is_source() {
            return delegate;
        }
        Arc::new(Self {
            module: Arc::downgrade(module),
            info,
            index,
            builtins_fragment,
            delegate,
            packages: SessionCache::new(),
        })
    }

    /// Look up `fq_name` in the view table for `session`.
    pub fn package_in_session(
        &self,
        session: SessionToken,
        fq_name: &FqName,
    ) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.packages.get(session, || self.new_table()).get(fq_name)
    }

    fn new_table(&self) -> ViewTable {
        let module = self.module.clone();
        let info = self.info.clone();
        let index = Arc::clone(&self.index);
        let builtins_fragment = Arc::clone(&self.builtins_fragment);
        let delegate = Arc::clone(&self.delegate);

        Arc::new(MemoizedFunction::new(move |fq_name: &FqName| {
            if fq_name.is_root() || index.package_exists(&info, fq_name) {
                return delegate.package(fq_name);
            }
            if fq_name == builtins_fragment.fq_name() {
                let module = module.upgrade()?;
                let view: Arc<dyn PackageViewDescriptor> = PackageViewImpl::new(
                    &module,
                    fq_name.clone(),
                    vec![Arc::clone(&builtins_fragment)],
                );
                return Some(view);
            }
            tracing::trace!(package = %fq_name, "package not in project index");
            None
        }))
    }
}

impl PackageViewManager for IdePackageViewManager {
    fn package(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.package_in_session(self.index.session(), fq_name)
    }

    fn sub_packages_of(&self, fq_name: &FqName, name_filter: &dyn Fn(&Name) -> bool) -> Vec<FqName> {
        self.delegate.sub_packages_of(fq_name, name_filter)
    }

    fn parent_view(&self, fq_name: &FqName) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.delegate.parent_view(fq_name)
    }
}
