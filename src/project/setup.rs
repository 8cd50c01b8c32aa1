//! Module graph construction.
//!
//! Modules are declared up front with [`ModuleSpec`]s; [`ProjectBuilder::build`]
//! then creates every module, wires dependencies and friends, initializes
//! content and seals the lot. The resulting [`Project`] is read-only and
//! safe to query from many threads.

use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;

use crate::base::{ClassId, FqName, ModuleError, Name};
use crate::builtins::{BuiltIns, create_library_module};
use crate::descriptors::{
    FragmentBuilder, ModuleDescriptor, PackageFragment, PackageFragmentProviderImpl,
    PlatformClassMap, single_package_fragment,
};
use crate::ide::{IdePackageViewManager, ModuleInfo, ProjectPackageIndex};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("module {0} is declared twice")]
    DuplicateModule(Name),

    #[error("module {module} depends on undeclared module {dependency}")]
    UnknownDependency { module: Name, dependency: Name },

    #[error(transparent)]
    Module(#[from] ModuleError),
}

type PackageBuild = Box<dyn FnOnce(FragmentBuilder) -> FragmentBuilder>;

/// Declaration of one module.
pub struct ModuleSpec {
    name: Name,
    info: ModuleInfo,
    packages: Vec<(FqName, PackageBuild)>,
    dependencies: Vec<Name>,
    friends: Vec<Name>,
    platform_classes: PlatformClassMap,
}

impl ModuleSpec {
    /// A source module; `name` is wrapped as a special name.
    pub fn new(name: &str) -> Self {
        Self {
            name: Name::special(name),
            info: ModuleInfo::Source {
                name: Name::identifier(name),
                tests: false,
            },
            packages: Vec::new(),
            dependencies: Vec::new(),
            friends: Vec::new(),
            platform_classes: PlatformClassMap::empty(),
        }
    }

    pub fn info(mut self, info: ModuleInfo) -> Self {
        self.info = info;
        self
    }

    /// Contribute a fragment of package `fq_name`.
    pub fn package(
        mut self,
        fq_name: &str,
        build: impl FnOnce(FragmentBuilder) -> FragmentBuilder + 'static,
    ) -> Self {
        self.packages.push((FqName::new(fq_name), Box::new(build)));
        self
    }

    pub fn depends_on(mut self, module: &str) -> Self {
        self.dependencies.push(Name::special(module));
        self
    }

    pub fn friend(mut self, module: &str) -> Self {
        self.friends.push(Name::special(module));
        self
    }

    pub fn platform_class(mut self, platform_class: FqName, class_id: ClassId) -> Self {
        self.platform_classes.insert(platform_class, class_id);
        self
    }
}

pub struct ProjectBuilder {
    builtins: Arc<BuiltIns>,
    specs: Vec<ModuleSpec>,
    index: Option<Arc<dyn ProjectPackageIndex>>,
}

impl ProjectBuilder {
    pub fn new(builtins: BuiltIns) -> Self {
        Self {
            builtins: Arc::new(builtins),
            specs: Vec::new(),
            index: None,
        }
    }

    pub fn module(mut self, spec: ModuleSpec) -> Self {
        self.specs.push(spec);
        self
    }

    /// Answer package existence for source modules from `index`.
    pub fn package_index(mut self, index: Arc<dyn ProjectPackageIndex>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn build(self) -> Result<Project, SetupError> {
        let library = create_library_module(Arc::clone(&self.builtins))?;

        let mut modules: IndexMap<Name, Arc<ModuleDescriptor>> = IndexMap::new();
        for spec in &self.specs {
            if modules.contains_key(&spec.name) {
                return Err(SetupError::DuplicateModule(spec.name.clone()));
            }
            let module = ModuleDescriptor::new(
                spec.name.clone(),
                self.builtins.default_imports(),
                spec.platform_classes.clone(),
            )?;
            modules.insert(spec.name.clone(), module);
        }

        let lookup = |owner: &Name, name: &Name| {
            modules
                .get(name)
                .cloned()
                .ok_or_else(|| SetupError::UnknownDependency {
                    module: owner.clone(),
                    dependency: name.clone(),
                })
        };

        for spec in &self.specs {
            let module = lookup(&spec.name, &spec.name)?;
            module.add_dependency_on_module(&module)?;
            for dependency in &spec.dependencies {
                module.add_dependency_on_module(&lookup(&spec.name, dependency)?)?;
            }
            module.add_dependency_on_module(&library)?;
            for friend in &spec.friends {
                module.add_friend(&lookup(&spec.name, friend)?)?;
            }
        }

        let builtins_fragment = single_package_fragment(
            library.package_fragment_provider().as_ref(),
            self.builtins.builtins_package(),
        );

        for spec in self.specs {
            let module = lookup(&spec.name, &spec.name)?;
            let fragments: Vec<Arc<PackageFragment>> = spec
                .packages
                .into_iter()
                .map(|(fq_name, build)| {
                    build(PackageFragment::builder(fq_name, spec.name.clone())).build()
                })
                .collect();
            let content = Arc::new(PackageFragmentProviderImpl::new(&spec.name, fragments));

            match &self.index {
                Some(index) => {
                    let views = IdePackageViewManager::create(
                        &module,
                        spec.info,
                        Arc::clone(index),
                        Arc::clone(&builtins_fragment),
                    );
                    module.initialize(content, views)?;
                }
                None => module.initialize_with_default_views(content)?,
            }
            module.seal()?;
            tracing::debug!(module = %spec.name, "module ready");
        }

        Ok(Project {
            builtins: self.builtins,
            library,
            modules,
        })
    }
}

/// A fully constructed module graph. Owns every module.
#[derive(Debug)]
pub struct Project {
    builtins: Arc<BuiltIns>,
    library: Arc<ModuleDescriptor>,
    modules: IndexMap<Name, Arc<ModuleDescriptor>>,
}

impl Project {
    pub fn builtins(&self) -> &Arc<BuiltIns> {
        &self.builtins
    }

    /// The module holding the built-in library.
    pub fn library(&self) -> &Arc<ModuleDescriptor> {
        &self.library
    }

    /// Look up a declared module by its plain name (`"app"`, not `"<app>"`).
    pub fn module(&self, name: &str) -> Option<&Arc<ModuleDescriptor>> {
        self.modules.get(&Name::special(name))
    }

    /// Declared modules, in declaration order.
    pub fn modules(&self) -> impl Iterator<Item = &Arc<ModuleDescriptor>> {
        self.modules.values()
    }
}
