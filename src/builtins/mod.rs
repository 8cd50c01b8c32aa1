//! Built-in declarations: the well-known packages and classes every module
//! sees, and the synthetic `FunctionN`/`KFunctionN` classes.
//!
//! The library module declares the un-numbered bases (`Function`,
//! `KFunction`, `KMemberFunction`, `KExtensionFunction`) directly. Numbered
//! variants are produced on demand by [`BuiltInFictitiousFunctionClassFactory`],
//! which is registered on the library's `kotlin` and `kotlin.reflect`
//! fragments.

mod factory;
mod functions;

use std::sync::Arc;

pub use factory::BuiltInFictitiousFunctionClassFactory;
pub use functions::{FunctionClassDescriptor, FunctionKind};

use crate::base::{ClassId, FqName, ImportPath, ModuleError, Name};
use crate::descriptors::{
    AnnotationDescriptor, ClassBuilder, ClassDescriptor, ClassDescriptorFactory, ClassKind,
    KotlinType, Modality, ModuleDescriptor, PackageFragment, PackageFragmentProviderImpl, PlatformClassMap,
    Variance,
};

/// Names and packages of the built-in declarations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltIns {
    builtins_package: FqName,
    reflect_package: FqName,
    any_name: Name,
    extension_annotation_name: Name,
}

impl Default for BuiltIns {
    fn default() -> Self {
        Self::new(FqName::new("kotlin"), FqName::new("kotlin.reflect"))
    }
}

impl BuiltIns {
    pub fn new(builtins_package: FqName, reflect_package: FqName) -> Self {
        Self {
            builtins_package,
            reflect_package,
            any_name: Name::identifier("Any"),
            extension_annotation_name: Name::identifier("extension"),
        }
    }

    /// The package holding `Any`, `Function` and `FunctionN`.
    pub fn builtins_package(&self) -> &FqName {
        &self.builtins_package
    }

    /// The package holding the reflective function kinds.
    pub fn reflect_package(&self) -> &FqName {
        &self.reflect_package
    }

    /// The package a function kind's classes live in.
    pub fn package_of(&self, kind: FunctionKind) -> &FqName {
        if kind.is_reflective() {
            &self.reflect_package
        } else {
            &self.builtins_package
        }
    }

    /// Name of the un-numbered base interface of `kind`, e.g. `KMemberFunction`.
    pub fn base_interface_name(&self, kind: FunctionKind) -> Name {
        Name::identifier(kind.prefix())
    }

    pub fn base_interface(&self, kind: FunctionKind) -> ClassId {
        ClassId::top_level(self.package_of(kind).clone(), self.base_interface_name(kind))
    }

    pub fn any(&self) -> ClassId {
        ClassId::top_level(self.builtins_package.clone(), self.any_name.clone())
    }

    /// `Any?`, the bound of every type parameter without an explicit one.
    pub fn default_bound(&self) -> KotlinType {
        KotlinType::simple(self.any()).make_nullable()
    }

    /// Marks a function type as callable with its receiver before the dot.
    pub fn extension_annotation(&self) -> AnnotationDescriptor {
        AnnotationDescriptor {
            class_id: ClassId::top_level(
                self.builtins_package.clone(),
                self.extension_annotation_name.clone(),
            ),
        }
    }

    /// Packages imported into every file.
    pub fn default_imports(&self) -> Vec<ImportPath> {
        vec![
            ImportPath::new(self.builtins_package.clone(), true),
            ImportPath::new(self.reflect_package.clone(), true),
        ]
    }
}

/// The built-in package fragments for `module`.
///
/// Declares `Any`, `extension` and the un-numbered function interfaces, and
/// registers the function class factory on both function packages.
pub fn library_fragments(
    module: &Arc<ModuleDescriptor>,
    builtins: &Arc<BuiltIns>,
) -> Vec<Arc<PackageFragment>> {
    let factory: Arc<dyn ClassDescriptorFactory> = Arc::new(
        BuiltInFictitiousFunctionClassFactory::new(module, Arc::clone(builtins)),
    );
    let module_name = module.name().clone();
    let bound = builtins.default_bound();

    let any = ClassBuilder::new(builtins.any(), ClassKind::Class)
        .modality(Modality::Open)
        .build();
    let extension = ClassBuilder::new(
        builtins.extension_annotation().class_id,
        ClassKind::AnnotationClass,
    )
    .build();

    let base = |kind: FunctionKind, receiver: Option<(&str, Variance)>| -> Arc<dyn ClassDescriptor> {
        let mut class = ClassBuilder::new(builtins.base_interface(kind), ClassKind::Interface)
            .default_bound(bound.clone());
        if let Some((name, variance)) = receiver {
            class = class.type_parameter(name, variance);
        }
        class.type_parameter("R", Variance::Out).build()
    };

    let kotlin = PackageFragment::builder(builtins.builtins_package().clone(), module_name.clone())
        .class(any)
        .class(extension)
        .class(base(FunctionKind::Function, None))
        .class_factory(Arc::clone(&factory))
        .build();

    let reflect = PackageFragment::builder(builtins.reflect_package().clone(), module_name)
        .class(base(FunctionKind::KFunction, None))
        .class(base(FunctionKind::KMemberFunction, Some(("T", Variance::In))))
        .class(base(FunctionKind::KExtensionFunction, Some(("E", Variance::In))))
        .class_factory(factory)
        .build();

    vec![kotlin, reflect]
}

/// A sealed, initialized module holding only the built-in library.
pub fn create_library_module(builtins: Arc<BuiltIns>) -> Result<Arc<ModuleDescriptor>, ModuleError> {
    let module = ModuleDescriptor::new(
        Name::special("built-ins"),
        builtins.default_imports(),
        PlatformClassMap::empty(),
    )?;
    module.add_dependency_on_module(&module)?;

    let fragments = library_fragments(&module, &builtins);
    let provider = PackageFragmentProviderImpl::new(module.name(), fragments);
    module.initialize_with_default_views(Arc::new(provider))?;
    module.seal()?;

    tracing::debug!(module = %module.name(), "built-in library module ready");
    Ok(module)
}
