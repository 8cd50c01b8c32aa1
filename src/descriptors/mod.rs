//! Descriptor model: packages, modules, classes and their members.
//!
//! Descriptors are immutable views over declarations. Anything derived
//! (type parameters of a synthetic class, the fragments behind a package
//! view) is computed lazily through [`crate::storage`] and cached.
//!
//! ## Ownership
//!
//! Modules own their content (fragment provider and package view manager).
//! Everything that needs to reach back to a module (views, factories,
//! synthetic classes) holds a `Weak` handle, so the graph never forms `Arc`
//! cycles. The caller keeps the module `Arc`s alive, usually through
//! [`crate::project::Project`].

mod class;
mod fragment;
mod module;
mod package_view;
mod scope;
mod types;

use std::fmt;
use std::sync::Arc;

use crate::base::{ClassId, FileRange, Name};

pub use class::{
    ClassBuilder, ClassDescriptorImpl, ConstructorDescriptor, FunctionDescriptor,
    PropertyDescriptor, ValueParameterDescriptor,
};
pub use fragment::{
    CompositePackageFragmentProvider, FragmentBuilder, PackageFragment, PackageFragmentProvider,
    PackageFragmentProviderImpl, single_package_fragment,
};
pub use module::{ModuleDescriptor, PlatformClassMap};
pub use package_view::{
    LazyPackageView, PackageViewDescriptor, PackageViewImpl, PackageViewManager,
    PackageViewManagerImpl,
};
pub use scope::{ChainedScope, DeclaredScope, EmptyScope, MemberScope};
pub use types::{
    AnnotationDescriptor, Annotations, ClassType, KotlinType, TypeParameterDescriptor,
    TypeParameterType, TypeProjection, Variance,
};

// ============================================================================
// CLASS METADATA
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClassKind {
    Class,
    Interface,
    EnumClass,
    EnumEntry,
    AnnotationClass,
    Object,
}

impl ClassKind {
    /// Kinds with exactly one instance. Members of these cannot be imported
    /// on demand.
    pub fn is_singleton(self) -> bool {
        matches!(self, ClassKind::Object | ClassKind::EnumEntry)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Modality {
    Final,
    Sealed,
    Open,
    Abstract,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
}

// ============================================================================
// CLASS DESCRIPTORS
// ============================================================================

/// A class, interface or object, whether declared or synthesized.
pub trait ClassDescriptor: Send + Sync + fmt::Debug {
    fn class_id(&self) -> &ClassId;
    fn kind(&self) -> ClassKind;
    fn modality(&self) -> Modality;
    fn visibility(&self) -> Visibility;
    fn is_companion_object(&self) -> bool;
    fn is_inner(&self) -> bool;
    fn type_parameters(&self) -> &[TypeParameterDescriptor];
    fn supertypes(&self) -> &[KotlinType];
    fn annotations(&self) -> &Annotations;
    fn constructors(&self) -> &[ConstructorDescriptor];
    fn primary_constructor(&self) -> Option<&ConstructorDescriptor>;
    fn companion_object(&self) -> Option<Arc<dyn ClassDescriptor>>;
    /// Nested classifiers, functions and properties.
    fn member_scope(&self) -> Arc<dyn MemberScope>;
    /// Declaration site; `None` for synthetic classes.
    fn source(&self) -> Option<FileRange>;

    fn name(&self) -> Name {
        self.class_id().short_class_name()
    }

    /// `C<T1, ..., Tn>` over this class's own parameters.
    fn default_type(&self) -> KotlinType {
        let arguments = self
            .type_parameters()
            .iter()
            .map(|p| TypeProjection::invariant(p.default_type()))
            .collect();
        KotlinType::class(self.class_id().clone(), arguments, Annotations::empty())
    }
}

/// Produces class descriptors that are not backed by declarations.
///
/// Package fragments consult their registered factories when a name is not
/// declared, and cache whatever the factories return.
pub trait ClassDescriptorFactory: Send + Sync {
    fn create_class(&self, class_id: &ClassId) -> Option<Arc<dyn ClassDescriptor>>;
}

// ============================================================================
// DESCRIPTOR
// ============================================================================

/// Any declaration a qualified name can resolve to.
#[derive(Clone)]
pub enum Descriptor {
    PackageView(Arc<dyn PackageViewDescriptor>),
    Class(Arc<dyn ClassDescriptor>),
    Function(Arc<FunctionDescriptor>),
    Property(Arc<PropertyDescriptor>),
}

impl Descriptor {
    pub fn name(&self) -> Name {
        match self {
            Descriptor::PackageView(view) => view.name(),
            Descriptor::Class(class) => class.name(),
            Descriptor::Function(function) => function.name.clone(),
            Descriptor::Property(property) => property.name.clone(),
        }
    }

    pub fn as_class(&self) -> Option<&Arc<dyn ClassDescriptor>> {
        match self {
            Descriptor::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn as_package_view(&self) -> Option<&Arc<dyn PackageViewDescriptor>> {
        match self {
            Descriptor::PackageView(view) => Some(view),
            _ => None,
        }
    }

    pub fn is_package_or_class(&self) -> bool {
        matches!(self, Descriptor::PackageView(_) | Descriptor::Class(_))
    }

    /// Member scope used when this descriptor is a qualifier.
    pub fn member_scope(&self) -> Option<Arc<dyn MemberScope>> {
        match self {
            Descriptor::PackageView(view) => Some(view.member_scope()),
            Descriptor::Class(class) => Some(class.member_scope()),
            Descriptor::Function(_) | Descriptor::Property(_) => None,
        }
    }

    /// Identity comparison.
    pub fn same_as(&self, other: &Descriptor) -> bool {
        fn addr<T: ?Sized>(arc: &Arc<T>) -> *const () {
            Arc::as_ptr(arc) as *const ()
        }
        match (self, other) {
            (Descriptor::PackageView(a), Descriptor::PackageView(b)) => addr(a) == addr(b),
            (Descriptor::Class(a), Descriptor::Class(b)) => addr(a) == addr(b),
            (Descriptor::Function(a), Descriptor::Function(b)) => Arc::ptr_eq(a, b),
            (Descriptor::Property(a), Descriptor::Property(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Short lowercase label used in diagnostics.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Descriptor::PackageView(_) => "package",
            Descriptor::Class(class) => match class.kind() {
                ClassKind::Interface => "interface",
                ClassKind::Object => "object",
                ClassKind::EnumClass => "enum class",
                ClassKind::EnumEntry => "enum entry",
                ClassKind::AnnotationClass => "annotation class",
                ClassKind::Class => "class",
            },
            Descriptor::Function(_) => "function",
            Descriptor::Property(_) => "property",
        }
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Descriptor::PackageView(view) => write!(f, "PackageView({})", view.fq_name()),
            Descriptor::Class(class) => write!(f, "Class({})", class.class_id()),
            Descriptor::Function(function) => write!(f, "Function({})", function.name),
            Descriptor::Property(property) => write!(f, "Property({})", property.name),
        }
    }
}
