//! Synthetic numbered function classes.
//!
//! ```text
//! Function1           : Function
//! KFunction1          : KFunction, Function1
//! KMemberFunction1    : KMemberFunction, @extension Function2
//! KExtensionFunction1 : KExtensionFunction, @extension Function2
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use super::BuiltIns;
use crate::base::{ClassId, FileRange, InternalError, Name, fatal};
use crate::descriptors::{
    Annotations, ClassDescriptor, ClassKind, ConstructorDescriptor, DeclaredScope,
    FunctionDescriptor, KotlinType, MemberScope, Modality, ModuleDescriptor, PackageFragment,
    TypeParameterDescriptor, TypeProjection, ValueParameterDescriptor, Variance, Visibility,
    single_package_fragment,
};
use crate::storage::LazyValue;

/// The closed set of numbered function class families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionKind {
    Function,
    KFunction,
    KMemberFunction,
    KExtensionFunction,
}

impl FunctionKind {
    /// Kinds living in the built-ins package.
    pub const FUNCTIONS: &'static [FunctionKind] = &[FunctionKind::Function];

    /// Kinds living in the reflection package, in lookup order.
    pub const KFUNCTIONS: &'static [FunctionKind] = &[
        FunctionKind::KFunction,
        FunctionKind::KMemberFunction,
        FunctionKind::KExtensionFunction,
    ];

    pub const ALL: [FunctionKind; 4] = [
        FunctionKind::Function,
        FunctionKind::KFunction,
        FunctionKind::KMemberFunction,
        FunctionKind::KExtensionFunction,
    ];

    /// Class name prefix; also the name of the un-numbered base interface.
    pub const fn prefix(self) -> &'static str {
        match self {
            FunctionKind::Function => "Function",
            FunctionKind::KFunction => "KFunction",
            FunctionKind::KMemberFunction => "KMemberFunction",
            FunctionKind::KExtensionFunction => "KExtensionFunction",
        }
    }

    pub const fn has_dispatch_receiver(self) -> bool {
        matches!(self, FunctionKind::KMemberFunction)
    }

    pub const fn has_extension_receiver(self) -> bool {
        matches!(self, FunctionKind::KExtensionFunction)
    }

    pub const fn is_reflective(self) -> bool {
        !matches!(self, FunctionKind::Function)
    }

    pub const fn receiver_count(self) -> u32 {
        self.has_dispatch_receiver() as u32 + self.has_extension_receiver() as u32
    }

    /// `Function3`, `KMemberFunction0`, ...
    pub fn numbered_class_name(self, arity: u32) -> Name {
        Name::identifier(format!("{}{}", self.prefix(), arity))
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A generated `{Kind}{arity}` interface.
///
/// Everything derived from kind and arity is computed on first use and
/// cached. The containing fragment and module are held weakly; the fragment
/// caches this descriptor in turn.
pub struct FunctionClassDescriptor {
    class_id: ClassId,
    kind: FunctionKind,
    arity: u32,
    container: Weak<PackageFragment>,
    module: Weak<ModuleDescriptor>,
    builtins: Arc<BuiltIns>,
    annotations: Annotations,
    type_parameters: LazyValue<Vec<TypeParameterDescriptor>>,
    supertypes: LazyValue<Vec<KotlinType>>,
    scope: LazyValue<Arc<dyn MemberScope>>,
}

impl FunctionClassDescriptor {
    pub fn new(
        kind: FunctionKind,
        arity: u32,
        container: &Arc<PackageFragment>,
        module: &Arc<ModuleDescriptor>,
        builtins: Arc<BuiltIns>,
    ) -> Self {
        let class_id = ClassId::top_level(
            container.fq_name().clone(),
            kind.numbered_class_name(arity),
        );
        Self {
            class_id,
            kind,
            arity,
            container: Arc::downgrade(container),
            module: Arc::downgrade(module),
            builtins,
            annotations: Annotations::empty(),
            type_parameters: LazyValue::new(),
            supertypes: LazyValue::new(),
            scope: LazyValue::new(),
        }
    }

    pub fn function_kind(&self) -> FunctionKind {
        self.kind
    }

    pub fn arity(&self) -> u32 {
        self.arity
    }

    /// `[T] [E] P1..Pn R`
    fn compute_type_parameters(&self) -> Vec<TypeParameterDescriptor> {
        let mut names = Vec::with_capacity(self.arity as usize + 3);
        if self.kind.has_dispatch_receiver() {
            names.push((Name::identifier("T"), Variance::In));
        }
        if self.kind.has_extension_receiver() {
            names.push((Name::identifier("E"), Variance::In));
        }
        names.extend((1..=self.arity).map(|i| (Name::identifier(format!("P{i}")), Variance::In)));
        names.push((Name::identifier("R"), Variance::Out));

        names
            .into_iter()
            .enumerate()
            .map(|(index, (name, variance))| {
                TypeParameterDescriptor::with_default_bound(
                    self.class_id.clone(),
                    name,
                    index,
                    variance,
                    self.builtins.default_bound(),
                )
            })
            .collect()
    }

    fn compute_supertypes(&self) -> Vec<KotlinType> {
        let container = self.container.upgrade().unwrap_or_else(|| self.dropped());
        let mut result = Vec::with_capacity(2);

        // Un-numbered base, e.g. KMemberFunction for KMemberFunction5
        result.push(self.supertype(
            &container,
            self.builtins.base_interface_name(self.kind),
            Annotations::empty(),
        ));

        // Reflective kinds also extend the plain FunctionN taking receivers as parameters
        if self.kind.is_reflective() {
            let module = self.module.upgrade().unwrap_or_else(|| self.dropped());
            let provider = module.package_fragment_provider();
            let builtins_fragment =
                single_package_fragment(provider.as_ref(), self.builtins.builtins_package());

            let annotations = if self.kind.receiver_count() > 0 {
                Annotations::new(vec![self.builtins.extension_annotation()])
            } else {
                Annotations::empty()
            };
            let arity = self.arity + self.kind.receiver_count();
            result.push(self.supertype(
                &builtins_fragment,
                FunctionKind::Function.numbered_class_name(arity),
                annotations,
            ));
        }

        result
    }

    /// `name` from `fragment`, applied to this class's last K type parameters
    /// where K is the supertype's own parameter count.
    fn supertype(&self, fragment: &PackageFragment, name: Name, annotations: Annotations) -> KotlinType {
        let Some(class) = fragment.member_scope().classifier(&name) else {
            fatal(InternalError::MissingBuiltInClass {
                name,
                package: fragment.fq_name().clone(),
            });
        };

        let own = self.type_parameters();
        let count = class.type_parameters().len().min(own.len());
        let arguments = own[own.len() - count..]
            .iter()
            .map(|p| TypeProjection::invariant(p.default_type()))
            .collect();

        KotlinType::class(class.class_id().clone(), arguments, annotations)
    }

    /// A single abstract `invoke` taking the positional parameters.
    fn compute_scope(&self) -> Arc<dyn MemberScope> {
        let params = self.type_parameters();
        let receivers = self.kind.receiver_count() as usize;
        let receiver = (receivers > 0).then(|| params[0].default_type());

        let value_parameters = params[receivers..params.len() - 1]
            .iter()
            .enumerate()
            .map(|(index, p)| ValueParameterDescriptor {
                name: Name::identifier(format!("p{}", index + 1)),
                index,
                ty: p.default_type(),
            })
            .collect();

        let invoke = FunctionDescriptor {
            name: Name::identifier("invoke"),
            dispatch_receiver: Some(self.default_type()),
            extension_receiver: receiver,
            value_parameters,
            return_type: params.last().map(TypeParameterDescriptor::default_type),
            modality: Modality::Abstract,
            visibility: Visibility::Public,
            is_operator: true,
        };

        let mut scope = DeclaredScope::new();
        scope.add_function(Arc::new(invoke));
        Arc::new(scope)
    }

    fn dropped(&self) -> ! {
        fatal(InternalError::ModuleDropped {
            class_id: self.class_id.clone(),
        })
    }
}

impl ClassDescriptor for FunctionClassDescriptor {
    fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    fn kind(&self) -> ClassKind {
        ClassKind::Interface
    }

    fn modality(&self) -> Modality {
        Modality::Abstract
    }

    fn visibility(&self) -> Visibility {
        Visibility::Public
    }

    fn is_companion_object(&self) -> bool {
        false
    }

    fn is_inner(&self) -> bool {
        false
    }

    fn type_parameters(&self) -> &[TypeParameterDescriptor] {
        self.type_parameters
            .get_or_compute(|| self.compute_type_parameters())
    }

    fn supertypes(&self) -> &[KotlinType] {
        self.supertypes.get_or_compute(|| {
            let supertypes = self.compute_supertypes();
            tracing::trace!(class = %self.class_id, count = supertypes.len(), "computed function class supertypes");
            supertypes
        })
    }

    fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    fn constructors(&self) -> &[ConstructorDescriptor] {
        &[]
    }

    fn primary_constructor(&self) -> Option<&ConstructorDescriptor> {
        None
    }

    fn companion_object(&self) -> Option<Arc<dyn ClassDescriptor>> {
        None
    }

    fn member_scope(&self) -> Arc<dyn MemberScope> {
        Arc::clone(self.scope.get_or_compute(|| self.compute_scope()))
    }

    fn source(&self) -> Option<FileRange> {
        None
    }
}

impl fmt::Debug for FunctionClassDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionClassDescriptor({})", self.class_id)
    }
}
