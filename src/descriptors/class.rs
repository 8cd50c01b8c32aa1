//! Declared classes and callable members.

use std::sync::Arc;

use super::{
    Annotations, ClassDescriptor, ClassKind, DeclaredScope, KotlinType, MemberScope, Modality,
    TypeParameterDescriptor, Visibility,
};
use crate::base::{ClassId, FileRange, Name};

// ============================================================================
// CALLABLES
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValueParameterDescriptor {
    pub name: Name,
    pub index: usize,
    pub ty: KotlinType,
}

/// A function member (or top-level function).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: Name,
    pub dispatch_receiver: Option<KotlinType>,
    pub extension_receiver: Option<KotlinType>,
    pub value_parameters: Vec<ValueParameterDescriptor>,
    pub return_type: Option<KotlinType>,
    pub modality: Modality,
    pub visibility: Visibility,
    pub is_operator: bool,
}

impl FunctionDescriptor {
    /// A public final function with no parameters and an unknown return type.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            dispatch_receiver: None,
            extension_receiver: None,
            value_parameters: Vec::new(),
            return_type: None,
            modality: Modality::Final,
            visibility: Visibility::Public,
            is_operator: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyDescriptor {
    pub name: Name,
    pub ty: Option<KotlinType>,
    pub is_var: bool,
    pub visibility: Visibility,
}

impl PropertyDescriptor {
    pub fn new(name: Name) -> Self {
        Self {
            name,
            ty: None,
            is_var: false,
            visibility: Visibility::Public,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDescriptor {
    pub value_parameters: Vec<ValueParameterDescriptor>,
    pub visibility: Visibility,
    pub is_primary: bool,
}

// ============================================================================
// DECLARED CLASSES
// ============================================================================

/// A class backed by a declaration.
#[derive(Debug)]
pub struct ClassDescriptorImpl {
    class_id: ClassId,
    kind: ClassKind,
    modality: Modality,
    visibility: Visibility,
    is_companion: bool,
    is_inner: bool,
    type_parameters: Vec<TypeParameterDescriptor>,
    supertypes: Vec<KotlinType>,
    annotations: Annotations,
    constructors: Vec<ConstructorDescriptor>,
    companion: Option<Arc<dyn ClassDescriptor>>,
    scope: Arc<DeclaredScope>,
    source: Option<FileRange>,
}

impl ClassDescriptor for ClassDescriptorImpl {
    fn class_id(&self) -> &ClassId {
        &self.class_id
    }

    fn kind(&self) -> ClassKind {
        self.kind
    }

    fn modality(&self) -> Modality {
        self.modality
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn is_companion_object(&self) -> bool {
        self.is_companion
    }

    fn is_inner(&self) -> bool {
        self.is_inner
    }

    fn type_parameters(&self) -> &[TypeParameterDescriptor] {
        &self.type_parameters
    }

    fn supertypes(&self) -> &[KotlinType] {
        &self.supertypes
    }

    fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    fn primary_constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructors.iter().find(|c| c.is_primary)
    }

    fn companion_object(&self) -> Option<Arc<dyn ClassDescriptor>> {
        self.companion.clone()
    }

    fn member_scope(&self) -> Arc<dyn MemberScope> {
        self.scope.clone()
    }

    fn source(&self) -> Option<FileRange> {
        self.source
    }
}

/// Builder for [`ClassDescriptorImpl`].
///
/// Defaults: public, final, no type parameters, no supertypes, no members.
pub struct ClassBuilder {
    class_id: ClassId,
    kind: ClassKind,
    modality: Modality,
    visibility: Visibility,
    is_companion: bool,
    is_inner: bool,
    type_parameters: Vec<(Name, super::Variance)>,
    supertypes: Vec<KotlinType>,
    annotations: Annotations,
    constructors: Vec<ConstructorDescriptor>,
    companion: Option<Arc<dyn ClassDescriptor>>,
    scope: DeclaredScope,
    source: Option<FileRange>,
    default_bound: Option<KotlinType>,
}

impl ClassBuilder {
    pub fn new(class_id: ClassId, kind: ClassKind) -> Self {
        let modality = match kind {
            ClassKind::Interface => Modality::Abstract,
            _ => Modality::Final,
        };
        Self {
            class_id,
            kind,
            modality,
            visibility: Visibility::Public,
            is_companion: false,
            is_inner: false,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            annotations: Annotations::empty(),
            constructors: Vec::new(),
            companion: None,
            scope: DeclaredScope::new(),
            source: None,
            default_bound: None,
        }
    }

    pub fn modality(mut self, modality: Modality) -> Self {
        self.modality = modality;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn inner(mut self) -> Self {
        self.is_inner = true;
        self
    }

    /// Declare a type parameter. Parameters are indexed in call order.
    pub fn type_parameter(mut self, name: impl Into<Name>, variance: super::Variance) -> Self {
        self.type_parameters.push((name.into(), variance));
        self
    }

    /// Upper bound given to every type parameter (defaults to none).
    pub fn default_bound(mut self, bound: KotlinType) -> Self {
        self.default_bound = Some(bound);
        self
    }

    pub fn supertype(mut self, ty: KotlinType) -> Self {
        self.supertypes.push(ty);
        self
    }

    pub fn annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    pub fn constructor(mut self, constructor: ConstructorDescriptor) -> Self {
        self.constructors.push(constructor);
        self
    }

    pub fn nested(mut self, class: Arc<dyn ClassDescriptor>) -> Self {
        self.scope.add_class(class);
        self
    }

    /// Attach a companion object; it is also visible as a nested classifier.
    pub fn companion(mut self, name: impl Into<Name>) -> Self {
        let companion: Arc<dyn ClassDescriptor> = Arc::new(ClassDescriptorImpl {
            class_id: self.class_id.nested(&name.into()),
            kind: ClassKind::Object,
            modality: Modality::Final,
            visibility: Visibility::Public,
            is_companion: true,
            is_inner: false,
            type_parameters: Vec::new(),
            supertypes: Vec::new(),
            annotations: Annotations::empty(),
            constructors: Vec::new(),
            companion: None,
            scope: Arc::new(DeclaredScope::new()),
            source: self.source,
        });
        self.scope.add_class(Arc::clone(&companion));
        self.companion = Some(companion);
        self
    }

    pub fn function(mut self, function: FunctionDescriptor) -> Self {
        self.scope.add_function(Arc::new(function));
        self
    }

    pub fn property(mut self, property: PropertyDescriptor) -> Self {
        self.scope.add_property(Arc::new(property));
        self
    }

    pub fn source(mut self, source: FileRange) -> Self {
        self.source = Some(source);
        self
    }

    pub fn build(self) -> Arc<ClassDescriptorImpl> {
        let owner = self.class_id.clone();
        let type_parameters = self
            .type_parameters
            .into_iter()
            .enumerate()
            .map(|(index, (name, variance))| TypeParameterDescriptor {
                owner: owner.clone(),
                name,
                index,
                variance,
                reified: false,
                upper_bounds: self.default_bound.iter().cloned().collect(),
            })
            .collect();

        Arc::new(ClassDescriptorImpl {
            class_id: self.class_id,
            kind: self.kind,
            modality: self.modality,
            visibility: self.visibility,
            is_companion: self.is_companion,
            is_inner: self.is_inner,
            type_parameters,
            supertypes: self.supertypes,
            annotations: self.annotations,
            constructors: self.constructors,
            companion: self.companion,
            scope: Arc::new(self.scope),
            source: self.source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FqName;
    use crate::descriptors::Variance;

    fn id(name: &str) -> ClassId {
        ClassId::top_level(FqName::new("a.b"), Name::identifier(name))
    }

    #[test]
    fn test_interface_defaults_to_abstract() {
        let class = ClassBuilder::new(id("I"), ClassKind::Interface).build();
        assert_eq!(class.modality(), Modality::Abstract);
        assert!(class.constructors().is_empty());
        assert!(class.primary_constructor().is_none());
    }

    #[test]
    fn test_companion_is_nested_singleton() {
        let class = ClassBuilder::new(id("C"), ClassKind::Class)
            .companion("Companion")
            .build();

        let companion = class.companion_object().unwrap();
        assert!(companion.is_companion_object());
        assert!(companion.kind().is_singleton());
        assert_eq!(companion.class_id().as_fq_name().as_str(), "a.b.C.Companion");
        assert!(
            class
                .member_scope()
                .classifier(&Name::identifier("Companion"))
                .is_some()
        );
    }

    #[test]
    fn test_type_parameters_are_indexed() {
        let class = ClassBuilder::new(id("Pair"), ClassKind::Class)
            .type_parameter("A", Variance::Out)
            .type_parameter("B", Variance::Out)
            .build();

        let params = class.type_parameters();
        assert_eq!(params.len(), 2);
        assert_eq!(params[1].index, 1);
        assert_eq!(class.default_type().to_string(), "Pair<A, B>");
    }
}
