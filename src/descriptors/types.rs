//! Types, type parameters and annotations.

use std::fmt;
use std::sync::Arc;

use crate::base::{ClassId, Name};

/// Declaration-site or use-site variance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Variance {
    Invariant,
    In,
    Out,
}

impl Variance {
    /// The keyword as written in source (`""`, `"in"`, `"out"`).
    pub fn label(self) -> &'static str {
        match self {
            Variance::Invariant => "",
            Variance::In => "in",
            Variance::Out => "out",
        }
    }
}

/// A single annotation application. Only the annotation class is tracked.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AnnotationDescriptor {
    pub class_id: ClassId,
}

/// An immutable list of annotations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Annotations(Arc<[AnnotationDescriptor]>);

impl Annotations {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(annotations: Vec<AnnotationDescriptor>) -> Self {
        Self(annotations.into())
    }

    /// Whether an annotation of class `class_id` is present.
    pub fn has(&self, class_id: &ClassId) -> bool {
        self.0.iter().any(|a| &a.class_id == class_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationDescriptor> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A type parameter of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterDescriptor {
    pub owner: ClassId,
    pub name: Name,
    pub index: usize,
    pub variance: Variance,
    pub reified: bool,
    pub upper_bounds: Vec<KotlinType>,
}

impl TypeParameterDescriptor {
    /// A parameter bounded only by the given default bound (usually `Any?`).
    pub fn with_default_bound(
        owner: ClassId,
        name: Name,
        index: usize,
        variance: Variance,
        default_bound: KotlinType,
    ) -> Self {
        Self {
            owner,
            name,
            index,
            variance,
            reified: false,
            upper_bounds: vec![default_bound],
        }
    }

    /// The type `T` referring to this parameter.
    pub fn default_type(&self) -> KotlinType {
        KotlinType::Parameter(TypeParameterType {
            owner: self.owner.clone(),
            name: self.name.clone(),
            index: self.index,
            nullable: false,
        })
    }
}

/// A (possibly projected) type argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeProjection {
    pub projection: Variance,
    pub ty: KotlinType,
}

impl TypeProjection {
    pub fn invariant(ty: KotlinType) -> Self {
        Self {
            projection: Variance::Invariant,
            ty,
        }
    }
}

/// A reference to a class type, e.g. `Function2<P1, P2, R>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassType {
    pub class_id: ClassId,
    pub arguments: Vec<TypeProjection>,
    pub annotations: Annotations,
    pub nullable: bool,
}

/// A use of a type parameter as a type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParameterType {
    pub owner: ClassId,
    pub name: Name,
    pub index: usize,
    pub nullable: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KotlinType {
    Class(ClassType),
    Parameter(TypeParameterType),
}

impl KotlinType {
    /// A non-null class type.
    pub fn class(class_id: ClassId, arguments: Vec<TypeProjection>, annotations: Annotations) -> Self {
        KotlinType::Class(ClassType {
            class_id,
            arguments,
            annotations,
            nullable: false,
        })
    }

    /// A non-null class type without arguments or annotations.
    pub fn simple(class_id: ClassId) -> Self {
        Self::class(class_id, Vec::new(), Annotations::empty())
    }

    pub fn make_nullable(mut self) -> Self {
        match &mut self {
            KotlinType::Class(ty) => ty.nullable = true,
            KotlinType::Parameter(ty) => ty.nullable = true,
        }
        self
    }

    pub fn class_id(&self) -> Option<&ClassId> {
        match self {
            KotlinType::Class(ty) => Some(&ty.class_id),
            KotlinType::Parameter(_) => None,
        }
    }

    pub fn arguments(&self) -> &[TypeProjection] {
        match self {
            KotlinType::Class(ty) => &ty.arguments,
            KotlinType::Parameter(_) => &[],
        }
    }

    pub fn annotations(&self) -> Annotations {
        match self {
            KotlinType::Class(ty) => ty.annotations.clone(),
            KotlinType::Parameter(_) => Annotations::empty(),
        }
    }
}

impl fmt::Display for KotlinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KotlinType::Class(ty) => {
                for annotation in ty.annotations.iter() {
                    write!(f, "@{} ", annotation.class_id.short_class_name())?;
                }
                write!(f, "{}", ty.class_id.short_class_name())?;
                if !ty.arguments.is_empty() {
                    f.write_str("<")?;
                    for (i, arg) in ty.arguments.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        match arg.projection {
                            Variance::Invariant => write!(f, "{}", arg.ty)?,
                            other => write!(f, "{} {}", other.label(), arg.ty)?,
                        }
                    }
                    f.write_str(">")?;
                }
                if ty.nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
            KotlinType::Parameter(ty) => {
                write!(f, "{}", ty.name)?;
                if ty.nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::FqName;

    fn class_id(package: &str, name: &str) -> ClassId {
        ClassId::top_level(FqName::new(package), Name::identifier(name))
    }

    #[test]
    fn test_render_class_type_with_arguments() {
        let owner = class_id("kotlin", "Function1");
        let p1 = TypeParameterDescriptor::with_default_bound(
            owner.clone(),
            Name::identifier("P1"),
            0,
            Variance::In,
            KotlinType::simple(class_id("kotlin", "Any")).make_nullable(),
        );
        let ty = KotlinType::class(
            class_id("kotlin", "Function"),
            vec![TypeProjection::invariant(p1.default_type())],
            Annotations::new(vec![AnnotationDescriptor {
                class_id: class_id("kotlin", "extension"),
            }]),
        );

        assert_eq!(ty.to_string(), "@extension Function<P1>");
        assert_eq!(p1.upper_bounds[0].to_string(), "Any?");
    }

    #[test]
    fn test_annotations_has() {
        let ext = class_id("kotlin", "extension");
        let annotations = Annotations::new(vec![AnnotationDescriptor { class_id: ext.clone() }]);
        assert!(annotations.has(&ext));
        assert!(!Annotations::empty().has(&ext));
    }
}
