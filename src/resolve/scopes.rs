//! Scopes produced by import directives.

use std::sync::Arc;

use crate::base::Name;
use crate::descriptors::{
    ClassDescriptor, Descriptor, FunctionDescriptor, MemberScope, PackageViewDescriptor,
    PropertyDescriptor,
};

/// The names one import directive brings into a file.
#[derive(Clone, Debug, Default)]
pub enum ImportScope {
    /// Nothing: the import failed or was malformed.
    #[default]
    Empty,
    /// `import a.b.*`: every member of every descriptor.
    AllUnder { descriptors: Vec<Descriptor> },
    /// `import a.b.C [as D]`: one name bound to the whole candidate set.
    Single {
        name: Name,
        descriptors: Vec<Descriptor>,
    },
}

impl ImportScope {
    pub fn all_under(descriptors: Vec<Descriptor>) -> Self {
        ImportScope::AllUnder { descriptors }
    }

    pub fn single(name: Name, descriptors: Vec<Descriptor>) -> Self {
        ImportScope::Single { name, descriptors }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ImportScope::Empty => true,
            ImportScope::AllUnder { descriptors } | ImportScope::Single { descriptors, .. } => {
                descriptors.is_empty()
            }
        }
    }

    /// The descriptors the import resolved to.
    pub fn descriptors(&self) -> &[Descriptor] {
        match self {
            ImportScope::Empty => &[],
            ImportScope::AllUnder { descriptors } | ImportScope::Single { descriptors, .. } => {
                descriptors.as_slice()
            }
        }
    }

    /// The bound name of a single import.
    pub fn imported_name(&self) -> Option<&Name> {
        match self {
            ImportScope::Single { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Descriptors visible under `name`; only single imports filter by name.
    fn candidates(&self, name: &Name) -> &[Descriptor] {
        match self {
            ImportScope::Single { name: bound, descriptors } if bound == name => descriptors.as_slice(),
            _ => &[],
        }
    }
}

impl MemberScope for ImportScope {
    fn classifier(&self, name: &Name) -> Option<Arc<dyn ClassDescriptor>> {
        match self {
            ImportScope::Empty => None,
            ImportScope::AllUnder { descriptors } => descriptors
                .iter()
                .filter_map(Descriptor::member_scope)
                .find_map(|scope| scope.classifier(name)),
            ImportScope::Single { .. } => self
                .candidates(name)
                .iter()
                .find_map(|d| d.as_class().cloned()),
        }
    }

    fn functions(&self, name: &Name) -> Vec<Arc<FunctionDescriptor>> {
        match self {
            ImportScope::Empty => Vec::new(),
            ImportScope::AllUnder { descriptors } => descriptors
                .iter()
                .filter_map(Descriptor::member_scope)
                .flat_map(|scope| scope.functions(name))
                .collect(),
            ImportScope::Single { .. } => self
                .candidates(name)
                .iter()
                .filter_map(|d| match d {
                    Descriptor::Function(function) => Some(Arc::clone(function)),
                    _ => None,
                })
                .collect(),
        }
    }

    fn properties(&self, name: &Name) -> Vec<Arc<PropertyDescriptor>> {
        match self {
            ImportScope::Empty => Vec::new(),
            ImportScope::AllUnder { descriptors } => descriptors
                .iter()
                .filter_map(Descriptor::member_scope)
                .flat_map(|scope| scope.properties(name))
                .collect(),
            ImportScope::Single { .. } => self
                .candidates(name)
                .iter()
                .filter_map(|d| match d {
                    Descriptor::Property(property) => Some(Arc::clone(property)),
                    _ => None,
                })
                .collect(),
        }
    }

    fn package(&self, name: &Name) -> Option<Arc<dyn PackageViewDescriptor>> {
        // All-under imports never bring subpackages into scope.
        self.candidates(name)
            .iter()
            .find_map(|d| d.as_package_view().cloned())
    }

    fn all_descriptors(&self) -> Vec<Descriptor> {
        match self {
            ImportScope::Empty => Vec::new(),
            ImportScope::AllUnder { descriptors } => descriptors
                .iter()
                .filter_map(Descriptor::member_scope)
                .flat_map(|scope| scope.all_descriptors())
                .collect(),
            ImportScope::Single { descriptors, .. } => descriptors
                .iter()
                .filter(|d| d.as_package_view().is_none())
                .cloned()
                .collect(),
        }
    }
}
