//! Member scopes: what can be looked up by simple name inside a container.

use std::sync::Arc;

use indexmap::IndexMap;

use super::{
    ClassDescriptor, Descriptor, FunctionDescriptor, PackageViewDescriptor, PropertyDescriptor,
};
use crate::base::Name;

/// Name-based lookup inside a package, class or import.
pub trait MemberScope: Send + Sync {
    fn classifier(&self, name: &Name) -> Option<Arc<dyn ClassDescriptor>>;
    fn functions(&self, name: &Name) -> Vec<Arc<FunctionDescriptor>>;
    fn properties(&self, name: &Name) -> Vec<Arc<PropertyDescriptor>>;

    /// Subpackage lookup; only package view scopes have subpackages.
    fn package(&self, _name: &Name) -> Option<Arc<dyn PackageViewDescriptor>> {
        None
    }

    /// Every declared member, in declaration order. Subpackages are not members.
    fn all_descriptors(&self) -> Vec<Descriptor>;
}

/// A scope with nothing in it.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScope;

impl MemberScope for EmptyScope {
    fn classifier(&self, _name: &Name) -> Option<Arc<dyn ClassDescriptor>> {
        None
    }

    fn functions(&self, _name: &Name) -> Vec<Arc<FunctionDescriptor>> {
        Vec::new()
    }

    fn properties(&self, _name: &Name) -> Vec<Arc<PropertyDescriptor>> {
        Vec::new()
    }

    fn all_descriptors(&self) -> Vec<Descriptor> {
        Vec::new()
    }
}

/// Explicitly declared members.
#[derive(Clone, Debug, Default)]
pub struct DeclaredScope {
    classes: IndexMap<Name, Arc<dyn ClassDescriptor>>,
    functions: IndexMap<Name, Vec<Arc<FunctionDescriptor>>>,
    properties: IndexMap<Name, Vec<Arc<PropertyDescriptor>>>,
}

impl DeclaredScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a class. A later class with the same name replaces the earlier one.
    pub fn add_class(&mut self, class: Arc<dyn ClassDescriptor>) {
        self.classes.insert(class.name(), class);
    }

    /// Add a function; overloads accumulate.
    pub fn add_function(&mut self, function: Arc<FunctionDescriptor>) {
        self.functions
            .entry(function.name.clone())
            .or_default()
            .push(function);
    }

    pub fn add_property(&mut self, property: Arc<PropertyDescriptor>) {
        self.properties
            .entry(property.name.clone())
            .or_default()
            .push(property);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
            + self.functions.values().map(Vec::len).sum::<usize>()
            + self.properties.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MemberScope for DeclaredScope {
    fn classifier(&self, name: &Name) -> Option<Arc<dyn ClassDescriptor>> {
        self.classes.get(name).cloned()
    }

    fn functions(&self, name: &Name) -> Vec<Arc<FunctionDescriptor>> {
        self.functions.get(name).cloned().unwrap_or_default()
    }

    fn properties(&self, name: &Name) -> Vec<Arc<PropertyDescriptor>> {
        self.properties.get(name).cloned().unwrap_or_default()
    }

    fn all_descriptors(&self) -> Vec<Descriptor> {
        let classes = self.classes.values().cloned().map(Descriptor::Class);
        let functions = self
            .functions
            .values()
            .flatten()
            .cloned()
            .map(Descriptor::Function);
        let properties = self
            .properties
            .values()
            .flatten()
            .cloned()
            .map(Descriptor::Property);
        classes.chain(functions).chain(properties).collect()
    }
}

/// Several scopes queried in order: the first classifier wins, callables
/// from all scopes are merged.
#[derive(Clone, Default)]
pub struct ChainedScope {
    scopes: Vec<Arc<dyn MemberScope>>,
}

impl ChainedScope {
    pub fn new(scopes: Vec<Arc<dyn MemberScope>>) -> Self {
        Self { scopes }
    }
}

impl MemberScope for ChainedScope {
    fn classifier(&self, name: &Name) -> Option<Arc<dyn ClassDescriptor>> {
        self.scopes.iter().find_map(|scope| scope.classifier(name))
    }

    fn functions(&self, name: &Name) -> Vec<Arc<FunctionDescriptor>> {
        self.scopes.iter().flat_map(|scope| scope.functions(name)).collect()
    }

    fn properties(&self, name: &Name) -> Vec<Arc<PropertyDescriptor>> {
        self.scopes.iter().flat_map(|scope| scope.properties(name)).collect()
    }

    fn package(&self, name: &Name) -> Option<Arc<dyn PackageViewDescriptor>> {
        self.scopes.iter().find_map(|scope| scope.package(name))
    }

    fn all_descriptors(&self) -> Vec<Descriptor> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.all_descriptors())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{ClassId, FqName};
    use crate::descriptors::{ClassBuilder, ClassKind};

    fn class(name: &str) -> Arc<dyn ClassDescriptor> {
        ClassBuilder::new(
            ClassId::top_level(FqName::new("p"), Name::identifier(name)),
            ClassKind::Class,
        )
        .build()
    }

    #[test]
    fn test_declared_scope_overloads() {
        let mut scope = DeclaredScope::new();
        scope.add_function(Arc::new(FunctionDescriptor::new(Name::identifier("f"))));
        scope.add_function(Arc::new(FunctionDescriptor::new(Name::identifier("f"))));
        scope.add_class(class("C"));

        assert_eq!(scope.functions(&Name::identifier("f")).len(), 2);
        assert!(scope.classifier(&Name::identifier("C")).is_some());
        assert_eq!(scope.all_descriptors().len(), 3);
    }

    #[test]
    fn test_chained_scope_first_classifier_wins() {
        let first_class = class("C");
        let mut first = DeclaredScope::new();
        first.add_class(Arc::clone(&first_class));
        let mut second = DeclaredScope::new();
        second.add_class(class("C"));
        second.add_property(Arc::new(PropertyDescriptor::new(Name::identifier("x"))));

        let chained = ChainedScope::new(vec![Arc::new(first), Arc::new(second)]);
        let found = chained.classifier(&Name::identifier("C")).unwrap();

        assert!(Arc::ptr_eq(&found, &first_class));
        assert_eq!(chained.properties(&Name::identifier("x")).len(), 1);
    }

    #[test]
    fn test_empty_scope() {
        assert!(EmptyScope.classifier(&Name::identifier("C")).is_none());
        assert!(EmptyScope.all_descriptors().is_empty());
    }
}
