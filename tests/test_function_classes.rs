//! Synthetic function classes, resolved through the built-in library module.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use descry::builtins::{BuiltInFictitiousFunctionClassFactory, create_library_module};
use descry::descriptors::{
    ClassDescriptor, ClassDescriptorFactory, ClassKind, Modality, ModuleDescriptor,
    PackageFragment, PackageFragmentProvider, PackageFragmentProviderImpl, Visibility,
};
use descry::{BuiltIns, ClassId, FqName, FunctionKind, Name};
use once_cell::sync::Lazy;
use rstest::rstest;

static LIBRARY: Lazy<Arc<ModuleDescriptor>> =
    Lazy::new(|| create_library_module(Arc::new(BuiltIns::default())).unwrap());

fn library_class(package: &str, name: &str) -> Option<Arc<dyn ClassDescriptor>> {
    LIBRARY
        .package(&FqName::new(package))?
        .member_scope()
        .classifier(&Name::identifier(name))
}

fn supertypes(class: &dyn ClassDescriptor) -> Vec<String> {
    class.supertypes().iter().map(ToString::to_string).collect()
}

fn class_id(package: &str, name: &str) -> ClassId {
    ClassId::top_level(FqName::new(package), Name::identifier(name))
}

// ============================================================================
// SHAPE
// ============================================================================

#[rstest]
#[case("kotlin", "Function0", FunctionKind::Function, 1)]
#[case("kotlin", "Function5", FunctionKind::Function, 6)]
#[case("kotlin.reflect", "KFunction2", FunctionKind::KFunction, 3)]
#[case("kotlin.reflect", "KMemberFunction1", FunctionKind::KMemberFunction, 3)]
#[case("kotlin.reflect", "KExtensionFunction3", FunctionKind::KExtensionFunction, 5)]
fn test_type_parameter_count(
    #[case] package: &str,
    #[case] name: &str,
    #[case] kind: FunctionKind,
    #[case] expected: usize,
) {
    let class = library_class(package, name).unwrap();
    assert_eq!(class.type_parameters().len(), expected);
    assert_eq!(class.name().as_str(), name);
    assert!(kind.numbered_class_name(0).as_str().starts_with(kind.prefix()));

    let last = class.type_parameters().last().unwrap();
    assert_eq!(last.name.as_str(), "R");
    for (index, parameter) in class.type_parameters().iter().enumerate() {
        assert_eq!(parameter.index, index);
        assert_eq!(parameter.upper_bounds[0].to_string(), "Any?");
    }
}

#[test]
fn test_fixed_metadata() {
    let class = library_class("kotlin", "Function1").unwrap();
    assert_eq!(class.kind(), ClassKind::Interface);
    assert_eq!(class.modality(), Modality::Abstract);
    assert_eq!(class.visibility(), Visibility::Public);
    assert!(!class.is_inner());
    assert!(!class.is_companion_object());
    assert!(class.primary_constructor().is_none());
    assert!(class.companion_object().is_none());
    assert!(class.annotations().is_empty());
}

#[test]
fn test_kfunction2_scenario() {
    let class = library_class("kotlin.reflect", "KFunction2").unwrap();
    let names: Vec<_> = class
        .type_parameters()
        .iter()
        .map(|p| p.name.as_str().to_owned())
        .collect();
    assert_eq!(names, vec!["P1", "P2", "R"]);
    assert_eq!(supertypes(class.as_ref()), vec!["KFunction<R>", "Function2<P1, P2, R>"]);
}

#[test]
fn test_kmember_function1_scenario() {
    let class = library_class("kotlin.reflect", "KMemberFunction1").unwrap();
    let names: Vec<_> = class
        .type_parameters()
        .iter()
        .map(|p| p.name.as_str().to_owned())
        .collect();
    assert_eq!(names, vec!["T", "P1", "R"]);
    assert_eq!(
        supertypes(class.as_ref()),
        vec!["KMemberFunction<P1, R>", "@extension Function2<T, P1, R>"]
    );
}

#[test]
fn test_kextension_function0_scenario() {
    let class = library_class("kotlin.reflect", "KExtensionFunction0").unwrap();
    assert_eq!(
        supertypes(class.as_ref()),
        vec!["KExtensionFunction<E, R>", "@extension Function1<E, R>"]
    );
}

// ============================================================================
// LOOKUP GATES
// ============================================================================

#[rstest]
#[case("kotlin", "Function1000")]
#[case("kotlin", "KFunction2")]
#[case("kotlin.reflect", "Function2")]
#[case("kotlin", "Function")]
#[case("kotlin", "MyFunction1")]
#[case("kotlin.reflect", "KFunctionX")]
fn test_names_without_function_class(#[case] package: &str, #[case] name: &str) {
    let class = library_class(package, name);
    // `Function` itself is declared, but not by the factory.
    if name == "Function" {
        assert_eq!(class.unwrap().type_parameters().len(), 1);
    } else {
        assert!(class.is_none(), "{package}.{name} should not resolve");
    }
}

#[test]
fn test_lookups_are_cached_by_fragment() {
    let first = library_class("kotlin", "Function7").unwrap();
    let second = library_class("kotlin", "Function7").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_factory_creates_fresh_instances() {
    let factory = BuiltInFictitiousFunctionClassFactory::new(&LIBRARY, Arc::new(BuiltIns::default()));
    let id = class_id("kotlin", "Function2");

    let first = factory.create_class(&id).unwrap();
    let second = factory.create_class(&id).unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.class_id(), second.class_id());
    assert_eq!(first.type_parameters().len(), second.type_parameters().len());
}

#[test]
fn test_nested_and_local_ids_are_rejected() {
    let factory = BuiltInFictitiousFunctionClassFactory::new(&LIBRARY, Arc::new(BuiltIns::default()));
    let nested = class_id("kotlin", "Outer").nested(&Name::identifier("Function1"));
    let local = ClassId::new(FqName::new("kotlin"), FqName::new("Function1"), true);

    assert!(factory.create_class(&nested).is_none());
    assert!(factory.create_class(&local).is_none());
}

// ============================================================================
// FAST REJECTION
// ============================================================================

struct CountingProvider {
    inner: PackageFragmentProviderImpl,
    calls: AtomicUsize,
}

impl PackageFragmentProvider for CountingProvider {
    fn package_fragments(&self, fq_name: &FqName) -> Vec<Arc<PackageFragment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.package_fragments(fq_name)
    }

    fn sub_packages_of(&self, fq_name: &FqName, name_filter: &dyn Fn(&Name) -> bool) -> Vec<FqName> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.sub_packages_of(fq_name, name_filter)
    }
}

fn counting_factory() -> (
    Arc<ModuleDescriptor>,
    Arc<CountingProvider>,
    BuiltInFictitiousFunctionClassFactory,
) {
    let module = ModuleDescriptor::named(Name::special("counting")).unwrap();
    module.add_dependency_on_module(&module).unwrap();

    let fragment = PackageFragment::empty(FqName::new("kotlin"), module.name().clone());
    let provider = Arc::new(CountingProvider {
        inner: PackageFragmentProviderImpl::new(module.name(), vec![fragment]),
        calls: AtomicUsize::new(0),
    });
    module
        .initialize_with_default_views(Arc::clone(&provider) as Arc<dyn PackageFragmentProvider>)
        .unwrap();

    let factory = BuiltInFictitiousFunctionClassFactory::new(&module, Arc::new(BuiltIns::default()));
    (module, provider, factory)
}

#[test]
fn test_rejection_never_touches_provider() {
    let (_module, provider, factory) = counting_factory();

    for name in ["Foo", "Fun1", "MyFunction1", "Function", "Function1234", "KFunction1"] {
        assert!(factory.create_class(&class_id("kotlin", name)).is_none());
    }
    assert!(factory.create_class(&class_id("other", "Function1")).is_none());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

    assert!(factory.create_class(&class_id("kotlin", "Function1")).is_some());
    assert!(provider.calls.load(Ordering::SeqCst) > 0);
}
