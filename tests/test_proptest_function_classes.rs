//! Property-based tests for function class naming and shape.
//!
//! Uses proptest to generate kinds and arities and checks that the factory
//! accepts exactly the names it can synthesize, and that synthesized classes
//! always carry `arity + receivers + 1` type parameters.
#![cfg(feature = "proptest")]

use std::sync::Arc;

use descry::builtins::{BuiltInFictitiousFunctionClassFactory, create_library_module};
use descry::descriptors::ModuleDescriptor;
use descry::{BuiltIns, FqName, FunctionKind, Name};
use once_cell::sync::Lazy;
use proptest::prelude::*;

static LIBRARY: Lazy<Arc<ModuleDescriptor>> =
    Lazy::new(|| create_library_module(Arc::new(BuiltIns::default())).unwrap());

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

fn arb_kind() -> impl Strategy<Value = FunctionKind> {
    prop_oneof![
        Just(FunctionKind::Function),
        Just(FunctionKind::KFunction),
        Just(FunctionKind::KMemberFunction),
        Just(FunctionKind::KExtensionFunction),
    ]
}

fn allowed(kind: FunctionKind) -> &'static [FunctionKind] {
    if kind.is_reflective() {
        FunctionKind::KFUNCTIONS
    } else {
        FunctionKind::FUNCTIONS
    }
}

fn package(kind: FunctionKind) -> &'static str {
    if kind.is_reflective() {
        "kotlin.reflect"
    } else {
        "kotlin"
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_numbered_names_parse(kind in arb_kind(), arity in 0u32..1000) {
        let name = kind.numbered_class_name(arity);
        prop_assert_eq!(
            BuiltInFictitiousFunctionClassFactory::parse_class_name(name.as_str(), allowed(kind)),
            Some((kind, arity))
        );
    }

    #[test]
    fn prop_four_digit_arities_rejected(kind in arb_kind(), arity in 1000u32..100_000) {
        let name = kind.numbered_class_name(arity);
        prop_assert_eq!(
            BuiltInFictitiousFunctionClassFactory::parse_class_name(name.as_str(), allowed(kind)),
            None
        );
    }

    #[test]
    fn prop_non_digit_suffix_rejected(kind in arb_kind(), suffix in "[a-zA-Z_][a-zA-Z0-9_]{0,3}") {
        let name = format!("{}{}", kind.prefix(), suffix);
        prop_assert_eq!(
            BuiltInFictitiousFunctionClassFactory::parse_class_name(&name, allowed(kind)),
            None
        );
    }

    #[test]
    fn prop_type_parameter_count(kind in arb_kind(), arity in 0u32..=255) {
        let view = LIBRARY.package(&FqName::new(package(kind))).unwrap();
        let class = view
            .member_scope()
            .classifier(&kind.numbered_class_name(arity))
            .unwrap();

        let expected = arity as usize + kind.receiver_count() as usize + 1;
        prop_assert_eq!(class.type_parameters().len(), expected);
        prop_assert_eq!(class.type_parameters()[expected - 1].name.clone(), Name::identifier("R"));
        prop_assert!(!class.supertypes().is_empty());
    }
}
