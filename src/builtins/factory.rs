//! The class factory behind numbered function classes.

use std::sync::{Arc, Weak};

use super::{BuiltIns, FunctionClassDescriptor, FunctionKind};
use crate::base::{ClassId, InternalError, fatal};
use crate::descriptors::{
    ClassDescriptor, ClassDescriptorFactory, ModuleDescriptor, single_package_fragment,
};

/// Longest arity suffix accepted; longer suffixes are never function classes.
const MAX_ARITY_DIGITS: usize = 3;

/// Produces `FunctionN` in the built-ins package and `KFunctionN`,
/// `KMemberFunctionN`, `KExtensionFunctionN` in the reflection package.
///
/// Each call builds a fresh descriptor; package fragments cache the result.
pub struct BuiltInFictitiousFunctionClassFactory {
    module: Weak<ModuleDescriptor>,
    builtins: Arc<BuiltIns>,
}

impl BuiltInFictitiousFunctionClassFactory {
    pub fn new(module: &Arc<ModuleDescriptor>, builtins: Arc<BuiltIns>) -> Self {
        Self {
            module: Arc::downgrade(module),
            builtins,
        }
    }

    /// Split `KMemberFunction12` into its kind and arity.
    ///
    /// Kinds are tried in order; the first kind whose prefix matches decides
    /// the outcome, even when its suffix turns out not to be an arity.
    pub fn parse_class_name(
        class_name: &str,
        allowed_kinds: &[FunctionKind],
    ) -> Option<(FunctionKind, u32)> {
        let (kind, suffix) = allowed_kinds
            .iter()
            .find_map(|&kind| Some((kind, class_name.strip_prefix(kind.prefix())?)))?;

        if suffix.is_empty()
            || suffix.len() > MAX_ARITY_DIGITS
            || !suffix.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }
        let arity = suffix.parse().ok()?;
        Some((kind, arity))
    }

    fn allowed_kinds(&self, class_id: &ClassId) -> Option<&'static [FunctionKind]> {
        let package = class_id.package_fq_name();
        if package == self.builtins.builtins_package() {
            Some(FunctionKind::FUNCTIONS)
        } else if package == self.builtins.reflect_package() {
            Some(FunctionKind::KFUNCTIONS)
        } else {
            None
        }
    }
}

impl ClassDescriptorFactory for BuiltInFictitiousFunctionClassFactory {
    fn create_class(&self, class_id: &ClassId) -> Option<Arc<dyn ClassDescriptor>> {
        if class_id.is_local() || class_id.is_nested_class() {
            return None;
        }

        let class_name = class_id.relative_class_name().as_str();
        if !class_name.contains("Function") {
            return None;
        }

        let allowed_kinds = self.allowed_kinds(class_id)?;
        let (kind, arity) = Self::parse_class_name(class_name, allowed_kinds)?;

        let module = self.module.upgrade().unwrap_or_else(|| {
            fatal(InternalError::ModuleDropped {
                class_id: class_id.clone(),
            })
        });
        let provider = module.package_fragment_provider();
        let container = single_package_fragment(provider.as_ref(), class_id.package_fq_name());

        tracing::debug!(class = %class_id, %kind, arity, "synthesizing function class");
        Some(Arc::new(FunctionClassDescriptor::new(
            kind,
            arity,
            &container,
            &module,
            Arc::clone(&self.builtins),
        )))
    }
}
