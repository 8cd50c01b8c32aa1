//! Lifecycle violations and internal-consistency failures.
//!
//! Both are programming errors: a correctly constructed module graph never
//! produces them. Lifecycle operations return [`ModuleError`] so the caller
//! decides how to fail; query paths abort through [`fatal`].

use thiserror::Error;

use super::{ClassId, FqName, Name};

/// Misuse of the module seal/initialize lifecycle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModuleError {
    #[error("module name must be special: {0}")]
    NameNotSpecial(Name),

    #[error("module {module} is sealed and cannot be modified")]
    ModifySealed { module: Name },

    #[error("module {module} already depends on {dependency}")]
    DuplicateDependency { module: Name, dependency: Name },

    #[error("module {module} cannot be a friend of itself")]
    FriendToSelf { module: Name },

    #[error("cannot add friend {friend} to sealed module {module}")]
    FriendAfterSeal { module: Name, friend: Name },

    #[error("module {module} must be in its own dependency list")]
    MissingSelfDependency { module: Name },

    #[error("module {module} is already initialized")]
    AlreadyInitialized { module: Name },

    #[error("module {module} is not initialized")]
    NotInitialized { module: Name },

    #[error("dependency {dependency} of module {module} is not initialized")]
    DependencyNotInitialized { module: Name, dependency: Name },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InternalError {
    #[error("root package does not exist in module {module}")]
    MissingRootPackage { module: Name },

    #[error("class {name} not found in package fragment {package}")]
    MissingBuiltInClass { name: Name, package: FqName },

    #[error("expected exactly one package fragment for {package}, found {found}")]
    FragmentCount { package: FqName, found: usize },

    #[error("module owning {class_id} is no longer alive")]
    ModuleDropped { class_id: ClassId },

    #[error("module {module} was dropped while a dependent module still referenced it")]
    DependencyDropped { module: Name },

    #[error(transparent)]
    Lifecycle(#[from] ModuleError),
}

/// Abort the current operation on an internal-consistency failure.
#[cold]
#[track_caller]
pub fn fatal(error: InternalError) -> ! {
    tracing::error!(%error, "internal consistency failure");
    panic!("{error}")
}
