//! # descry-base
//!
//! Descriptor resolution core: modules and package views, import
//! resolution, and the synthetic `FunctionN`/`KFunctionN` classes.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! project     → Module graph setup (ProjectBuilder)
//!   ↓
//! ide         → Index-backed package views for the editor
//!   ↓
//! resolve     → Import directives: package peel + member lookup
//!   ↓
//! syntax      → Lexer + parser for package/import headers
//!   ↓
//! builtins    → Built-in library, function classes and their factory
//!   ↓
//! descriptors → Modules, fragments, package views, classes
//!   ↓
//! storage     → Lazy values, memoized functions, session caches
//!   ↓
//! base        → Primitives (Name, FqName, ClassId, FileRange, errors)
//! ```

/// Foundation types: names, source positions, internal errors
pub mod base;

/// Memoization primitives
pub mod storage;

/// Descriptor model: modules, package fragments and views, classes
pub mod descriptors;

/// Built-in declarations and synthetic function classes
pub mod builtins;

/// Package and import directive syntax
pub mod syntax;

/// Import resolution and diagnostics
pub mod resolve;

/// Editor-side package views
pub mod ide;

/// Module graph construction
pub mod project;

// Re-export commonly needed items
pub use base::{ClassId, FileId, FileRange, FqName, ImportPath, Name, TextRange, TextSize};
pub use builtins::{BuiltIns, FunctionKind};
pub use descriptors::{Descriptor, ModuleDescriptor};
pub use project::{ModuleSpec, Project, ProjectBuilder};
pub use resolve::{Diagnostic, ImportDirectiveProcessor, ImportOptions, ImportScope, LookupMode};
