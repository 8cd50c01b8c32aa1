//! Foundation types for the resolution core.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`Name`], [`FqName`], [`ClassId`], [`ImportPath`] - Declaration names
//! - [`FileId`], [`FileRange`] - Source positions for diagnostics
//! - [`ModuleError`], [`InternalError`], [`fatal`] - Programming errors
//!
//! This module has NO dependencies on other descry modules.

mod error;
mod name;
mod source;

pub use error::{InternalError, ModuleError, fatal};
pub use name::{ClassId, FqName, ImportPath, Name};
pub use source::{FileId, FileRange, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
