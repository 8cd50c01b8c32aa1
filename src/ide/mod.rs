//! Editor integration.
//!
//! The compiler answers "does package `p` exist?" from fragment providers.
//! Inside the editor that answer comes from the live project index instead,
//! which changes while the user types; [`IdePackageViewManager`] ties its
//! caches to the index session so stale answers are never served.

mod package_views;

pub use package_views::{IdePackageViewManager, ModuleInfo, ProjectPackageIndex};
