//! Project model: declaring modules and building the module graph.

mod setup;

pub use setup::{ModuleSpec, Project, ProjectBuilder, SetupError};
