//! Project configuration
//!
//! `vxmod.yml` at the project root declares the module being built, the modules
//! it includes, and where those includes are installed from.

pub mod project;
pub mod repository;

pub use project::{parse_project_config, FailurePolicy, ProjectConfig};
pub use repository::RepositoryConfig;
