//! vxmod Core Library
//!
//! This is the core library for vxmod, a build plugin that assembles and packages
//! modules for a module-based runtime platform. It resolves and installs the
//! modules a project includes, registers their dependency sets with the build,
//! generates the module descriptor and lays out the module directory.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`module_manager`] - High-level interface driving a project's module build
//! - [`resolver`] - Concurrent include resolution against an installer service
//! - [`installer`] - Local, remote and chained repository installers
//! - [`dependencies`] - The `includes` and `libs` dependency configurations
//! - [`descriptor`] - `mod.json` generation
//! - [`assembly`] - Module directory assembly and packaging
//! - [`archive`] - Module archive extraction and creation
//! - [`configs`] - `vxmod.yml` parsing
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The primary entry point is the [`ModuleManager`]:
//!
//! ```rust,no_run
//! use vxmod_core::module_manager::{ModuleManager, ModuleManagerConfig};
//! use std::path::PathBuf;
//!
//! # async fn example() -> vxmod_core::types::VxmodResult<()> {
//! let mut manager = ModuleManager::new(ModuleManagerConfig {
//!     project_root: PathBuf::from("."),
//! })?;
//!
//! let result = manager.build().await?;
//! println!("{}", result.archive.display());
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod assembly;
pub mod configs;
pub mod dependencies;
pub mod descriptor;
pub mod files;
pub mod installer;
pub mod module_manager;
pub mod resolver;
pub mod types;

// Re-export the main types for easier usage
pub use module_manager::{ModuleManager, ModuleManagerConfig};
pub use types::{VxmodError, VxmodResult};
pub use vxmod_installer_protocol as installer_protocol;
