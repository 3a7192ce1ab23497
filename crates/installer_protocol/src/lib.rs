//! # vxmod Installer Protocol
//!
//! This crate defines the seam between vxmod and the services that make modules
//! available locally. An installer service receives a [`ModuleIdentifier`] and a
//! target directory, and reports exactly one terminal result per request.
//!
//! ## Overview
//!
//! - [`ModuleIdentifier`] - A validated `group~name~version` module name
//! - [`InstallError`] - Typed classification of install failures
//! - [`InstallOutcome`] - The terminal outcome of one install request
//! - [`ModuleInstaller`] - The trait installer services implement
//!
//! ## Quick Start
//!
//! ```rust
//! use std::path::Path;
//! use vxmod_installer_protocol::{async_trait, InstallError, ModuleIdentifier, ModuleInstaller};
//!
//! struct NoopInstaller;
//!
//! #[async_trait]
//! impl ModuleInstaller for NoopInstaller {
//!     fn name(&self) -> &str {
//!         "noop"
//!     }
//!
//!     async fn install_module(
//!         &self,
//!         module: &ModuleIdentifier,
//!         mods_dir: &Path,
//!     ) -> Result<(), InstallError> {
//!         if mods_dir.join(module.as_str()).exists() {
//!             return Err(InstallError::AlreadyInstalled);
//!         }
//!         Ok(())
//!     }
//! }
//! ```

pub mod traits;
pub mod types;

pub use async_trait::async_trait;
pub use traits::ModuleInstaller;
pub use types::{InstallError, InstallOutcome, ModuleIdentifier, ModuleIdentifierError};
