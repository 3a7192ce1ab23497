//! The installer service trait.
//!
//! vxmod never fetches modules itself. Everything that makes a module available
//! locally goes through [`ModuleInstaller`], so local directories, remote
//! repositories and test doubles are interchangeable.

use std::path::Path;

use async_trait::async_trait;

use crate::types::{InstallError, ModuleIdentifier};

/// A service that installs modules into a modules directory.
///
/// **Contract**:
/// - `install_module` resolves exactly once per call, with success or a typed
///   [`InstallError`].
/// - On success the module lives at `mods_dir/<identifier>/`, with its build
///   output at the root and its bundled jars under `lib/`.
/// - If `mods_dir/<identifier>/` already exists the installer must not touch it
///   and must return [`InstallError::AlreadyInstalled`].
/// - A failed install must not leave a partial module directory behind.
///
/// **Concurrency**: The resolver dispatches all includes at once, so
/// `install_module` is called concurrently for different identifiers on the same
/// installer instance. Implementations must be `Send + Sync`.
///
/// # Example
///
/// ```rust
/// # use std::path::Path;
/// # use vxmod_installer_protocol::{async_trait, InstallError, ModuleIdentifier, ModuleInstaller};
/// struct OfflineInstaller;
///
/// #[async_trait]
/// impl ModuleInstaller for OfflineInstaller {
///     fn name(&self) -> &str {
///         "offline"
///     }
///
///     async fn install_module(
///         &self,
///         _module: &ModuleIdentifier,
///         _mods_dir: &Path,
///     ) -> Result<(), InstallError> {
///         Err(InstallError::NotFound {
///             repository: self.name().to_string(),
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait ModuleInstaller: Send + Sync {
    /// Human-readable name used in logs and error messages, e.g. a repository
    /// path or URL.
    fn name(&self) -> &str;

    /// Install `module` into `mods_dir/<identifier>/`.
    ///
    /// # Errors
    ///
    /// - [`InstallError::AlreadyInstalled`] if the module directory exists
    /// - [`InstallError::NotFound`] if this installer has no such module
    /// - [`InstallError::Failed`] for anything else
    async fn install_module(
        &self,
        module: &ModuleIdentifier,
        mods_dir: &Path,
    ) -> Result<(), InstallError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct FixedInstaller {
        result: Result<(), InstallError>,
    }

    #[async_trait]
    impl ModuleInstaller for FixedInstaller {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn install_module(
            &self,
            _module: &ModuleIdentifier,
            _mods_dir: &Path,
        ) -> Result<(), InstallError> {
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_installer_is_object_safe() {
        let installer: Arc<dyn ModuleInstaller> = Arc::new(FixedInstaller {
            result: Err(InstallError::AlreadyInstalled),
        });
        let id = ModuleIdentifier::new("a~b~1").unwrap();

        let result = installer.install_module(&id, Path::new("mods")).await;
        assert_eq!(result, Err(InstallError::AlreadyInstalled));
        assert_eq!(installer.name(), "fixed");
    }
}
