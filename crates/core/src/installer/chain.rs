use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use vxmod_installer_protocol::{async_trait, InstallError, ModuleIdentifier, ModuleInstaller};

use super::ensure_not_installed;

/// Tries each repository in order until one of them has the module.
///
/// Only [`InstallError::NotFound`] falls through to the next repository; any
/// other result, including a failure, ends the search.
pub struct RepositoryChain {
    installers: Vec<Arc<dyn ModuleInstaller>>,
    name: String,
}

impl RepositoryChain {
    pub fn new(installers: Vec<Arc<dyn ModuleInstaller>>) -> Self {
        let name = installers
            .iter()
            .map(|i| i.name().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self { installers, name }
    }

    pub fn len(&self) -> usize {
        self.installers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.installers.is_empty()
    }
}

#[async_trait]
impl ModuleInstaller for RepositoryChain {
    fn name(&self) -> &str {
        &self.name
    }

    async fn install_module(
        &self,
        module: &ModuleIdentifier,
        mods_dir: &Path,
    ) -> Result<(), InstallError> {
        if self.installers.is_empty() {
            return Err(InstallError::Failed(
                "no module repositories configured".to_string(),
            ));
        }

        ensure_not_installed(mods_dir, module)?;

        let mut searched = Vec::new();
        for installer in &self.installers {
            match installer.install_module(module, mods_dir).await {
                Err(InstallError::NotFound { repository }) => {
                    debug!("Module {} not found in {}", module, repository);
                    searched.push(repository);
                }
                result => return result,
            }
        }

        Err(InstallError::Failed(format!(
            "module {} not found in any repository (searched: {})",
            module,
            searched.join(", ")
        )))
    }
}
