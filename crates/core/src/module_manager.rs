//! High-level module build interface
//!
//! [`ModuleManager`] is the entry point used by the CLI and by host builds. It
//! loads `vxmod.yml`, owns the session's dependency configurations, and drives
//! include resolution, descriptor generation, assembly and packaging.
//!
//! ## Example
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
//! // Install includes and register their dependency sets
//! let report = manager.resolve_includes().await?;
//!
//! // Copy output and jars into build/mod/<module> and zip it
//! manager.assemble()?;
//! let archive = manager.package()?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use vxmod_installer_protocol::{ModuleIdentifier, ModuleInstaller};

use crate::assembly::{self, AssemblyReport, ModuleLayout};
use crate::configs::project::{parse_project_config, ProjectConfig, PROJECT_CONFIG_FILE};
use crate::dependencies::DependencyConfigurations;
use crate::descriptor;
use crate::installer::repository_chain;
use crate::resolver::{IncludeResolver, ResolutionReport};
use crate::types::{VxmodError, VxmodResult};

/// Per-project state directory
pub const STATE_DIR: &str = ".vxmod";

/// Configuration for initializing a module manager
pub struct ModuleManagerConfig {
    pub project_root: PathBuf,
}

/// Result of a full build
#[derive(Debug)]
pub struct BuildResult {
    pub resolution: ResolutionReport,
    pub assembly: AssemblyReport,
    pub archive: PathBuf,
}

pub struct ModuleManager {
    pub project_root: PathBuf,
    pub config: ProjectConfig,
    pub module: ModuleIdentifier,
    pub dependencies: DependencyConfigurations,
    installer: Arc<dyn ModuleInstaller>,
}

impl ModuleManager {
    /// Load the project at `config.project_root` with installers built from its
    /// configured repositories
    pub fn new(config: ModuleManagerConfig) -> VxmodResult<Self> {
        let project_config = Self::load_project_config(&config.project_root)?;
        let installer = repository_chain(
            &config.project_root,
            project_config.repositories.as_deref().unwrap_or_default(),
            &Self::download_cache_dir(&config.project_root),
        )?;

        Self::with_installer(config.project_root, project_config, Arc::new(installer))
    }

    /// Use a caller-supplied installer service instead of the configured
    /// repositories
    pub fn with_installer(
        project_root: PathBuf,
        config: ProjectConfig,
        installer: Arc<dyn ModuleInstaller>,
    ) -> VxmodResult<Self> {
        let module = config.module_id()?;
        // Validate includes up front so a typo fails before any install starts
        config.include_ids()?;

        Ok(Self {
            project_root,
            config,
            module,
            dependencies: DependencyConfigurations::new(),
            installer,
        })
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.project_root.join(self.config.mods_dir())
    }

    pub fn layout(&self) -> ModuleLayout {
        ModuleLayout::new(
            self.module.clone(),
            self.project_root.join(self.config.build_dir()),
        )
    }

    /// Install the declared includes and register their dependency sets.
    ///
    /// Each pass starts from empty configurations, so they only ever hold the
    /// registrations of the latest pass.
    pub async fn resolve_includes(&mut self) -> VxmodResult<ResolutionReport> {
        let includes = self.config.include_ids()?;
        self.dependencies = DependencyConfigurations::new();
        let resolver = IncludeResolver::new(Arc::clone(&self.installer), self.mods_dir())
            .with_failure_policy(self.config.failure_policy())
            .with_install_timeout(self.config.install_timeout());

        resolver
            .resolve_includes(&includes, &mut self.dependencies)
            .await
    }

    /// Write `mod.json` into the module directory
    pub fn generate_descriptor(&self) -> VxmodResult<PathBuf> {
        let path = self.layout().descriptor_path();
        descriptor::write_descriptor(&self.config, &path)?;
        Ok(path)
    }

    pub fn assemble(&self) -> VxmodResult<AssemblyReport> {
        assembly::assemble(&self.project_root, &self.config, &self.layout())
    }

    pub fn package(&self) -> VxmodResult<PathBuf> {
        assembly::package(&self.layout())
    }

    /// Resolve includes, assemble and package
    pub async fn build(&mut self) -> VxmodResult<BuildResult> {
        let resolution = self.resolve_includes().await?;
        let assembly = self.assemble()?;
        let archive = self.package()?;

        Ok(BuildResult {
            resolution,
            assembly,
            archive,
        })
    }

    /// Identifiers of the modules currently installed in the mods directory
    pub fn installed_modules(&self) -> VxmodResult<Vec<ModuleIdentifier>> {
        let mods_dir = self.mods_dir();
        let mut modules = Vec::new();

        if !mods_dir.exists() {
            return Ok(modules);
        }

        for entry in std::fs::read_dir(&mods_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            // Staging directories and anything else that is not a module are skipped
            if let Some(module) = entry
                .file_name()
                .to_str()
                .filter(|name| !name.starts_with('.'))
                .and_then(|name| ModuleIdentifier::new(name).ok())
            {
                modules.push(module);
            }
        }

        modules.sort();
        Ok(modules)
    }

    /// Remove every installed module
    pub async fn clear_installed(&self) -> VxmodResult<()> {
        let mods_dir = self.mods_dir();
        if mods_dir.exists() {
            tokio::fs::remove_dir_all(&mods_dir).await.map_err(|e| {
                VxmodError::Path(format!(
                    "Failed to clear installed modules {}: {}",
                    mods_dir.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    fn download_cache_dir(project_root: &Path) -> PathBuf {
        project_root.join(STATE_DIR).join("cache").join("downloads")
    }

    fn load_project_config(project_root: &Path) -> VxmodResult<ProjectConfig> {
        let config_path = project_root.join(PROJECT_CONFIG_FILE);
        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            VxmodError::Config(format!(
                "Failed to read project config {}: {}",
                config_path.display(),
                e
            ))
        })?;

        parse_project_config(&content).map_err(|e| {
            VxmodError::Config(format!(
                "Failed to parse project config {}: {}",
                config_path.display(),
                e
            ))
        })
    }
}
