//! Module include resolution
//!
//! [`IncludeResolver`] asks an installer service to install every declared
//! include, waits until each install has produced exactly one outcome, and then
//! registers the `includes`/`libs` dependency sets of every module that is now
//! available.
//!
//! Installs run concurrently as separate tasks. Their outcomes come back through
//! the joined handles, so the host's [`DependencyConfigurations`] are only
//! touched after the join, sequentially and in declaration order, no matter in
//! which order the installs finished.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, info, warn};
use vxmod_installer_protocol::{InstallError, InstallOutcome, ModuleIdentifier, ModuleInstaller};

use crate::configs::project::{FailurePolicy, DEFAULT_INSTALL_TIMEOUT_SECS};
use crate::dependencies::{DependencyConfigurations, DependencyRegistration};
use crate::types::{VxmodError, VxmodResult};

/// Outcome of installing one include
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleResolution {
    pub module: ModuleIdentifier,
    pub outcome: InstallOutcome,
}

/// Outcomes of a resolution pass, in declaration order
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    pub resolutions: Vec<ModuleResolution>,
}

impl ResolutionReport {
    /// Modules whose dependency sets were registered
    pub fn resolved(&self) -> impl Iterator<Item = &ModuleResolution> {
        self.resolutions
            .iter()
            .filter(|r| r.outcome.registers_dependencies())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ModuleResolution> {
        self.resolutions
            .iter()
            .filter(|r| !r.outcome.registers_dependencies())
    }

    pub fn has_failures(&self) -> bool {
        self.failed().next().is_some()
    }
}

pub struct IncludeResolver {
    installer: Arc<dyn ModuleInstaller>,
    mods_dir: PathBuf,
    failure_policy: FailurePolicy,
    install_timeout: Duration,
}

impl IncludeResolver {
    pub fn new(installer: Arc<dyn ModuleInstaller>, mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            installer,
            mods_dir: mods_dir.into(),
            failure_policy: FailurePolicy::default(),
            install_timeout: Duration::from_secs(DEFAULT_INSTALL_TIMEOUT_SECS),
        }
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn with_install_timeout(mut self, install_timeout: Duration) -> Self {
        self.install_timeout = install_timeout;
        self
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Install every include and register the dependency sets of the modules
    /// that are available afterwards.
    ///
    /// Returns once every include has a terminal outcome. Under
    /// [`FailurePolicy::Log`] failed installs are only logged; under
    /// [`FailurePolicy::Fail`] they produce [`VxmodError::Resolution`] after the
    /// successful modules have been registered.
    pub async fn resolve_includes(
        &self,
        includes: &[ModuleIdentifier],
        target: &mut DependencyConfigurations,
    ) -> VxmodResult<ResolutionReport> {
        if includes.is_empty() {
            debug!("No module includes declared");
            return Ok(ResolutionReport::default());
        }

        info!(
            "Resolving {} module include(s) with {}",
            includes.len(),
            self.installer.name()
        );

        let handles: Vec<_> = includes
            .iter()
            .map(|module| {
                let installer = Arc::clone(&self.installer);
                let module = module.clone();
                let mods_dir = self.mods_dir.clone();
                let install_timeout = self.install_timeout;
                tokio::spawn(async move {
                    install_with_timeout(installer.as_ref(), &module, &mods_dir, install_timeout)
                        .await
                })
            })
            .collect();

        // join_all keeps the declaration order of the handles
        let resolutions: Vec<ModuleResolution> = join_all(handles)
            .await
            .into_iter()
            .zip(includes)
            .map(|(joined, module)| {
                let outcome = joined.unwrap_or_else(|e| {
                    InstallOutcome::Failed(format!("install task aborted: {}", e))
                });
                log_outcome(module, &outcome);
                ModuleResolution {
                    module: module.clone(),
                    outcome,
                }
            })
            .collect();

        for resolution in &resolutions {
            if !resolution.outcome.registers_dependencies() {
                continue;
            }
            for (kind, registration) in
                DependencyRegistration::for_module(&resolution.module, &self.mods_dir)
            {
                target.register(kind, registration);
            }
        }

        let report = ResolutionReport { resolutions };

        if self.failure_policy == FailurePolicy::Fail && report.has_failures() {
            let failed = report
                .failed()
                .map(|r| format!("{} ({})", r.module, r.outcome))
                .collect::<Vec<_>>()
                .join(", ");
            return Err(VxmodError::Resolution(failed));
        }

        Ok(report)
    }
}

async fn install_with_timeout(
    installer: &dyn ModuleInstaller,
    module: &ModuleIdentifier,
    mods_dir: &Path,
    install_timeout: Duration,
) -> InstallOutcome {
    let result = tokio::time::timeout(install_timeout, installer.install_module(module, mods_dir))
        .await
        .unwrap_or_else(|_| {
            Err(InstallError::Failed(format!(
                "install did not finish within {}s",
                install_timeout.as_secs_f64()
            )))
        });

    InstallOutcome::from(result)
}

fn log_outcome(module: &ModuleIdentifier, outcome: &InstallOutcome) {
    match outcome {
        InstallOutcome::Success => info!("Installed module {}", module),
        InstallOutcome::AlreadyInstalled => debug!("Module {} is already installed", module),
        InstallOutcome::Failed(reason) => {
            warn!("Failed to install module {}: {}", module, reason)
        }
    }
}
