//! Repository-backed module installers
//!
//! - [`local::LocalRepositoryInstaller`] - modules from a directory on disk
//! - [`remote::RemoteRepositoryInstaller`] - module archives from a Maven-layout HTTP repository
//! - [`chain::RepositoryChain`] - tries several repositories in order
//!
//! All of them stage a module next to its final location and rename it into
//! place, so a failed install never leaves a half-written module directory.

pub mod chain;
pub mod local;
pub mod remote;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use vxmod_installer_protocol::{InstallError, ModuleIdentifier, ModuleInstaller};

use crate::archive::extract_zip;
use crate::configs::repository::{RepositoryConfig, RepositoryLocation, DEFAULT_LOCAL_REPOSITORY};
use crate::files::copy_dir_all;
use crate::types::{VxmodError, VxmodResult};

pub use chain::RepositoryChain;
pub use local::LocalRepositoryInstaller;
pub use remote::RemoteRepositoryInstaller;

/// Build the repository chain described by a project's configuration.
///
/// Relative local paths are resolved against `project_root`. Without any
/// configured repository, the project's `repo/` directory is used.
pub fn repository_chain(
    project_root: &Path,
    repositories: &[RepositoryConfig],
    download_cache_dir: &Path,
) -> VxmodResult<RepositoryChain> {
    let default_repositories = [RepositoryConfig::local(DEFAULT_LOCAL_REPOSITORY)];
    let repositories = if repositories.is_empty() {
        &default_repositories[..]
    } else {
        repositories
    };

    let mut installers: Vec<Arc<dyn ModuleInstaller>> = Vec::new();
    for repository in repositories {
        match repository.location()? {
            RepositoryLocation::Remote(url) => installers.push(Arc::new(
                RemoteRepositoryInstaller::new(url, download_cache_dir),
            )),
            RepositoryLocation::Local(path) => installers.push(Arc::new(
                LocalRepositoryInstaller::new(project_root.join(path)),
            )),
        }
    }

    Ok(RepositoryChain::new(installers))
}

/// Path of a module archive relative to a Maven-layout repository root
pub fn maven_archive_path(module: &ModuleIdentifier) -> String {
    format!(
        "{}/{}/{}/{}-{}-mod.zip",
        module.group().replace('.', "/"),
        module.name(),
        module.version(),
        module.name(),
        module.version()
    )
}

/// Where an installed module lives
pub(crate) fn module_dir(mods_dir: &Path, module: &ModuleIdentifier) -> PathBuf {
    mods_dir.join(module.as_str())
}

pub(crate) fn ensure_not_installed(
    mods_dir: &Path,
    module: &ModuleIdentifier,
) -> Result<(), InstallError> {
    if module_dir(mods_dir, module).exists() {
        return Err(InstallError::AlreadyInstalled);
    }
    Ok(())
}

/// What a repository hands over for a module
#[derive(Debug, Clone)]
pub(crate) enum ModuleSource {
    Directory(PathBuf),
    Archive(PathBuf),
}

/// Whether a staged module may still be renamed into place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitState {
    Pending,
    Committed,
    Cancelled,
}

type SharedCommitState = Arc<Mutex<CommitState>>;

fn lock_state(state: &SharedCommitState) -> MutexGuard<'_, CommitState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Held by the awaiting side of an install. Dropping it before the install
/// finished, e.g. when a timeout discards the install future, keeps the
/// blocking job from committing, or undoes a commit nobody will observe.
struct CommitGuard {
    state: SharedCommitState,
    target: PathBuf,
    finished: bool,
}

impl Drop for CommitGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut state = lock_state(&self.state);
        match *state {
            CommitState::Pending => *state = CommitState::Cancelled,
            CommitState::Committed => {
                debug!("Rolling back abandoned install at {}", self.target.display());
                let _ = fs::remove_dir_all(&self.target);
                *state = CommitState::Cancelled;
            }
            CommitState::Cancelled => {}
        }
    }
}

/// Copy or extract `source` into `mods_dir/<module>` on a blocking thread.
///
/// If the returned future is dropped before it completes, the module is not
/// left installed.
pub(crate) async fn install_from_source(
    source: ModuleSource,
    module: &ModuleIdentifier,
    mods_dir: &Path,
) -> Result<(), InstallError> {
    let state = Arc::new(Mutex::new(CommitState::Pending));
    let mut guard = CommitGuard {
        state: Arc::clone(&state),
        target: module_dir(mods_dir, module),
        finished: false,
    };

    let module = module.clone();
    let mods_dir = mods_dir.to_path_buf();
    let joined =
        tokio::task::spawn_blocking(move || stage_and_commit(&source, &module, &mods_dir, &state))
            .await;
    guard.finished = true;

    joined.map_err(|e| InstallError::Failed(format!("install task failed: {}", e)))?
}

fn stage_and_commit(
    source: &ModuleSource,
    module: &ModuleIdentifier,
    mods_dir: &Path,
    state: &SharedCommitState,
) -> Result<(), InstallError> {
    let target = module_dir(mods_dir, module);

    let staged = fs::create_dir_all(mods_dir)
        .map_err(VxmodError::from)
        .and_then(|()| {
            // Unique per install, so concurrent installs of one module never share it
            tempfile::Builder::new()
                .prefix(&format!(".{}.", module))
                .suffix(".installing")
                .tempdir_in(mods_dir)
                .map_err(VxmodError::from)
        })
        .and_then(|staging| {
            let content_root = stage(source, module, staging.path())?;
            Ok((staging, content_root))
        });

    let committed = staged.and_then(|(_staging, content_root)| {
        let mut state = lock_state(state);
        if *state == CommitState::Cancelled {
            return Err(VxmodError::Path(format!(
                "install of {} was abandoned before it finished",
                module
            )));
        }
        if target.exists() {
            return Err(VxmodError::Path(format!(
                "{} appeared while installing",
                target.display()
            )));
        }
        fs::rename(&content_root, &target)?;
        *state = CommitState::Committed;
        Ok(())
    });

    match committed {
        Ok(()) => Ok(()),
        // Another install won the race for the same module
        Err(_) if target.exists() && *lock_state(state) != CommitState::Cancelled => {
            Err(InstallError::AlreadyInstalled)
        }
        Err(e) => Err(InstallError::Failed(e.to_string())),
    }
}

/// Fill `staging` from `source` and return the directory holding the module
/// contents.
fn stage(source: &ModuleSource, module: &ModuleIdentifier, staging: &Path) -> VxmodResult<PathBuf> {
    let content = staging.join("content");

    match source {
        ModuleSource::Directory(dir) => {
            debug!("Copying module {} from {}", module, dir.display());
            copy_dir_all(dir, &content)?;
        }
        ModuleSource::Archive(archive) => {
            debug!("Extracting module {} from {}", module, archive.display());
            extract_zip(archive, &content)?;
        }
    }

    // Some archives wrap the module in a top-level directory named after it
    let wrapped = content.join(module.as_str());
    let only_entry = fs::read_dir(&content)?.count() == 1;
    if only_entry && wrapped.is_dir() {
        return Ok(wrapped);
    }

    Ok(content)
}
