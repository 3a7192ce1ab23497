use std::path::{Path, PathBuf};

use vxmod_installer_protocol::{async_trait, InstallError, ModuleIdentifier, ModuleInstaller};

use super::{ensure_not_installed, install_from_source, maven_archive_path, ModuleSource};

/// Installs modules from a directory on disk.
///
/// A module is looked up, in order, as:
/// - an unpacked directory `<root>/<identifier>/`
/// - an archive `<root>/<identifier>.zip`
/// - a Maven-layout archive `<root>/<group path>/<name>/<version>/<name>-<version>-mod.zip`
pub struct LocalRepositoryInstaller {
    root: PathBuf,
    name: String,
}

impl LocalRepositoryInstaller {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root.display().to_string();
        Self { root, name }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locate(&self, module: &ModuleIdentifier) -> Option<ModuleSource> {
        let unpacked = self.root.join(module.as_str());
        if unpacked.is_dir() {
            return Some(ModuleSource::Directory(unpacked));
        }

        let archive = self.root.join(format!("{}.zip", module));
        if archive.is_file() {
            return Some(ModuleSource::Archive(archive));
        }

        let maven_archive = self.root.join(maven_archive_path(module));
        if maven_archive.is_file() {
            return Some(ModuleSource::Archive(maven_archive));
        }

        None
    }
}

#[async_trait]
impl ModuleInstaller for LocalRepositoryInstaller {
    fn name(&self) -> &str {
        &self.name
    }

    async fn install_module(
        &self,
        module: &ModuleIdentifier,
        mods_dir: &Path,
    ) -> Result<(), InstallError> {
        ensure_not_installed(mods_dir, module)?;

        let source = self.locate(module).ok_or_else(|| InstallError::NotFound {
            repository: self.name.clone(),
        })?;

        install_from_source(source, module, mods_dir).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::zip_directory;
    use std::fs;
    use tempfile::TempDir;

    fn id(raw: &str) -> ModuleIdentifier {
        ModuleIdentifier::new(raw).unwrap()
    }

    fn write_module(dir: &Path) {
        fs::create_dir_all(dir.join("lib")).unwrap();
        fs::write(dir.join("mod.json"), "{\"main\":\"Main\"}").unwrap();
        fs::write(dir.join("lib").join("support.jar"), "jar").unwrap();
    }

    #[tokio::test]
    async fn test_installs_unpacked_module() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        write_module(&repo.join("g~plain~1"));
        let mods_dir = temp.path().join("mods");

        let installer = LocalRepositoryInstaller::new(&repo);
        installer
            .install_module(&id("g~plain~1"), &mods_dir)
            .await
            .unwrap();

        assert!(mods_dir.join("g~plain~1").join("mod.json").is_file());
        assert!(mods_dir.join("g~plain~1").join("lib").join("support.jar").is_file());
        // The repository copy is untouched
        assert!(repo.join("g~plain~1").join("mod.json").is_file());
    }

    #[tokio::test]
    async fn test_installs_zipped_and_maven_layout_modules() {
        let temp = TempDir::new().unwrap();
        let staging = temp.path().join("staging");
        write_module(&staging);

        let repo = temp.path().join("repo");
        zip_directory(&staging, &repo.join("g~zipped~1.zip")).unwrap();
        zip_directory(
            &staging,
            &repo.join("io/example/maven/2.0/maven-2.0-mod.zip"),
        )
        .unwrap();

        let mods_dir = temp.path().join("mods");
        let installer = LocalRepositoryInstaller::new(&repo);

        installer
            .install_module(&id("g~zipped~1"), &mods_dir)
            .await
            .unwrap();
        installer
            .install_module(&id("io.example~maven~2.0"), &mods_dir)
            .await
            .unwrap();

        assert!(mods_dir.join("g~zipped~1").join("lib").join("support.jar").is_file());
        assert!(mods_dir.join("io.example~maven~2.0").join("mod.json").is_file());
    }

    #[tokio::test]
    async fn test_second_install_reports_already_installed() {
        let temp = TempDir::new().unwrap();
        let repo = temp.path().join("repo");
        write_module(&repo.join("g~twice~1"));
        let mods_dir = temp.path().join("mods");
        let installer = LocalRepositoryInstaller::new(&repo);

        installer
            .install_module(&id("g~twice~1"), &mods_dir)
            .await
            .unwrap();
        let second = installer.install_module(&id("g~twice~1"), &mods_dir).await;

        assert_eq!(second, Err(InstallError::AlreadyInstalled));
    }

    #[tokio::test]
    async fn test_unknown_module_is_not_found() {
        let temp = TempDir::new().unwrap();
        let installer = LocalRepositoryInstaller::new(temp.path().join("repo"));

        let result = installer
            .install_module(&id("g~missing~1"), &temp.path().join("mods"))
            .await;

        assert!(matches!(result, Err(InstallError::NotFound { .. })));
        assert!(!temp.path().join("mods").join("g~missing~1").exists());
    }
}
