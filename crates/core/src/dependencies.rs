//! Dependency configurations owned by the host build
//!
//! A project has two append-only configurations: `includes`, holding the root
//! directory of every resolved module, and `libs`, holding the jars bundled under
//! each module's `lib/` directory. The include resolver only ever appends.

use std::fmt;
use std::path::{Path, PathBuf};

use vxmod_installer_protocol::ModuleIdentifier;

use crate::types::VxmodResult;

pub const LIB_DIR: &str = "lib";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyKind {
    Includes,
    Libs,
}

impl DependencyKind {
    pub fn configuration_name(&self) -> &'static str {
        match self {
            Self::Includes => "includes",
            Self::Libs => "libs",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.configuration_name())
    }
}

/// A reference registered in a dependency configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyRegistration {
    /// The installed module's root directory
    ModuleRoot {
        module: ModuleIdentifier,
        dir: PathBuf,
    },
    /// The jar files under the installed module's `lib/` directory.
    ///
    /// The set is evaluated lazily by [`DependencyRegistration::files`], so jars
    /// are listed as they exist when the build asks for them.
    LibJars {
        module: ModuleIdentifier,
        dir: PathBuf,
    },
}

impl DependencyRegistration {
    /// Both registrations for a module installed under `mods_dir`
    pub fn for_module(
        module: &ModuleIdentifier,
        mods_dir: &Path,
    ) -> [(DependencyKind, DependencyRegistration); 2] {
        let module_dir = mods_dir.join(module.as_str());
        [
            (
                DependencyKind::Includes,
                Self::ModuleRoot {
                    module: module.clone(),
                    dir: module_dir.clone(),
                },
            ),
            (
                DependencyKind::Libs,
                Self::LibJars {
                    module: module.clone(),
                    dir: module_dir.join(LIB_DIR),
                },
            ),
        ]
    }

    pub fn module(&self) -> &ModuleIdentifier {
        match self {
            Self::ModuleRoot { module, .. } | Self::LibJars { module, .. } => module,
        }
    }

    pub fn dir(&self) -> &Path {
        match self {
            Self::ModuleRoot { dir, .. } | Self::LibJars { dir, .. } => dir,
        }
    }

    /// Files this registration contributes to the build path
    pub fn files(&self) -> VxmodResult<Vec<PathBuf>> {
        match self {
            Self::ModuleRoot { dir, .. } => Ok(vec![dir.clone()]),
            Self::LibJars { dir, .. } => list_jars(dir),
        }
    }
}

fn list_jars(dir: &Path) -> VxmodResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut jars = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_jar = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("jar"))
            .unwrap_or(false);
        if path.is_file() && is_jar {
            jars.push(path);
        }
    }
    jars.sort();
    Ok(jars)
}

/// A named, append-only list of registrations
#[derive(Debug, Clone)]
pub struct DependencyConfiguration {
    kind: DependencyKind,
    registrations: Vec<DependencyRegistration>,
}

impl DependencyConfiguration {
    fn new(kind: DependencyKind) -> Self {
        Self {
            kind,
            registrations: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind.configuration_name()
    }

    pub fn registrations(&self) -> &[DependencyRegistration] {
        &self.registrations
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// All files contributed by this configuration, in registration order
    pub fn files(&self) -> VxmodResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for registration in &self.registrations {
            files.extend(registration.files()?);
        }
        Ok(files)
    }
}

/// The `includes` and `libs` configurations of one build
#[derive(Debug, Clone)]
pub struct DependencyConfigurations {
    includes: DependencyConfiguration,
    libs: DependencyConfiguration,
}

impl Default for DependencyConfigurations {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyConfigurations {
    pub fn new() -> Self {
        Self {
            includes: DependencyConfiguration::new(DependencyKind::Includes),
            libs: DependencyConfiguration::new(DependencyKind::Libs),
        }
    }

    pub fn register(&mut self, kind: DependencyKind, registration: DependencyRegistration) {
        match kind {
            DependencyKind::Includes => self.includes.registrations.push(registration),
            DependencyKind::Libs => self.libs.registrations.push(registration),
        }
    }

    pub fn includes(&self) -> &DependencyConfiguration {
        &self.includes
    }

    pub fn libs(&self) -> &DependencyConfiguration {
        &self.libs
    }

    /// Number of registrations, across both configurations, made for `module`
    pub fn registrations_for(&self, module: &ModuleIdentifier) -> usize {
        self.includes
            .registrations
            .iter()
            .chain(self.libs.registrations.iter())
            .filter(|r| r.module() == module)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn id(raw: &str) -> ModuleIdentifier {
        ModuleIdentifier::new(raw).unwrap()
    }

    #[test]
    fn test_for_module_paths() {
        let module = id("io.example~db~1.0");
        let [(kind_a, root), (kind_b, libs)] =
            DependencyRegistration::for_module(&module, Path::new("/project/mods"));

        assert_eq!(kind_a, DependencyKind::Includes);
        assert_eq!(root.dir(), Path::new("/project/mods/io.example~db~1.0"));
        assert_eq!(kind_b, DependencyKind::Libs);
        assert_eq!(libs.dir(), Path::new("/project/mods/io.example~db~1.0/lib"));
    }

    #[test]
    fn test_register_appends_in_order() {
        let mut configs = DependencyConfigurations::new();
        let a = id("g~a~1");
        let b = id("g~b~1");

        for module in [&a, &b] {
            for (kind, registration) in DependencyRegistration::for_module(module, Path::new("mods")) {
                configs.register(kind, registration);
            }
        }

        assert_eq!(configs.includes().len(), 2);
        assert_eq!(configs.libs().len(), 2);
        assert_eq!(configs.includes().registrations()[0].module(), &a);
        assert_eq!(configs.includes().registrations()[1].module(), &b);
        assert_eq!(configs.registrations_for(&a), 2);
        assert_eq!(configs.registrations_for(&id("g~c~1")), 0);
    }

    #[test]
    fn test_lib_jars_are_listed_lazily() {
        let temp = TempDir::new().unwrap();
        let module = id("g~a~1");
        let [_, (_, libs)] = DependencyRegistration::for_module(&module, temp.path());

        // Nothing installed yet
        assert!(libs.files().unwrap().is_empty());

        let lib_dir = temp.path().join("g~a~1").join("lib");
        fs::create_dir_all(&lib_dir).unwrap();
        fs::write(lib_dir.join("b.jar"), b"").unwrap();
        fs::write(lib_dir.join("a.JAR"), b"").unwrap();
        fs::write(lib_dir.join("notes.txt"), b"").unwrap();

        let files = libs.files().unwrap();
        assert_eq!(files, vec![lib_dir.join("a.JAR"), lib_dir.join("b.jar")]);
    }
}
