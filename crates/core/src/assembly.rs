//! Module directory assembly and packaging
//!
//! An assembled module lives in `<build>/mod/<identifier>/`: build output at the
//! root, library jars under `lib/`, and the generated `mod.json`. Packaging zips
//! that directory into `<build>/libs/<name>-<version>-mod.zip`.

use std::fs;
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::{debug, info};
use vxmod_installer_protocol::ModuleIdentifier;
use walkdir::WalkDir;

use crate::archive::zip_directory;
use crate::configs::project::ProjectConfig;
use crate::dependencies::LIB_DIR;
use crate::descriptor::{write_descriptor, DESCRIPTOR_FILE};
use crate::files::copy_dir_all;
use crate::types::{VxmodError, VxmodResult};

/// Directories never searched for library jars
const SKIPPED_DIRS: &[&str] = &[".git", ".vxmod", "target", "node_modules"];

/// Where a project's module is assembled and packaged
#[derive(Debug, Clone)]
pub struct ModuleLayout {
    pub module: ModuleIdentifier,
    pub build_dir: PathBuf,
}

impl ModuleLayout {
    pub fn new(module: ModuleIdentifier, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            module,
            build_dir: build_dir.into(),
        }
    }

    pub fn module_dir(&self) -> PathBuf {
        self.build_dir.join("mod").join(self.module.as_str())
    }

    pub fn descriptor_path(&self) -> PathBuf {
        self.module_dir().join(DESCRIPTOR_FILE)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.build_dir.join("libs").join(format!(
            "{}-{}-mod.zip",
            self.module.name(),
            self.module.version()
        ))
    }
}

/// What ended up in an assembled module
#[derive(Debug, Clone)]
pub struct AssemblyReport {
    pub module_dir: PathBuf,
    pub output_files: usize,
    pub libs: Vec<PathBuf>,
}

/// Assemble the module directory for the project at `project_root`
pub fn assemble(
    project_root: &Path,
    config: &ProjectConfig,
    layout: &ModuleLayout,
) -> VxmodResult<AssemblyReport> {
    let module_dir = layout.module_dir();
    if module_dir.exists() {
        fs::remove_dir_all(&module_dir)?;
    }
    fs::create_dir_all(&module_dir)?;

    let mut output_files = 0;
    for output in config.outputs() {
        let source = project_root.join(&output);
        if !source.is_dir() {
            debug!("Skipping missing output directory {}", source.display());
            continue;
        }
        output_files += copy_dir_all(&source, &module_dir)?;
    }

    let lib_dir = module_dir.join(LIB_DIR);
    let mut libs = Vec::new();
    let skipped = [config.build_dir(), config.mods_dir()];
    for jar in find_libs(project_root, &config.lib_globs(), &skipped)? {
        let file_name = jar
            .file_name()
            .ok_or_else(|| VxmodError::Path(format!("Invalid library path {}", jar.display())))?;
        fs::create_dir_all(&lib_dir)?;
        let destination = lib_dir.join(file_name);
        fs::copy(&jar, &destination)?;
        libs.push(destination);
    }

    write_descriptor(config, &layout.descriptor_path())?;

    info!(
        "Assembled module {} ({} output file(s), {} lib(s))",
        layout.module,
        output_files,
        libs.len()
    );

    Ok(AssemblyReport {
        module_dir,
        output_files,
        libs,
    })
}

/// Zip an assembled module, returning the archive path
pub fn package(layout: &ModuleLayout) -> VxmodResult<PathBuf> {
    let module_dir = layout.module_dir();
    if !layout.descriptor_path().is_file() {
        return Err(VxmodError::Assembly(format!(
            "Module {} has not been assembled: {} is missing",
            layout.module,
            layout.descriptor_path().display()
        )));
    }

    let archive = layout.archive_path();
    zip_directory(&module_dir, &archive)?;
    info!("Packaged module {} -> {}", layout.module, archive.display());
    Ok(archive)
}

fn build_glob_set(patterns: &[String]) -> VxmodResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| VxmodError::Config(format!("Invalid libs pattern '{}': {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| VxmodError::Config(format!("Invalid libs patterns: {}", e)))
}

/// Lexically normalize a path: drop `.` components and resolve `..`
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Files under `project_root` matching any of `patterns`, sorted.
///
/// `skipped` directories may be relative to `project_root` or absolute.
fn find_libs(
    project_root: &Path,
    patterns: &[String],
    skipped: &[&str],
) -> VxmodResult<Vec<PathBuf>> {
    if patterns.is_empty() {
        return Ok(Vec::new());
    }
    let glob_set = build_glob_set(patterns)?;

    let root = normalize(project_root);
    let skipped_dirs: Vec<PathBuf> = SKIPPED_DIRS
        .iter()
        .chain(skipped)
        .map(|dir| normalize(&root.join(dir)))
        .collect();

    let walker = WalkDir::new(&root).into_iter().filter_entry(|entry| {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }
        !skipped_dirs.iter().any(|dir| entry.path() == dir)
    });

    let mut libs = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| VxmodError::Path(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(&root).unwrap_or(entry.path());
        if glob_set.is_match(relative) {
            libs.push(entry.path().to_path_buf());
        }
    }

    libs.sort();
    Ok(libs)
}
