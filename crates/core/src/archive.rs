//! Module archives
//!
//! Modules travel as zip files with the module directory's contents at the
//! archive root. This module extracts them into a directory and produces them
//! from an assembled module directory.

use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::types::{VxmodError, VxmodResult};

/// Extract `archive_path` into `target_dir`, which is created if needed.
///
/// Entries that would land outside `target_dir` fail the whole extraction.
pub fn extract_zip(archive_path: &Path, target_dir: &Path) -> VxmodResult<usize> {
    let file = File::open(archive_path).map_err(|e| {
        VxmodError::Archive(format!(
            "Failed to open archive {}: {}",
            archive_path.display(),
            e
        ))
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| {
        VxmodError::Archive(format!(
            "Failed to read archive {}: {}",
            archive_path.display(),
            e
        ))
    })?;

    fs::create_dir_all(target_dir)?;
    debug!(
        "Extracting {} into {}",
        archive_path.display(),
        target_dir.display()
    );

    let mut extracted = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;

        let relative = safe_relative_path(entry.name()).ok_or_else(|| {
            VxmodError::Archive(format!(
                "Archive {} contains an entry outside the module directory: {}",
                archive_path.display(),
                entry.name()
            ))
        })?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        let destination = target_dir.join(&relative);
        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
            continue;
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&destination)?;
        io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    Ok(extracted)
}

/// Normalise an archive entry name, refusing anything that climbs out of the
/// extraction root.
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let mut relative = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(relative)
}

/// Zip the contents of `source_dir` into `archive_path`, returning the number of
/// files written.
pub fn zip_directory(source_dir: &Path, archive_path: &Path) -> VxmodResult<usize> {
    if let Some(parent) = archive_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = ZipWriter::new(File::create(archive_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut written = 0;

    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| VxmodError::Archive(e.to_string()))?;
        let path = entry.path();
        let relative = path
            .strip_prefix(source_dir)
            .map_err(|e| VxmodError::Path(e.to_string()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }

        // Zip entry names always use forward slashes
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(name, options)?;
        } else {
            writer.start_file(name, options)?;
            io::copy(&mut File::open(path)?, &mut writer)?;
            written += 1;
        }
    }

    writer.finish()?;
    debug!(
        "Wrote {} file(s) from {} to {}",
        written,
        source_dir.display(),
        archive_path.display()
    );
    Ok(written)
}
