use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::types::{VxmodError, VxmodResult};

/// Recursively copy the contents of `source` into `target`, returning the number
/// of files copied. Existing files in `target` are overwritten.
pub fn copy_dir_all(source: &Path, target: &Path) -> VxmodResult<usize> {
    fs::create_dir_all(target)?;
    let mut copied = 0;

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| {
            VxmodError::Path(format!("Failed to walk {}: {}", source.display(), e))
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| VxmodError::Path(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &destination)?;
            copied += 1;
        }
    }

    Ok(copied)
}
