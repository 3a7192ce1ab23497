//! Module descriptor (`mod.json`) generation

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::configs::project::ProjectConfig;
use crate::types::VxmodResult;

pub const DESCRIPTOR_FILE: &str = "mod.json";

/// Build the descriptor for a project.
///
/// The project's `descriptor` mapping is taken as is. Declared includes are
/// added as a comma-separated `includes` entry unless the mapping sets one.
pub fn generate_descriptor(config: &ProjectConfig) -> VxmodResult<Map<String, Value>> {
    let mut descriptor = config.descriptor_map()?;

    let includes = config.include_ids()?;
    if !includes.is_empty() && !descriptor.contains_key("includes") {
        let joined = includes
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(",");
        descriptor.insert("includes".to_string(), Value::String(joined));
    }

    Ok(descriptor)
}

/// Write the project's descriptor to `path` as pretty-printed JSON
pub fn write_descriptor(config: &ProjectConfig, path: &Path) -> VxmodResult<()> {
    let descriptor = generate_descriptor(config)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(&Value::Object(descriptor))?;
    json.push('\n');
    std::fs::write(path, json)?;

    debug!("Wrote module descriptor {}", path.display());
    Ok(())
}
