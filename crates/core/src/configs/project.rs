use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use vxmod_installer_protocol::ModuleIdentifier;

use crate::configs::repository::RepositoryConfig;
use crate::types::{VxmodError, VxmodResult};

pub const PROJECT_CONFIG_FILE: &str = "vxmod.yml";

pub const DEFAULT_OUTPUTS: &[&str] = &["build/classes", "build/resources"];
pub const DEFAULT_MODS_DIR: &str = "mods";
pub const DEFAULT_BUILD_DIR: &str = "build";
pub const DEFAULT_INSTALL_TIMEOUT_SECS: u64 = 300;

/// What the resolver does with an include that could not be installed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and carry on without the module.
    #[default]
    Log,
    /// Fail the resolution pass once every install has finished.
    Fail,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    /// Identifier of the module this project builds, in `group~name~version` form.
    pub module: String,
    /// Modules to install and put on the build path before assembling.
    pub includes: Option<Vec<String>>,
    /// Free-form module descriptor written to `mod.json`.
    pub descriptor: Option<serde_json::Value>,
    /// Build output directories copied to the module root.
    pub outputs: Option<Vec<String>>,
    /// Glob patterns, relative to the project root, of jars copied to `lib/`.
    pub libs: Option<Vec<String>>,
    pub repositories: Option<Vec<RepositoryConfig>>,
    pub mods_dir: Option<String>,
    pub build_dir: Option<String>,
    pub failure_policy: Option<FailurePolicy>,
    pub install_timeout_secs: Option<u64>,
}

impl ProjectConfig {
    pub fn module_id(&self) -> VxmodResult<ModuleIdentifier> {
        ModuleIdentifier::new(self.module.as_str())
            .map_err(|e| VxmodError::Config(format!("module: {}", e)))
    }

    /// Declared includes, validated and de-duplicated in declaration order
    pub fn include_ids(&self) -> VxmodResult<Vec<ModuleIdentifier>> {
        let mut ids: Vec<ModuleIdentifier> = Vec::new();

        for raw in self.includes.as_deref().unwrap_or_default() {
            let id = ModuleIdentifier::new(raw.as_str())
                .map_err(|e| VxmodError::Config(format!("includes: {}", e)))?;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }

        Ok(ids)
    }

    pub fn descriptor_map(&self) -> VxmodResult<serde_json::Map<String, serde_json::Value>> {
        match &self.descriptor {
            None | Some(serde_json::Value::Null) => Ok(serde_json::Map::new()),
            Some(serde_json::Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(VxmodError::Config(format!(
                "descriptor must be a mapping, got {}",
                other
            ))),
        }
    }

    pub fn outputs(&self) -> Vec<String> {
        self.outputs.clone().unwrap_or_else(|| {
            DEFAULT_OUTPUTS.iter().map(|s| s.to_string()).collect()
        })
    }

    pub fn lib_globs(&self) -> Vec<String> {
        self.libs.clone().unwrap_or_default()
    }

    pub fn mods_dir(&self) -> &str {
        self.mods_dir.as_deref().unwrap_or(DEFAULT_MODS_DIR)
    }

    pub fn build_dir(&self) -> &str {
        self.build_dir.as_deref().unwrap_or(DEFAULT_BUILD_DIR)
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy.unwrap_or_default()
    }

    pub fn install_timeout(&self) -> Duration {
        Duration::from_secs(
            self.install_timeout_secs
                .unwrap_or(DEFAULT_INSTALL_TIMEOUT_SECS),
        )
    }
}

pub fn parse_project_config(yaml_str: &str) -> VxmodResult<ProjectConfig> {
    let config: ProjectConfig = serde_yaml::from_str(yaml_str)?;
    if config.install_timeout_secs == Some(0) {
        return Err(VxmodError::Config(
            "installTimeoutSecs must be greater than zero".to_string(),
        ));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_project_config("module: io.example~web~1.0.0\n").unwrap();

        assert_eq!(config.module_id().unwrap().name(), "web");
        assert!(config.include_ids().unwrap().is_empty());
        assert_eq!(config.outputs(), vec!["build/classes", "build/resources"]);
        assert_eq!(config.mods_dir(), "mods");
        assert_eq!(config.build_dir(), "build");
        assert_eq!(config.failure_policy(), FailurePolicy::Log);
        assert_eq!(config.install_timeout(), Duration::from_secs(300));
        assert!(config.descriptor_map().unwrap().is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let yaml = r#"
module: io.example~web~1.0.0
includes:
  - io.vertx~mod-mongo~2.1.0
  - io.vertx~mod-auth~1.0.0
  - io.vertx~mod-mongo~2.1.0
descriptor:
  main: app.js
  worker: false
outputs: [out]
libs: ["libs/*.jar"]
repositories:
  - path: ../repo
  - url: https://repo.example.com/maven2
modsDir: .mods
buildDir: target
failurePolicy: fail
installTimeoutSecs: 5
"#;
        let config = parse_project_config(yaml).unwrap();

        let includes = config.include_ids().unwrap();
        assert_eq!(includes.len(), 2);
        assert_eq!(includes[0].as_str(), "io.vertx~mod-mongo~2.1.0");
        assert_eq!(includes[1].as_str(), "io.vertx~mod-auth~1.0.0");

        let descriptor = config.descriptor_map().unwrap();
        assert_eq!(descriptor["main"], "app.js");

        assert_eq!(config.outputs(), vec!["out"]);
        assert_eq!(config.lib_globs(), vec!["libs/*.jar"]);
        assert_eq!(config.repositories.as_ref().map(Vec::len), Some(2));
        assert_eq!(config.mods_dir(), ".mods");
        assert_eq!(config.build_dir(), "target");
        assert_eq!(config.failure_policy(), FailurePolicy::Fail);
        assert_eq!(config.install_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_rejects_unknown_fields() {
        let result = parse_project_config("module: a~b~1\nunknown: true\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_include_is_config_error() {
        let config = parse_project_config("module: a~b~1\nincludes: [not-a-module]\n").unwrap();
        match config.include_ids() {
            Err(VxmodError::Config(msg)) => assert!(msg.contains("not-a-module")),
            other => panic!("expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_descriptor_must_be_mapping() {
        let config = parse_project_config("module: a~b~1\ndescriptor: [1, 2]\n").unwrap();
        assert!(config.descriptor_map().is_err());
    }

    #[test]
    fn test_zero_install_timeout_is_rejected() {
        let result = parse_project_config("module: g~app~1\ninstallTimeoutSecs: 0\n");
        assert!(matches!(result, Err(VxmodError::Config(_))));

        let config = parse_project_config("module: g~app~1\ninstallTimeoutSecs: 5\n").unwrap();
        assert_eq!(config.install_timeout(), Duration::from_secs(5));
    }
}
