use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::{VxmodError, VxmodResult};

/// Local directory searched when a project declares no repositories
pub const DEFAULT_LOCAL_REPOSITORY: &str = "repo";

/// A module repository. Exactly one of `url` or `path` must be set.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Base URL of a Maven-layout repository
    pub url: Option<String>,
    /// Local directory, relative to the project root
    pub path: Option<String>,
}

/// Where a repository lives, once its configuration has been validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryLocation<'a> {
    Remote(&'a str),
    Local(&'a str),
}

impl RepositoryConfig {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            url: None,
            path: Some(path.into()),
        }
    }

    pub fn remote(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            path: None,
        }
    }

    pub fn location(&self) -> VxmodResult<RepositoryLocation<'_>> {
        match (&self.url, &self.path) {
            (Some(url), None) => Ok(RepositoryLocation::Remote(url.trim_end_matches('/'))),
            (None, Some(path)) => Ok(RepositoryLocation::Local(path)),
            (Some(_), Some(_)) => Err(VxmodError::Config(
                "Repository configuration must specify either 'url' or 'path', not both".to_string(),
            )),
            (None, None) => Err(VxmodError::Config(
                "Repository configuration must specify either 'url' or 'path'".to_string(),
            )),
        }
    }
}
