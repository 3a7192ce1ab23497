//! Core types for the vxmod installer protocol.
//!
//! - [`ModuleIdentifier`] - Validated `group~name~version` module name
//! - [`InstallError`] - Why an install did not produce a fresh module
//! - [`InstallOutcome`] - The terminal classification of one install request

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Separator between the group, name and version parts of a module identifier.
pub const IDENTIFIER_SEPARATOR: char = '~';

/// Names a module in `group~name~version` form.
///
/// **Purpose**: Identifiers are supplied by project configuration and are
/// immutable once declared. The full string is used verbatim as the directory
/// name of an installed module, so it must never contain path separators.
///
/// **Requirements**:
/// - Exactly three parts separated by `~`
/// - No part may be empty
/// - No whitespace and no `/` or `\`
///
/// # Example
///
/// ```rust
/// # use vxmod_installer_protocol::ModuleIdentifier;
/// let id: ModuleIdentifier = "io.example~mod-web~2.1.0".parse().unwrap();
/// assert_eq!(id.group(), "io.example");
/// assert_eq!(id.name(), "mod-web");
/// assert_eq!(id.version(), "2.1.0");
///
/// assert!("io.example~mod-web".parse::<ModuleIdentifier>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleIdentifier {
    raw: String,
    // Byte offsets of the two separators within `raw`
    first_sep: usize,
    second_sep: usize,
}

/// Returned when a string is not a valid [`ModuleIdentifier`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid module identifier '{identifier}': {reason}")]
pub struct ModuleIdentifierError {
    pub identifier: String,
    pub reason: String,
}

impl ModuleIdentifier {
    /// Parse and validate an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ModuleIdentifierError`] if the string is not in
    /// `group~name~version` form.
    pub fn new(raw: impl Into<String>) -> Result<Self, ModuleIdentifierError> {
        let raw = raw.into();
        let invalid = |reason: &str| ModuleIdentifierError {
            identifier: raw.clone(),
            reason: reason.to_string(),
        };

        if raw
            .chars()
            .any(|c| c.is_whitespace() || c == '/' || c == '\\')
        {
            return Err(invalid(
                "must not contain whitespace or path separators",
            ));
        }

        let separators: Vec<usize> = raw
            .match_indices(IDENTIFIER_SEPARATOR)
            .map(|(idx, _)| idx)
            .collect();

        let (first_sep, second_sep) = match separators.as_slice() {
            [first, second] => (*first, *second),
            _ => return Err(invalid("expected the form group~name~version")),
        };

        let parts = [
            &raw[..first_sep],
            &raw[first_sep + 1..second_sep],
            &raw[second_sep + 1..],
        ];
        if parts.iter().any(|part| part.is_empty()) {
            return Err(invalid("group, name and version must all be non-empty"));
        }

        Ok(Self {
            raw,
            first_sep,
            second_sep,
        })
    }

    /// The group part, e.g. `io.example`.
    #[must_use]
    pub fn group(&self) -> &str {
        &self.raw[..self.first_sep]
    }

    /// The module name part, e.g. `mod-web`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.raw[self.first_sep + 1..self.second_sep]
    }

    /// The version part, e.g. `2.1.0`.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.raw[self.second_sep + 1..]
    }

    /// The full identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl FromStr for ModuleIdentifier {
    type Err = ModuleIdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ModuleIdentifier {
    type Error = ModuleIdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleIdentifier> for String {
    fn from(value: ModuleIdentifier) -> Self {
        value.raw
    }
}

impl AsRef<str> for ModuleIdentifier {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ModuleIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Typed classification of an install that did not produce a fresh module.
///
/// **Purpose**: Installers report *why* an install did not happen instead of a
/// free-form message. [`InstallError::AlreadyInstalled`] is not a real failure:
/// callers treat it exactly like success.
///
/// **Message-only installers**: Services that can only report text should go
/// through [`InstallError::from_message`], which recognises the
/// "already installed" case so that it is never mistaken for a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// The module directory already exists in the target location.
    #[error("module is already installed")]
    AlreadyInstalled,

    /// The repository does not contain the module. Repository chains use this
    /// to fall through to the next repository.
    #[error("module not found in repository {repository}")]
    NotFound { repository: String },

    /// Any other failure, with a human-readable reason.
    #[error("{0}")]
    Failed(String),
}

impl InstallError {
    /// Classify a message-only failure.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use vxmod_installer_protocol::InstallError;
    /// assert_eq!(
    ///     InstallError::from_message("Module is already installed"),
    ///     InstallError::AlreadyInstalled
    /// );
    /// assert_eq!(
    ///     InstallError::from_message("connection refused"),
    ///     InstallError::Failed("connection refused".to_string())
    /// );
    /// ```
    #[must_use]
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.to_ascii_lowercase().contains("already installed") {
            Self::AlreadyInstalled
        } else {
            Self::Failed(message)
        }
    }
}

/// The terminal result of one install request.
///
/// Derived from the installer's result; never persisted. It only decides whether
/// the module's dependency sets get registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The module was installed by this request.
    Success,
    /// The module was already present. Equivalent to [`InstallOutcome::Success`].
    AlreadyInstalled,
    /// The module could not be installed.
    Failed(String),
}

impl InstallOutcome {
    /// Whether dependency sets should be registered for this module.
    #[must_use]
    pub const fn registers_dependencies(&self) -> bool {
        matches!(self, Self::Success | Self::AlreadyInstalled)
    }

    /// The failure reason, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<Result<(), InstallError>> for InstallOutcome {
    fn from(result: Result<(), InstallError>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(InstallError::AlreadyInstalled) => Self::AlreadyInstalled,
            Err(other) => Self::Failed(other.to_string()),
        }
    }
}

impl fmt::Display for InstallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "installed"),
            Self::AlreadyInstalled => write!(f, "already installed"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}
