//! Validation and on-disk persistence of the single API credential.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CredentialError;

/// Format a credential must satisfy before it is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialPolicy {
    pub prefix: String,
    /// Minimum length in characters, prefix included.
    pub min_len: usize,
}

impl Default for CredentialPolicy {
    fn default() -> Self {
        Self {
            prefix: "sk-".into(),
            min_len: 20,
        }
    }
}

impl CredentialPolicy {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }
}

/// Trims `key` and checks it against `policy`, returning the trimmed key.
pub fn validate_credential<'a>(
    key: &'a str,
    policy: &CredentialPolicy,
) -> Result<&'a str, CredentialError> {
    let key = key.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty);
    }
    if !key.starts_with(&policy.prefix) {
        return Err(CredentialError::MissingPrefix(policy.prefix.clone()));
    }
    let actual = key.chars().count();
    if actual < policy.min_len {
        return Err(CredentialError::TooShort {
            min: policy.min_len,
            actual,
        });
    }
    Ok(key)
}

/// File-backed store holding one credential string.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
    policy: CredentialPolicy,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, policy: CredentialPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
        }
    }

    /// Store at `<config dir>/promptsmith/credential`.
    pub fn in_config_dir(policy: CredentialPolicy) -> Result<Self, CredentialError> {
        let dir = dirs::config_dir().ok_or(CredentialError::NoConfigDir)?;
        Ok(Self::new(dir.join("promptsmith").join("credential"), policy))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    /// The stored credential, if there is a valid one.
    pub fn load(&self) -> Option<String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "credential_absent");
                return None;
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "credential_read_failed");
                return None;
            }
        };
        match validate_credential(&raw, &self.policy) {
            Ok(key) => Some(key.to_string()),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "stored_credential_rejected");
                None
            }
        }
    }

    /// Validates `key` and writes it, replacing any previous credential.
    pub fn save(&self, key: &str) -> Result<(), CredentialError> {
        let key = validate_credential(key, &self.policy)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, key)?;
        restrict_permissions(&self.path)?;
        info!(path = %self.path.display(), "credential_saved");
        Ok(())
    }

    /// Removes the stored credential. A missing file is not an error.
    pub fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "credential_cleared");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
