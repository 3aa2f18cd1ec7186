//! Credential records loaded once from a JSON document.
//!
//! The document is an object keyed by the full secret key (prefix included):
//!
//! ```json
//! { "sftp/users/alice": { "password": "...", "role_arn": "...", "home_directory": "/bucket/alice" } }
//! ```
//!
//! Records are parsed per lookup so one bad entry only fails its own user.

use super::{LookupError, SecretStore};
use crate::authenticator::CredentialRecord;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::{fs, path::Path};

#[derive(Debug, Clone, Default)]
pub struct StaticSecretStore {
    secrets: Map<String, Value>,
}

impl StaticSecretStore {
    #[must_use]
    pub fn new(secrets: Map<String, Value>) -> Self {
        Self { secrets }
    }

    /// # Errors
    /// Returns an error if the document is not a JSON object.
    pub fn from_json(json: &str) -> Result<Self> {
        let secrets: Map<String, Value> =
            serde_json::from_str(json).context("secrets document must be a JSON object")?;
        Ok(Self::new(secrets))
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is not a JSON object.
    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read secrets file: {}", path.display()))?;
        Self::from_json(&json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl SecretStore for StaticSecretStore {
    async fn fetch(&self, key: &str) -> Result<Option<CredentialRecord>, LookupError> {
        self.secrets
            .get(key)
            .cloned()
            .map(CredentialRecord::from_value)
            .transpose()
    }
}
