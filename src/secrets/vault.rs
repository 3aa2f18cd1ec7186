//! Credential records stored in Vault KV v2.

use super::{LookupError, SecretStore};
use crate::{
    authenticator::CredentialRecord,
    cli::globals::GlobalArgs,
    vault::{
        self,
        kv::{self, KvRead},
    },
};
use anyhow::Result;
use reqwest::Client;

/// Clones share the HTTP client and its connection pool.
#[derive(Debug, Clone)]
pub struct VaultSecretStore {
    client: Client,
    globals: GlobalArgs,
    kv_mount: String,
}

impl VaultSecretStore {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(globals: GlobalArgs, kv_mount: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: vault::client()?,
            globals,
            kv_mount: kv_mount.into(),
        })
    }
}

impl SecretStore for VaultSecretStore {
    async fn fetch(&self, key: &str) -> Result<Option<CredentialRecord>, LookupError> {
        match kv::read(&self.client, &self.globals, &self.kv_mount, key).await {
            Ok(KvRead::Found(value)) => CredentialRecord::from_value(value).map(Some),
            Ok(KvRead::NotFound) => Ok(None),
            Err(err) => Err(LookupError::Backend(format!("{err:#}"))),
        }
    }
}
