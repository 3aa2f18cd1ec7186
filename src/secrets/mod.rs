//! Credential record lookup.
//!
//! The authenticator only knows the [`SecretStore`] capability: given the full
//! secret key it returns the parsed record, `None` when the key does not exist,
//! or a [`LookupError`] for anything else.

pub mod fixed;
pub mod vault;

pub use self::fixed::StaticSecretStore;
pub use self::vault::VaultSecretStore;

use crate::authenticator::CredentialRecord;
use std::future::Future;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("secret backend error: {0}")]
    Backend(String),
    #[error("malformed credential record: {0}")]
    Malformed(String),
}

/// Log tag for a lookup fault, kept apart from the message so it can be matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErrorKind {
    Backend,
    MalformedRecord,
}

impl LookupErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Backend => "backend",
            Self::MalformedRecord => "malformed_record",
        }
    }
}

impl LookupError {
    #[must_use]
    pub const fn kind(&self) -> LookupErrorKind {
        match self {
            Self::Backend(_) => LookupErrorKind::Backend,
            Self::Malformed(_) => LookupErrorKind::MalformedRecord,
        }
    }
}

pub trait SecretStore: Send + Sync {
    /// Fetch the credential record stored under `key`.
    ///
    /// # Errors
    /// Returns `LookupError::Backend` when the backend cannot answer and
    /// `LookupError::Malformed` when the stored payload is not a valid record.
    fn fetch(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<CredentialRecord>, LookupError>> + Send;
}

/// Store selected at startup: Vault for the server, a static document for
/// one-shot invocations.
#[derive(Debug, Clone)]
pub enum SecretBackend {
    Vault(VaultSecretStore),
    Static(StaticSecretStore),
}

impl SecretBackend {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Vault(_) => "vault",
            Self::Static(_) => "static",
        }
    }
}

impl SecretStore for SecretBackend {
    async fn fetch(&self, key: &str) -> Result<Option<CredentialRecord>, LookupError> {
        match self {
            Self::Vault(store) => store.fetch(key).await,
            Self::Static(store) => store.fetch(key).await,
        }
    }
}
