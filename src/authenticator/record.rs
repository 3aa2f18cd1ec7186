//! Stored per-user credential record.

use crate::secrets::LookupError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use subtle::ConstantTimeEq;

#[derive(Deserialize)]
pub struct CredentialRecord {
    #[serde(default, deserialize_with = "deserialize_password")]
    password: Option<SecretString>,
    #[serde(default, alias = "publicKeys")]
    public_keys: Option<Vec<String>>,
    #[serde(alias = "roleArn")]
    role_arn: String,
    #[serde(alias = "homeDirectory")]
    home_directory: String,
}

fn deserialize_password<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}

impl CredentialRecord {
    /// Parse and validate a record from its stored JSON form.
    ///
    /// # Errors
    /// Returns `LookupError::Malformed` if a required field is missing, has the
    /// wrong type, `role_arn` is empty or `home_directory` is not absolute.
    pub fn from_value(value: Value) -> Result<Self, LookupError> {
        let record: Self =
            serde_json::from_value(value).map_err(|e| LookupError::Malformed(e.to_string()))?;
        record.validate()?;
        Ok(record)
    }

    fn validate(&self) -> Result<(), LookupError> {
        if self.role_arn.trim().is_empty() {
            return Err(LookupError::Malformed("role_arn is empty".to_string()));
        }

        if !self.home_directory.starts_with('/') {
            return Err(LookupError::Malformed(format!(
                "home_directory must be an absolute path, got: {:?}",
                self.home_directory
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn role_arn(&self) -> &str {
        &self.role_arn
    }

    #[must_use]
    pub fn home_directory(&self) -> &str {
        &self.home_directory
    }

    /// Keys in stored order, empty when none are configured.
    #[must_use]
    pub fn public_keys(&self) -> &[String] {
        self.public_keys.as_deref().unwrap_or_default()
    }

    /// Exact comparison against the stored password. A record without a
    /// password never matches.
    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        match &self.password {
            Some(stored) if !stored.expose_secret().is_empty() => stored
                .expose_secret()
                .as_bytes()
                .ct_eq(candidate.as_bytes())
                .into(),
            _ => false,
        }
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("public_keys", &self.public_keys().len())
            .field("role_arn", &self.role_arn)
            .field("home_directory", &self.home_directory)
            .finish()
    }
}
