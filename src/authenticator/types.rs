//! Request/response types for the auth callback.

use crate::authenticator::CredentialRecord;
use crate::secrets::LookupErrorKind;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use utoipa::ToSchema;

pub const HOME_DIRECTORY_TYPE_LOGICAL: &str = "LOGICAL";
pub const UNKNOWN_SOURCE_IP: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Password,
    PublicKey,
}

impl AuthType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Password => "password",
            Self::PublicKey => "public_key",
        }
    }
}

/// Why a request was denied. Only ever logged; the wire answer is always `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    UserNotFound,
    InvalidUsername,
    InvalidPassword,
    NoPublicKeysConfigured,
}

impl FailureReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserNotFound => "user_not_found",
            Self::InvalidUsername => "invalid_username",
            Self::InvalidPassword => "invalid_password",
            Self::NoPublicKeysConfigured => "no_public_keys_configured",
        }
    }
}

/// Event payload sent by the transfer service. Missing or `null` strings
/// read as empty, so a `null` password selects key auth.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthEvent {
    #[serde(deserialize_with = "null_as_empty")]
    pub username: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub password: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub protocol: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub server_id: String,
    pub source_ip: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub struct AuthRequest {
    pub username: String,
    pub password: SecretString,
    pub protocol: String,
    pub server_id: String,
    pub source_ip: String,
}

impl AuthRequest {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            protocol: String::new(),
            server_id: String::new(),
            source_ip: UNKNOWN_SOURCE_IP.to_string(),
        }
    }

    #[must_use]
    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    #[must_use]
    pub fn with_server_id(mut self, server_id: impl Into<String>) -> Self {
        self.server_id = server_id.into();
        self
    }

    /// Empty values fall back to `"unknown"`.
    #[must_use]
    pub fn with_source_ip(mut self, source_ip: Option<String>) -> Self {
        self.source_ip = source_ip
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| UNKNOWN_SOURCE_IP.to_string());
        self
    }

    /// The request selects the branch: any supplied password means password auth.
    #[must_use]
    pub fn auth_type(&self) -> AuthType {
        if self.password.expose_secret().is_empty() {
            AuthType::PublicKey
        } else {
            AuthType::Password
        }
    }
}

impl From<AuthEvent> for AuthRequest {
    fn from(event: AuthEvent) -> Self {
        Self::new(event.username, event.password)
            .with_protocol(event.protocol)
            .with_server_id(event.server_id)
            .with_source_ip(event.source_ip)
    }
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .field("protocol", &self.protocol)
            .field("server_id", &self.server_id)
            .field("source_ip", &self.source_ip)
            .finish()
    }
}

/// Answer returned to the transfer service. A denial has no fields set and
/// serializes as `{}`.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase", default)]
pub struct AuthResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_type: Option<String>,
    /// JSON-encoded list of `{"Entry", "Target"}` mappings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_directory_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_keys: Option<Vec<String>>,
}

impl AuthResponse {
    #[must_use]
    pub fn denied() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_denied(&self) -> bool {
        *self == Self::default()
    }

    /// Role and logical home directory (`/` mapped to the record's directory).
    #[must_use]
    pub fn granted(record: &CredentialRecord) -> Self {
        let details = json!([{ "Entry": "/", "Target": record.home_directory() }]);

        Self {
            role: Some(record.role_arn().to_string()),
            home_directory_type: Some(HOME_DIRECTORY_TYPE_LOGICAL.to_string()),
            home_directory_details: Some(details.to_string()),
            public_keys: None,
        }
    }

    #[must_use]
    pub fn with_public_keys(mut self, keys: &[String]) -> Self {
        self.public_keys = Some(keys.to_vec());
        self
    }
}

/// Decision with its cause; collapses to an [`AuthResponse`] at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted {
        auth_type: AuthType,
        response: AuthResponse,
    },
    Failed(FailureReason),
    Error(LookupErrorKind),
}

impl AuthOutcome {
    #[must_use]
    pub fn into_response(self) -> AuthResponse {
        match self {
            Self::Granted { response, .. } => response,
            Self::Failed(_) | Self::Error(_) => AuthResponse::denied(),
        }
    }
}
