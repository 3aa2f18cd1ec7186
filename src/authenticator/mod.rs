//! Auth decision for one transfer-service callback.
//!
//! One invocation performs at most one secret lookup and emits one
//! `auth_attempt` event followed by exactly one terminal event
//! (`auth_success`, `auth_fail` or `auth_error`). Nothing is cached and nothing
//! is retried: a failed lookup denies the request.

pub mod audit;
pub mod record;
pub mod types;

pub use self::record::CredentialRecord;
pub use self::types::{
    AuthEvent, AuthOutcome, AuthRequest, AuthResponse, AuthType, FailureReason,
};

use crate::secrets::SecretStore;
use secrecy::ExposeSecret;
use tracing::instrument;

/// Usernames become part of the secret path: anything that could leave the
/// prefix (a leading `/`, a `..` segment, control characters) is rejected
/// before the lookup. Everything else goes to the backend as is.
#[must_use]
pub fn valid_username(username: &str) -> bool {
    !username.is_empty()
        && !username.starts_with('/')
        && !username.split('/').any(|segment| segment == "..")
        && !username.chars().any(char::is_control)
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    secret_prefix: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(secret_prefix: impl Into<String>) -> Self {
        Self {
            secret_prefix: secret_prefix.into(),
        }
    }

    #[must_use]
    pub fn secret_prefix(&self) -> &str {
        &self.secret_prefix
    }

    #[must_use]
    pub fn secret_key(&self, username: &str) -> String {
        format!("{}{username}", self.secret_prefix)
    }
}

#[derive(Debug)]
pub struct Authenticator<S> {
    store: S,
    config: AuthConfig,
}

impl<S: SecretStore> Authenticator<S> {
    #[must_use]
    pub fn new(store: S, config: AuthConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Answer a callback with the wire response: attributes on success, `{}` otherwise.
    pub async fn authenticate(&self, request: &AuthRequest) -> AuthResponse {
        self.evaluate(request).await.into_response()
    }

    /// Same decision as [`Self::authenticate`], keeping the cause.
    #[instrument(skip_all, fields(username = %request.username))]
    pub async fn evaluate(&self, request: &AuthRequest) -> AuthOutcome {
        audit::attempt(request);

        let username = request.username.as_str();

        if username.is_empty() {
            return fail(username, FailureReason::UserNotFound);
        }

        if !valid_username(username) {
            return fail(username, FailureReason::InvalidUsername);
        }

        let record = match self.store.fetch(&self.config.secret_key(username)).await {
            Ok(Some(record)) => record,
            Ok(None) => return fail(username, FailureReason::UserNotFound),
            Err(err) => {
                audit::error(username, &err);
                return AuthOutcome::Error(err.kind());
            }
        };

        match request.auth_type() {
            AuthType::Password => {
                if !record.password_matches(request.password.expose_secret()) {
                    return fail(username, FailureReason::InvalidPassword);
                }

                audit::success(username, AuthType::Password);
                AuthOutcome::Granted {
                    auth_type: AuthType::Password,
                    response: AuthResponse::granted(&record),
                }
            }

            AuthType::PublicKey => {
                let keys = record.public_keys();
                if keys.is_empty() {
                    return fail(username, FailureReason::NoPublicKeysConfigured);
                }

                audit::success(username, AuthType::PublicKey);
                AuthOutcome::Granted {
                    auth_type: AuthType::PublicKey,
                    response: AuthResponse::granted(&record).with_public_keys(keys),
                }
            }
        }
    }
}

fn fail(username: &str, reason: FailureReason) -> AuthOutcome {
    audit::fail(username, reason);
    AuthOutcome::Failed(reason)
}
