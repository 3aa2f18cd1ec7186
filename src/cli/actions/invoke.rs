//! One-shot authentication: an event document on stdin, the response on stdout.

use crate::{
    authenticator::{AuthConfig, AuthEvent, AuthRequest, AuthResponse, Authenticator},
    secrets::{SecretBackend, StaticSecretStore},
};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub secrets_file: PathBuf,
    pub secret_prefix: String,
}

/// Authenticate the event in `input` against the records in `args.secrets_file`.
/// # Errors
/// Returns an error if the secrets file cannot be loaded or `input` is not an event document.
pub async fn run(args: &Args, input: &str) -> Result<AuthResponse> {
    let store = StaticSecretStore::from_file(&args.secrets_file)?;

    debug!("loaded {} credential records", store.len());

    let event: AuthEvent =
        serde_json::from_str(input).context("Failed to parse authentication event")?;

    let authenticator = Authenticator::new(
        SecretBackend::Static(store),
        AuthConfig::new(args.secret_prefix.clone()),
    );

    Ok(authenticator.authenticate(&AuthRequest::from(event)).await)
}

/// Execute the invoke action.
/// # Errors
/// Returns an error if stdin cannot be read or the event cannot be processed.
pub async fn execute(args: Args) -> Result<()> {
    let mut input = String::new();
    tokio::io::stdin()
        .read_to_string(&mut input)
        .await
        .context("Failed to read authentication event from stdin")?;

    let response = run(&args, &input).await?;

    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use ulid::Ulid;

    fn secrets_file() -> PathBuf {
        let path = std::env::temp_dir().join(format!("transfer-idp-{}.json", Ulid::new()));
        let doc = json!({
            "sftp/users/alice": {
                "password": "hunter2",
                "public_keys": ["ssh-ed25519 AAA"],
                "role_arn": "arn:alice",
                "home_directory": "/bucket/alice"
            }
        });
        fs::write(&path, doc.to_string()).unwrap();
        path
    }

    #[tokio::test]
    async fn grants_password_event() {
        let path = secrets_file();
        let args = Args {
            secrets_file: path.clone(),
            secret_prefix: "sftp/users/".to_string(),
        };

        let event = json!({ "username": "alice", "password": "hunter2", "serverId": "s-1" });
        let response = run(&args, &event.to_string()).await.unwrap();
        fs::remove_file(path).unwrap();

        assert_eq!(response.role.as_deref(), Some("arn:alice"));
        assert!(response.public_keys.is_none());
        assert_eq!(
            response.home_directory_details.as_deref(),
            Some(r#"[{"Entry":"/","Target":"/bucket/alice"}]"#)
        );
    }

    #[tokio::test]
    async fn denies_unknown_user() {
        let path = secrets_file();
        let args = Args {
            secrets_file: path.clone(),
            secret_prefix: "sftp/users/".to_string(),
        };

        let response = run(&args, r#"{ "username": "mallory" }"#).await.unwrap();
        fs::remove_file(path).unwrap();

        assert!(response.is_denied());
        assert_eq!(serde_json::to_string(&response).unwrap(), "{}");
    }

    #[tokio::test]
    async fn rejects_bad_event() {
        let path = secrets_file();
        let args = Args {
            secrets_file: path.clone(),
            secret_prefix: "sftp/users/".to_string(),
        };

        let result = run(&args, "not json").await;
        fs::remove_file(path).unwrap();

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn missing_secrets_file_is_an_error() {
        let args = Args {
            secrets_file: PathBuf::from("/nonexistent/transfer-idp.json"),
            secret_prefix: String::new(),
        };

        assert!(run(&args, r#"{ "username": "alice" }"#).await.is_err());
    }
}
