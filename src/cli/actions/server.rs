use crate::{
    api,
    authenticator::{AuthConfig, Authenticator},
    cli::globals::GlobalArgs,
    secrets::{SecretBackend, VaultSecretStore},
    vault,
};
use anyhow::{Context, Result, anyhow};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub vault_url: String,
    pub vault_role_id: String,
    pub vault_secret_id: Option<SecretString>,
    pub vault_wrapped_token: Option<SecretString>,
    pub vault_kv_mount: String,
    pub secret_prefix: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if Vault login fails or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let mut globals = GlobalArgs::new(args.vault_url);

    // If vault wrapped token try to unwrap, otherwise use secret-id.
    let secret_id: String = if let Some(wrapped) = &args.vault_wrapped_token {
        vault::unwrap(&globals.vault_url, wrapped.expose_secret())
            .await
            .context("Could not unwrap the Vault wrapped token")?
    } else {
        args.vault_secret_id
            .as_ref()
            .map(|sid| sid.expose_secret().to_string())
            .ok_or_else(|| anyhow!("Vault secret-id is required"))?
    };

    let (vault_token, lease_duration) =
        vault::approle_login(&globals.vault_url, &secret_id, &args.vault_role_id)
            .await
            .context("Vault AppRole login failed")?;

    globals.set_token(SecretString::from(vault_token));

    debug!("Global args: {:?}", globals);

    // Signals the API server to shut down once the token can no longer be renewed
    let (tx, rx) = mpsc::unbounded_channel();

    vault::renew::try_renew(&globals, lease_duration, tx).await?;

    let store = VaultSecretStore::new(globals, args.vault_kv_mount)?;
    let authenticator = Authenticator::new(
        SecretBackend::Vault(store),
        AuthConfig::new(args.secret_prefix),
    );

    info!(
        secret_prefix = authenticator.config().secret_prefix(),
        "credential records served from vault"
    );

    api::new(args.port, Arc::new(authenticator), rx).await
}
