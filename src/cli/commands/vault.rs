use anyhow::{Context, Result};
use clap::{Arg, ArgGroup, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_VAULT_URL: &str = "vault-url";
pub const ARG_VAULT_ROLE_ID: &str = "vault-role-id";
pub const ARG_VAULT_SECRET_ID: &str = "vault-secret-id";
pub const ARG_VAULT_WRAPPED_TOKEN: &str = "vault-wrapped-token";
pub const ARG_VAULT_KV_MOUNT: &str = "vault-kv-mount";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_VAULT_URL)
                .long("vault-url")
                .help("Vault approle login URL, example: https://vault.tld:8200/v1/auth/<approle>/login")
                .env("TRANSFER_IDP_VAULT_URL")
                .required(true),
        )
        .arg(
            Arg::new(ARG_VAULT_ROLE_ID)
                .long("vault-role-id")
                .help("Vault role id")
                .env("TRANSFER_IDP_VAULT_ROLE_ID")
                .required(true),
        )
        .arg(
            Arg::new(ARG_VAULT_SECRET_ID)
                .long("vault-secret-id")
                .help("Vault secret id")
                .env("TRANSFER_IDP_VAULT_SECRET_ID"),
        )
        .arg(
            Arg::new(ARG_VAULT_WRAPPED_TOKEN)
                .long("vault-wrapped-token")
                .help("Vault wrapped token, unwrapped at startup to obtain the secret id")
                .env("TRANSFER_IDP_VAULT_WRAPPED_TOKEN"),
        )
        .arg(
            Arg::new(ARG_VAULT_KV_MOUNT)
                .long("vault-kv-mount")
                .help("Vault KV-v2 mount holding the credential records")
                .env("TRANSFER_IDP_VAULT_KV_MOUNT")
                .default_value("secret"),
        )
        .group(
            ArgGroup::new("vault-auth")
                .args([ARG_VAULT_SECRET_ID, ARG_VAULT_WRAPPED_TOKEN])
                .required(true)
                .multiple(false),
        )
}

#[derive(Debug)]
pub struct Options {
    pub url: String,
    pub role_id: String,
    pub secret_id: Option<SecretString>,
    pub wrapped_token: Option<SecretString>,
    pub kv_mount: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required vault argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let url = matches
            .get_one::<String>(ARG_VAULT_URL)
            .cloned()
            .context("missing required argument: --vault-url")?;

        let role_id = matches
            .get_one::<String>(ARG_VAULT_ROLE_ID)
            .cloned()
            .context("missing required argument: --vault-role-id")?;

        let secret_id = matches
            .get_one::<String>(ARG_VAULT_SECRET_ID)
            .map(|s| SecretString::from(s.clone()));

        let wrapped_token = matches
            .get_one::<String>(ARG_VAULT_WRAPPED_TOKEN)
            .map(|s| SecretString::from(s.clone()));

        let kv_mount = matches
            .get_one::<String>(ARG_VAULT_KV_MOUNT)
            .cloned()
            .unwrap_or_else(|| "secret".to_string());

        Ok(Self {
            url,
            role_id,
            secret_id,
            wrapped_token,
            kv_mount,
        })
    }
}
