//! Map parsed CLI arguments to the action to run.

use crate::cli::{
    actions::{Action, invoke, server},
    commands::{self, auth, vault},
};
use anyhow::{Context, Result, bail};
use std::path::PathBuf;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or the subcommand is unknown.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    match matches.subcommand() {
        Some((commands::CMD_SERVER, sub)) => {
            let port = sub
                .get_one::<u16>(commands::ARG_PORT)
                .copied()
                .unwrap_or(8080);

            let vault_opts = vault::Options::parse(sub)?;
            let auth_opts = auth::Options::parse(sub)?;

            Ok(Action::Server(server::Args {
                port,
                vault_url: vault_opts.url,
                vault_role_id: vault_opts.role_id,
                vault_secret_id: vault_opts.secret_id,
                vault_wrapped_token: vault_opts.wrapped_token,
                vault_kv_mount: vault_opts.kv_mount,
                secret_prefix: auth_opts.secret_prefix,
            }))
        }
        Some((commands::CMD_INVOKE, sub)) => {
            let secrets_file = sub
                .get_one::<String>(commands::ARG_SECRETS_FILE)
                .map(PathBuf::from)
                .context("missing required argument: --secrets-file")?;

            let auth_opts = auth::Options::parse(sub)?;

            Ok(Action::Invoke(invoke::Args {
                secrets_file,
                secret_prefix: auth_opts.secret_prefix,
            }))
        }
        Some((name, _)) => bail!("unknown subcommand: {name}"),
        None => bail!("missing subcommand"),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn server_action_from_args() {
        temp_env::with_vars(
            [
                ("TRANSFER_IDP_VAULT_SECRET_ID", None::<&str>),
                ("TRANSFER_IDP_VAULT_KV_MOUNT", None),
                ("TRANSFER_IDP_PORT", None),
            ],
            || {
                let matches = commands::new()
                    .try_get_matches_from(vec![
                        "transfer-idp",
                        "server",
                        "--port",
                        "9090",
                        "--vault-url",
                        "http://vault:8200/v1/auth/approle/login",
                        "--vault-role-id",
                        "role-id",
                        "--vault-wrapped-token",
                        "wrapped",
                        "--secret-prefix",
                        "sftp/users/",
                    ])
                    .unwrap();

                let Action::Server(args) = handler(&matches).unwrap() else {
                    panic!("expected server action");
                };

                assert_eq!(args.port, 9090);
                assert_eq!(args.vault_role_id, "role-id");
                assert!(args.vault_secret_id.is_none());
                assert_eq!(
                    args.vault_wrapped_token.as_ref().map(|t| t.expose_secret().to_string()),
                    Some("wrapped".to_string())
                );
                assert_eq!(args.vault_kv_mount, "secret");
                assert_eq!(args.secret_prefix, "sftp/users/");
            },
        );
    }

    #[test]
    fn invoke_action_from_args() {
        temp_env::with_vars([("TRANSFER_IDP_SECRETS_FILE", None::<&str>)], || {
            let matches = commands::new()
                .try_get_matches_from(vec![
                    "transfer-idp",
                    "invoke",
                    "--secrets-file",
                    "/tmp/secrets.json",
                    "--secret-prefix",
                    "",
                ])
                .unwrap();

            let Action::Invoke(args) = handler(&matches).unwrap() else {
                panic!("expected invoke action");
            };

            assert_eq!(args.secrets_file, PathBuf::from("/tmp/secrets.json"));
            assert_eq!(args.secret_prefix, "");
        });
    }
}
