use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};

pub const ARG_SECRET_PREFIX: &str = "secret-prefix";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_SECRET_PREFIX)
            .long("secret-prefix")
            .help("Prefix prepended verbatim to the username to form the secret key, example: sftp/users/")
            .env("TRANSFER_IDP_SECRET_PREFIX")
            .required(true),
    )
}

#[derive(Debug)]
pub struct Options {
    pub secret_prefix: String,
}

impl Options {
    /// # Errors
    /// Returns an error if the secret prefix is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        let secret_prefix = matches
            .get_one::<String>(ARG_SECRET_PREFIX)
            .cloned()
            .context("missing required argument: --secret-prefix")?;

        Ok(Self { secret_prefix })
    }
}
