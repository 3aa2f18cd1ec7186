pub mod auth;
pub mod logging;
pub mod vault;

use clap::{
    Arg, ColorChoice, Command,
    builder::styling::{AnsiColor, Effects, Styles},
};

pub const CMD_SERVER: &str = "server";
pub const CMD_INVOKE: &str = "invoke";
pub const ARG_PORT: &str = "port";
pub const ARG_SECRETS_FILE: &str = "secrets-file";

fn server() -> Command {
    let command = Command::new(CMD_SERVER)
        .about("Serve the identity-provider callbacks over HTTP, reading records from Vault")
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("TRANSFER_IDP_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = vault::with_args(command);
    auth::with_args(command)
}

fn invoke() -> Command {
    let command = Command::new(CMD_INVOKE)
        .about("Authenticate one event read from stdin and print the response on stdout")
        .arg(
            Arg::new(ARG_SECRETS_FILE)
                .long("secrets-file")
                .help("JSON document mapping secret keys to credential records")
                .env("TRANSFER_IDP_SECRETS_FILE")
                .required(true),
        );

    auth::with_args(command)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("transfer-idp")
        .about("Custom identity provider for managed file-transfer servers")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(server())
        .subcommand(invoke());

    logging::with_args(command)
}
