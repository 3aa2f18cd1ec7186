//! # transfer-idp (custom identity provider for managed transfer servers)
//!
//! `transfer-idp` is called by a managed SFTP/FTPS service on every connection
//! attempt. It looks up the connecting user's credential record in Vault and
//! answers with either an empty denial or the attributes the transfer service
//! needs to open the session: the role to assume, a logical home-directory
//! mapping and, for public-key logins, the keys the client must match.
//!
//! ## Auth modes
//!
//! - **Password supplied:** the request is a password attempt, even when the
//!   user also has public keys configured.
//! - **No password:** the request is a public-key attempt; the stored keys are
//!   handed back and the transfer service verifies the presented key itself.
//!
//! ## Failure contract
//!
//! Every denial, backend fault or malformed record is answered with `{}`. The
//! cause is only visible in the audit log (`action = auth_fail | auth_error`),
//! never on the wire.

pub mod api;
pub mod authenticator;
pub mod cli;
pub mod secrets;
pub mod vault;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
