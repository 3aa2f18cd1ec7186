//! Structured audit events, one per line, tagged by `action`.
//!
//! Events go to the `transfer_idp::audit` target so they stay enabled at the
//! default log level (see `cli::telemetry`).

use super::types::{AuthRequest, AuthType, FailureReason};
use crate::secrets::LookupError;
use tracing::{error, info, warn};

pub const AUDIT_TARGET: &str = "transfer_idp::audit";

pub fn attempt(request: &AuthRequest) {
    info!(
        target: AUDIT_TARGET,
        action = "auth_attempt",
        username = %request.username,
        protocol = %request.protocol,
        server_id = %request.server_id,
        source_ip = %request.source_ip,
        auth_type = request.auth_type().as_str(),
    );
}

pub fn error(username: &str, err: &LookupError) {
    error!(
        target: AUDIT_TARGET,
        action = "auth_error",
        username = %username,
        kind = err.kind().as_str(),
        reason = %err,
    );
}

pub fn fail(username: &str, reason: FailureReason) {
    warn!(
        target: AUDIT_TARGET,
        action = "auth_fail",
        username = %username,
        reason = reason.as_str(),
    );
}

pub fn success(username: &str, auth_type: AuthType) {
    info!(
        target: AUDIT_TARGET,
        action = "auth_success",
        username = %username,
        auth_type = auth_type.as_str(),
    );
}
