//! Identity-provider callbacks for the transfer service.
//!
//! Both routes always answer `200`; a denial is the empty object `{}`.

use crate::api::SharedAuthenticator;
use crate::authenticator::{AuthEvent, AuthRequest, AuthResponse};
use axum::{
    extract::{Extension, Path, Query},
    http::HeaderMap,
    response::Json,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::IntoParams;

pub const PASSWORD_HEADER: &str = "Password";

#[derive(IntoParams, Deserialize, Debug, Default)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ConfigQuery {
    /// Transfer protocol (`SFTP`, `FTPS`, `FTP`)
    protocol: Option<String>,
    /// Client address as seen by the transfer service
    source_ip: Option<String>,
}

#[utoipa::path(
    get,
    path = "/servers/{server_id}/users/{username}/config",
    params(
        ("server_id" = String, Path, description = "Transfer server identifier"),
        ("username" = String, Path, description = "Connecting user"),
        ("Password" = Option<String>, Header, description = "Password; omit for public-key authentication"),
        ConfigQuery
    ),
    responses(
        (status = 200, description = "Session attributes, or `{}` when access is denied", body = AuthResponse, content_type = "application/json")
    ),
    tag = "transfer"
)]
// axum handler for the API-gateway style callback
#[instrument(skip(auth, headers, query))]
pub async fn user_config(
    Extension(auth): Extension<SharedAuthenticator>,
    Path((server_id, username)): Path<(String, String)>,
    Query(query): Query<ConfigQuery>,
    headers: HeaderMap,
) -> Json<AuthResponse> {
    // Non-UTF-8 bytes are replaced rather than dropped so the request stays a
    // password attempt.
    let password = headers
        .get(PASSWORD_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_default();

    let request = AuthRequest::new(username, password)
        .with_protocol(query.protocol.unwrap_or_default())
        .with_server_id(server_id)
        .with_source_ip(query.source_ip);

    Json(auth.authenticate(&request).await)
}

#[utoipa::path(
    post,
    path = "/auth",
    request_body = AuthEvent,
    responses(
        (status = 200, description = "Session attributes, or `{}` when access is denied", body = AuthResponse, content_type = "application/json"),
        (status = 400, description = "Body is not valid JSON"),
        (status = 422, description = "Body does not match the event shape")
    ),
    tag = "transfer"
)]
// axum handler for the event style callback
#[instrument(skip(auth, event))]
pub async fn auth_event(
    Extension(auth): Extension<SharedAuthenticator>,
    Json(event): Json<AuthEvent>,
) -> Json<AuthResponse> {
    let request = AuthRequest::from(event);

    Json(auth.authenticate(&request).await)
}
