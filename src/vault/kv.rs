use crate::{cli::globals::GlobalArgs, vault};
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{Instrument, info_span, instrument};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvRead {
    Found(Value),
    NotFound,
}

/// `/v1/{mount}/data/{key}` with every segment of `key` percent-encoded, so
/// `?`, `#` or `%` in a username stay part of the secret name.
fn data_url(vault_url: &str, kv_mount: &str, key: &str) -> Result<Url> {
    let mut url = Url::parse(&vault::endpoint_url(vault_url, "/")?)?;

    url.path_segments_mut()
        .map_err(|()| anyhow!("Error parsing URL: cannot be a base"))?
        .clear()
        .push("v1")
        .extend(kv_mount.split('/').filter(|segment| !segment.is_empty()))
        .push("data")
        .extend(key.split('/'));

    Ok(url)
}

/// Read the latest version of a KV-v2 secret.
///
/// A `404` (missing or deleted secret) is `KvRead::NotFound`, not an error.
///
/// # Errors
/// Returns an error if the Vault request fails, Vault returns any other non-success status,
/// or the response has no `data.data` object.
#[instrument(skip(client, globals))]
pub async fn read(
    client: &Client,
    globals: &GlobalArgs,
    kv_mount: &str,
    key: &str,
) -> Result<KvRead> {
    let url = data_url(&globals.vault_url, kv_mount, key)?;

    let span = info_span!(
        "vault.kv.read",
        http.method = "GET",
        url = %url
    );
    let response = client
        .get(url.as_str())
        .header("X-Vault-Token", globals.vault_token.expose_secret())
        .send()
        .instrument(span)
        .await?;

    if response.status() == StatusCode::NOT_FOUND {
        return Ok(KvRead::NotFound);
    }

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or_default();
        return Err(anyhow!(
            "vault kv read failed: {status} {}",
            vault::vault_error_message(&json_response)
        ));
    }

    let mut json: Value = response.json().await?;
    let data = json
        .get_mut("data")
        .and_then(|data| data.get_mut("data"))
        .map(Value::take)
        .filter(Value::is_object)
        .context("secret data missing from vault response")?;

    Ok(KvRead::Found(data))
}
