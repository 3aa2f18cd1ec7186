pub mod kv;
pub mod renew;

use crate::APP_USER_AGENT;
use anyhow::{Result, anyhow};
use reqwest::Client;
use serde_json::{Value, json};
use tracing::{Instrument, debug, info_span, instrument};
use url::Url;

pub(crate) fn vault_error_message(json_response: &Value) -> &str {
    json_response
        .get("errors")
        .and_then(|v| v.get(0))
        .and_then(Value::as_str)
        .unwrap_or("")
}

pub(crate) fn client() -> Result<Client> {
    Ok(Client::builder().user_agent(APP_USER_AGENT).build()?)
}

/// Build `scheme://host:port{path}` from any Vault URL (e.g. the `AppRole` login URL).
///
/// # Errors
/// Returns an error if `url` cannot be parsed, has no host, or uses an unsupported scheme.
#[instrument]
pub fn endpoint_url(url: &str, path: &str) -> Result<String> {
    let url = Url::parse(url)?;

    let scheme = url.scheme();

    let host = url
        .host()
        .ok_or_else(|| anyhow!("Error parsing URL: no host specified"))?
        .to_owned();

    let port = match url.port() {
        Some(p) => p,
        None => match scheme {
            "http" => 80,
            "https" => 443,
            _ => return Err(anyhow!("Error parsing URL: unsupported scheme {scheme}")),
        },
    };

    let endpoint_url = format!("{scheme}://{host}:{port}{path}");

    debug!("endpoint URL: {}", endpoint_url);

    Ok(endpoint_url)
}

/// Unwrap a wrapped Vault client token
/// Create wrapped token with:
/// vault write -wrap-ttl=300s -f auth/approle/role/transfer-idp/secret-id
/// # Errors
/// Returns an error if the Vault request fails, Vault returns a non-success status, or the response is missing expected fields.
#[instrument(skip(token))]
pub async fn unwrap(url: &str, token: &str) -> Result<String> {
    let client = client()?;

    let unwrap_url = endpoint_url(url, "/v1/sys/wrapping/unwrap")?;

    let span = info_span!(
        "vault.unwrap",
        http.method = "POST",
        url = %unwrap_url
    );
    let response = client
        .post(&unwrap_url)
        .header("X-Vault-Token", token)
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or_default();

        return Err(anyhow!(
            "{} - {}, {}",
            unwrap_url,
            status,
            vault_error_message(&json_response)
        ));
    }

    let json_response: Value = response.json().await?;
    let sid = json_response
        .get("data")
        .and_then(|v| v.get("secret_id"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no secret_id found"))?;

    Ok(sid.to_string())
}

/// Login to Vault using `AppRole`
/// Create a secret ID with:
/// vault write -f auth/approle/role/transfer-idp/secret-id
/// # Errors
/// Returns an error if the Vault request fails, Vault returns a non-success status, or the response is missing expected fields.
#[instrument(skip(sid))]
pub async fn approle_login(url: &str, sid: &str, rid: &str) -> Result<(String, u64)> {
    let client = client()?;

    let login_payload = json!({
        "role_id": rid,
        "secret_id": sid
    });

    debug!("login URL: {}, role ID: {}", url, rid);

    let span = info_span!(
        "vault.approle_login",
        http.method = "POST",
        url = %url
    );
    let response = client
        .post(url)
        .json(&login_payload)
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or_default();

        return Err(anyhow!(
            "{} - {}, {}",
            url,
            status,
            vault_error_message(&json_response)
        ));
    }

    let json_response: Value = response.json().await?;
    let token = json_response
        .get("auth")
        .and_then(|v| v.get("client_token"))
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no client_token found"))?;
    let lease_duration = json_response
        .get("auth")
        .and_then(|v| v.get("lease_duration"))
        .and_then(Value::as_u64)
        .unwrap_or(1800);

    Ok((token.to_string(), lease_duration))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[test]
    fn endpoint_url_defaults_http_port() -> Result<()> {
        let url = endpoint_url("http://example.com", "/v1/test")?;
        assert_eq!(url, "http://example.com:80/v1/test");
        Ok(())
    }

    #[test]
    fn endpoint_url_strips_login_path() -> Result<()> {
        let url = endpoint_url(
            "https://vault.tld:8200/v1/auth/approle/login",
            "/v1/secret/data/x",
        )?;
        assert_eq!(url, "https://vault.tld:8200/v1/secret/data/x");
        Ok(())
    }

    #[test]
    fn endpoint_url_rejects_unsupported_scheme() -> Result<()> {
        let err = endpoint_url("ftp://example.com", "/v1/test")
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("unsupported scheme"));
        Ok(())
    }

    #[test]
    fn vault_error_message_reads_first_error() {
        assert_eq!(
            vault_error_message(&json!({ "errors": ["permission denied", "other"] })),
            "permission denied"
        );
        assert_eq!(vault_error_message(&json!({})), "");
    }

    #[tokio::test]
    async fn unwrap_returns_secret_id() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/sys/wrapping/unwrap"))
            .and(header("X-Vault-Token", "wrapped-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"secret_id": "secret-123"}
            })))
            .mount(&server)
            .await;

        let secret_id = unwrap(&server.uri(), "wrapped-token").await?;
        assert_eq!(secret_id, "secret-123");
        Ok(())
    }

    #[tokio::test]
    async fn unwrap_errors_on_failure_status() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/sys/wrapping/unwrap"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "errors": ["nope"]
            })))
            .mount(&server)
            .await;

        let result = unwrap(&server.uri(), "wrapped-token").await;
        let err = result.err().ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("nope"));
        Ok(())
    }

    #[tokio::test]
    async fn approle_login_returns_token_and_lease() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/auth/approle/login"))
            .and(body_json(json!({
                "role_id": "role-id",
                "secret_id": "secret-id"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": {"client_token": "token-abc", "lease_duration": 600}
            })))
            .mount(&server)
            .await;

        let login_url = format!("{}/v1/auth/approle/login", server.uri());
        let (token, lease) = approle_login(&login_url, "secret-id", "role-id").await?;
        assert_eq!(token, "token-abc");
        assert_eq!(lease, 600);
        Ok(())
    }

    #[tokio::test]
    async fn approle_login_defaults_lease_duration() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/auth/approle/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": {"client_token": "token-abc"}
            })))
            .mount(&server)
            .await;

        let login_url = format!("{}/v1/auth/approle/login", server.uri());
        let (_, lease) = approle_login(&login_url, "secret-id", "role-id").await?;
        assert_eq!(lease, 1800);
        Ok(())
    }
}
