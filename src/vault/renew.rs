use crate::{cli::globals::GlobalArgs, vault};
use anyhow::{Result, anyhow};
use rand::{Rng, SeedableRng, rngs::StdRng};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tokio::{
    sync::mpsc,
    time::{Duration, sleep},
};
use tracing::{Instrument, debug, error, info_span, instrument, warn};

const MAX_ATTEMPTS: u32 = 3;

/// Renew a Vault token, returns the new lease duration in seconds
#[instrument(skip(token))]
async fn renew_token(url: &str, token: &SecretString, increment: Option<u64>) -> Result<u64> {
    let client = vault::client()?;

    let payload = json!({
        "increment": increment.map_or(0, |increment| increment)
    });

    let renew_url = vault::endpoint_url(url, "/v1/auth/token/renew-self")?;

    let span = info_span!(
        "vault.renew_token",
        http.method = "POST",
        url = %renew_url
    );
    let response = client
        .post(&renew_url)
        .json(&payload)
        .header("X-Vault-Token", token.expose_secret())
        .send()
        .instrument(span)
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let json_response: Value = response.json().await.unwrap_or_default();

        return Err(anyhow!(
            "{} - {}, {}",
            renew_url,
            status,
            vault::vault_error_message(&json_response)
        ));
    }

    let json_response: Value = response.json().await?;

    json_response
        .get("auth")
        .and_then(|v| v.get("lease_duration"))
        .and_then(Value::as_u64)
        .ok_or_else(|| anyhow!("Error parsing JSON response: no lease_duration found"))
}

/// Keep the Vault token alive in the background.
///
/// The token is renewed at 70-90% of its lease. After `MAX_ATTEMPTS` failed
/// renewals in a row `tx` is signaled so the server can shut down gracefully.
/// # Errors
/// Returns an error if the renewal task cannot be set up.
#[instrument(skip(globals, tx))]
pub async fn try_renew(
    globals: &GlobalArgs,
    lease_duration: u64,
    tx: mpsc::UnboundedSender<()>,
) -> Result<()> {
    // non-expiring tokens report a zero lease
    if lease_duration == 0 {
        debug!("Token has no lease, skipping renewal");
        return Ok(());
    }

    tokio::spawn({
        let mut rng = StdRng::from_entropy();
        let mut jittered_lease_duration = jitter(&mut rng, lease_duration);

        let url = globals.vault_url.clone();
        let token = globals.vault_token.clone();

        async move {
            loop {
                debug!(
                    "Will renew token in {} seconds",
                    jittered_lease_duration.as_secs()
                );

                sleep(jittered_lease_duration).await;

                for attempt in 1..=MAX_ATTEMPTS {
                    let backoff_time = 2u64.pow(attempt - 1);

                    if attempt > 1 {
                        warn!("Backing off for {} seconds", backoff_time);
                        sleep(Duration::from_secs(backoff_time)).await;
                    }

                    match renew_token(&url, &token, None).await {
                        Ok(lease_duration) => {
                            jittered_lease_duration = jitter(&mut rng, lease_duration);

                            break;
                        }

                        Err(e) => {
                            error!("Failed to renew token: {}", e);

                            if attempt == MAX_ATTEMPTS {
                                error!(
                                    "Failed to renew token after {} attempts: {}",
                                    MAX_ATTEMPTS, e
                                );
                                let _ = tx.send(());
                                return;
                            }
                        }
                    }
                }
            }
        }
    });

    Ok(())
}

fn jitter(rng: &mut StdRng, lease_duration: u64) -> Duration {
    let factor = rng.gen_range(70..90);
    Duration::from_secs(lease_duration * factor / 100)
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
    fn jitter_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let secs = jitter(&mut rng, 1000).as_secs();
            assert!((700..900).contains(&secs), "jitter out of range: {secs}");
        }
    }

    #[tokio::test]
    async fn try_renew_skips_tokens_without_lease() -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let globals = GlobalArgs::new("http://127.0.0.1:8200".to_string());

        try_renew(&globals, 0, tx).await?;

        // sender dropped without a shutdown signal
        assert!(rx.recv().await.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn renew_token_returns_lease_duration() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .and(header("X-Vault-Token", "token"))
            .and(body_json(json!({ "increment": 0 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "auth": {"lease_duration": 3600}
            })))
            .mount(&server)
            .await;

        let token = SecretString::from("token".to_string());
        let lease = renew_token(&server.uri(), &token, None).await?;
        assert_eq!(lease, 3600);
        Ok(())
    }

    #[tokio::test]
    async fn renew_token_errors_on_failure_status() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/auth/token/renew-self"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "errors": ["permission denied"]
            })))
            .mount(&server)
            .await;

        let token = SecretString::from("token".to_string());
        let err = renew_token(&server.uri(), &token, None)
            .await
            .err()
            .ok_or_else(|| anyhow!("expected error"))?;
        assert!(err.to_string().contains("permission denied"));
        Ok(())
    }
}
