//! Signed webhook delivery.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chainrelay_core::{ChainEvent, EventHandler, Handled, HandlerError, NotificationCategory};
use chainrelay_store::WebhookStore;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

/// Header carrying the hex HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "X-Signature-SHA256";

/// Posts each chain event to every webhook registered for the chain-event
/// category. Delivery is best effort: an unreachable endpoint is logged at
/// warn and never retried here.
pub struct WebhookHandler {
    store: Arc<dyn WebhookStore>,
    client: reqwest::Client,
}

/// Hex HMAC-SHA256 over `body`. The signing key is the webhook row's
/// hex-encoded secret; a secret that is not valid hex is used as raw bytes.
pub fn sign_payload(secret: &str, body: &[u8]) -> String {
    let key = hex::decode(secret).unwrap_or_else(|_| secret.as_bytes().to_vec());
    let mut mac =
        Hmac::<Sha256>::new_from_slice(&key).expect("HMAC accepts keys of any length");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

impl WebhookHandler {
    pub fn new(store: Arc<dyn WebhookStore>) -> Result<Self, HandlerError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| HandlerError::Other(format!("http client: {e}")))?;
        Ok(Self { store, client })
    }
}

#[async_trait]
impl EventHandler for WebhookHandler {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn handle(&self, event: &ChainEvent) -> Result<Handled, HandlerError> {
        let endpoints = self
            .store
            .endpoints_for(NotificationCategory::ChainEvent)
            .await?;
        if endpoints.is_empty() {
            return Ok(Handled::Skipped);
        }

        let body = serde_json::to_vec(event).map_err(|e| HandlerError::Other(e.to_string()))?;
        for endpoint in endpoints {
            let mut req = self
                .client
                .post(&endpoint.url)
                .header("content-type", "application/json")
                .body(body.clone());
            if let Some(secret) = &endpoint.secret {
                req = req.header(SIGNATURE_HEADER, sign_payload(secret, &body));
            }
            match req.send().await {
                Ok(resp) if resp.status().is_success() => {
                    debug!(url = %endpoint.url, event_id = event.id, "webhook delivered");
                }
                Ok(resp) => {
                    warn!(url = %endpoint.url, status = %resp.status(), "webhook rejected");
                }
                Err(err) => {
                    warn!(url = %endpoint.url, error = %err, "webhook delivery failed");
                }
            }
        }
        Ok(Handled::Done)
    }
}
