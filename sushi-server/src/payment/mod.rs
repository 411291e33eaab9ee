//! Payment provider integration
//!
//! The storefront pays through a generic provider relay (REST, no SDK). The
//! relay answers a session request with `{id, url}` and later calls the
//! webhook with an HMAC-SHA256 signed body.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Header carrying the webhook signature
pub const SIGNATURE_HEADER: &str = "x-payment-signature";
/// Accepted clock skew for webhook timestamps
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

pub const EVENT_SUCCEEDED: &str = "payment.succeeded";
pub const EVENT_FAILED: &str = "payment.failed";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Session request posted to the relay
#[derive(Debug, Clone, Serialize)]
pub struct RelaySessionRequest<'a> {
    pub order_id: &'a str,
    pub reference: String,
    /// Amount in cents
    pub amount: i64,
    pub currency: &'static str,
    pub customer_email: &'a str,
}

/// Session returned by the relay
#[derive(Debug, Clone, Deserialize)]
pub struct RelaySession {
    pub id: String,
    pub url: Option<String>,
}

/// Create a checkout session through the relay
pub async fn create_relay_session(
    client: &reqwest::Client,
    relay_url: &str,
    request: &RelaySessionRequest<'_>,
) -> Result<RelaySession, BoxError> {
    let resp = client
        .post(relay_url)
        .json(request)
        .send()
        .await?
        .error_for_status()?;
    let session: RelaySession = resp.json().await?;
    Ok(session)
}

/// Session id used when no relay is configured
pub fn local_session_id() -> String {
    format!("local_{}", uuid::Uuid::new_v4().simple())
}

/// Amount in cents, as providers expect it
pub fn to_cents(amount: f64) -> i64 {
    let cents = crate::pricing::to_decimal(amount) * rust_decimal::Decimal::ONE_HUNDRED;
    crate::pricing::to_f64(cents.round()) as i64
}

fn mac_for(secret: &str, timestamp: &str, payload: &[u8]) -> Result<Hmac<Sha256>, &'static str> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).map_err(|_| "HMAC key error")?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Signature header value for a payload: `t=<unix>,v1=<hex>`
pub fn sign_payload(payload: &[u8], secret: &str, timestamp: i64) -> Result<String, &'static str> {
    let ts = timestamp.to_string();
    let mac = mac_for(secret, &ts, payload)?;
    Ok(format!("t={ts},v1={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify a webhook signature header (HMAC-SHA256 over `"<t>.<body>"`)
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
    now_secs: i64,
) -> Result<(), &'static str> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        let part = part.trim();
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err("Invalid signature header");
    }

    let mac = mac_for(secret, timestamp, payload)?;
    let sig_bytes = hex::decode(signature).map_err(|_| "Invalid signature hex")?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| "Webhook signature mismatch")?;

    let ts: i64 = timestamp.parse().map_err(|_| "Invalid timestamp")?;
    if (now_secs - ts).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err("Webhook timestamp outside tolerance");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";
    const BODY: &[u8] = br#"{"type":"payment.succeeded","order_id":"abc"}"#;

    #[test]
    fn signed_payload_verifies() {
        let header = sign_payload(BODY, SECRET, 1_700_000_000).unwrap();
        assert!(header.starts_with("t=1700000000,v1="));
        assert!(verify_webhook_signature(BODY, &header, SECRET, 1_700_000_100).is_ok());
    }

    #[test]
    fn tampered_body_or_secret_fails() {
        let header = sign_payload(BODY, SECRET, 1_700_000_000).unwrap();
        assert_eq!(
            verify_webhook_signature(b"{}", &header, SECRET, 1_700_000_000),
            Err("Webhook signature mismatch")
        );
        assert!(verify_webhook_signature(BODY, &header, "other", 1_700_000_000).is_err());
    }

    #[test]
    fn stale_timestamp_fails() {
        let header = sign_payload(BODY, SECRET, 1_700_000_000).unwrap();
        assert!(verify_webhook_signature(BODY, &header, SECRET, 1_700_000_300).is_ok());
        assert_eq!(
            verify_webhook_signature(BODY, &header, SECRET, 1_700_000_301),
            Err("Webhook timestamp outside tolerance")
        );
    }

    #[test]
    fn malformed_headers() {
        assert!(verify_webhook_signature(BODY, "", SECRET, 0).is_err());
        assert!(verify_webhook_signature(BODY, "t=1", SECRET, 0).is_err());
        assert!(verify_webhook_signature(BODY, "t=1,v1=zz", SECRET, 0).is_err());
    }

    #[test]
    fn cents() {
        assert_eq!(to_cents(42.5), 4250);
        assert_eq!(to_cents(0.1 + 0.2), 30);
    }
}
