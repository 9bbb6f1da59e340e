//! Webhook signature verification.
//!
//! Async jobs created with a `webhook_url` receive a `webhook_secret` in the
//! creation response. When the completion webhook arrives, two headers
//! accompany the POST body: [`SIGNATURE_HEADER`] and [`TIMESTAMP_HEADER`].
//! The signature is `sha256={hex}` where the digest is HMAC-SHA256, keyed by
//! the secret, over the ASCII timestamp, a literal `.`, and the raw body
//! bytes exactly as transmitted — no re-encoding or normalization. Callers
//! holding the body as text must pass its exact UTF-8 bytes.
//!
//! Verification never panics and never errors: malformed input is simply
//! unverified.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the webhook signature (`sha256={hex}`).
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Header carrying the webhook timestamp (Unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

/// Replay window: timestamps further than this from the current time are
/// rejected even when the signature itself is valid, in either direction
/// (stale capture or skewed clock).
pub const REPLAY_TOLERANCE_SECS: i64 = 300;

const SIGNATURE_PREFIX: &str = "sha256=";

fn keyed_mac(secret: &str, timestamp: &str, payload: &[u8]) -> HmacSha256 {
    // HMAC accepts keys of any length, so construction cannot fail.
    #[allow(clippy::expect_used)]
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    mac
}

/// Computes the signature header value for a payload and timestamp.
///
/// This is what the API itself sends; it is exposed for tests and for
/// services that relay webhooks downstream.
#[must_use]
pub fn sign_webhook(payload: &[u8], timestamp: &str, secret: &str) -> String {
    let digest = keyed_mac(secret, timestamp, payload).finalize().into_bytes();
    format!("{SIGNATURE_PREFIX}{}", hex::encode(digest))
}

/// Verifies an inbound webhook against the secret issued at job creation.
///
/// Returns true only when the timestamp parses as Unix seconds, lies within
/// [`REPLAY_TOLERANCE_SECS`] of the current time, and the signature matches.
/// The digest comparison is constant-time.
#[must_use]
pub fn verify_webhook(payload: &[u8], signature: &str, timestamp: &str, secret: &str) -> bool {
    verify_webhook_at(payload, signature, timestamp, secret, Utc::now().timestamp())
}

/// [`verify_webhook`] with an explicit "now", for deterministic testing.
#[must_use]
pub fn verify_webhook_at(
    payload: &[u8],
    signature: &str,
    timestamp: &str,
    secret: &str,
    now_unix: i64,
) -> bool {
    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };
    // Checked: the timestamp is attacker-controlled and may be extreme.
    let Some(skew) = now_unix.checked_sub(ts) else {
        return false;
    };
    if skew.unsigned_abs() > REPLAY_TOLERANCE_SECS.unsigned_abs() {
        return false;
    }
    let Some(hex_digest) = signature.strip_prefix(SIGNATURE_PREFIX) else {
        return false;
    };
    let Ok(provided) = hex::decode(hex_digest) else {
        return false;
    };
    keyed_mac(secret, timestamp, payload)
        .verify_slice(&provided)
        .is_ok()
}

/// Verifies a Contents API completion webhook.
///
/// Alias for [`verify_webhook`]; the contents job flow is where webhook
/// secrets are issued.
#[must_use]
pub fn verify_contents_webhook(
    payload: &[u8],
    signature: &str,
    timestamp: &str,
    secret: &str,
) -> bool {
    verify_webhook(payload, signature, timestamp, secret)
}
