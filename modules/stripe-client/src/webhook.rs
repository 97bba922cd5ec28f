//! Webhook signature verification.
//!
//! Stripe signs each delivery with `Stripe-Signature: t=<unix>,v1=<hex>`
//! where `v1 = HMAC-SHA256(secret, "{t}.{body}")`. Verification must pass
//! before the payload is parsed at all: an unverified body is untrusted
//! input and must cause no state change.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{Result, StripeError};
use crate::types::Event;

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted clock skew between the signature timestamp and now.
/// Matches the gateway's own recommended replay window.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify the signature header and parse the event. The only entry point
/// the webhook handler should use.
pub fn construct_event(payload: &[u8], signature_header: &str, secret: &str) -> Result<Event> {
    verify_signature(
        payload,
        signature_header,
        secret,
        chrono::Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )?;

    serde_json::from_slice(payload).map_err(|e| StripeError::Parse(format!("event envelope: {e}")))
}

/// Signature check with an injectable clock, so the tolerance window is
/// testable.
pub fn verify_signature(
    payload: &[u8],
    signature_header: &str,
    secret: &str,
    now_unix: i64,
    tolerance_secs: i64,
) -> Result<()> {
    let header = parse_signature_header(signature_header)?;

    if (now_unix - header.timestamp).abs() > tolerance_secs {
        return Err(StripeError::Signature(format!(
            "timestamp {} outside tolerance window",
            header.timestamp
        )));
    }

    let expected = sign(payload, header.timestamp, secret);
    let matched = header
        .v1_signatures
        .iter()
        .any(|sig| constant_time_eq(sig.as_bytes(), expected.as_bytes()));

    if !matched {
        return Err(StripeError::Signature("no matching v1 signature".into()));
    }

    Ok(())
}

/// Compute the expected hex signature for a payload at a timestamp.
/// Exposed so tests (and fixtures) can produce valid headers.
pub fn sign(payload: &[u8], timestamp: i64, secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Build a header value in the gateway's format. Test/fixture helper.
pub fn signature_header(payload: &[u8], timestamp: i64, secret: &str) -> String {
    format!("t={},v1={}", timestamp, sign(payload, timestamp, secret))
}

struct ParsedHeader {
    timestamp: i64,
    /// Multiple v1 entries appear while a webhook secret is being rolled.
    v1_signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> Result<ParsedHeader> {
    let mut timestamp = None;
    let mut v1_signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = value.parse::<i64>().ok();
            }
            Some(("v1", value)) => {
                v1_signatures.push(value.to_string());
            }
            _ => {} // v0 and unknown schemes are ignored
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| StripeError::Signature("missing or malformed timestamp".into()))?;

    if v1_signatures.is_empty() {
        return Err(StripeError::Signature("no v1 signature present".into()));
    }

    Ok(ParsedHeader {
        timestamp,
        v1_signatures,
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test_secret";
    const BODY: &[u8] = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_test_1"}}}"#;

    #[test]
    fn valid_signature_verifies() {
        let header = signature_header(BODY, 1_700_000_000, SECRET);
        assert!(verify_signature(BODY, &header, SECRET, 1_700_000_010, 300).is_ok());
    }

    #[test]
    fn tampered_payload_fails() {
        let header = signature_header(BODY, 1_700_000_000, SECRET);
        let tampered = br#"{"id":"evt_1","type":"checkout.session.completed","data":{"object":{"id":"cs_test_EVIL"}}}"#;
        assert!(verify_signature(tampered, &header, SECRET, 1_700_000_010, 300).is_err());
    }

    #[test]
    fn wrong_secret_fails() {
        let header = signature_header(BODY, 1_700_000_000, "whsec_other");
        assert!(verify_signature(BODY, &header, SECRET, 1_700_000_010, 300).is_err());
    }

    #[test]
    fn stale_timestamp_fails() {
        let header = signature_header(BODY, 1_700_000_000, SECRET);
        assert!(verify_signature(BODY, &header, SECRET, 1_700_000_000 + 301, 300).is_err());
    }

    #[test]
    fn second_v1_entry_is_accepted_during_secret_roll() {
        let good = sign(BODY, 1_700_000_000, SECRET);
        let header = format!("t=1700000000,v1=deadbeef,v1={good}");
        assert!(verify_signature(BODY, &header, SECRET, 1_700_000_000, 300).is_ok());
    }

    #[test]
    fn missing_timestamp_is_rejected() {
        let good = sign(BODY, 1_700_000_000, SECRET);
        let header = format!("v1={good}");
        assert!(matches!(
            verify_signature(BODY, &header, SECRET, 1_700_000_000, 300),
            Err(StripeError::Signature(_))
        ));
    }

    #[test]
    fn construct_event_parses_verified_payload() {
        let now = chrono::Utc::now().timestamp();
        let header = signature_header(BODY, now, SECRET);
        let event = construct_event(BODY, &header, SECRET).unwrap();
        assert_eq!(event.id, "evt_1");
        assert!(event.is_checkout_completed());
        assert_eq!(event.checkout_session().unwrap().id, "cs_test_1");
    }
}
