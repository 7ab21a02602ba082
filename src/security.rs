use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use regex::Regex;
use sha2::Sha256;
use std::sync::OnceLock;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Header carrying the webhook signature: `t=<timestamp>,v1=<signature>`
pub const SIGNATURE_HEADER: &str = "sanity-webhook-signature";

static SIGNATURE_REGEX: OnceLock<Regex> = OnceLock::new();

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header missing")]
    Missing,

    #[error("signature header malformed")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,
}

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing API keys, webhook secrets, and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

fn digest(secret: &str, timestamp: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
}

/// Header value the CMS would send for `body` at `timestamp` (milliseconds).
pub fn sign_payload(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let timestamp = timestamp.to_string();
    format!("t={},v1={}", timestamp, digest(secret, &timestamp, body))
}

/// Check a webhook signature header against the raw request body.
pub fn verify_signature(secret: &str, header: Option<&str>, body: &[u8]) -> Result<(), SignatureError> {
    let header = header.map(str::trim).filter(|h| !h.is_empty()).ok_or(SignatureError::Missing)?;

    let regex = SIGNATURE_REGEX.get_or_init(|| {
        Regex::new(r"^t=(\d+)[, ]+v1=([^, ]+)$").expect("signature header pattern is valid")
    });
    let captures = regex.captures(header).ok_or(SignatureError::Malformed)?;
    let (timestamp, signature) = (&captures[1], &captures[2]);

    if constant_time_compare(&digest(secret, timestamp, body), signature) {
        Ok(())
    } else {
        Err(SignatureError::Mismatch)
    }
}
