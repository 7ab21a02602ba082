//! Cache revalidation requested by the CMS webhook.

use crate::security::{verify_signature, SignatureError};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    tags: Option<Vec<String>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RevalidateError {
    #[error("Missing SANITY_REVALIDATE_SECRET")]
    SecretNotConfigured,

    #[error("Invalid signature")]
    InvalidSignature(#[source] SignatureError),

    #[error("Missing tags")]
    MissingTags,
}

impl RevalidateError {
    /// HTTP status the webhook endpoint answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            RevalidateError::SecretNotConfigured => 500,
            RevalidateError::InvalidSignature(_) => 401,
            RevalidateError::MissingTags => 400,
        }
    }
}

/// Authenticate a webhook request and extract the tags to invalidate.
///
/// The signature is checked before the body is parsed, so an unsigned
/// request is rejected whatever it contains. Tags are trimmed and blank ones
/// dropped, so the returned list may differ from the body; a body holding only
/// blank tags is `MissingTags`.
pub fn authorize_and_parse(
    secret: Option<&str>,
    signature: Option<&str>,
    body: &[u8],
) -> Result<Vec<String>, RevalidateError> {
    let secret = secret.ok_or_else(|| {
        warn!("Revalidation webhook received but no secret is configured");
        RevalidateError::SecretNotConfigured
    })?;

    verify_signature(secret, signature, body).map_err(|err| {
        warn!("Rejected revalidation webhook: {}", err);
        RevalidateError::InvalidSignature(err)
    })?;

    let tags: Vec<String> = serde_json::from_slice::<WebhookPayload>(body)
        .ok()
        .and_then(|payload| payload.tags)
        .unwrap_or_default()
        .into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    if tags.is_empty() {
        return Err(RevalidateError::MissingTags);
    }

    info!("Revalidation requested for tags: {:?}", tags);
    Ok(tags)
}
