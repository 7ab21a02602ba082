//! Content store access.
//!
//! The site's content lives in a remote Sanity dataset. Everything here talks
//! to it through the [`ContentStore`] trait so the resolver and the slug
//! validator can be exercised against fakes.

mod client;
#[cfg(test)]
pub(crate) mod fake;
mod resolver;

pub use client::SanityClient;
pub use resolver::{AlternateUrls, LinkResolution, Resolution, TranslationResolver};

use crate::routes::DocumentType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

/// Failure talking to the content store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("content store request failed: {0}")]
    Transport(String),

    #[error("content store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode content store response: {0}")]
    Decode(String),
}

impl StoreError {
    /// Network failures, rate limiting and server errors may succeed on retry.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Transport(_) => true,
            StoreError::Status { status, .. } => *status == 429 || *status >= 500,
            StoreError::Decode(_) => false,
        }
    }
}

/// Result of a read that distinguishes "nothing there" from "couldn't look".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome<T> {
    Found(T),
    NotFound,
    Unavailable(StoreError),
}

impl<T> FetchOutcome<T> {
    pub fn from_result(result: Result<Option<T>, StoreError>) -> Self {
        match result {
            Ok(Some(value)) => FetchOutcome::Found(value),
            Ok(None) => FetchOutcome::NotFound,
            Err(err) => FetchOutcome::Unavailable(err),
        }
    }

    /// Collapse to the value, treating both misses and failures as absent.
    pub fn found(self) -> Option<T> {
        match self {
            FetchOutcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> FetchOutcome<U> {
        match self {
            FetchOutcome::Found(value) => FetchOutcome::Found(f(value)),
            FetchOutcome::NotFound => FetchOutcome::NotFound,
            FetchOutcome::Unavailable(err) => FetchOutcome::Unavailable(err),
        }
    }
}

/// One language's document in a translation link.
///
/// Links hold weak references, so a member deleted after linking still has
/// an entry whose dereferenced type and slug come back null.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TranslationEntry {
    pub language: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub doc_type: Option<String>,
    pub slug: Option<String>,
}

/// Parameters of a slug collision count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugQuery {
    pub doc_type: String,
    /// `None` checks across every language of the type.
    pub language: Option<String>,
    pub slug: String,
    /// Published and draft ids of the document being edited.
    pub exclude_ids: [String; 2],
}

/// A document listed in the sitemap.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SitemapDocument {
    pub slug: Option<String>,
    pub language: Option<String>,
    #[serde(rename = "_updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Entries of the translation link that references `document_id`, if any.
    async fn translation_entries(
        &self,
        document_id: &str,
    ) -> Result<Option<Vec<TranslationEntry>>, StoreError>;

    /// Id of the document of `doc_type` in `language`, optionally matched by slug.
    async fn document_id(
        &self,
        doc_type: DocumentType,
        language: &str,
        slug: Option<&str>,
    ) -> Result<Option<String>, StoreError>;

    /// Number of other documents already using a slug.
    async fn count_slug_matches(&self, query: &SlugQuery) -> Result<u64, StoreError>;

    /// Published documents of a detail type, for the sitemap.
    async fn sitemap_documents(
        &self,
        doc_type: DocumentType,
    ) -> Result<Vec<SitemapDocument>, StoreError>;
}
