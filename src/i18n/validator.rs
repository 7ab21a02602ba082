//! Slug uniqueness for the CMS authoring tool.
//!
//! Slugs are unique per document type *and language*: a Dutch and an English
//! villa may both use `moraira`, two Dutch villas may not.

use crate::cms::{ContentStore, SlugQuery, StoreError};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

const DRAFT_PREFIX: &str = "drafts.";

/// What to answer when the collision count itself cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreFailurePolicy {
    /// Accept the slug; a duplicate may slip through during an outage.
    Permissive,
    /// Report a validation error; the editor cannot save until the store answers.
    #[default]
    Blocking,
}

impl FromStr for StoreFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(StoreFailurePolicy::Permissive),
            "blocking" => Ok(StoreFailurePolicy::Blocking),
            other => Err(format!(
                "Unknown store failure policy '{}', expected 'permissive' or 'blocking'",
                other
            )),
        }
    }
}

/// The document being edited, as the authoring tool describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlugContext {
    /// Draft (`drafts.x`) or published (`x`) id
    #[serde(rename = "_id", default)]
    pub document_id: String,

    #[serde(rename = "_type")]
    pub doc_type: Option<String>,

    /// Absent for schemas without document-level translations
    pub language: Option<String>,
}

impl SlugContext {
    /// Published and draft ids of the document, in that order.
    pub fn revision_ids(&self) -> [String; 2] {
        let base = self
            .document_id
            .strip_prefix(DRAFT_PREFIX)
            .unwrap_or(&self.document_id);
        [base.to_string(), format!("{}{}", DRAFT_PREFIX, base)]
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugValidationError {
    #[error("could not verify that the slug is unique: {0}")]
    StoreUnavailable(#[source] StoreError),
}

pub struct SlugValidator {
    store: Arc<dyn ContentStore>,
    policy: StoreFailurePolicy,
}

impl SlugValidator {
    pub fn new(store: Arc<dyn ContentStore>, policy: StoreFailurePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> StoreFailurePolicy {
        self.policy
    }

    /// `Ok(true)` when no other document of the same type (and language, when
    /// the document has one) uses `candidate`.
    ///
    /// Both revisions of the document being edited are excluded, so keeping a
    /// document's own slug is never a collision. The candidate is compared
    /// exactly as stored, surrounding whitespace included.
    pub async fn is_unique(
        &self,
        candidate: &str,
        context: &SlugContext,
    ) -> Result<bool, SlugValidationError> {
        if candidate.is_empty() {
            return Ok(true);
        }

        let Some(doc_type) = context.doc_type.as_deref().filter(|t| !t.is_empty()) else {
            debug!("No document type for slug '{}', nothing to compare against", candidate);
            return Ok(true);
        };

        let query = SlugQuery {
            doc_type: doc_type.to_string(),
            language: context.language.clone().filter(|l| !l.is_empty()),
            slug: candidate.to_string(),
            exclude_ids: context.revision_ids(),
        };

        match self.store.count_slug_matches(&query).await {
            Ok(count) => {
                if count > 0 {
                    debug!(
                        "Slug '{}' already used by {} other {} document(s) (language: {:?})",
                        candidate, count, doc_type, query.language
                    );
                }
                Ok(count == 0)
            }
            Err(err) => match self.policy {
                StoreFailurePolicy::Permissive => {
                    warn!(
                        "Slug uniqueness check for '{}' failed, accepting: {}",
                        candidate, err
                    );
                    Ok(true)
                }
                StoreFailurePolicy::Blocking => {
                    warn!(
                        "Slug uniqueness check for '{}' failed, rejecting: {}",
                        candidate, err
                    );
                    Err(SlugValidationError::StoreUnavailable(err))
                }
            },
        }
    }
}
