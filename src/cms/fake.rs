//! In-memory content store for unit tests.

use super::{ContentStore, SitemapDocument, SlugQuery, StoreError, TranslationEntry};
use crate::routes::DocumentType;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone)]
pub struct FakeDocument {
    pub id: String,
    pub doc_type: String,
    pub language: Option<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Default)]
pub struct FakeStore {
    pub documents: Vec<FakeDocument>,
    /// Each link lists the ids of its member documents.
    pub links: Vec<Vec<String>>,
    /// Linked ids whose documents were deleted, with the language key they
    /// were linked under.
    pub deleted: Vec<(String, String)>,
    pub failure: Option<StoreError>,
    /// Document types whose queries fail while others succeed.
    pub failing_types: Vec<String>,
    pub queries: AtomicUsize,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: StoreError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn with_document(mut self, id: &str, doc_type: &str, language: Option<&str>, slug: Option<&str>) -> Self {
        self.documents.push(FakeDocument {
            id: id.to_string(),
            doc_type: doc_type.to_string(),
            language: language.map(str::to_string),
            slug: slug.map(str::to_string),
        });
        self
    }

    pub fn with_link(mut self, ids: &[&str]) -> Self {
        self.links.push(ids.iter().map(|id| id.to_string()).collect());
        self
    }

    pub fn with_deleted_document(mut self, id: &str, language: &str) -> Self {
        self.deleted.push((id.to_string(), language.to_string()));
        self
    }

    pub fn with_failing_type(mut self, doc_type: &str) -> Self {
        self.failing_types.push(doc_type.to_string());
        self
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), StoreError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn check_type(&self, doc_type: DocumentType) -> Result<(), StoreError> {
        self.check()?;
        if self.failing_types.iter().any(|t| t == doc_type.as_str()) {
            return Err(StoreError::Status {
                status: 500,
                body: format!("{} query failed", doc_type),
            });
        }
        Ok(())
    }

    fn document(&self, id: &str) -> Option<&FakeDocument> {
        self.documents.iter().find(|doc| doc.id == id)
    }
}

#[async_trait]
impl ContentStore for FakeStore {
    async fn translation_entries(
        &self,
        document_id: &str,
    ) -> Result<Option<Vec<TranslationEntry>>, StoreError> {
        self.check()?;
        let Some(link) = self.links.iter().find(|ids| ids.iter().any(|id| id == document_id)) else {
            return Ok(None);
        };

        Ok(Some(
            link.iter()
                .filter_map(|id| {
                    if let Some(doc) = self.document(id) {
                        return Some(TranslationEntry {
                            language: doc.language.clone().unwrap_or_default(),
                            id: Some(doc.id.clone()),
                            doc_type: Some(doc.doc_type.clone()),
                            slug: doc.slug.clone(),
                        });
                    }
                    let (_, language) = self.deleted.iter().find(|(deleted, _)| deleted == id)?;
                    Some(TranslationEntry {
                        language: language.clone(),
                        id: Some(id.clone()),
                        doc_type: None,
                        slug: None,
                    })
                })
                .collect(),
        ))
    }

    async fn document_id(
        &self,
        doc_type: DocumentType,
        language: &str,
        slug: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        self.check_type(doc_type)?;
        Ok(self
            .documents
            .iter()
            .find(|doc| {
                doc.doc_type == doc_type.as_str()
                    && doc.language.as_deref() == Some(language)
                    && (slug.is_none() || doc.slug.as_deref() == slug)
            })
            .map(|doc| doc.id.clone()))
    }

    async fn count_slug_matches(&self, query: &SlugQuery) -> Result<u64, StoreError> {
        self.check()?;
        Ok(self
            .documents
            .iter()
            .filter(|doc| {
                doc.doc_type == query.doc_type
                    && doc.slug.as_deref() == Some(query.slug.as_str())
                    && (query.language.is_none() || doc.language == query.language)
                    && !query.exclude_ids.contains(&doc.id)
            })
            .count() as u64)
    }

    async fn sitemap_documents(
        &self,
        doc_type: DocumentType,
    ) -> Result<Vec<SitemapDocument>, StoreError> {
        self.check_type(doc_type)?;
        Ok(self
            .documents
            .iter()
            .filter(|doc| doc.doc_type == doc_type.as_str() && doc.slug.is_some())
            .map(|doc| SitemapDocument {
                slug: doc.slug.clone(),
                language: doc.language.clone(),
                updated_at: None,
            })
            .collect())
    }
}
