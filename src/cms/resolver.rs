//! Alternate-language URLs from the CMS translation graph.
//!
//! A failed or missing lookup never fails the page: callers get a typed
//! [`Resolution`] and the caller-level helpers fill in static fallbacks.

use super::{ContentStore, FetchOutcome, StoreError, TranslationEntry};
use crate::cache::TRANSLATION_METADATA_TAG;
use crate::i18n::{delocalize, localize, LocaleRegistry, PathTranslator, ResolutionMetrics};
use crate::routes::{DocumentType, RoutePrefixTable};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Locale code -> localized path.
pub type AlternateUrls = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// URLs for every locale present in the translation link.
    Resolved(AlternateUrls),
    /// The document is not part of any translation link.
    NotLinked,
    /// The content store could not be queried.
    Unavailable(StoreError),
}

impl Resolution {
    /// The alternates, or `None` when nothing was resolved.
    pub fn into_alternates(self) -> Option<AlternateUrls> {
        match self {
            Resolution::Resolved(urls) => Some(urls),
            Resolution::NotLinked | Resolution::Unavailable(_) => None,
        }
    }
}

/// A resolution together with the cache tags it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkResolution {
    pub resolution: Resolution,
    /// The link tag, the requested id, every member id, each member's type
    /// under both its document name and its revalidate tag, and `type:slug`.
    pub tags: BTreeSet<String>,
}

fn link_tags(document_id: &str, entries: &[TranslationEntry]) -> BTreeSet<String> {
    let mut tags = BTreeSet::from([TRANSLATION_METADATA_TAG.to_string(), document_id.to_string()]);
    for entry in entries {
        tags.extend(entry.id.iter().cloned());
        let Some(doc_type) = entry.doc_type.as_deref() else {
            continue;
        };
        match doc_type.parse::<DocumentType>() {
            Ok(known) => {
                tags.insert(known.as_str().to_string());
                tags.insert(known.revalidate_tag().to_string());
            }
            Err(_) => {
                tags.insert(doc_type.to_string());
            }
        }
        if let Some(slug) = &entry.slug {
            tags.insert(format!("{}:{}", doc_type, slug));
        }
    }
    tags
}

#[derive(Clone)]
pub struct TranslationResolver {
    store: Arc<dyn ContentStore>,
    registry: Arc<LocaleRegistry>,
    prefixes: Arc<RoutePrefixTable>,
    translator: PathTranslator,
    metrics: Arc<ResolutionMetrics>,
}

impl TranslationResolver {
    pub fn new(
        store: Arc<dyn ContentStore>,
        prefixes: Arc<RoutePrefixTable>,
        translator: PathTranslator,
        metrics: Arc<ResolutionMetrics>,
    ) -> Self {
        let registry = Arc::clone(translator.registry());
        Self {
            store,
            registry,
            prefixes,
            translator,
            metrics,
        }
    }

    fn entry_url(&self, entry: &TranslationEntry) -> Option<String> {
        if !self.registry.is_valid(&entry.language) {
            warn!(
                "Translation entry for unregistered locale '{}' skipped",
                entry.language
            );
            return None;
        }

        // Deleted members keep their slot in the link but lose their type.
        let Some(raw_type) = entry.doc_type.as_deref() else {
            debug!(
                "Translation entry for '{}' points at a deleted document, skipped",
                entry.language
            );
            return None;
        };

        let url = match raw_type.parse::<DocumentType>() {
            Ok(doc_type) => self.prefixes.document_url(
                &self.registry,
                doc_type,
                entry.slug.as_deref(),
                &entry.language,
            ),
            Err(_) => {
                warn!(
                    "No route prefix for document type '{}', using locale root",
                    raw_type
                );
                localize(&self.registry, "/", &entry.language)
            }
        };
        Some(url)
    }

    /// URLs of every translation of `document_id`, keyed by locale.
    pub async fn resolve_alternate_urls(&self, document_id: &str) -> Resolution {
        self.resolve_link(document_id).await.resolution
    }

    /// Like [`Self::resolve_alternate_urls`], also returning the tags under
    /// which the result should be cached.
    pub async fn resolve_link(&self, document_id: &str) -> LinkResolution {
        self.metrics.record_lookup();

        let entries = match self.store.translation_entries(document_id).await {
            Ok(Some(entries)) => entries,
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!("Alternate URL lookup for {} failed: {}", document_id, err);
                self.metrics.record_store_failure();
                return LinkResolution {
                    resolution: Resolution::Unavailable(err),
                    tags: link_tags(document_id, &[]),
                };
            }
        };

        let urls: AlternateUrls = entries
            .iter()
            .filter_map(|entry| Some((entry.language.clone(), self.entry_url(entry)?)))
            .collect();

        let resolution = if urls.is_empty() {
            debug!("No translation link for {}", document_id);
            self.metrics.record_unlinked();
            Resolution::NotLinked
        } else {
            self.metrics.record_linked();
            Resolution::Resolved(urls)
        };

        LinkResolution {
            resolution,
            tags: link_tags(document_id, &entries),
        }
    }

    /// URL of the `target` translation of `document_id`.
    pub async fn language_url(&self, document_id: &str, target: &str) -> FetchOutcome<String> {
        match self.store.translation_entries(document_id).await {
            Ok(entries) => FetchOutcome::from_result(Ok(entries
                .unwrap_or_default()
                .iter()
                .find(|entry| entry.language == target)
                .and_then(|entry| self.entry_url(entry)))),
            Err(err) => {
                warn!("Language URL lookup for {} failed: {}", document_id, err);
                self.metrics.record_store_failure();
                FetchOutcome::Unavailable(err)
            }
        }
    }

    /// Where the language switcher should send a visitor on `current_path`.
    ///
    /// Known page and detail routes are resolved through the translation
    /// graph. When that fails, static pages go through the slug table and
    /// detail pages land on the target locale's section root, since their
    /// slugs cannot be guessed.
    pub async fn translated_path(&self, current_path: &str, current: &str, target: &str) -> String {
        let stripped = delocalize(&self.registry, current_path);
        let segments: Vec<&str> = stripped
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        if segments.is_empty() {
            return localize(&self.registry, "/", target);
        }

        let Some(doc_type) = self.prefixes.type_for_path(&segments, current) else {
            self.metrics.record_fallback();
            return self.translator.translate_path(current_path, current, target);
        };

        let slug = if doc_type.is_detail() { segments.get(1).copied() } else { None };
        match self.store.document_id(doc_type, current, slug).await {
            Ok(Some(id)) => {
                if let FetchOutcome::Found(url) = self.language_url(&id, target).await {
                    return url;
                }
            }
            Ok(None) => debug!("No {} document at {}", doc_type, current_path),
            Err(err) => {
                warn!("Document lookup for {} failed: {}", current_path, err);
                self.metrics.record_store_failure();
            }
        }

        self.metrics.record_fallback();
        if doc_type.is_detail() {
            self.prefixes
                .document_url(&self.registry, doc_type, None, target)
        } else {
            self.translator.translate_path(current_path, current, target)
        }
    }

    /// Alternates for a singleton page, complete for every registered locale.
    pub async fn static_page_alternates(&self, doc_type: DocumentType, language: &str) -> AlternateUrls {
        let resolved = self.lookup_and_resolve(doc_type, language, None).await;
        self.complete(resolved, |locale| {
            self.prefixes.document_url(&self.registry, doc_type, None, locale)
        })
    }

    /// Alternates for a villa, post or article, complete for every locale.
    /// Missing translations fall back to the same slug under the locale's prefix.
    pub async fn detail_alternates(&self, doc_type: DocumentType, slug: &str, language: &str) -> AlternateUrls {
        let resolved = self.lookup_and_resolve(doc_type, language, Some(slug)).await;
        self.complete(resolved, |locale| {
            self.prefixes
                .document_url(&self.registry, doc_type, Some(slug), locale)
        })
    }

    async fn lookup_and_resolve(
        &self,
        doc_type: DocumentType,
        language: &str,
        slug: Option<&str>,
    ) -> Option<AlternateUrls> {
        match self.store.document_id(doc_type, language, slug).await {
            Ok(Some(id)) => self.resolve_alternate_urls(&id).await.into_alternates(),
            Ok(None) => None,
            Err(err) => {
                warn!("Error fetching {} document for alternates: {}", doc_type, err);
                self.metrics.record_store_failure();
                None
            }
        }
    }

    fn complete(
        &self,
        resolved: Option<AlternateUrls>,
        fallback: impl Fn(&str) -> String,
    ) -> AlternateUrls {
        let mut urls = resolved.unwrap_or_default();
        for locale in self.registry.list_locales() {
            if !urls.contains_key(&locale.code) {
                self.metrics.record_fallback();
                urls.insert(locale.code.clone(), fallback(&locale.code));
            }
        }
        urls
    }
}
