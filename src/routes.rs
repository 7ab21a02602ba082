//! Public URL prefixes for each translatable content type.

use crate::i18n::{localize, LocaleRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Translatable CMS document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    Villa,
    HomePage,
    AboutPage,
    ContactPage,
    VillasPage,
    MorairaPage,
    BlogPost,
    Article,
}

impl DocumentType {
    pub const ALL: [DocumentType; 8] = [
        DocumentType::Villa,
        DocumentType::HomePage,
        DocumentType::AboutPage,
        DocumentType::ContactPage,
        DocumentType::VillasPage,
        DocumentType::MorairaPage,
        DocumentType::BlogPost,
        DocumentType::Article,
    ];

    /// Singleton page types, one document per language.
    pub const PAGES: [DocumentType; 5] = [
        DocumentType::HomePage,
        DocumentType::VillasPage,
        DocumentType::AboutPage,
        DocumentType::MorairaPage,
        DocumentType::ContactPage,
    ];

    /// The `_type` name used by the CMS.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Villa => "villa",
            DocumentType::HomePage => "homePage",
            DocumentType::AboutPage => "aboutPage",
            DocumentType::ContactPage => "contactPage",
            DocumentType::VillasPage => "villasPage",
            DocumentType::MorairaPage => "morairaPage",
            DocumentType::BlogPost => "blogPost",
            DocumentType::Article => "article",
        }
    }

    /// Whether instances carry author-controlled slugs below the prefix.
    pub fn is_detail(&self) -> bool {
        matches!(
            self,
            DocumentType::Villa | DocumentType::BlogPost | DocumentType::Article
        )
    }

    /// Cache tag used when the CMS announces changes to this type.
    pub fn revalidate_tag(&self) -> &'static str {
        match self {
            DocumentType::Villa => "villa",
            DocumentType::HomePage => "home-page",
            DocumentType::AboutPage => "about-page",
            DocumentType::ContactPage => "contact-page",
            DocumentType::VillasPage => "villas-page",
            DocumentType::MorairaPage => "moraira-page",
            DocumentType::BlogPost => "blog-post",
            DocumentType::Article => "article",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentType::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str() == s)
            .ok_or_else(|| format!("Unknown document type: '{}'", s))
    }
}

/// Document type -> locale -> URL prefix.
#[derive(Debug, Clone, Default)]
pub struct RoutePrefixTable {
    prefixes: HashMap<DocumentType, HashMap<String, String>>,
}

impl RoutePrefixTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, doc_type: DocumentType, locale: &str, prefix: &str) -> Self {
        self.prefixes
            .entry(doc_type)
            .or_default()
            .insert(locale.to_string(), prefix.to_string());
        self
    }

    /// Prefix for a type in a locale; empty when nothing is configured.
    pub fn prefix(&self, doc_type: DocumentType, locale: &str) -> &str {
        self.prefixes
            .get(&doc_type)
            .and_then(|by_locale| by_locale.get(locale))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Un-localized path of a document: the prefix for pages, `prefix/slug`
    /// for detail types. A detail document without a slug gets its section root.
    pub fn document_path(&self, doc_type: DocumentType, slug: Option<&str>, locale: &str) -> String {
        let prefix = self.prefix(doc_type, locale);
        let path = match slug.filter(|s| !s.is_empty()) {
            Some(slug) if doc_type.is_detail() => format!("{}/{}", prefix, slug),
            _ => prefix.to_string(),
        };
        if path.is_empty() {
            "/".to_string()
        } else {
            path
        }
    }

    /// Public URL of a document, including the locale prefix.
    pub fn document_url(
        &self,
        registry: &LocaleRegistry,
        doc_type: DocumentType,
        slug: Option<&str>,
        locale: &str,
    ) -> String {
        localize(registry, &self.document_path(doc_type, slug, locale), locale)
    }

    /// Guess the document type from the first path segment in `locale`.
    ///
    /// One-segment paths map to page types (`/villas` is the villas overview),
    /// two-segment paths to detail types (`/villas/{slug}`).
    pub fn type_for_path(&self, segments: &[&str], locale: &str) -> Option<DocumentType> {
        let first = match segments {
            [first] | [first, _] => format!("/{}", first),
            _ => return None,
        };
        let want_detail = segments.len() == 2;

        DocumentType::ALL.into_iter().find(|doc_type| {
            doc_type.is_detail() == want_detail && self.prefix(*doc_type, locale) == first
        })
    }
}

/// Prefixes the site is published with.
pub fn default_route_prefixes() -> RoutePrefixTable {
    let shared = [
        (DocumentType::Villa, "/villas"),
        (DocumentType::HomePage, ""),
        (DocumentType::ContactPage, "/contact"),
        (DocumentType::VillasPage, "/villas"),
        (DocumentType::MorairaPage, "/moraira"),
        (DocumentType::BlogPost, "/blog"),
    ];

    let mut table = RoutePrefixTable::new();
    for (doc_type, prefix) in shared {
        table = table
            .with_prefix(doc_type, "nl", prefix)
            .with_prefix(doc_type, "en", prefix);
    }

    table
        .with_prefix(DocumentType::AboutPage, "nl", "/over-ons")
        .with_prefix(DocumentType::AboutPage, "en", "/about-us")
        .with_prefix(DocumentType::Article, "nl", "/artikelen")
        .with_prefix(DocumentType::Article, "en", "/articles")
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== DocumentType Tests ====================

    #[test]
    fn test_document_type_round_trips_cms_name() {
        for doc_type in DocumentType::ALL {
            assert_eq!(doc_type.as_str().parse::<DocumentType>().unwrap(), doc_type);
        }
    }

    #[test]
    fn test_document_type_unknown() {
        let err = "review".parse::<DocumentType>().unwrap_err();
        assert!(err.contains("review"));
    }

    #[test]
    fn test_document_type_serde_uses_cms_name() {
        let json = serde_json::to_string(&DocumentType::BlogPost).unwrap();
        assert_eq!(json, "\"blogPost\"");
        let parsed: DocumentType = serde_json::from_str("\"morairaPage\"").unwrap();
        assert_eq!(parsed, DocumentType::MorairaPage);
    }

    #[test]
    fn test_detail_types() {
        let detail: Vec<_> = DocumentType::ALL.into_iter().filter(|t| t.is_detail()).collect();
        assert_eq!(
            detail,
            vec![DocumentType::Villa, DocumentType::BlogPost, DocumentType::Article]
        );
        assert!(DocumentType::PAGES.iter().all(|t| !t.is_detail()));
    }

    // ==================== Prefix Tests ====================

    #[test]
    fn test_every_type_has_prefix_in_both_locales() {
        let table = default_route_prefixes();
        for doc_type in DocumentType::ALL {
            for locale in ["nl", "en"] {
                assert!(table.prefixes[&doc_type].contains_key(locale));
            }
        }
    }

    #[test]
    fn test_locale_specific_prefixes() {
        let table = default_route_prefixes();
        assert_eq!(table.prefix(DocumentType::AboutPage, "nl"), "/over-ons");
        assert_eq!(table.prefix(DocumentType::AboutPage, "en"), "/about-us");
        assert_eq!(table.prefix(DocumentType::Article, "en"), "/articles");
        assert_eq!(table.prefix(DocumentType::Villa, "en"), "/villas");
    }

    #[test]
    fn test_unknown_locale_prefix_is_empty() {
        assert_eq!(default_route_prefixes().prefix(DocumentType::AboutPage, "de"), "");
    }

    // ==================== Path Tests ====================

    #[test]
    fn test_document_path_detail() {
        let table = default_route_prefixes();
        assert_eq!(
            table.document_path(DocumentType::Villa, Some("luxury-beach-villa"), "nl"),
            "/villas/luxury-beach-villa"
        );
    }

    #[test]
    fn test_document_path_page_ignores_slug() {
        let table = default_route_prefixes();
        assert_eq!(table.document_path(DocumentType::AboutPage, Some("ignored"), "en"), "/about-us");
        assert_eq!(table.document_path(DocumentType::HomePage, None, "nl"), "/");
    }

    #[test]
    fn test_document_path_detail_without_slug() {
        let table = default_route_prefixes();
        assert_eq!(table.document_path(DocumentType::BlogPost, None, "nl"), "/blog");
        assert_eq!(table.document_path(DocumentType::BlogPost, Some(""), "nl"), "/blog");
    }

    #[test]
    fn test_document_url_localizes() {
        let registry = LocaleRegistry::default();
        let table = default_route_prefixes();
        assert_eq!(
            table.document_url(&registry, DocumentType::Villa, Some("luxury-beach-villa"), "en"),
            "/en/villas/luxury-beach-villa"
        );
        assert_eq!(table.document_url(&registry, DocumentType::HomePage, None, "en"), "/en");
        assert_eq!(table.document_url(&registry, DocumentType::HomePage, None, "nl"), "/");
    }

    // ==================== type_for_path Tests ====================

    #[test]
    fn test_type_for_single_segment() {
        let table = default_route_prefixes();
        assert_eq!(table.type_for_path(&["villas"], "nl"), Some(DocumentType::VillasPage));
        assert_eq!(table.type_for_path(&["over-ons"], "nl"), Some(DocumentType::AboutPage));
        assert_eq!(table.type_for_path(&["about-us"], "en"), Some(DocumentType::AboutPage));
        assert_eq!(table.type_for_path(&["about-us"], "nl"), None);
    }

    #[test]
    fn test_type_for_detail_path() {
        let table = default_route_prefixes();
        assert_eq!(table.type_for_path(&["villas", "x"], "nl"), Some(DocumentType::Villa));
        assert_eq!(table.type_for_path(&["articles", "x"], "en"), Some(DocumentType::Article));
        assert_eq!(table.type_for_path(&["moraira", "x"], "nl"), None);
    }

    #[test]
    fn test_type_for_other_lengths() {
        let table = default_route_prefixes();
        assert_eq!(table.type_for_path(&[], "nl"), None);
        assert_eq!(table.type_for_path(&["a", "b", "c"], "nl"), None);
    }
}
