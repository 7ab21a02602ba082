//! Canonical URLs, Open Graph locales, hreflang alternates and the sitemap.

use crate::cms::{AlternateUrls, ContentStore, SitemapDocument, TranslationResolver};
use crate::i18n::{delocalize, localize, LocaleRegistry};
use crate::routes::{DocumentType, RoutePrefixTable};
use chrono::{DateTime, SecondsFormat, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::fmt::Write as _;
use tracing::{info, warn};

/// Site-relative image used when a page has none of its own.
pub const DEFAULT_OG_IMAGE_PATH: &str = "/villa-pool-hero.jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFrequency {
    Daily,
    Weekly,
    Monthly,
}

impl ChangeFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
        }
    }
}

/// Pages published in every locale. `BlogPost` without a slug is the blog index.
const STATIC_PAGES: [(DocumentType, ChangeFrequency, f32); 6] = [
    (DocumentType::HomePage, ChangeFrequency::Daily, 1.0),
    (DocumentType::VillasPage, ChangeFrequency::Daily, 0.9),
    (DocumentType::BlogPost, ChangeFrequency::Weekly, 0.8),
    (DocumentType::AboutPage, ChangeFrequency::Monthly, 0.7),
    (DocumentType::MorairaPage, ChangeFrequency::Monthly, 0.7),
    (DocumentType::ContactPage, ChangeFrequency::Monthly, 0.6),
];

const DETAIL_PAGES: [(DocumentType, ChangeFrequency, f32); 3] = [
    (DocumentType::Villa, ChangeFrequency::Weekly, 0.9),
    (DocumentType::BlogPost, ChangeFrequency::Monthly, 0.6),
    (DocumentType::Article, ChangeFrequency::Monthly, 0.6),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HreflangLink {
    pub hreflang: String,
    pub href: String,
}

/// Head metadata of one rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub canonical: String,
    pub og_locale: String,
    pub og_image: String,
    pub hreflang: Vec<HreflangLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub url: String,
    pub last_modified: DateTime<Utc>,
    pub change_frequency: ChangeFrequency,
    pub priority: f32,
    pub alternates: Vec<HreflangLink>,
}

/// Absolute URL of a site path. The home page is the bare site URL.
pub fn canonical_url(site_url: &str, path: &str) -> String {
    let site_url = site_url.trim_end_matches('/');
    match path {
        "" | "/" => site_url.to_string(),
        p if p.starts_with('/') => format!("{}{}", site_url, p),
        p => format!("{}/{}", site_url, p),
    }
}

/// Open Graph locale (`nl_NL`, `en_US`) for a locale code.
pub fn og_locale(code: &str) -> String {
    match code {
        "nl" => "nl_NL".to_string(),
        "en" => "en_US".to_string(),
        other => {
            let language = other.split('-').next().unwrap_or(other);
            format!("{}_{}", language, language.to_ascii_uppercase())
        }
    }
}

/// Open Graph locale of the page at `path`, inferred from its prefix.
pub fn og_locale_for_path(registry: &LocaleRegistry, path: &str) -> String {
    og_locale(&delocalize(registry, path).locale.code)
}

/// Absolute Open Graph image URL. CMS images are already absolute,
/// protocol-relative ones get https and bare paths are resolved on the site.
pub fn og_image_url(site_url: &str, image: Option<&str>, default_image: &str) -> String {
    let Some(image) = image.map(str::trim).filter(|i| !i.is_empty()) else {
        return default_image.to_string();
    };

    let lower = image.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        image.to_string()
    } else if let Some(rest) = image.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        canonical_url(site_url, image)
    }
}

/// hreflang links for a set of alternates, plus `x-default` pointing at the
/// default locale's URL when it is present.
pub fn hreflang_links(
    registry: &LocaleRegistry,
    site_url: &str,
    alternates: &AlternateUrls,
) -> Vec<HreflangLink> {
    let mut links: Vec<HreflangLink> = registry
        .list_locales()
        .iter()
        .filter_map(|locale| {
            alternates.get(&locale.code).map(|path| HreflangLink {
                hreflang: locale.code.clone(),
                href: canonical_url(site_url, path),
            })
        })
        .collect();

    if let Some(path) = alternates.get(&registry.default_locale().code) {
        links.push(HreflangLink {
            hreflang: "x-default".to_string(),
            href: canonical_url(site_url, path),
        });
    }
    links
}

/// Canonical URL, Open Graph fields and hreflang alternates for `path`.
///
/// The other locales' URLs come from the language switcher, so they are
/// always present even when the translation graph cannot be read.
pub async fn page_metadata(
    resolver: &TranslationResolver,
    registry: &LocaleRegistry,
    site_url: &str,
    path: &str,
    image: Option<&str>,
) -> PageMetadata {
    let current = delocalize(registry, path);
    let current_code = current.locale.code.as_str();

    let others = registry.others(current_code).map(|locale| async move {
        let url = resolver.translated_path(path, current_code, &locale.code).await;
        (locale.code.clone(), url)
    });
    let mut alternates: AlternateUrls = join_all(others).await.into_iter().collect();
    let own = localize(registry, &current.path, current_code);
    alternates.insert(current_code.to_string(), own.clone());

    let default_image = canonical_url(site_url, DEFAULT_OG_IMAGE_PATH);
    PageMetadata {
        canonical: canonical_url(site_url, &own),
        og_locale: og_locale_for_path(registry, path),
        og_image: og_image_url(site_url, image, &default_image),
        hreflang: hreflang_links(registry, site_url, &alternates),
    }
}

/// Every page of the site, static pages first.
///
/// Detail documents are fetched per type concurrently. A type whose fetch
/// fails is left out instead of failing the whole sitemap.
pub async fn build_sitemap(
    store: &dyn ContentStore,
    registry: &LocaleRegistry,
    prefixes: &RoutePrefixTable,
    site_url: &str,
    now: DateTime<Utc>,
) -> Vec<SitemapEntry> {
    let mut entries = Vec::new();

    for (doc_type, change_frequency, priority) in STATIC_PAGES {
        let alternates: AlternateUrls = registry
            .list_locales()
            .iter()
            .map(|locale| {
                let url = prefixes.document_url(registry, doc_type, None, &locale.code);
                (locale.code.clone(), url)
            })
            .collect();
        let links = hreflang_links(registry, site_url, &alternates);

        for locale in registry.list_locales() {
            entries.push(SitemapEntry {
                url: canonical_url(site_url, &alternates[&locale.code]),
                last_modified: now,
                change_frequency,
                priority,
                alternates: links.clone(),
            });
        }
    }

    let fetches = DETAIL_PAGES
        .iter()
        .map(|(doc_type, _, _)| store.sitemap_documents(*doc_type));
    let results = join_all(fetches).await;

    for ((doc_type, change_frequency, priority), result) in DETAIL_PAGES.iter().zip(results) {
        let documents = match result {
            Ok(documents) => documents,
            Err(err) => {
                warn!("Skipping {} pages in sitemap: {}", doc_type, err);
                continue;
            }
        };

        entries.extend(documents.into_iter().filter_map(|document| {
            let (url, last_modified) =
                detail_location(registry, prefixes, site_url, *doc_type, document)?;
            Some(SitemapEntry {
                url,
                last_modified: last_modified.unwrap_or(now),
                change_frequency: *change_frequency,
                priority: *priority,
                alternates: Vec::new(),
            })
        }));
    }

    info!("Built sitemap with {} entries", entries.len());
    entries
}

fn detail_location(
    registry: &LocaleRegistry,
    prefixes: &RoutePrefixTable,
    site_url: &str,
    doc_type: DocumentType,
    document: SitemapDocument,
) -> Option<(String, Option<DateTime<Utc>>)> {
    let slug = document.slug.filter(|s| !s.trim().is_empty())?;
    // Documents without a registered language are published under the default locale
    let language = document
        .language
        .filter(|l| registry.is_valid(l))
        .unwrap_or_else(|| registry.default_locale().code.clone());

    let path = prefixes.document_url(registry, doc_type, Some(&slug), &language);
    Some((canonical_url(site_url, &path), document.updated_at))
}

/// Sitemap protocol XML with `xhtml:link` alternates.
pub fn render_sitemap(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\" \
         xmlns:xhtml=\"http://www.w3.org/1999/xhtml\">\n",
    );

    // Writing into a String cannot fail
    for entry in entries {
        let _ = writeln!(xml, "  <url>");
        let _ = writeln!(xml, "    <loc>{}</loc>", html_escape::encode_text(&entry.url));
        let _ = writeln!(
            xml,
            "    <lastmod>{}</lastmod>",
            entry.last_modified.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.change_frequency.as_str());
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", entry.priority);
        for link in &entry.alternates {
            let _ = writeln!(
                xml,
                "    <xhtml:link rel=\"alternate\" hreflang=\"{}\" href=\"{}\"/>",
                html_escape::encode_double_quoted_attribute(&link.hreflang),
                html_escape::encode_double_quoted_attribute(&link.href)
            );
        }
        let _ = writeln!(xml, "  </url>");
    }

    xml.push_str("</urlset>\n");
    xml
}
