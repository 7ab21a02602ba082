//! Locale prefixes on URL paths.
//!
//! Default-locale paths are never prefixed (`/villas`); every other locale is
//! prefixed with its code (`/en/villas`), and its root is exactly `/en`.

use super::registry::{Locale, LocaleRegistry};
use serde::{Deserialize, Serialize};

/// A path with its locale prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delocalized<'a> {
    pub path: String,
    pub locale: &'a Locale,
}

/// A navigation or footer link as stored in the CMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// Exactly one leading slash.
fn normalize(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

/// Prefix `path` for `locale`. Unknown codes are treated like the default locale.
pub fn localize(registry: &LocaleRegistry, path: &str, locale: &str) -> String {
    let path = normalize(path);

    if registry.is_default(locale) || !registry.is_valid(locale) {
        return path;
    }

    if path == "/" {
        format!("/{}", locale)
    } else {
        format!("/{}{}", locale, path)
    }
}

/// Strip a known non-default locale prefix and report which locale it was.
pub fn delocalize<'a>(registry: &'a LocaleRegistry, path: &str) -> Delocalized<'a> {
    let path = normalize(path);

    for locale in registry.prefixed() {
        let exact = format!("/{}", locale.code);
        if path == exact {
            return Delocalized {
                path: "/".to_string(),
                locale,
            };
        }
        // Keep the slash that follows the code
        if let Some(rest) = path.strip_prefix(&exact) {
            if rest.starts_with('/') {
                return Delocalized {
                    path: rest.to_string(),
                    locale,
                };
            }
        }
    }

    Delocalized {
        path,
        locale: registry.default_locale(),
    }
}

/// Re-localize a CMS link, dropping whatever locale prefix it was stored with.
pub fn normalize_link(registry: &LocaleRegistry, href: &str, locale: &str) -> String {
    let stripped = delocalize(registry, href);
    localize(registry, &stripped.path, locale)
}

/// Apply [`normalize_link`] to every link in a menu.
pub fn localize_links(registry: &LocaleRegistry, links: &[Link], locale: &str) -> Vec<Link> {
    links
        .iter()
        .map(|link| Link {
            label: link.label.clone(),
            href: normalize_link(registry, &link.href, locale),
        })
        .collect()
}
