//! Static path translation for the language switcher.

use super::path::{delocalize, localize};
use super::registry::LocaleRegistry;
use super::slugs::SlugTable;
use std::sync::Arc;

/// Rewrites statically routed paths between locales, one segment at a time.
#[derive(Debug, Clone)]
pub struct PathTranslator {
    registry: Arc<LocaleRegistry>,
    slugs: Arc<SlugTable>,
}

impl PathTranslator {
    pub fn new(registry: Arc<LocaleRegistry>, slugs: Arc<SlugTable>) -> Self {
        Self { registry, slugs }
    }

    pub fn registry(&self) -> &Arc<LocaleRegistry> {
        &self.registry
    }

    pub fn translate_slug<'a>(&'a self, segment: &'a str, from: &str, to: &str) -> &'a str {
        self.slugs.translate(segment, from, to)
    }

    /// Translate `path` from `from` to `to` and localize it for `to`.
    ///
    /// Any locale prefix on the input is stripped first, so both `/over-ons`
    /// and `/en/about-us` are accepted. Segments without a table entry pass
    /// through unchanged.
    pub fn translate_path(&self, path: &str, from: &str, to: &str) -> String {
        let stripped = delocalize(&self.registry, path);

        let translated: Vec<&str> = stripped
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| self.slugs.translate(segment, from, to))
            .collect();

        localize(&self.registry, &format!("/{}", translated.join("/")), to)
    }

    /// URL for the same static page in `target`, detecting the current locale
    /// from the path prefix.
    pub fn language_switch_url(&self, current_path: &str, target: &str) -> String {
        let current = delocalize(&self.registry, current_path).locale.code.clone();
        self.translate_path(current_path, &current, target)
    }
}
