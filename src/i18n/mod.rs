//! Locale handling for the bilingual site.
//!
//! # Architecture
//!
//! - `registry`: the supported locales and which one is un-prefixed
//! - `slugs`: static segment translations for fixed top-level pages
//! - `path`: adding and removing locale prefixes on URL paths
//! - `translate`: segment-by-segment path translation for the language switcher
//! - `validator`: per-language slug uniqueness for the CMS
//! - `metrics`: counters for resolution fallbacks and store failures
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use villa_moraira::i18n::{default_slug_table, LocaleRegistry, PathTranslator};
//!
//! let translator = PathTranslator::new(
//!     Arc::new(LocaleRegistry::default()),
//!     Arc::new(default_slug_table().unwrap()),
//! );
//! assert_eq!(translator.translate_path("/over-ons", "nl", "en"), "/en/about-us");
//! ```

mod metrics;
mod path;
mod registry;
mod slugs;
mod translate;
mod validator;

pub use metrics::{MetricsReport, ResolutionMetrics};
pub use path::{delocalize, localize, localize_links, normalize_link, Delocalized, Link};
pub use registry::{Locale, LocaleRegistry, RegistryError};
pub use slugs::{default_slug_table, SlugTable, SlugTableError};
pub use translate::PathTranslator;
pub use validator::{SlugContext, SlugValidationError, SlugValidator, StoreFailurePolicy};
