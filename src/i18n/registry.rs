//! Locale registry: the set of locales the site is published in.
//!
//! Unlike a process-wide singleton, a `LocaleRegistry` is an ordinary value.
//! It is built once at startup and handed to every component that needs it,
//! so tests can substitute their own locale sets.

use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

/// A supported locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Locale {
    /// Short language code used in URLs (e.g., "nl", "en")
    pub code: String,

    /// Whether URLs for this locale are left un-prefixed (exactly one should be true)
    pub is_default: bool,

    /// Human-readable name for the language switcher (e.g., "Nederlands")
    pub display_name: String,
}

impl Locale {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>, is_default: bool) -> Self {
        Self {
            code: code.into(),
            is_default,
            display_name: display_name.into(),
        }
    }
}

/// Reasons a locale list cannot form a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("locale registry must contain at least one locale")]
    Empty,

    #[error("duplicate locale code '{0}'")]
    DuplicateCode(String),

    #[error("invalid locale code '{0}'")]
    InvalidCode(String),

    #[error("expected exactly one default locale, found {0}")]
    DefaultCount(usize),
}

/// Ordered, validated set of locales.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    locales: Vec<Locale>,
    default_index: usize,
}

static CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn is_well_formed_code(code: &str) -> bool {
    let regex = CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(-[a-z0-9]+)*$").expect("locale code pattern is valid")
    });
    regex.is_match(code)
}

impl LocaleRegistry {
    /// Build a registry, checking that codes are unique and well formed and
    /// that exactly one locale is the default.
    pub fn new(locales: Vec<Locale>) -> Result<Self, RegistryError> {
        if locales.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = HashSet::new();
        for locale in &locales {
            if !is_well_formed_code(&locale.code) {
                return Err(RegistryError::InvalidCode(locale.code.clone()));
            }
            if !seen.insert(locale.code.as_str()) {
                return Err(RegistryError::DuplicateCode(locale.code.clone()));
            }
        }

        let defaults: Vec<usize> = locales
            .iter()
            .enumerate()
            .filter(|(_, locale)| locale.is_default)
            .map(|(index, _)| index)
            .collect();

        match defaults.as_slice() {
            [index] => Ok(Self {
                default_index: *index,
                locales,
            }),
            other => Err(RegistryError::DefaultCount(other.len())),
        }
    }

    /// All locales in registration order.
    pub fn list_locales(&self) -> &[Locale] {
        &self.locales
    }

    /// Look up a locale by its code.
    pub fn get(&self, code: &str) -> Option<&Locale> {
        self.locales.iter().find(|locale| locale.code == code)
    }

    /// Check if a code names a registered locale.
    pub fn is_valid(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// The un-prefixed locale.
    pub fn default_locale(&self) -> &Locale {
        &self.locales[self.default_index]
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default_locale().code == code
    }

    /// The other locale of a two-locale registry.
    ///
    /// Returns `None` for unknown codes and for registries that do not hold
    /// exactly two locales; callers with larger sets should use [`Self::others`].
    pub fn alternate_of<'a>(&'a self, code: &str) -> Option<&'a Locale> {
        if self.locales.len() != 2 || !self.is_valid(code) {
            return None;
        }
        self.locales.iter().find(|locale| locale.code != code)
    }

    /// Every registered locale except `code`.
    pub fn others<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Locale> + 'a {
        self.locales.iter().filter(move |locale| locale.code != code)
    }

    /// Registered non-default locales, in order.
    pub fn prefixed(&self) -> impl Iterator<Item = &Locale> {
        self.locales.iter().filter(|locale| !locale.is_default)
    }
}

impl Default for LocaleRegistry {
    /// Dutch (default) and English, the locales the site is published in.
    fn default() -> Self {
        Self {
            locales: vec![
                Locale::new("nl", "Nederlands", true),
                Locale::new("en", "English", false),
            ],
            default_index: 0,
        }
    }
}
