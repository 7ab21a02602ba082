//! Translation table for statically named page segments.
//!
//! Only the small, fixed set of top-level routes lives here (e.g. `over-ons`
//! and `about-us`). Author-controlled slugs for villas, posts and articles are
//! resolved through the translation graph instead.

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugTableError {
    #[error("segment '{segment}' is mapped more than once from '{from}' to '{to}'")]
    DuplicateSource {
        from: String,
        to: String,
        segment: String,
    },

    #[error("segment '{segment}' is the target of more than one entry from '{from}' to '{to}'")]
    DuplicateTarget {
        from: String,
        to: String,
        segment: String,
    },

    #[error("slug translation from '{0}' to itself")]
    SameLocale(String),

    #[error("empty segment in slug translation from '{from}' to '{to}'")]
    EmptySegment { from: String, to: String },
}

type Direction = (String, String);

/// Bidirectional segment map, keyed by locale direction.
///
/// Every pair registered for `from -> to` is also registered for `to -> from`,
/// so translating a segment there and back yields the original segment.
#[derive(Debug, Clone, Default)]
pub struct SlugTable {
    directions: HashMap<Direction, HashMap<String, String>>,
}

impl SlugTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `(source, target)` pairs for `from -> to` and their inverse.
    pub fn with_pairs<I, S, T>(mut self, from: &str, to: &str, pairs: I) -> Result<Self, SlugTableError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        if from == to {
            return Err(SlugTableError::SameLocale(from.to_string()));
        }

        let forward_key = (from.to_string(), to.to_string());
        let reverse_key = (to.to_string(), from.to_string());
        let mut forward = self.directions.remove(&forward_key).unwrap_or_default();
        let mut reverse = self.directions.remove(&reverse_key).unwrap_or_default();

        for (source, target) in pairs {
            let (source, target) = (source.into(), target.into());
            if source.is_empty() || target.is_empty() {
                return Err(SlugTableError::EmptySegment {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
            if forward.contains_key(&source) {
                return Err(SlugTableError::DuplicateSource {
                    from: from.to_string(),
                    to: to.to_string(),
                    segment: source,
                });
            }
            if reverse.contains_key(&target) {
                return Err(SlugTableError::DuplicateTarget {
                    from: from.to_string(),
                    to: to.to_string(),
                    segment: target,
                });
            }
            forward.insert(source.clone(), target.clone());
            reverse.insert(target, source);
        }

        self.directions.insert(forward_key, forward);
        self.directions.insert(reverse_key, reverse);
        Ok(self)
    }

    /// Translate one segment, passing unknown segments through unchanged.
    pub fn translate<'a>(&'a self, segment: &'a str, from: &str, to: &str) -> &'a str {
        if from == to {
            return segment;
        }
        self.directions
            .get(&(from.to_string(), to.to_string()))
            .and_then(|map| map.get(segment))
            .map(String::as_str)
            .unwrap_or(segment)
    }

    /// All `(source, target)` pairs registered for one direction.
    #[cfg(test)]
    pub(crate) fn entries(&self, from: &str, to: &str) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .directions
            .get(&(from.to_string(), to.to_string()))
            .map(|map| map.iter().map(|(s, t)| (s.as_str(), t.as_str())).collect())
            .unwrap_or_default();
        entries.sort_unstable();
        entries
    }

    /// Check that every registered direction inverts back to its source.
    pub fn is_involution(&self) -> bool {
        self.directions.iter().all(|((from, to), map)| {
            map.iter()
                .all(|(source, target)| self.translate(target, to, from) == source)
        })
    }
}

/// The site's Dutch/English page segments.
pub fn default_slug_table() -> Result<SlugTable, SlugTableError> {
    SlugTable::new().with_pairs("nl", "en", [("over-ons", "about-us"), ("artikelen", "articles")])
}
