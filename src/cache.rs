//! Tag-addressed cache for resolved URLs.
//!
//! Every entry carries the tags it depends on; the revalidation webhook drops
//! all entries sharing a tag with the request.

use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::{PoisonError, RwLock};
use tracing::debug;

/// Tag attached to every cached translation-link resolution.
pub const TRANSLATION_METADATA_TAG: &str = "translation.metadata";

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    tags: HashSet<String>,
    stored_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct TaggedCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    max_age: Option<Duration>,
}

impl<V> Default for TaggedCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_age: None,
        }
    }
}

impl<V: Clone> TaggedCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries older than `max_age` are treated as misses.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(key)?;

        if let Some(max_age) = self.max_age {
            if Utc::now() - entry.stored_at > max_age {
                return None;
            }
        }
        Some(entry.value.clone())
    }

    pub fn insert<I, S>(&self, key: impl Into<String>, tags: I, value: V)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = Entry {
            value,
            tags: tags.into_iter().map(Into::into).collect(),
            stored_at: Utc::now(),
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), entry);
    }

    /// Drop every entry carrying any of `tags`. Returns how many were dropped.
    pub fn invalidate_tags(&self, tags: &[String]) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !tags.iter().any(|tag| entry.tags.contains(tag)));
        let dropped = before - entries.len();

        debug!("Invalidated {} cache entries for tags {:?}", dropped, tags);
        dropped
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
