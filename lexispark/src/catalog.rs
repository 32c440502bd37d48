//! Ordered word catalogs
//!
//! A catalog is the authoritative word list of one category. Its order
//! (ascending by normalized form) is what gives each word a slot index, and the
//! client only ever learns the word lengths in that order.

use hashbrown::{HashMap, HashSet};
use lexispark_core::{normalize, BloomFilter, SlotMatch, WordLookup};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// One catalog word
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Spelling shown to the player once found
    pub display: String,
    /// Lookup key
    pub normalized: String,
}

impl CatalogEntry {
    /// Create an entry, deriving the key from `display`
    pub fn new(display: impl Into<String>) -> Self {
        let display = display.into();
        let normalized = normalize(&display);
        Self {
            display,
            normalized,
        }
    }
}

/// Words of one category, sorted by normalized form and unique per key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<CatalogEntry>", into = "Vec<CatalogEntry>")]
pub struct WordCatalog {
    entries: Vec<CatalogEntry>,
    slots: HashMap<String, usize>,
}

impl WordCatalog {
    /// Build a catalog from raw words
    ///
    /// Words that normalize to nothing are dropped; of several spellings with
    /// the same key, the first one wins.
    pub fn from_words<S: AsRef<str> + Sync>(words: &[S]) -> Self {
        let entries: Vec<CatalogEntry> = words
            .par_iter()
            .map(|w| CatalogEntry::new(w.as_ref()))
            .collect();
        Self::from_entries(entries)
    }

    /// Build a catalog from entries in any order
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        let mut seen = HashSet::with_capacity(entries.len());
        let mut entries: Vec<CatalogEntry> = entries
            .into_iter()
            .filter(|e| !e.normalized.is_empty())
            .filter(|e| seen.insert(e.normalized.clone()))
            .collect();
        entries.sort_by(|a, b| a.normalized.cmp(&b.normalized));

        let slots = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.normalized.clone(), i))
            .collect();

        Self { entries, slots }
    }

    /// Entries in slot order
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Entry at a slot
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Build the Bloom filter that ships with this catalog
    pub fn bloom_filter(&self, false_positive_rate: f64) -> lexispark_core::Result<BloomFilter> {
        BloomFilter::from_words(self.entries.iter().map(|e| &e.normalized), false_positive_rate)
    }
}

impl PartialEq for WordCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for WordCatalog {}

impl From<Vec<CatalogEntry>> for WordCatalog {
    fn from(entries: Vec<CatalogEntry>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<WordCatalog> for Vec<CatalogEntry> {
    fn from(catalog: WordCatalog) -> Self {
        catalog.entries
    }
}

impl WordLookup for WordCatalog {
    fn find(&self, normalized: &str) -> Option<SlotMatch> {
        let &index = self.slots.get(normalized)?;
        Some(SlotMatch {
            index,
            display: self.entries[index].display.clone(),
        })
    }

    fn word_lengths(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.normalized.len()).collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
