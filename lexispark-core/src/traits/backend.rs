//! Storage-backed lookup traits
//!
//! Pure interfaces. Implementations live in the `lexispark` crate.

/// Where a confirmed word sits in its catalog
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotMatch {
    /// Position in the catalog's sorted order
    pub index: usize,
    /// Canonical display spelling, accents included
    pub display: String,
}

/// Ordered word catalog for one category
///
/// Implementations must keep their ordering fixed for the lifetime of any
/// session that consults them: one normalized word maps to at most one index,
/// and repeated lookups return the same index.
pub trait WordLookup {
    /// Find a normalized word
    ///
    /// Returns `None` when the word is not part of the catalog.
    fn find(&self, normalized: &str) -> Option<SlotMatch>;

    /// Length of every word, in catalog order
    ///
    /// This is all a client learns about the catalog up front.
    fn word_lengths(&self) -> Vec<usize>;

    /// Number of words in the catalog
    fn len(&self) -> usize {
        self.word_lengths().len()
    }

    /// Whether the catalog holds no words
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Borrowed view of one playable category
#[derive(Debug)]
pub struct CategoryEntry<'a, C: ?Sized> {
    /// Stable category id
    pub id: u32,
    /// Display name
    pub name: &'a str,
    /// Word catalog backing the category
    pub catalog: &'a C,
    /// Serialized Bloom filter built from that catalog
    pub blob: &'a [u8],
}

/// Source of playable categories
pub trait CategorySource {
    /// Catalog type handed out for each category
    type Catalog: WordLookup;

    /// Ids of categories that can be played in `language`, in a stable order
    ///
    /// Only leaf categories with at least one word qualify.
    fn valid_categories(&self, language: &str) -> Vec<u32>;

    /// Look up one playable category by id
    ///
    /// Returns `None` for unknown ids, parent categories and empty leaves.
    fn category(&self, id: u32) -> Option<CategoryEntry<'_, Self::Catalog>>;
}

impl<T: CategorySource + ?Sized> CategorySource for &T {
    type Catalog = T::Catalog;

    fn valid_categories(&self, language: &str) -> Vec<u32> {
        (**self).valid_categories(language)
    }

    fn category(&self, id: u32) -> Option<CategoryEntry<'_, Self::Catalog>> {
        (**self).category(id)
    }
}
