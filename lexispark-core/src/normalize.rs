//! Canonical lookup keys for words
//!
//! Every comparison between a guess and a catalog entry goes through
//! [`normalize`]: catalog construction, Bloom filter construction, rule
//! evaluation and guess checking on both client and server.

use unicode_normalization::UnicodeNormalization;

/// Map arbitrary text to its lookup key.
///
/// Lowercases, expands the `œ`/`æ` ligatures, decomposes to NFD, and keeps
/// only the ASCII letters `a`..=`z`. Combining marks fall out in that last
/// step, which is what strips accents from their base letters.
///
/// ```
/// use lexispark_core::normalize;
///
/// assert_eq!(normalize("Œuf"), "oeuf");
/// assert_eq!(normalize("Ångström"), "angstrom");
/// ```
pub fn normalize(text: &str) -> String {
    let mut folded = String::with_capacity(text.len());
    for c in text.chars().flat_map(char::to_lowercase) {
        match c {
            'œ' => folded.push_str("oe"),
            'æ' => folded.push_str("ae"),
            other => folded.push(other),
        }
    }

    folded
        .nfd()
        .filter(|c| c.is_ascii_lowercase())
        .collect()
}

/// Whether `word` is acceptable as a raw dictionary entry.
///
/// Accepts ASCII letters, the Latin-1 letter block `À`..=`ÿ`, and the
/// `œ`/`Œ`/`æ`/`Æ` ligatures. Anything else (digits, hyphens, apostrophes,
/// spaces) disqualifies the line.
pub fn is_dictionary_word(word: &str) -> bool {
    !word.is_empty()
        && word.chars().all(|c| {
            c.is_ascii_alphabetic() || ('À'..='ÿ').contains(&c) || matches!(c, 'œ' | 'Œ' | 'æ' | 'Æ')
        })
}

/// Drop words whose normalized form was already seen, keeping the first
/// raw spelling of each.
pub fn dedup_normalized<I, S>(words: I) -> Vec<S>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    words
        .into_iter()
        .filter(|word| seen.insert(normalize(word.as_ref())))
        .collect()
}
