//! Offline library construction
//!
//! Turns a raw dictionary and a tree of category definitions into a
//! [`Library`]: every leaf gets the dictionary words its rule selects, in
//! catalog order, plus the Bloom filter blob that ships to clients.

use std::collections::BTreeMap;

use lexispark_core::{dedup_normalized, is_dictionary_word, normalize, WordLookup};
use rayon::prelude::*;

use crate::catalog::{CatalogEntry, WordCatalog};
use crate::category::{
    CategoryDefinition, CategoryNode, DefinitionShape, LeafCategory, ParentCategory, Rule,
};
use crate::config::FilterConfig;
use crate::library::Library;
use crate::wire::encode_blob;
use crate::Result;

/// Dictionary word with its key computed once
#[derive(Debug, Clone)]
struct DictionaryWord {
    display: String,
    normalized: String,
}

/// Parse a one-word-per-line dictionary
///
/// Lines are trimmed; blank lines and lines with characters outside the
/// accepted letter set are skipped. Display forms are lowercased and the
/// first spelling of each normalized form is kept.
pub fn read_dictionary(text: &str) -> Vec<String> {
    let words = text
        .lines()
        .map(str::trim)
        .filter(|line| is_dictionary_word(line))
        .map(str::to_lowercase);
    dedup_normalized(words)
}

/// Builds a [`Library`] one language at a time
///
/// Ids are assigned depth first, parents before their children, starting at
/// 1 and continuing across languages so that every id is unique in the
/// library.
#[derive(Debug)]
pub struct LibraryBuilder {
    config: FilterConfig,
    next_id: u32,
    languages: BTreeMap<String, Vec<CategoryNode>>,
}

impl LibraryBuilder {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            next_id: 1,
            languages: BTreeMap::new(),
        }
    }

    /// Add the category tree of one language
    pub fn add_language(
        &mut self,
        language: &str,
        dictionary: &str,
        definitions: &[CategoryDefinition],
    ) -> Result<&mut Self> {
        let words: Vec<DictionaryWord> = read_dictionary(dictionary)
            .into_iter()
            .map(|display| DictionaryWord {
                normalized: normalize(&display),
                display,
            })
            .collect();
        log::info!(
            "builder: {} dictionary words for language {}",
            words.len(),
            language
        );

        let mut roots = Vec::with_capacity(definitions.len());
        for definition in definitions {
            roots.push(self.build_node(definition, &words)?);
        }
        self.languages.insert(language.to_string(), roots);
        Ok(self)
    }

    /// Finish and index the library
    pub fn build(self) -> Result<Library> {
        Library::from_languages(self.languages)
    }

    fn build_node(
        &mut self,
        definition: &CategoryDefinition,
        words: &[DictionaryWord],
    ) -> Result<CategoryNode> {
        let id = self.next_id;
        self.next_id += 1;

        match definition.shape()? {
            DefinitionShape::Parent(children) => {
                let mut nodes = Vec::with_capacity(children.len());
                for child in children {
                    nodes.push(self.build_node(child, words)?);
                }
                Ok(CategoryNode::Parent(ParentCategory {
                    id,
                    name: definition.name.clone(),
                    description: definition.description.clone(),
                    children: nodes,
                }))
            }
            DefinitionShape::Leaf(rule) => {
                let leaf = self.build_leaf(id, definition, rule, words)?;
                Ok(CategoryNode::Leaf(leaf))
            }
        }
    }

    fn build_leaf(
        &self,
        id: u32,
        definition: &CategoryDefinition,
        rule: &Rule,
        words: &[DictionaryWord],
    ) -> Result<LeafCategory> {
        let matcher = rule.matcher();
        let entries: Vec<CatalogEntry> = words
            .par_iter()
            .filter(|w| matcher.matches(&w.normalized))
            .map(|w| CatalogEntry {
                display: w.display.clone(),
                normalized: w.normalized.clone(),
            })
            .collect();
        let catalog = WordCatalog::from_entries(entries);

        let blob = catalog
            .bloom_filter(self.config.false_positive_rate)?
            .to_bytes();
        log::info!(
            "Created category: {} with {} words",
            definition.name,
            catalog.len()
        );

        Ok(LeafCategory {
            id,
            name: definition.name.clone(),
            description: definition.description.clone(),
            rule: rule.clone(),
            catalog,
            bloom_filter: encode_blob(&blob),
            blob,
        })
    }
}
