//! In-memory category library
//!
//! Holds the category trees of every language and answers the lookups the
//! puzzle service needs. A library is built offline by
//! [`crate::builder::LibraryBuilder`] and is read-only afterwards.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use lexispark_core::{CategoryEntry, CategorySource, WordLookup};
use tempfile::NamedTempFile;

use crate::catalog::WordCatalog;
use crate::category::{CategoryListing, CategoryNode, LeafCategory};
use crate::Result;

/// Location of a node: language plus child indices from a root
#[derive(Debug, Clone)]
struct NodePath {
    language: String,
    steps: Vec<usize>,
}

/// Category trees keyed by language
#[derive(Debug, Clone, Default)]
pub struct Library {
    languages: BTreeMap<String, Vec<CategoryNode>>,
    paths: HashMap<u32, NodePath>,
}

impl Library {
    /// Assemble a library from finished trees
    pub fn from_languages(languages: BTreeMap<String, Vec<CategoryNode>>) -> Result<Self> {
        let mut library = Self {
            languages,
            paths: HashMap::new(),
        };
        library.reindex()?;
        Ok(library)
    }

    /// Load a library saved with [`Library::save`]
    pub fn load(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let languages: BTreeMap<String, Vec<CategoryNode>> = serde_json::from_reader(reader)?;
        let library = Self::from_languages(languages)?;
        log::info!(
            "library: loaded {} categories from {}",
            library.paths.len(),
            path.display()
        );
        Ok(library)
    }

    /// Write the library as JSON, replacing `path` atomically
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer(&mut writer, &self.languages)?;
            writer.flush()?;
        }
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Languages present in the library
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    /// Root categories of a language with their children
    pub fn listings(&self, language: &str) -> Vec<CategoryListing> {
        self.languages
            .get(language)
            .map(|roots| roots.iter().map(CategoryNode::listing).collect())
            .unwrap_or_default()
    }

    /// Any node by id, parent or leaf
    pub fn node(&self, id: u32) -> Option<&CategoryNode> {
        let path = self.paths.get(&id)?;
        let (first, rest) = path.steps.split_first()?;
        let mut node = self.languages.get(&path.language)?.get(*first)?;
        for &step in rest {
            match node {
                CategoryNode::Parent(parent) => node = parent.children.get(step)?,
                CategoryNode::Leaf(_) => return None,
            }
        }
        Some(node)
    }

    /// Leaf category by id
    pub fn leaf(&self, id: u32) -> Option<&LeafCategory> {
        match self.node(id)? {
            CategoryNode::Leaf(leaf) => Some(leaf),
            CategoryNode::Parent(_) => None,
        }
    }

    /// Rebuild the id index and decode every leaf blob
    fn reindex(&mut self) -> Result<()> {
        self.paths.clear();
        for (language, roots) in self.languages.iter_mut() {
            for (i, root) in roots.iter_mut().enumerate() {
                index_node(root, language, vec![i], &mut self.paths)?;
            }
        }
        Ok(())
    }
}

fn index_node(
    node: &mut CategoryNode,
    language: &str,
    steps: Vec<usize>,
    paths: &mut HashMap<u32, NodePath>,
) -> Result<()> {
    paths.insert(
        node.id(),
        NodePath {
            language: language.to_string(),
            steps: steps.clone(),
        },
    );
    match node {
        CategoryNode::Leaf(leaf) => leaf.hydrate()?,
        CategoryNode::Parent(parent) => {
            for (i, child) in parent.children.iter_mut().enumerate() {
                let mut child_steps = steps.clone();
                child_steps.push(i);
                index_node(child, language, child_steps, paths)?;
            }
        }
    }
    Ok(())
}

impl CategorySource for Library {
    type Catalog = WordCatalog;

    fn valid_categories(&self, language: &str) -> Vec<u32> {
        let mut ids = Vec::new();
        for root in self.languages.get(language).into_iter().flatten() {
            root.walk(&mut |node| {
                if let CategoryNode::Leaf(leaf) = node {
                    if !leaf.catalog.is_empty() {
                        ids.push(leaf.id);
                    }
                }
            });
        }
        ids.sort_unstable();
        ids
    }

    fn category(&self, id: u32) -> Option<CategoryEntry<'_, WordCatalog>> {
        let leaf = self.leaf(id)?;
        if leaf.catalog.is_empty() {
            return None;
        }
        Some(CategoryEntry {
            id: leaf.id,
            name: &leaf.name,
            catalog: &leaf.catalog,
            blob: &leaf.blob,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::LibraryBuilder;
    use crate::category::CategoryDefinition;
    use crate::config::FilterConfig;
    use crate::Error;

    fn sample() -> Library {
        let defs = CategoryDefinition::parse_list(
            r#"[
                {"name": "Short", "description": "", "rules": {"type": "max_length", "params": {"length": 3}}},
                {"name": "Letters", "description": "", "subcategories": [
                    {"name": "B", "description": "", "rules": {"type": "starts_with", "params": {"letter": "b"}}},
                    {"name": "Z", "description": "", "rules": {"type": "starts_with", "params": {"letter": "z"}}}
                ]}
            ]"#,
        )
        .unwrap();
        let mut builder = LibraryBuilder::new(FilterConfig::default());
        builder.add_language("en", "cat\ndog\nbird\nbee\n", &defs).unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_valid_categories_skip_parents_and_empty_leaves() {
        let library = sample();
        // ids: Short=1, Letters=2, B=3, Z=4 (empty)
        assert_eq!(library.valid_categories("en"), vec![1, 3]);
        assert!(library.valid_categories("fr").is_empty());
        assert!(library.category(2).is_none());
        assert!(library.category(4).is_none());
        assert!(library.node(4).is_some());
    }

    #[test]
    fn test_category_entry() {
        let library = sample();
        let entry = library.category(3).unwrap();
        assert_eq!(entry.name, "B");
        assert_eq!(entry.catalog.word_lengths(), vec![3, 4]);
        let filter = lexispark_core::BloomFilter::from_bytes(entry.blob).unwrap();
        assert!(filter.contains("bee"));
        assert!(filter.contains("bird"));
    }

    #[test]
    fn test_listings() {
        let library = sample();
        let listings = library.listings("en");
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].word_count, Some(3));
        assert!(listings[1].is_parent);
        assert_eq!(listings[1].children.len(), 2);
        assert_eq!(listings[1].children[1].word_count, Some(0));
    }

    #[test]
    fn test_save_and_load() {
        let library = sample();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        library.save(&path).unwrap();

        let loaded = Library::load(&path).unwrap();
        assert_eq!(loaded.valid_categories("en"), library.valid_categories("en"));
        assert_eq!(
            loaded.category(3).unwrap().blob,
            library.category(3).unwrap().blob
        );
        assert_eq!(loaded.languages().collect::<Vec<_>>(), vec!["en"]);
    }

    fn load_with_blob(blob: &str) -> Result<Library> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.json");
        sample().save(&path).unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        json["en"][0]["bloom_filter"] = blob.into();
        fs::write(&path, json.to_string()).unwrap();
        Library::load(&path)
    }

    #[test]
    fn test_load_rejects_filter_missing_catalog_words() {
        let mut other = lexispark_core::BloomFilter::with_parameters(1024, 3).unwrap();
        other.insert("zzz");
        let err = load_with_blob(&crate::wire::encode_blob(&other.to_bytes())).unwrap_err();
        assert!(matches!(err, Error::StaleFilter { id: 1, .. }), "{err}");
    }

    #[test]
    fn test_load_rejects_malformed_filter() {
        let err = load_with_blob("AAAA").unwrap_err();
        assert!(matches!(err, Error::StaleFilter { id: 1, .. }), "{err}");
        assert!(matches!(load_with_blob("not base64!"), Err(Error::Base64(_))));
    }
}
