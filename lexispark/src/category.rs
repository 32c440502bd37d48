//! Category definitions, selection rules and the category tree
//!
//! Definitions arrive as JSON where a node is a parent when it carries
//! `subcategories` and a leaf when it carries `rules`. They are converted once
//! into [`CategoryNode`], so nothing downstream inspects optional fields.

use serde::{Deserialize, Serialize};

use crate::catalog::WordCatalog;
use crate::{Error, Result};
use lexispark_core::{normalize, BloomFilter};

/// Predicate selecting the dictionary words that belong to a leaf category
///
/// Rules are evaluated against normalized words, and their parameters are
/// normalized the same way before comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum Rule {
    StartsWith { letter: String },
    EndsWith { suffix: String },
    Contains { pattern: String },
    Length { length: usize },
    MaxLength { length: usize },
    MinLength { length: usize },
    InSet { words: Vec<String> },
}

impl Rule {
    /// Stable rule name, as used in definition files
    pub fn kind(&self) -> &'static str {
        match self {
            Rule::StartsWith { .. } => "starts_with",
            Rule::EndsWith { .. } => "ends_with",
            Rule::Contains { .. } => "contains",
            Rule::Length { .. } => "length",
            Rule::MaxLength { .. } => "max_length",
            Rule::MinLength { .. } => "min_length",
            Rule::InSet { .. } => "in_set",
        }
    }

    /// Reject parameters that would select nothing meaningful
    ///
    /// Text parameters must keep at least one letter once normalized.
    pub fn validate(&self) -> std::result::Result<(), &'static str> {
        match self {
            Rule::StartsWith { letter: text }
            | Rule::EndsWith { suffix: text }
            | Rule::Contains { pattern: text }
                if normalize(text).is_empty() =>
            {
                Err("has a rule parameter without letters")
            }
            _ => Ok(()),
        }
    }

    /// Prepare the rule for repeated evaluation
    pub fn matcher(&self) -> RuleMatcher<'_> {
        let mut needle = String::new();
        let mut set = hashbrown::HashSet::new();
        match self {
            Rule::StartsWith { letter: text }
            | Rule::EndsWith { suffix: text }
            | Rule::Contains { pattern: text } => needle = normalize(text),
            Rule::InSet { words } => set = words.iter().map(|w| normalize(w)).collect(),
            _ => {}
        }
        RuleMatcher {
            rule: self,
            needle,
            set,
        }
    }

    /// Test one normalized word
    pub fn matches(&self, normalized: &str) -> bool {
        self.matcher().matches(normalized)
    }
}

/// A rule with its parameters pre-normalized
#[derive(Debug)]
pub struct RuleMatcher<'a> {
    rule: &'a Rule,
    needle: String,
    set: hashbrown::HashSet<String>,
}

impl RuleMatcher<'_> {
    /// Test one normalized word
    pub fn matches(&self, word: &str) -> bool {
        match self.rule {
            Rule::StartsWith { .. } | Rule::EndsWith { .. } | Rule::Contains { .. }
                if self.needle.is_empty() =>
            {
                false
            }
            Rule::StartsWith { .. } => word.starts_with(self.needle.as_str()),
            Rule::EndsWith { .. } => word.ends_with(self.needle.as_str()),
            Rule::Contains { .. } => word.contains(self.needle.as_str()),
            Rule::Length { length } => word.len() == *length,
            Rule::MaxLength { length } => word.len() <= *length,
            Rule::MinLength { length } => word.len() >= *length,
            Rule::InSet { .. } => self.set.contains(word),
        }
    }
}

/// Category definition as written in a definitions file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Rule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategories: Option<Vec<CategoryDefinition>>,
}

impl CategoryDefinition {
    /// Parse a JSON array of definitions
    pub fn parse_list(json: &str) -> Result<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve into a tagged shape
    ///
    /// Subcategories take precedence over rules, matching how parents are
    /// recognized; a definition with neither is rejected.
    pub fn shape(&self) -> Result<DefinitionShape<'_>> {
        match (&self.subcategories, &self.rules) {
            (Some(children), _) => Ok(DefinitionShape::Parent(children)),
            (None, Some(rule)) => match rule.validate() {
                Ok(()) => Ok(DefinitionShape::Leaf(rule)),
                Err(reason) => Err(Error::InvalidCategory {
                    name: self.name.clone(),
                    reason,
                }),
            },
            (None, None) => Err(Error::InvalidCategory {
                name: self.name.clone(),
                reason: "has no rules and no subcategories",
            }),
        }
    }
}

/// A definition seen as either a parent or a leaf
#[derive(Debug, Clone, Copy)]
pub enum DefinitionShape<'a> {
    Leaf(&'a Rule),
    Parent(&'a [CategoryDefinition]),
}

/// Node of a built category tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CategoryNode {
    Leaf(LeafCategory),
    Parent(ParentCategory),
}

impl CategoryNode {
    /// Category id
    pub fn id(&self) -> u32 {
        match self {
            CategoryNode::Leaf(leaf) => leaf.id,
            CategoryNode::Parent(parent) => parent.id,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            CategoryNode::Leaf(leaf) => &leaf.name,
            CategoryNode::Parent(parent) => &parent.name,
        }
    }

    /// Visit this node and every descendant, depth first
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a CategoryNode)) {
        visit(self);
        if let CategoryNode::Parent(parent) = self {
            for child in &parent.children {
                child.walk(visit);
            }
        }
    }

    /// Summary for category listings
    pub fn listing(&self) -> CategoryListing {
        match self {
            CategoryNode::Leaf(leaf) => CategoryListing {
                id: leaf.id,
                name: leaf.name.clone(),
                description: leaf.description.clone(),
                is_parent: false,
                word_count: Some(lexispark_core::WordLookup::len(&leaf.catalog)),
                children: Vec::new(),
            },
            CategoryNode::Parent(parent) => CategoryListing {
                id: parent.id,
                name: parent.name.clone(),
                description: parent.description.clone(),
                is_parent: true,
                word_count: None,
                children: parent.children.iter().map(CategoryNode::listing).collect(),
            },
        }
    }
}

/// Playable category with its catalog and shipped filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafCategory {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub rule: Rule,
    pub catalog: WordCatalog,
    /// Base64 of the serialized Bloom filter
    pub bloom_filter: String,
    #[serde(skip)]
    pub blob: Vec<u8>,
}

impl LeafCategory {
    /// Decode the stored base64 blob into `blob`
    ///
    /// The blob must parse as a filter and contain every catalog word, so a
    /// library never ships a filter that rejects one of its own answers.
    pub fn hydrate(&mut self) -> Result<()> {
        let blob = crate::wire::decode_blob(&self.bloom_filter)?;
        let filter = BloomFilter::from_bytes(&blob).map_err(|e| Error::StaleFilter {
            id: self.id,
            reason: e.to_string(),
        })?;
        if let Some(entry) = self
            .catalog
            .entries()
            .iter()
            .find(|entry| !filter.contains(&entry.normalized))
        {
            return Err(Error::StaleFilter {
                id: self.id,
                reason: format!("{} is missing", entry.normalized),
            });
        }
        self.blob = blob;
        Ok(())
    }
}

/// Grouping node without words of its own
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParentCategory {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub children: Vec<CategoryNode>,
}

/// Category listing entry with its children
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryListing {
    pub id: u32,
    pub name: String,
    pub description: String,
    pub is_parent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryListing>,
}
