//! Core data types shared across the tagging toolkit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::error::ParseError;

/// Semantic category of a structured tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Character,
    Setting,
    Action,
}

impl Category {
    /// All categories, in classification priority order.
    pub const ALL: [Category; 3] = [Category::Character, Category::Setting, Category::Action];

    /// Singular form, used in the `"category:value"` prefix encoding.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Character => "character",
            Category::Setting => "setting",
            Category::Action => "action",
        }
    }

    /// Plural form, used as the JSON sidecar key.
    pub fn plural(&self) -> &'static str {
        match self {
            Category::Character => "characters",
            Category::Setting => "settings",
            Category::Action => "actions",
        }
    }

    /// Parse the singular form.
    pub fn parse(value: &str) -> Result<Self, ParseError> {
        match value {
            "character" => Ok(Category::Character),
            "setting" => Ok(Category::Setting),
            "action" => Ok(Category::Action),
            other => Err(ParseError::Category {
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tag value bound to its semantic category.
///
/// This is the component-boundary representation; the flat
/// `"category:value"` string form exists only inside the persistence
/// adapter (`sidecar::encoding`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuredTag {
    Character(String),
    Setting(String),
    Action(String),
}

impl StructuredTag {
    pub fn new(category: Category, value: impl Into<String>) -> Self {
        let value = value.into();
        match category {
            Category::Character => StructuredTag::Character(value),
            Category::Setting => StructuredTag::Setting(value),
            Category::Action => StructuredTag::Action(value),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            StructuredTag::Character(_) => Category::Character,
            StructuredTag::Setting(_) => Category::Setting,
            StructuredTag::Action(_) => Category::Action,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            StructuredTag::Character(value)
            | StructuredTag::Setting(value)
            | StructuredTag::Action(value) => value,
        }
    }
}

/// The structured tag set persisted in a JSON sidecar.
///
/// Field names match the sidecar schema exactly:
/// `{"characters": [...], "settings": [...], "actions": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagSet {
    pub characters: Vec<String>,
    pub settings: Vec<String>,
    pub actions: Vec<String>,
}

impl TagSet {
    pub fn is_empty(&self) -> bool {
        self.characters.is_empty() && self.settings.is_empty() && self.actions.is_empty()
    }

    /// Total tag count across all three categories.
    pub fn len(&self) -> usize {
        self.characters.len() + self.settings.len() + self.actions.len()
    }

    pub fn category(&self, category: Category) -> &[String] {
        match category {
            Category::Character => &self.characters,
            Category::Setting => &self.settings,
            Category::Action => &self.actions,
        }
    }

    pub fn category_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Character => &mut self.characters,
            Category::Setting => &mut self.settings,
            Category::Action => &mut self.actions,
        }
    }

    /// Append a tag to its category bucket, preserving insertion order.
    pub fn insert(&mut self, tag: StructuredTag) {
        match tag {
            StructuredTag::Character(value) => self.characters.push(value),
            StructuredTag::Setting(value) => self.settings.push(value),
            StructuredTag::Action(value) => self.actions.push(value),
        }
    }

    /// Append all tags from another set.
    pub fn merge(&mut self, other: TagSet) {
        self.characters.extend(other.characters);
        self.settings.extend(other.settings);
        self.actions.extend(other.actions);
    }

    /// Deduplicate and sort each category list.
    pub fn normalize(&mut self) {
        for category in Category::ALL {
            let list = self.category_mut(category);
            list.sort();
            list.dedup();
        }
    }

    /// Consuming variant of [`normalize`](Self::normalize).
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Flatten into structured tags, category by category.
    pub fn flatten(&self) -> Vec<StructuredTag> {
        Category::ALL
            .iter()
            .flat_map(|&category| {
                self.category(category)
                    .iter()
                    .map(move |value| StructuredTag::new(category, value.clone()))
            })
            .collect()
    }
}

/// A single image in the loaded directory.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Path to the image file
    pub path: PathBuf,

    /// Pixel dimensions (orientation-corrected), if they could be read
    pub dimensions: Option<(u32, u32)>,

    /// Ordered free-text tags from the plain-text sidecar
    pub tags: Vec<String>,

    /// Path to a cached thumbnail, if one has been generated
    pub thumbnail: Option<PathBuf>,
}

/// A vocabulary tag with its predicted probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredTag {
    pub name: String,
    pub probability: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.as_str()).unwrap(), category);
        }
        assert!(Category::parse("scenery").is_err());
    }

    #[test]
    fn test_structured_tag_accessors() {
        let tag = StructuredTag::new(Category::Character, "alice");
        assert_eq!(tag.category(), Category::Character);
        assert_eq!(tag.value(), "alice");
    }

    #[test]
    fn test_tag_set_normalize_dedups_and_sorts() {
        let set = TagSet {
            characters: vec!["b".into(), "a".into(), "a".into()],
            settings: vec![],
            actions: vec!["run".into()],
        };
        let normalized = set.normalized();
        assert_eq!(normalized.characters, vec!["a", "b"]);
        assert!(normalized.settings.is_empty());
        assert_eq!(normalized.actions, vec!["run"]);
    }

    #[test]
    fn test_tag_set_serde_keys() {
        let mut set = TagSet::default();
        set.insert(StructuredTag::Setting("castle".into()));
        let json = serde_json::to_string(&set).unwrap();
        assert!(json.contains("\"characters\":[]"));
        assert!(json.contains("\"settings\":[\"castle\"]"));
        assert!(json.contains("\"actions\":[]"));
    }

    #[test]
    fn test_tag_set_missing_fields_default_empty() {
        let set: TagSet = serde_json::from_str("{\"characters\": [\"alice\"]}").unwrap();
        assert_eq!(set.characters, vec!["alice"]);
        assert!(set.settings.is_empty());
        assert!(set.actions.is_empty());
    }

    #[test]
    fn test_tag_set_flatten_order() {
        let set = TagSet {
            characters: vec!["alice".into()],
            settings: vec!["castle".into()],
            actions: vec!["running".into()],
        };
        let flat = set.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0], StructuredTag::Character("alice".into()));
        assert_eq!(flat[1], StructuredTag::Setting("castle".into()));
        assert_eq!(flat[2], StructuredTag::Action("running".into()));
    }

    #[test]
    fn test_tag_set_merge_keeps_duplicates_until_normalize() {
        let mut set = TagSet {
            characters: vec!["alice".into()],
            ..TagSet::default()
        };
        set.merge(TagSet {
            characters: vec!["alice".into(), "bob".into()],
            ..TagSet::default()
        });
        assert_eq!(set.characters.len(), 3);
        assert_eq!(set.normalized().characters, vec!["alice", "bob"]);
    }
}
