//! Heuristic classification for tags the model response does not settle.

use crate::types::Category;

/// Suffixes that mark a tag as verb-like.
const VERB_SUFFIXES: [&str; 6] = ["ing", "ed", "ate", "ize", "ise", "ify"];

/// Nouns that mark a tag as naming a living entity.
const ENTITY_KEYWORDS: [&str; 7] = ["man", "woman", "boy", "girl", "person", "dog", "cat"];

/// Classify a tag by surface form alone.
///
/// Total over all inputs, checked in priority order: verb-like suffixes
/// first, then entity keywords, then setting as the default.
pub fn classify(tag: &str) -> Category {
    let lowered = tag.to_lowercase();
    if VERB_SUFFIXES
        .iter()
        .any(|suffix| lowered.ends_with(suffix))
    {
        return Category::Action;
    }
    if ENTITY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
    {
        return Category::Character;
    }
    Category::Setting
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_suffix_wins() {
        assert_eq!(classify("running"), Category::Action);
        assert_eq!(classify("painted"), Category::Action);
        assert_eq!(classify("crystallize"), Category::Action);
    }

    #[test]
    fn test_entity_keyword_matches_substring() {
        assert_eq!(classify("woman"), Category::Character);
        assert_eq!(classify("old person"), Category::Character);
        assert_eq!(classify("Sheepdog"), Category::Character);
    }

    #[test]
    fn test_default_is_setting() {
        assert_eq!(classify("castle"), Category::Setting);
        assert_eq!(classify("motorcycle"), Category::Setting);
        assert_eq!(classify(""), Category::Setting);
    }

    #[test]
    fn test_suffix_outranks_entity_keyword() {
        // Contains "man" but ends in a verb suffix.
        assert_eq!(classify("manning"), Category::Action);
    }
}
