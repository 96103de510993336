//! The `"category:value"` prefix encoding for structured tags.
//!
//! This flat string form is used for display and interchange only; the
//! rest of the crate works with [`StructuredTag`] values.

use crate::error::ParseError;
use crate::types::{Category, StructuredTag};

/// Encode a structured tag as `"<singular-category>:<value>"`.
pub fn encode(tag: &StructuredTag) -> String {
    format!("{}:{}", tag.category(), tag.value())
}

/// Decode a prefix-encoded entry.
pub fn decode(entry: &str) -> Result<StructuredTag, ParseError> {
    let (category, value) = entry.split_once(':').ok_or_else(|| ParseError::TagEntry {
        entry: entry.to_string(),
    })?;
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::TagEntry {
            entry: entry.to_string(),
        });
    }
    let category = Category::parse(category.trim())?;
    Ok(StructuredTag::new(category, value))
}

/// Decode a batch of entries, skipping malformed ones.
///
/// Skipped entries are warned about and returned alongside the decoded
/// tags so callers can surface them without parsing logs.
pub fn decode_all(entries: &[String]) -> (Vec<StructuredTag>, Vec<(String, ParseError)>) {
    let mut tags = Vec::new();
    let mut skipped = Vec::new();
    for entry in entries {
        match decode(entry) {
            Ok(tag) => tags.push(tag),
            Err(e) => {
                tracing::warn!("Skipping tag entry {entry:?}: {e}");
                skipped.push((entry.clone(), e));
            }
        }
    }
    (tags, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        let tag = StructuredTag::Character("alice".into());
        assert_eq!(encode(&tag), "character:alice");
    }

    #[test]
    fn test_decode_roundtrip() {
        for tag in [
            StructuredTag::Character("alice".into()),
            StructuredTag::Setting("castle".into()),
            StructuredTag::Action("running".into()),
        ] {
            assert_eq!(decode(&encode(&tag)).unwrap(), tag);
        }
    }

    #[test]
    fn test_decode_keeps_colons_in_the_value() {
        let tag = decode("setting:city: night").unwrap();
        assert_eq!(tag, StructuredTag::Setting("city: night".into()));
    }

    #[test]
    fn test_decode_rejects_unprefixed_and_unknown() {
        assert!(matches!(
            decode("alice").unwrap_err(),
            ParseError::TagEntry { .. }
        ));
        assert!(matches!(
            decode("scenery:castle").unwrap_err(),
            ParseError::Category { .. }
        ));
        assert!(matches!(
            decode("character:  ").unwrap_err(),
            ParseError::TagEntry { .. }
        ));
    }

    #[test]
    fn test_decode_all_skips_malformed() {
        let entries = vec![
            "character:alice".to_string(),
            "not a tag".to_string(),
            "action:running".to_string(),
        ];
        let (tags, skipped) = decode_all(&entries);
        assert_eq!(tags.len(), 2);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, "not a tag");
    }
}
