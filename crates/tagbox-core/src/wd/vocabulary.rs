//! WD tagger vocabulary loading.
//!
//! The vocabulary ships as `selected_tags.csv` beside the model: one row
//! per model output index, with a tag name and a numeric category code.

use std::path::Path;

use crate::error::ModelError;

/// Tag names that keep their underscores when rendered.
///
/// Everything else gets underscores replaced with spaces; these would be
/// destroyed by the substitution.
pub const KAOMOJIS: [&str; 19] = [
    "0_0", "(o)_(o)", "+_+", "+_-", "._.", "<o>_<o>", "<|>_<|>", "=_=", ">_<", "3_3", "6_9",
    ">_o", "@_@", "^_^", "o_o", "u_u", "x_x", "|_|", "||_||",
];

/// Category of a vocabulary tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Rating,
    General,
    Character,
}

impl TagKind {
    /// Map the CSV category code. Unrecognized codes yield `None` and the
    /// tag is treated like a general tag downstream.
    fn from_code(code: &str) -> Option<Self> {
        match code {
            "9" => Some(TagKind::Rating),
            "0" => Some(TagKind::General),
            "4" => Some(TagKind::Character),
            _ => None,
        }
    }
}

/// A single vocabulary entry, index-aligned with the model output.
#[derive(Debug, Clone)]
pub struct VocabTag {
    /// Display name (underscores rendered as spaces, kaomoji kept verbatim)
    pub name: String,

    /// Category code from the CSV, if recognized
    pub kind: Option<TagKind>,
}

/// The loaded tag vocabulary, in model output order.
#[derive(Debug)]
pub struct WdVocabulary {
    tags: Vec<VocabTag>,
}

impl WdVocabulary {
    /// Load the vocabulary from a `selected_tags.csv` file.
    ///
    /// Column positions are taken from the header row; `name` and
    /// `category` are required.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let content = std::fs::read_to_string(path).map_err(|e| ModelError::Load {
            path: path.to_path_buf(),
            message: format!("Failed to read vocabulary: {e}"),
        })?;
        Self::parse(&content).map_err(|message| ModelError::Load {
            path: path.to_path_buf(),
            message,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.lines();
        let header = lines.next().ok_or("Vocabulary file is empty")?;
        let columns: Vec<&str> = header.split(',').map(str::trim).collect();
        let name_index = columns
            .iter()
            .position(|c| *c == "name")
            .ok_or("Vocabulary header has no name column")?;
        let category_index = columns
            .iter()
            .position(|c| *c == "category")
            .ok_or("Vocabulary header has no category column")?;

        let mut tags = Vec::new();
        for (line_number, line) in lines.enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split(',').collect();
            let name = fields.get(name_index).copied().ok_or_else(|| {
                format!("Row {} is missing the name column", line_number + 2)
            })?;
            let code = fields.get(category_index).copied().unwrap_or("");
            tags.push(VocabTag {
                name: render_name(name),
                kind: TagKind::from_code(code.trim()),
            });
        }

        let rating = tags.iter().filter(|t| t.kind == Some(TagKind::Rating)).count();
        let character = tags
            .iter()
            .filter(|t| t.kind == Some(TagKind::Character))
            .count();
        tracing::info!(
            "Loaded WD vocabulary: {} tags ({} rating, {} character)",
            tags.len(),
            rating,
            character,
        );

        Ok(Self { tags })
    }

    /// All tags, in model output order.
    pub fn tags(&self) -> &[VocabTag] {
        &self.tags
    }

    /// Number of tags in the vocabulary.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the vocabulary is empty.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Render a raw vocabulary name for display.
fn render_name(raw: &str) -> String {
    if KAOMOJIS.contains(&raw) {
        raw.to_string()
    } else {
        raw.replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
tag_id,name,category,count
9999,general,9,100
1,long_hair,0,500
2,^_^,0,50
3,hatsune_miku,4,200
";

    #[test]
    fn test_parse_header_indexed_columns() {
        let vocab = WdVocabulary::parse(SAMPLE).unwrap();
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.tags()[0].kind, Some(TagKind::Rating));
        assert_eq!(vocab.tags()[1].kind, Some(TagKind::General));
        assert_eq!(vocab.tags()[3].kind, Some(TagKind::Character));
    }

    #[test]
    fn test_underscores_become_spaces() {
        let vocab = WdVocabulary::parse(SAMPLE).unwrap();
        assert_eq!(vocab.tags()[1].name, "long hair");
        assert_eq!(vocab.tags()[3].name, "hatsune miku");
    }

    #[test]
    fn test_kaomoji_kept_verbatim() {
        let vocab = WdVocabulary::parse(SAMPLE).unwrap();
        assert_eq!(vocab.tags()[2].name, "^_^");
    }

    #[test]
    fn test_unknown_category_code_tolerated() {
        let vocab = WdVocabulary::parse("name,category\nartist_tag,1\n").unwrap();
        assert_eq!(vocab.tags()[0].kind, None);
    }

    #[test]
    fn test_missing_name_column_is_an_error() {
        assert!(WdVocabulary::parse("tag_id,category\n1,0\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = WdVocabulary::load(Path::new("/nonexistent/selected_tags.csv")).unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
    }
}
