//! The comma-separated tag exclusion mini-language.
//!
//! A literal comma inside a tag is escaped as `\,`. Entries are trimmed
//! and empty entries dropped.

/// Parse an exclusion string into individual tags.
pub fn parse(input: &str) -> Vec<String> {
    if input.trim().is_empty() {
        return Vec::new();
    }

    let mut tags = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&',') => {
                chars.next();
                current.push(',');
            }
            ',' => push_entry(&mut tags, &mut current),
            other => current.push(other),
        }
    }
    push_entry(&mut tags, &mut current);
    tags
}

fn push_entry(tags: &mut Vec<String>, current: &mut String) {
    let entry = current.trim();
    if !entry.is_empty() {
        tags.push(entry.to_string());
    }
    current.clear();
}
