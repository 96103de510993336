//! The `tagbox tags` command for viewing and editing an image's tags.

use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use tagbox_core::caption::{CaptionCounter, MAX_TOKEN_COUNT};
use tagbox_core::sidecar;
use tagbox_core::types::TagSet;
use tagbox_core::Config;

/// Arguments for the `tags` command.
#[derive(Args, Debug)]
pub struct TagsArgs {
    #[command(subcommand)]
    pub command: TagsCommand,
}

/// Subcommands for tag editing.
#[derive(Subcommand, Debug)]
pub enum TagsCommand {
    /// Show an image's free-text and structured tags
    Show {
        /// Image file
        image: PathBuf,
    },

    /// Add tags to an image
    Add {
        /// Image file
        image: PathBuf,

        /// Tags to add; prefix with `character:`, `setting:` or `action:`
        /// for structured tags
        #[arg(required = true)]
        tags: Vec<String>,
    },

    /// Remove tags from an image
    Remove {
        /// Image file
        image: PathBuf,

        /// Tags to remove, in the same form they were added
        #[arg(required = true)]
        tags: Vec<String>,
    },
}

/// Execute the tags command.
pub fn execute(args: TagsArgs, config: Config) -> anyhow::Result<()> {
    match args.command {
        TagsCommand::Show { image } => show(&image, &config),
        TagsCommand::Add { image, tags } => add(&image, &tags, &config),
        TagsCommand::Remove { image, tags } => remove(&image, &tags, &config),
    }
}

fn show(image: &Path, config: &Config) -> anyhow::Result<()> {
    let tags = sidecar::text::read(image, &config.library.tag_separator)?;
    let structured = sidecar::json::read(image)?;

    println!("{}", image.display());
    if tags.is_empty() {
        println!("  (no free-text tags)");
    } else {
        println!("  tags: {}", tags.join(&config.library.tag_separator));
    }
    // Structured tags are shown in their prefix-encoded interchange form,
    // the same shape `tags add` accepts.
    for tag in structured.flatten() {
        println!("  {}", sidecar::encoding::encode(&tag));
    }

    // Token budget readout, if a tokenizer is installed.
    let tokenizer_path = config.model_dir().join("tokenizer.json");
    if tokenizer_path.exists() {
        let counter = CaptionCounter::load(&tokenizer_path)?;
        let count = counter.count(&tags, &config.library.tag_separator)?;
        println!("  {count} / {MAX_TOKEN_COUNT} tokens");
    }

    Ok(())
}

fn add(image: &Path, entries: &[String], config: &Config) -> anyhow::Result<()> {
    let (plain, structured, skipped) = partition(entries);

    if !plain.is_empty() {
        let mut tags = sidecar::text::read(image, &config.library.tag_separator)?;
        let mut added = 0;
        for tag in plain {
            if !tags.contains(&tag) {
                tags.push(tag);
                added += 1;
            }
        }
        if added > 0 {
            sidecar::text::write(image, &tags)?;
        }
        println!("Added {added} free-text tags");
    }

    if !structured.is_empty() {
        let merged = sidecar::json::merge(image, &structured)?;
        println!(
            "Wrote {} ({} structured tags)",
            sidecar::json_path(image).display(),
            merged.len()
        );
    }

    if skipped > 0 {
        println!("Skipped {skipped} malformed entries");
    }
    Ok(())
}

fn remove(image: &Path, entries: &[String], config: &Config) -> anyhow::Result<()> {
    let (plain, structured, skipped) = partition(entries);

    if !plain.is_empty() {
        let mut tags = sidecar::text::read(image, &config.library.tag_separator)?;
        let before = tags.len();
        tags.retain(|tag| !plain.contains(tag));
        if tags.len() != before {
            sidecar::text::write(image, &tags)?;
        }
        println!("Removed {} free-text tags", before - tags.len());
    }

    if !structured.is_empty() {
        let mut set = sidecar::json::read(image)?;
        let mut removed = 0;
        for tag in structured.flatten() {
            let bucket = set.category_mut(tag.category());
            let before = bucket.len();
            bucket.retain(|value| value != tag.value());
            removed += before - bucket.len();
        }
        if removed > 0 {
            sidecar::json::write(image, &set)?;
        }
        println!("Removed {removed} structured tags");
    }

    if skipped > 0 {
        println!("Skipped {skipped} malformed entries");
    }
    Ok(())
}

/// Split raw entries into plain tags and a structured tag set.
///
/// Entries with a `category:` prefix are decoded; prefixed entries that
/// fail to decode are counted as skipped rather than treated as plain
/// tags.
fn partition(entries: &[String]) -> (Vec<String>, TagSet, usize) {
    let mut plain = Vec::new();
    let mut structured = TagSet::default();
    let mut skipped = 0;
    for entry in entries {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.contains(':') {
            match sidecar::encoding::decode(trimmed) {
                Ok(tag) => structured.insert(tag),
                Err(e) => {
                    tracing::warn!("{e}");
                    skipped += 1;
                }
            }
        } else {
            plain.push(trimmed.to_string());
        }
    }
    (plain, structured, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_splits_plain_and_prefixed() {
        let entries = vec![
            "beach".to_string(),
            "character:alice".to_string(),
            "unknown:thing".to_string(),
            "  ".to_string(),
        ];
        let (plain, structured, skipped) = partition(&entries);
        assert_eq!(plain, vec!["beach"]);
        assert_eq!(structured.characters, vec!["alice"]);
        assert_eq!(skipped, 1);
    }
}
