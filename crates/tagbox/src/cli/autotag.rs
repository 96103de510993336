//! The `tagbox autotag` command: score images with the WD tagger.

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

use tagbox_core::wd::WdTagger;
use tagbox_core::{Config, Session};

/// Arguments for the `autotag` command.
#[derive(Args, Debug)]
pub struct AutotagArgs {
    /// Image file or directory
    pub path: PathBuf,

    /// Minimum probability for a tag to be kept
    #[arg(long)]
    pub min_probability: Option<f32>,

    /// Maximum number of tags per image
    #[arg(long)]
    pub max_tags: Option<usize>,

    /// Comma-separated tags to exclude (escape a literal comma as `\,`)
    #[arg(long)]
    pub exclude: Option<String>,

    /// Print scores as JSON instead of plain text (single image only)
    #[arg(long)]
    pub json: bool,

    /// Print tags without writing them to the text sidecar
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the autotag command.
pub fn execute(args: AutotagArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(min) = args.min_probability {
        config.wd_tagger.min_probability = min;
    }
    if let Some(max) = args.max_tags {
        config.wd_tagger.max_tags = max;
    }
    if let Some(exclude) = &args.exclude {
        config.wd_tagger.tags_to_exclude = exclude.clone();
    }

    if args.path.is_dir() {
        autotag_directory(&args.path, &config, args.dry_run)
    } else {
        autotag_file(&args.path, &config, args.json, args.dry_run)
    }
}

fn autotag_file(path: &Path, config: &Config, json: bool, dry_run: bool) -> anyhow::Result<()> {
    let tagger = WdTagger::load(&config.model_dir(), &config.wd_tagger)?;
    let scored = tagger.tag_file(path, &config.wd_tagger)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&scored)?);
    } else {
        for tag in &scored {
            println!("{:5.3}  {}", tag.probability, tag.name);
        }
    }

    if !dry_run && !scored.is_empty() {
        let names: Vec<String> = scored.iter().map(|t| t.name.clone()).collect();
        merge_text_tags(path, &names, config)?;
    }
    Ok(())
}

fn autotag_directory(root: &Path, config: &Config, dry_run: bool) -> anyhow::Result<()> {
    let mut session = Session::load(root, config.clone())?;
    let paths: Vec<PathBuf> = session
        .images()
        .iter()
        .map(|record| record.path.clone())
        .collect();
    if paths.is_empty() {
        println!("No images found under {}", root.display());
        return Ok(());
    }

    let wd_config = config.wd_tagger.clone();
    let progress = ProgressBar::new(paths.len() as u64);
    progress.set_style(ProgressStyle::with_template(
        "{bar:40} {pos}/{len} {msg}",
    )?);

    let mut tagged = 0usize;
    let mut failed = 0usize;
    for path in &paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        progress.set_message(name);

        // The tagger loads once, on the first image.
        let result = session.wd_tagger()?.tag_file(path, &wd_config);
        match result {
            Ok(scored) => {
                if !dry_run && !scored.is_empty() {
                    let names: Vec<String> = scored.iter().map(|t| t.name.clone()).collect();
                    session.add_tags(path, &names)?;
                }
                tagged += 1;
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {e}", path);
                failed += 1;
            }
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    println!("Tagged {tagged} images ({failed} failed)");
    Ok(())
}

/// Append scored tags to an image's text sidecar, skipping duplicates.
fn merge_text_tags(path: &Path, names: &[String], config: &Config) -> anyhow::Result<()> {
    use tagbox_core::sidecar;

    let mut tags = sidecar::text::read(path, &config.library.tag_separator)?;
    let mut added = 0;
    for name in names {
        if !tags.contains(name) {
            tags.push(name.clone());
            added += 1;
        }
    }
    if added > 0 {
        sidecar::text::write(path, &tags)?;
    }
    println!(
        "Wrote {} ({added} new tags)",
        sidecar::text_path(path).display()
    );
    Ok(())
}
