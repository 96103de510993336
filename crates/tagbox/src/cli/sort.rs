//! The `tagbox sort` command: classify free-text tags into categories.

use clap::Args;
use std::path::PathBuf;

use tagbox_core::classify::TagClassifier;
use tagbox_core::sidecar;
use tagbox_core::types::Category;
use tagbox_core::Config;

/// Arguments for the `sort` command.
#[derive(Args, Debug)]
pub struct SortArgs {
    /// Image whose sidecar tags should be classified
    pub image: PathBuf,

    /// Classify these tags instead of the image's sidecar tags
    #[arg(long = "tag", value_name = "TAG")]
    pub tags: Vec<String>,

    /// Print the result without writing the JSON sidecar
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the sort command.
pub async fn execute(args: SortArgs, config: Config) -> anyhow::Result<()> {
    let tags = if args.tags.is_empty() {
        sidecar::text::read(&args.image, &config.library.tag_separator)?
    } else {
        args.tags.clone()
    };
    if tags.is_empty() {
        println!("No tags to classify.");
        return Ok(());
    }

    let classifier = TagClassifier::connect(&config.classifier).await?;
    tracing::info!("Classifying {} tags", tags.len());
    let report = classifier.sort_tags(&tags).await;

    for category in Category::ALL {
        let bucket = report.tags.category(category);
        if !bucket.is_empty() {
            println!("{}: {}", category.plural(), bucket.join(", "));
        }
    }
    for (tag, error) in &report.skipped {
        println!("skipped {tag:?}: {error}");
    }

    if !args.dry_run && !report.tags.is_empty() {
        let merged = sidecar::json::merge(&args.image, &report.tags)?;
        println!(
            "Wrote {} ({} tags)",
            sidecar::json_path(&args.image).display(),
            merged.len()
        );
    }

    Ok(())
}
