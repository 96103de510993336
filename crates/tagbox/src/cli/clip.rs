//! The `tagbox clip` command: crop a tagged clip out of an image.

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use std::path::PathBuf;

use tagbox_core::clip;
use tagbox_core::types::TagSet;
use tagbox_core::Config;

/// Arguments for the `clip` command.
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Source image
    pub image: PathBuf,

    /// Selection rectangle as X,Y,WIDTH,HEIGHT
    #[arg(short, long, value_name = "X,Y,W,H")]
    pub select: String,

    /// Rendered-image rectangle the selection was made in, as
    /// X,Y,WIDTH,HEIGHT. When given, the selection is treated as display
    /// coordinates and mapped onto the original pixels.
    #[arg(long, value_name = "X,Y,W,H")]
    pub display_rect: Option<String>,

    /// Character tags for the clip
    #[arg(long = "character", value_name = "TAG")]
    pub characters: Vec<String>,

    /// Setting tags for the clip
    #[arg(long = "setting", value_name = "TAG")]
    pub settings: Vec<String>,

    /// Action tags for the clip
    #[arg(long = "action", value_name = "TAG")]
    pub actions: Vec<String>,

    /// Skip the tag prompt and write no tag sidecar
    #[arg(long)]
    pub no_tags: bool,

    /// Copy the source image's sidecar files to the clip
    #[arg(long)]
    pub copy_sidecars: bool,
}

/// Execute the clip command.
pub fn execute(args: ClipArgs, config: Config) -> anyhow::Result<()> {
    let selection = parse_rect(&args.select)?;
    clip::validate_selection(selection, config.clip.min_selection)?;

    let image_rect = match &args.display_rect {
        Some(display) => clip::map_selection(&args.image, selection, parse_rect(display)?)?,
        None => selection,
    };

    let pending = clip::create_clip(&args.image, image_rect)?;
    println!(
        "{} {} ({}x{})",
        style("Saved").green(),
        pending.path.display(),
        pending.width,
        pending.height
    );

    if args.copy_sidecars || config.clip.copy_sidecars {
        clip::copy_sidecars(&args.image, &pending)?;
    }

    if args.no_tags {
        return Ok(());
    }

    let flags_given =
        !args.characters.is_empty() || !args.settings.is_empty() || !args.actions.is_empty();
    let tags = if flags_given {
        TagSet {
            characters: args.characters.clone(),
            settings: args.settings.clone(),
            actions: args.actions.clone(),
        }
    } else {
        match prompt_for_tags(&pending)? {
            Some(tags) => tags,
            None => {
                // Cancelling the tag entry takes the clip with it.
                clip::discard(pending);
                println!("Cancelled; clip removed.");
                return Ok(());
            }
        }
    };

    clip::attach_tags(&pending, &tags)?;
    println!(
        "Wrote {}",
        tagbox_core::sidecar::json_path(&pending.path).display()
    );
    Ok(())
}

/// Interactive tag entry for a fresh clip.
///
/// Returns `None` if the user declines to keep the tags (and the clip).
fn prompt_for_tags(pending: &clip::PendingClip) -> anyhow::Result<Option<TagSet>> {
    let theme = ColorfulTheme::default();
    println!(
        "Tagging {} ({}x{})",
        pending.path.display(),
        pending.width,
        pending.height
    );

    let tags = TagSet {
        characters: prompt_category(&theme, "Characters")?,
        settings: prompt_category(&theme, "Settings")?,
        actions: prompt_category(&theme, "Actions")?,
    };

    let keep = Confirm::with_theme(&theme)
        .with_prompt("Save these tags?")
        .default(true)
        .interact()?;
    Ok(if keep { Some(tags) } else { None })
}

fn prompt_category(theme: &ColorfulTheme, label: &str) -> anyhow::Result<Vec<String>> {
    let input: String = Input::with_theme(theme)
        .with_prompt(format!("{label} (comma-separated, empty for none)"))
        .allow_empty(true)
        .interact_text()?;
    Ok(input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect())
}

/// Parse an `X,Y,W,H` rectangle argument.
fn parse_rect(input: &str) -> anyhow::Result<clip::Rect> {
    let parts: Vec<&str> = input.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        anyhow::bail!("Expected X,Y,W,H, got {input:?}");
    }
    Ok(clip::Rect::new(
        parts[0].parse()?,
        parts[1].parse()?,
        parts[2].parse()?,
        parts[3].parse()?,
    ))
}
