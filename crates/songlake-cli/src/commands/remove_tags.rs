//! Remove tags command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::{parse_tag_name, with_deadline};
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct RemoveTagsArgs {
    /// Song id
    pub id: String,

    /// Tag name to remove; a trailing =VALUE is accepted and ignored (repeatable)
    #[arg(long = "tag", value_name = "NAME", required = true)]
    pub tags: Vec<String>,
}

pub async fn run(args: RemoveTagsArgs, config: &Config) -> Result<()> {
    let names = args
        .tags
        .iter()
        .map(|raw| parse_tag_name(raw))
        .collect::<Result<Vec<_>>>()?;

    let catalog = config.open_catalog()?;
    with_deadline(config, "remove_tags", catalog.remove_tags(&args.id, names))
        .await
        .with_context(|| format!("Failed to remove tags from {}", args.id))?;

    output::success(&format!("Removed tags from {}", args.id));
    Ok(())
}
