//! Add tags command implementation.

use anyhow::{Context, Result};
use clap::Args;

use songlake_core::Tags;

use crate::commands::{parse_tag, with_deadline};
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct AddTagsArgs {
    /// Song id
    pub id: String,

    /// Tag to set as NAME=VALUE (repeatable)
    #[arg(long = "tag", value_name = "NAME=VALUE", required = true)]
    pub tags: Vec<String>,
}

pub async fn run(args: AddTagsArgs, config: &Config) -> Result<()> {
    let tags = args
        .tags
        .iter()
        .map(|raw| parse_tag(raw))
        .collect::<Result<Tags>>()?;
    let count = tags.len();

    let catalog = config.open_catalog()?;
    with_deadline(config, "add_tags", catalog.add_tags(&args.id, tags))
        .await
        .with_context(|| format!("Failed to add tags to {}", args.id))?;

    output::success(&format!("Set {} tag(s) on {}", count, args.id));
    Ok(())
}
