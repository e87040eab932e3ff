//! Lookup command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use songlake_core::{Combinator, LookupRequest, Selector, Tags};

use crate::commands::{parse_tag, with_deadline};
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Song id to fetch (repeatable)
    #[arg(long = "id", value_name = "ID")]
    pub ids: Vec<String>,

    /// Tag to match as NAME=VALUE, or NAME=* for presence (repeatable)
    #[arg(long = "tag", value_name = "NAME=VALUE")]
    pub tags: Vec<String>,

    /// How tag matches combine: all|and|1, any|or|0, none|nor|2.
    /// Unrecognized values mean any
    #[arg(long, value_name = "COMBINATOR")]
    pub combinator: Option<String>,

    /// Offset into the result set
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page_token: i64,

    /// Maximum songs to return, 0 for all
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page_size: i64,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Decode a combinator given by name or by its integer wire form.
fn parse_combinator(raw: &str) -> Combinator {
    match raw.trim().parse::<i32>() {
        Ok(wire) => Combinator::from_wire(wire),
        Err(_) => Combinator::from_name(raw),
    }
}

pub async fn run(args: LookupArgs, config: &Config) -> Result<()> {
    let tags = args
        .tags
        .iter()
        .map(|raw| parse_tag(raw))
        .collect::<Result<Tags>>()?;

    let combinator = args.combinator.as_deref().map(parse_combinator);
    let selector = Selector::from_parts(args.ids, tags, combinator).context("Invalid lookup")?;
    let request = LookupRequest::new(selector).with_page(args.page_token, args.page_size);

    let catalog = config.open_catalog()?;
    let page = with_deadline(config, "lookup", catalog.lookup(request))
        .await
        .context("Failed to find songs")?;

    if page.items.is_empty() {
        eprintln!("{}", "No songs found.".dimmed());
    }

    for song in &page.items {
        if args.pretty {
            output::json_pretty(song)?;
        } else {
            output::json(song)?;
        }
    }

    output::field("Next page token", &page.next_token.to_string());
    if page.is_exhausted() {
        eprintln!("{}", "No more pages.".dimmed());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinator_names_and_wire_values() {
        assert_eq!(parse_combinator("AND"), Combinator::All);
        assert_eq!(parse_combinator("all"), Combinator::All);
        assert_eq!(parse_combinator("Nor"), Combinator::None);
        assert_eq!(parse_combinator("or"), Combinator::Any);
        assert_eq!(parse_combinator("1"), Combinator::All);
        assert_eq!(parse_combinator("2"), Combinator::None);
        assert_eq!(parse_combinator("0"), Combinator::Any);
    }

    #[test]
    fn unknown_combinator_means_any() {
        assert_eq!(parse_combinator("xor"), Combinator::Any);
        assert_eq!(parse_combinator("7"), Combinator::Any);
        assert_eq!(parse_combinator(""), Combinator::Any);
    }
}
