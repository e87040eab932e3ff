//! Subcommand implementations.

pub mod add_tags;
pub mod ingest;
pub mod lookup;
pub mod remove_tags;

use std::future::Future;

use anyhow::{Result, bail};

use songlake_core::Error;

use crate::cli::Commands;
use crate::config::Config;

pub async fn handle(cmd: Commands, config: Config) -> Result<()> {
    match cmd {
        Commands::Ingest(args) => ingest::run(args, &config).await,
        Commands::Lookup(args) => lookup::run(args, &config).await,
        Commands::AddTags(args) => add_tags::run(args, &config).await,
        Commands::RemoveTags(args) => remove_tags::run(args, &config).await,
    }
}

/// Run a catalog call under the configured deadline.
///
/// When the deadline passes the call is dropped, abandoning it.
pub async fn with_deadline<T, F>(
    config: &Config,
    operation: &'static str,
    call: F,
) -> songlake_core::Result<T>
where
    F: Future<Output = songlake_core::Result<T>>,
{
    match config.timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| Error::Cancelled { operation })?,
        None => call.await,
    }
}

/// Parse a `name=value` tag argument.
pub fn parse_tag(raw: &str) -> Result<(String, String)> {
    let Some((name, value)) = raw.split_once('=') else {
        bail!("Invalid tag '{}': expected NAME=VALUE", raw);
    };
    if name.is_empty() {
        bail!("Invalid tag '{}': empty name", raw);
    }
    Ok((name.to_string(), value.to_string()))
}

/// Parse a tag name for removal. Anything after `=` is ignored.
pub fn parse_tag_name(raw: &str) -> Result<String> {
    let name = raw.split_once('=').map_or(raw, |(name, _)| name);
    if name.is_empty() {
        bail!("Invalid tag '{}': empty name", raw);
    }
    Ok(name.to_string())
}
