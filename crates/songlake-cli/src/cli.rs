//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{add_tags, ingest, lookup, remove_tags};
use crate::config::Environment;

/// Song metadata catalog.
#[derive(Parser, Debug)]
#[command(name = "songlake")]
#[command(author, version = env!("SONGLAKE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Store root directory (defaults to the platform data directory)
    #[arg(long, env = "SONGLAKE_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Which database to use
    #[arg(
        long,
        env = "SONGLAKE_ENV",
        value_enum,
        default_value_t = Environment::Test,
        global = true
    )]
    pub environment: Environment,

    /// Abandon the operation after this many seconds
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a batch of songs
    Ingest(ingest::IngestArgs),

    /// Find songs by id or tags
    Lookup(lookup::LookupArgs),

    /// Merge tags into a song
    AddTags(add_tags::AddTagsArgs),

    /// Remove tags from a song
    RemoveTags(remove_tags::RemoveTagsArgs),
}
