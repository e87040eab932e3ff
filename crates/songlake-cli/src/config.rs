//! Runtime configuration resolved from flags and environment.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ValueEnum;
use directories::ProjectDirs;
use tracing::debug;

use songlake_core::Catalog;
use songlake_file::FileStore;

use crate::cli::GlobalArgs;

/// Deployment environment. Each one is a separate database in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Environment {
    Prod,
    #[default]
    Test,
}

impl Environment {
    /// Database name backing this environment.
    pub fn database(&self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Test => "test",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_root: PathBuf,
    pub environment: Environment,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn resolve(args: &GlobalArgs) -> Result<Self> {
        let store_root = match &args.store {
            Some(path) => path.clone(),
            None => default_store_root()?,
        };

        Ok(Self {
            store_root,
            environment: args.environment,
            timeout: args.timeout.map(Duration::from_secs),
        })
    }

    /// Open the catalog over the configured store.
    pub fn open_catalog(&self) -> Result<Catalog<FileStore>> {
        let database = self.environment.database();
        debug!(root = %self.store_root.display(), database, "Opening store");

        let store = FileStore::open(&self.store_root, database).with_context(|| {
            format!("Failed to open store at {}", self.store_root.display())
        })?;
        Ok(Catalog::new(store))
    }
}

fn default_store_root() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "songlake").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("store"))
}
