//! Ingest command implementation.

use std::io::{self, Read};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Deserialize;

use songlake_core::NewSong;

use crate::commands::{parse_tag, with_deadline};
use crate::config::Config;
use crate::output;

#[derive(Args, Debug)]
pub struct IngestArgs {
    /// JSON file with one song or an array of songs (use - for stdin)
    #[arg(long, conflicts_with_all = ["uri", "name", "mime_type", "tags"])]
    pub json: Option<String>,

    /// Location of the media payload
    #[arg(long)]
    pub uri: Option<String>,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Content type of the media payload
    #[arg(long)]
    pub mime_type: Option<String>,

    /// Tag as NAME=VALUE (repeatable)
    #[arg(long = "tag", value_name = "NAME=VALUE")]
    pub tags: Vec<String>,
}

/// Accepts either a bare song or a batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum Batch {
    Many(Vec<NewSong>),
    One(NewSong),
}

impl From<Batch> for Vec<NewSong> {
    fn from(batch: Batch) -> Self {
        match batch {
            Batch::Many(songs) => songs,
            Batch::One(song) => vec![song],
        }
    }
}

pub async fn run(args: IngestArgs, config: &Config) -> Result<()> {
    let songs = read_songs(&args)?;
    let catalog = config.open_catalog()?;

    let ids = with_deadline(config, "ingest", catalog.ingest(songs))
        .await
        .context("Failed to add songs")?;

    for id in &ids {
        println!("{}", id);
    }
    output::success(&format!("Added {} song(s)", ids.len()));

    Ok(())
}

fn read_songs(args: &IngestArgs) -> Result<Vec<NewSong>> {
    if let Some(path) = &args.json {
        let content = if path == "-" {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path).context("Failed to read JSON file")?
        };
        return parse_batch(&content);
    }

    let Some(uri) = &args.uri else {
        bail!("Either --json or --uri is required");
    };

    let mut song = NewSong::new(uri.as_str());
    song.name = args.name.clone();
    song.mime_type = args.mime_type.clone();
    for raw in &args.tags {
        let (name, value) = parse_tag(raw)?;
        song = song.with_tag(name, value);
    }
    Ok(vec![song])
}

fn parse_batch(content: &str) -> Result<Vec<NewSong>> {
    let batch: Batch = serde_json::from_str(content).context("Invalid song JSON")?;
    Ok(batch.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_song_and_batch() {
        let one = parse_batch(r#"{"uri": "gs://a.mp3", "mimeType": "audio/mpeg"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].mime_type.as_deref(), Some("audio/mpeg"));

        let many = parse_batch(
            r#"[{"uri": "gs://a.mp3"}, {"uri": "gs://b.mp3", "tags": {"genre": "rock"}}]"#,
        )
        .unwrap();
        assert_eq!(many.len(), 2);
        assert_eq!(many[1].tags.get("genre").map(String::as_str), Some("rock"));

        assert!(parse_batch("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_caller_supplied_id() {
        assert!(parse_batch(r#"{"id": "60330f9e6fdbdb246a93b7a6", "uri": "gs://a.mp3"}"#).is_err());
    }

    #[test]
    fn builds_song_from_flags() {
        let args = IngestArgs {
            json: None,
            uri: Some("gs://a.mp3".to_string()),
            name: Some("Rock Song".to_string()),
            mime_type: None,
            tags: vec!["genre=rock".to_string()],
        };
        let songs = read_songs(&args).unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].name.as_deref(), Some("Rock Song"));
        assert_eq!(songs[0].tags.get("genre").map(String::as_str), Some("rock"));
    }

    #[test]
    fn requires_uri_or_json() {
        let args = IngestArgs {
            json: None,
            uri: None,
            name: None,
            mime_type: None,
            tags: Vec::new(),
        };
        assert!(read_songs(&args).is_err());
    }
}
