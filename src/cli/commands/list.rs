//! List command - show every entry in the persistent index

use super::open_index;
use crate::cache::time::format_millis;
use crate::cache::{ArtifactAtRepositoryKey, CachedArtifact};
use crate::cli::args::{ListArgs, OutputFormat};
use crate::config::Config;
use crate::error::ArtcacheResult;
use console::style;
use serde::Serialize;

/// One index record, flattened for output
#[derive(Debug, Serialize)]
struct ListedEntry<'a> {
    repository: &'a str,
    artifact: String,
    #[serde(flatten)]
    entry: &'a CachedArtifact,
}

/// Execute the list command
pub fn execute(args: ListArgs, config: &Config) -> ArtcacheResult<()> {
    let index = open_index(config);
    let entries: Vec<(ArtifactAtRepositoryKey, CachedArtifact)> = index
        .entries()?
        .into_iter()
        .filter(|(key, entry)| {
            args.repo.as_deref().map_or(true, |repo| key.repository_id() == repo)
                && (!args.missing || entry.is_missing())
        })
        .collect();

    if entries.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!(
                "{} No cached entries in {}",
                style("i").blue(),
                index.path().display()
            ),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&entries),
        OutputFormat::Json => print_json(&entries)?,
        OutputFormat::Plain => print_plain(&entries),
    }

    Ok(())
}

fn print_table(entries: &[(ArtifactAtRepositoryKey, CachedArtifact)]) {
    println!(
        "{:<16} {:<48} {:<9} {:<20}",
        style("REPOSITORY").bold(),
        style("ARTIFACT").bold(),
        style("STATE").bold(),
        style("CACHED AT").bold()
    );
    println!("{}", "-".repeat(96));

    for (key, entry) in entries {
        let state = if entry.is_missing() {
            style("missing").yellow()
        } else {
            style("present").green()
        };

        println!(
            "{:<16} {:<48} {:<9} {:<20}",
            key.repository_id(),
            key.artifact_id().to_string(),
            state,
            format_millis(entry.cached_at())
        );
    }

    println!();
    println!("{} entry(ies)", entries.len());
}

fn print_json(entries: &[(ArtifactAtRepositoryKey, CachedArtifact)]) -> ArtcacheResult<()> {
    let listed: Vec<ListedEntry<'_>> = entries
        .iter()
        .map(|(key, entry)| ListedEntry {
            repository: key.repository_id(),
            artifact: key.artifact_id().to_string(),
            entry,
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&listed)?);
    Ok(())
}

fn print_plain(entries: &[(ArtifactAtRepositoryKey, CachedArtifact)]) {
    for (key, _) in entries {
        println!("{}", key);
    }
}
