//! Lookup command - show the cached resolution for one artifact

use super::{artifact_key, open_cache};
use crate::cache::time::format_millis;
use crate::cache::CachedArtifact;
use crate::cli::args::{LookupArgs, OutputFormat};
use crate::config::Config;
use crate::error::ArtcacheResult;
use console::style;

/// Execute the lookup command
pub fn execute(args: LookupArgs, config: &Config) -> ArtcacheResult<()> {
    let key = artifact_key(&args.artifact)?;
    let entry = open_cache(config).lookup(&key)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entry)?),
        OutputFormat::Plain => print_plain(entry.as_ref()),
        OutputFormat::Table => match &entry {
            Some(entry) => print_table(&key.to_string(), entry),
            None => println!("{} {} is not cached", style("!").yellow(), key),
        },
    }
    Ok(())
}

fn print_table(key: &str, entry: &CachedArtifact) {
    println!("{}", style(key).bold());

    match entry {
        CachedArtifact::Present {
            cached_file,
            cached_file_last_modified,
            ..
        } => {
            println!("  {:<16} {}", "state", style("present").green());
            println!("  {:<16} {}", "file", cached_file.display());
            println!(
                "  {:<16} {}",
                "last modified",
                format_millis(*cached_file_last_modified)
            );
        }
        CachedArtifact::Missing {
            attempted_locations,
            ..
        } => {
            println!("  {:<16} {}", "state", style("missing").yellow());
            for (n, location) in attempted_locations.iter().enumerate() {
                let label = if n == 0 { "tried" } else { "" };
                println!("  {:<16} {}", label, location);
            }
        }
    }

    println!("  {:<16} {}", "cached at", format_millis(entry.cached_at()));
    println!("  {:<16} {}", "descriptor hash", entry.descriptor_hash());
}

fn print_plain(entry: Option<&CachedArtifact>) {
    match entry {
        None => println!("none"),
        Some(CachedArtifact::Present { cached_file, .. }) => {
            println!("present {}", cached_file.display())
        }
        Some(CachedArtifact::Missing {
            attempted_locations,
            ..
        }) => {
            println!("missing");
            for location in attempted_locations {
                println!("{}", location);
            }
        }
    }
}
