//! Store-missing command - record that an artifact was not found

use super::{artifact_key, descriptor_hash, open_cache};
use crate::cli::args::StoreMissingArgs;
use crate::config::Config;
use crate::error::ArtcacheResult;
use console::style;
use tracing::info;

/// Execute the store-missing command
pub fn execute(args: StoreMissingArgs, config: &Config) -> ArtcacheResult<()> {
    let key = artifact_key(&args.artifact)?;
    let hash = descriptor_hash(&args.descriptor)?;
    let attempted = args.locations.len();

    let cache = open_cache(config);
    cache.store_missing(&key, args.locations, hash)?;

    info!("Stored missing entry for {} ({} locations)", key, attempted);
    println!(
        "{} {} {}",
        style("✓").green(),
        key,
        style(format!("missing, {} location(s) tried", attempted)).dim()
    );
    Ok(())
}
