//! Clear command - forget a cached resolution

use super::{artifact_key, open_cache};
use crate::cli::args::ClearArgs;
use crate::config::Config;
use crate::error::ArtcacheResult;
use console::style;
use tracing::info;

/// Execute the clear command
pub fn execute(args: ClearArgs, config: &Config) -> ArtcacheResult<()> {
    let key = artifact_key(&args.artifact)?;

    open_cache(config).clear(&key)?;

    info!("Cleared {}", key);
    println!("{} Cleared {}", style("✓").green(), key);
    Ok(())
}
