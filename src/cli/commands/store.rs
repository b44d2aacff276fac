//! Store command - record where an artifact was found

use super::{artifact_key, descriptor_hash, open_cache};
use crate::cli::args::StoreArgs;
use crate::config::Config;
use crate::error::{ArtcacheError, ArtcacheResult};
use console::style;
use std::fs;
use std::path::Path;
use std::time::UNIX_EPOCH;
use tracing::info;

/// Execute the store command
pub fn execute(args: StoreArgs, config: &Config) -> ArtcacheResult<()> {
    let key = artifact_key(&args.artifact)?;
    let hash = descriptor_hash(&args.descriptor)?;
    let last_modified = match args.last_modified {
        Some(millis) => millis,
        None => file_last_modified(&args.path)?,
    };

    let cache = open_cache(config);
    cache.store(&key, &args.path, hash, last_modified)?;

    info!("Stored {} -> {}", key, args.path.display());
    println!(
        "{} {} {} {}",
        style("✓").green(),
        key,
        style("->").dim(),
        args.path.display()
    );
    Ok(())
}

/// Modification time in epoch millis; zero when the file does not exist
fn file_last_modified(path: &Path) -> ArtcacheResult<i64> {
    let metadata = match fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(ArtcacheError::io(format!("reading {}", path.display()), e)),
    };

    let modified = metadata
        .modified()
        .map_err(|e| ArtcacheError::io(format!("reading mtime of {}", path.display()), e))?;
    Ok(modified
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn last_modified_of_missing_file_is_zero() {
        assert_eq!(file_last_modified(Path::new("/nonexistent/a.jar")).unwrap(), 0);
    }

    #[test]
    fn last_modified_of_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.jar");
        fs::write(&path, b"jar").unwrap();
        assert!(file_last_modified(&path).unwrap() > 0);
    }
}
