//! Optional sweeper for generated WAV files.
//!
//! Without it every file returned by `/tts` stays on disk until the caller
//! deletes it.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tracing::{info, warn};
use tts_core::wav::{TEMP_WAV_PREFIX, TEMP_WAV_SUFFIX};

/// Delete generated WAV files in `dir` whose modification time is at least
/// `ttl` ago. Files not written by the server are left alone.
pub fn sweep_expired(dir: &Path, ttl: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(TEMP_WAV_PREFIX) || !name.ends_with(TEMP_WAV_SUFFIX) {
            continue;
        }

        let metadata = match entry.metadata() {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        let age = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .unwrap_or_default();

        if age >= ttl {
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!("Failed to remove {}: {e}", entry.path().display()),
            }
        }
    }

    Ok(removed)
}

/// Sweep `dir` forever, twice per TTL period.
pub async fn run_sweeper(dir: PathBuf, ttl: Duration) {
    let period = (ttl / 2).max(Duration::from_secs(1));
    let mut interval = tokio::time::interval(period);

    loop {
        interval.tick().await;

        let sweep_dir = dir.clone();
        match tokio::task::spawn_blocking(move || sweep_expired(&sweep_dir, ttl)).await {
            Ok(Ok(0)) => {}
            Ok(Ok(removed)) => info!(removed, dir = %dir.display(), "Removed expired audio files"),
            Ok(Err(e)) => warn!("Failed to sweep {}: {e}", dir.display()),
            Err(e) => warn!("Sweep task failed: {e}"),
        }
    }
}
