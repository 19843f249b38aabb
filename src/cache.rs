//! Remembers where a reader left off in Listen Mode, per book.
//!
//! Files are stored under the configured cache directory using a hash of the
//! book id as the directory name to avoid filesystem issues. The format is a
//! tiny TOML file with the page and playback time. Sentence timelines are
//! never stored here; they are rebuilt for every page.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ListenPosition {
    pub page: usize,
    pub current_time: f64,
}

pub fn hash_dir(cache_root: &Path, book_id: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(book_id.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    cache_root.join(hash)
}

fn position_path(cache_root: &Path, book_id: &str) -> PathBuf {
    hash_dir(cache_root, book_id).join("listen.toml")
}

/// Load the cached listening position for a book, if present and readable.
pub fn load_listen_position(cache_root: &Path, book_id: &str) -> Option<ListenPosition> {
    let path = position_path(cache_root, book_id);
    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<ListenPosition>(&data) {
        Ok(position) => Some(position),
        Err(err) => {
            warn!(path = %path.display(), "Ignoring unreadable listen position: {err}");
            None
        }
    }
}

/// Persist the listening position for a book. Failures are logged and
/// otherwise ignored so playback never stalls on disk errors.
pub fn save_listen_position(cache_root: &Path, book_id: &str, position: ListenPosition) {
    let path = position_path(cache_root, book_id);
    if let Some(parent) = path.parent() {
        if let Err(err) = fs::create_dir_all(parent) {
            warn!(path = %parent.display(), "Failed to create cache dir: {err}");
            return;
        }
    }
    let contents = match toml::to_string(&position) {
        Ok(contents) => contents,
        Err(err) => {
            warn!("Failed to serialize listen position: {err}");
            return;
        }
    };
    match fs::write(&path, contents) {
        Ok(()) => debug!(
            path = %path.display(),
            page = position.page,
            current_time = position.current_time,
            "Saved listen position"
        ),
        Err(err) => warn!(path = %path.display(), "Failed to write listen position: {err}"),
    }
}
