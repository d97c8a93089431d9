use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::card::SuitCount;
use crate::error::StoreError;

/// Well-known key the snapshot is stored under.
pub const STORAGE_KEY: &str = "spider-solitaire-game";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settings {
    /// Suit count for games dealt without an explicit choice.
    pub suit_count: SuitCount,
    /// Seed for the first deal; later new games use fresh entropy.
    pub seed: Option<u64>,
}

impl Settings {
    pub fn with_seed(suit_count: SuitCount, seed: u64) -> Self {
        Settings {
            suit_count,
            seed: Some(seed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    pub data_dir: PathBuf,
    pub snapshot_file: PathBuf,
}

impl StorePaths {
    /// Keep the snapshot in `dir` rather than the platform data directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let data_dir = dir.as_ref().to_path_buf();
        let snapshot_file = data_dir.join(format!("{STORAGE_KEY}.dat"));
        StorePaths {
            data_dir,
            snapshot_file,
        }
    }
}

/// Platform data directory for the snapshot.
pub fn project_paths() -> Result<StorePaths, StoreError> {
    let dirs = ProjectDirs::from("com", "spider", "spider-solitaire").ok_or(StoreError::NoProjectDir)?;
    Ok(StorePaths::in_dir(dirs.data_dir()))
}
