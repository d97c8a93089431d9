use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{info, warn};

use crate::config::{Settings, StorePaths, project_paths};
use crate::error::StoreError;
use crate::observer::StateObserver;
use crate::state::GameState;

type HmacSha256 = Hmac<Sha256>;

const SECRET_KEY: &[u8] = b"spider_snapshot_key_keep_it_honest";
const HMAC_SIZE: usize = 32;

/// The persisted game: `bincode(state)` followed by its HMAC-SHA256 tag.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    paths: StorePaths,
}

impl SnapshotStore {
    pub fn new(paths: StorePaths) -> Self {
        SnapshotStore { paths }
    }

    /// Store in the platform data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(project_paths()?))
    }

    pub fn path(&self) -> &Path {
        &self.paths.snapshot_file
    }

    /// Read the saved game. `Ok(None)` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<GameState>, StoreError> {
        let mut file = match File::open(self.path()) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut data = Vec::new();
        file.read_to_end(&mut data)?;

        if data.len() < HMAC_SIZE {
            return Err(StoreError::Truncated);
        }
        let (payload, signature) = data.split_at(data.len() - HMAC_SIZE);

        let mut mac = Self::mac()?;
        mac.update(payload);
        mac.verify_slice(signature).map_err(|_| StoreError::Signature)?;

        let state: GameState = bincode::deserialize(payload)?;
        state.validate()?;
        Ok(Some(state))
    }

    /// The saved game if it is usable, otherwise a fresh deal.
    pub fn load_or_new(&self, settings: &Settings) -> GameState {
        match self.load() {
            Ok(Some(state)) => {
                info!(path = %self.path().display(), "resumed saved game");
                state
            }
            Ok(None) => GameState::deal(settings.suit_count, settings.seed),
            Err(e) => {
                warn!(error = %e, path = %self.path().display(), "discarding saved game");
                GameState::deal(settings.suit_count, settings.seed)
            }
        }
    }

    /// Write the snapshot atomically: temp file, fsync, then rename.
    pub fn save(&self, state: &GameState) -> Result<(), StoreError> {
        fs::create_dir_all(&self.paths.data_dir)?;

        let mut data = bincode::serialize(state)?;
        let mut mac = Self::mac()?;
        mac.update(&data);
        data.extend_from_slice(&mac.finalize().into_bytes());

        let tmp = self.path().with_extension("tmp");
        let written = File::create(&tmp).and_then(|mut f| {
            f.write_all(&data)?;
            f.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        fs::rename(&tmp, self.path())?;
        Ok(())
    }

    fn mac() -> Result<HmacSha256, StoreError> {
        HmacSha256::new_from_slice(SECRET_KEY).map_err(|_| StoreError::Signature)
    }
}

impl StateObserver for SnapshotStore {
    fn state_changed(&mut self, state: &GameState) {
        if let Err(e) = self.save(state) {
            warn!(error = %e, path = %self.path().display(), "failed to save game");
        }
    }
}
