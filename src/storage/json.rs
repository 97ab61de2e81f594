//! File-backed bandit store: one JSON document per role.
//!
//! Writes go through a temp file and an atomic rename so a crash mid-save
//! never leaves a truncated state file behind.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::bandit::BanditState;
use crate::error::{Result, ScoutError};

use super::BanditStore;

pub struct JsonBanditStore {
    dir: PathBuf,
    // Serializes the load-compare-write cycle across threads in this
    // process; cross-process races are caught by the version check.
    write_lock: Mutex<()>,
}

impl JsonBanditStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn state_path(&self, role_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize(role_id)))
    }

    fn archive_path(&self, role_id: &str) -> PathBuf {
        self.dir.join("archive").join(format!("{}.json", sanitize(role_id)))
    }

    fn read_state(path: &Path) -> Result<Option<BanditState>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)?;
        let state: BanditState = serde_json::from_str(&contents)?;
        state.validate()?;
        Ok(Some(state))
    }

    fn write_atomic(path: &Path, json: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, json)?;
        match std::fs::rename(&temp_path, path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                std::fs::remove_file(path)?;
                if let Err(err) = std::fs::rename(&temp_path, path) {
                    let _ = std::fs::remove_file(&temp_path);
                    return Err(ScoutError::Io(err));
                }
                Ok(())
            }
            Err(err) => {
                let _ = std::fs::remove_file(&temp_path);
                Err(ScoutError::Io(err))
            }
        }
    }
}

impl BanditStore for JsonBanditStore {
    fn load(&self, role_id: &str) -> Result<Option<BanditState>> {
        Self::read_state(&self.state_path(role_id))
    }

    fn save(&self, state: &BanditState) -> Result<()> {
        state.validate()?;
        let _guard = self.write_lock.lock();

        let path = self.state_path(&state.role_id);
        if let Some(existing) = Self::read_state(&path)? {
            if existing.version > state.version {
                return Err(ScoutError::PersistenceConflict(format!(
                    "role {} has persisted version {} newer than {}",
                    state.role_id, existing.version, state.version
                )));
            }
        }

        let json = serde_json::to_string_pretty(state)?;
        Self::write_atomic(&path, &json)?;
        debug!(role = %state.role_id, version = state.version, "bandit state saved");
        Ok(())
    }

    fn archive(&self, role_id: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let path = self.state_path(role_id);
        if !path.exists() {
            return Err(ScoutError::RoleNotFound(role_id.to_string()));
        }
        let target = self.archive_path(role_id);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::rename(&path, &target)?;
        debug!(role = %role_id, "bandit state archived");
        Ok(())
    }
}

fn sanitize(role_id: &str) -> String {
    role_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state(role: &str, version: u64) -> BanditState {
        let mut state = BanditState::new(role);
        state.arms = vec!["c0".into(), "c1".into(), "c2".into()];
        state.alpha = vec![5.0, 3.0, 1.0];
        state.beta = vec![1.0, 3.0, 5.0];
        state.version = version;
        state
    }

    #[test]
    fn round_trip_preserves_arm_order() {
        let dir = TempDir::new().unwrap();
        let store = JsonBanditStore::new(dir.path()).unwrap();
        store.save(&state("role-1", 1)).unwrap();

        let loaded = store.load("role-1").unwrap().unwrap();
        assert_eq!(loaded.arms, vec!["c0", "c1", "c2"]);
        assert_eq!(loaded.alpha, vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn missing_role_loads_none() {
        let dir = TempDir::new().unwrap();
        let store = JsonBanditStore::new(dir.path()).unwrap();
        assert!(store.load("missing").unwrap().is_none());
    }

    #[test]
    fn stale_save_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonBanditStore::new(dir.path()).unwrap();
        store.save(&state("role-1", 5)).unwrap();
        assert!(matches!(
            store.save(&state("role-1", 2)),
            Err(ScoutError::PersistenceConflict(_))
        ));
    }

    #[test]
    fn archive_moves_the_state_file() {
        let dir = TempDir::new().unwrap();
        let store = JsonBanditStore::new(dir.path()).unwrap();
        store.save(&state("role-1", 1)).unwrap();
        store.archive("role-1").unwrap();

        assert!(store.load("role-1").unwrap().is_none());
        assert!(dir.path().join("archive/role-1.json").exists());
    }

    #[test]
    fn role_ids_are_sanitized_into_filenames() {
        let dir = TempDir::new().unwrap();
        let store = JsonBanditStore::new(dir.path()).unwrap();
        store.save(&state("acme/staff eng", 1)).unwrap();
        assert!(store.load("acme/staff eng").unwrap().is_some());
    }

    #[test]
    fn corrupt_state_is_surfaced_not_swallowed() {
        let dir = TempDir::new().unwrap();
        let store = JsonBanditStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("bad.json"), "{not json").unwrap();
        assert!(store.load("bad").is_err());
    }
}
