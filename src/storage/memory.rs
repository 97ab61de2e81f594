//! In-memory stores for tests, fixtures, and embedding callers that bring
//! their own persistence.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::bandit::BanditState;
use crate::error::{Result, ScoutError};
use crate::types::CandidateProfile;

use super::{BanditStore, DerivedFields, ProfileStore};

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<HashMap<String, CandidateProfile>>,
}

impl MemoryProfileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: CandidateProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }

    pub fn remove(&self, id: &str) {
        self.profiles.write().remove(id);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.read().is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    fn get_profile(&self, id: &str) -> Result<Option<CandidateProfile>> {
        Ok(self.profiles.read().get(id).cloned())
    }

    fn put_derived_fields(&self, id: &str, fields: &DerivedFields) -> Result<()> {
        let mut profiles = self.profiles.write();
        let profile = profiles
            .get_mut(id)
            .ok_or_else(|| ScoutError::ProfileNotFound(id.to_string()))?;
        if let Some(cluster) = &fields.ability_cluster {
            profile.ability_cluster = Some(cluster.clone());
        }
        if let Some(score) = fields.exceptional_score {
            profile.exceptional_score = Some(score);
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryBanditStore {
    active: RwLock<HashMap<String, BanditState>>,
    archived: RwLock<HashMap<String, BanditState>>,
}

impl MemoryBanditStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn archived_roles(&self) -> Vec<String> {
        self.archived.read().keys().cloned().collect()
    }
}

impl BanditStore for MemoryBanditStore {
    fn load(&self, role_id: &str) -> Result<Option<BanditState>> {
        Ok(self.active.read().get(role_id).cloned())
    }

    fn save(&self, state: &BanditState) -> Result<()> {
        state.validate()?;
        let mut active = self.active.write();
        if let Some(existing) = active.get(&state.role_id) {
            if existing.version > state.version {
                return Err(ScoutError::PersistenceConflict(format!(
                    "role {} has persisted version {} newer than {}",
                    state.role_id, existing.version, state.version
                )));
            }
        }
        active.insert(state.role_id.clone(), state.clone());
        Ok(())
    }

    fn archive(&self, role_id: &str) -> Result<()> {
        let state = self
            .active
            .write()
            .remove(role_id)
            .ok_or_else(|| ScoutError::RoleNotFound(role_id.to_string()))?;
        self.archived.write().insert(role_id.to_string(), state);
        Ok(())
    }
}
