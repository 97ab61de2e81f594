//! Learning tracker: the keyed registry of per-role policies and the
//! update path that keeps them persisted.
//!
//! Each role's `RolePolicy` sits behind its own mutex so unrelated roles
//! never serialize on each other; the registry map itself is only locked
//! long enough to fetch the `Arc`. State is saved inside the update
//! critical section, so an accepted feedback event survives a crash that
//! happens right after `submit` returns.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::bandit::{LearningMetrics, RolePolicy};
use crate::config::BanditConfig;
use crate::error::{Result, ScoutError};
use crate::similarity::SimilarityEstimator;
use crate::storage::{BanditStore, ProfileStore};
use crate::types::{CandidateProfile, FeedbackEvent, RoleContext};

pub struct LearningTracker {
    config: BanditConfig,
    policies: RwLock<HashMap<String, Arc<Mutex<RolePolicy>>>>,
    store: Arc<dyn BanditStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl LearningTracker {
    #[must_use]
    pub fn new(
        config: BanditConfig,
        store: Arc<dyn BanditStore>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            config,
            policies: RwLock::new(HashMap::new()),
            store,
            profiles,
        }
    }

    /// Initialize (or resume) the selection policy for a role.
    ///
    /// Persisted state takes precedence over a fresh warm start so that a
    /// restart reproduces the exact arm-index-to-candidate mapping.
    pub fn initialize(
        &self,
        role_id: &str,
        candidates: &[CandidateProfile],
        role: &RoleContext,
        estimator: &SimilarityEstimator,
    ) -> Result<()> {
        let policy = if let Some(state) = self.store.load(role_id)? {
            info!(role = %role_id, arms = state.len(), "resuming persisted policy");
            RolePolicy::resume(state, self.config.clone())?
        } else {
            let mut policy = RolePolicy::new(role_id, self.config.clone());
            policy.initialize(candidates, role, estimator)?;
            self.store.save(policy.state())?;
            policy
        };

        self.policies
            .write()
            .insert(role_id.to_string(), Arc::new(Mutex::new(policy)));
        Ok(())
    }

    /// Fetch the policy handle for a role.
    pub fn policy(&self, role_id: &str) -> Result<Arc<Mutex<RolePolicy>>> {
        self.policies
            .read()
            .get(role_id)
            .cloned()
            .ok_or_else(|| ScoutError::RoleNotFound(role_id.to_string()))
    }

    /// Thompson-select a candidate for the role.
    pub fn select(&self, role_id: &str) -> Result<String> {
        let policy = self.policy(role_id)?;
        let policy = policy.lock();
        let arm = policy.select()?;
        Ok(policy.state().arms[arm].clone())
    }

    /// The candidate's current posterior mean, when it is an arm.
    pub fn posterior_mean(&self, role_id: &str, candidate_id: &str) -> Option<f64> {
        let policy = self.policy(role_id).ok()?;
        let policy = policy.lock();
        policy
            .state()
            .arm_index_of(candidate_id)
            .map(|arm| policy.state().posterior_mean(arm))
    }

    /// Apply one feedback event and persist the mutated state before
    /// returning. Update order within a role follows acceptance order; the
    /// per-role mutex makes each alpha/beta read-modify-write atomic.
    pub fn submit(&self, event: &FeedbackEvent) -> Result<LearningMetrics> {
        // An arm whose profile has since been deleted points at state the
        // rest of the system no longer agrees on.
        if self.profiles.get_profile(&event.candidate_id)?.is_none() {
            return Err(ScoutError::PersistenceConflict(format!(
                "feedback for candidate {} whose profile no longer exists",
                event.candidate_id
            )));
        }

        let policy = self.policy(&event.role_id)?;
        let mut policy = policy.lock();

        let arm = policy
            .state()
            .arm_index_of(&event.candidate_id)
            .ok_or_else(|| {
                ScoutError::UnknownArm(format!(
                    "candidate {} is not an arm of role {}",
                    event.candidate_id, event.role_id
                ))
            })?;

        policy.update(arm, event.reward, event.is_qualified)?;
        self.store.save(policy.state())?;

        debug!(
            role = %event.role_id,
            candidate = %event.candidate_id,
            reward = event.reward,
            version = policy.state().version,
            "feedback applied"
        );
        Ok(policy.metrics())
    }

    /// Close a role: no further selection or learning, state archived.
    pub fn close_role(&self, role_id: &str) -> Result<()> {
        let policy = self.policy(role_id)?;
        {
            let mut policy = policy.lock();
            policy.close();
            self.store.save(policy.state())?;
        }
        self.store.archive(role_id)?;
        self.policies.write().remove(role_id);
        info!(role = %role_id, "role closed and archived");
        Ok(())
    }

    /// Current metrics snapshot for a role.
    pub fn metrics(&self, role_id: &str) -> Result<LearningMetrics> {
        let policy = self.policy(role_id)?;
        let policy = policy.lock();
        Ok(policy.metrics())
    }
}
