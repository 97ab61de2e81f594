//! Injected persistence contracts and their built-in implementations.
//!
//! The engine treats storage as a collaborator: profiles live in an
//! external profile store, bandit state round-trips through a keyed store
//! that must preserve arm ordering exactly. In-memory implementations back
//! tests and CLI fixtures; the JSON store backs real deployments of the
//! library without a database.

pub mod json;
pub mod memory;

pub use json::JsonBanditStore;
pub use memory::{MemoryBanditStore, MemoryProfileStore};

use crate::bandit::BanditState;
use crate::error::Result;
use crate::types::CandidateProfile;

/// Derived fields the engine is allowed to write back to a profile.
#[derive(Debug, Clone, Default)]
pub struct DerivedFields {
    pub ability_cluster: Option<String>,
    pub exceptional_score: Option<f64>,
}

/// Read access to candidate profiles plus write access to derived fields.
pub trait ProfileStore: Send + Sync {
    fn get_profile(&self, id: &str) -> Result<Option<CandidateProfile>>;

    /// Write back derived fields only; the rest of the profile is owned by
    /// the external system.
    fn put_derived_fields(&self, id: &str, fields: &DerivedFields) -> Result<()>;
}

/// Keyed persistence for per-role bandit state.
///
/// `save` must fail with `PersistenceConflict` when the persisted version
/// is newer than the one being written (stale load-then-save), and a
/// `load` after `save` must reproduce arm ordering verbatim.
pub trait BanditStore: Send + Sync {
    fn load(&self, role_id: &str) -> Result<Option<BanditState>>;
    fn save(&self, state: &BanditState) -> Result<()>;

    /// Move a closed role's state out of the active set.
    fn archive(&self, role_id: &str) -> Result<()>;
}
