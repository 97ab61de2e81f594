//! Adaptive selection policy: warm-started Thompson Sampling per role.
//!
//! Each open role owns one independent `RolePolicy`. Arms are candidates,
//! bound to stable indices at initialization; belief about each arm is a
//! Beta posterior seeded from the candidate's similarity to the role.

pub mod policy;
pub mod prior;
pub mod state;

pub use policy::{LearningMetrics, PolicyPhase, RolePolicy};
pub use prior::to_prior;
pub use state::{BanditState, MetricSample};
