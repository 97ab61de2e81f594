use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Debug, Error)]
pub enum ScoutError {
    /// Operation attempted on a policy that is uninitialized or closed.
    #[error("invalid policy state: {0}")]
    InvalidState(String),

    /// Feedback references a candidate that is not an arm of the role's policy.
    #[error("unknown arm: {0}")]
    UnknownArm(String),

    /// A computation was requested over zero usable attributes.
    ///
    /// Internal paths degrade to neutral signals instead of raising this;
    /// it only surfaces when a caller explicitly asks for a score that has
    /// no inputs at all.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A save observed a newer persisted version than the one it loaded,
    /// or feedback arrived for a candidate whose profile no longer exists.
    #[error("persistence conflict: {0}")]
    PersistenceConflict(String),

    #[error("role not found: {0}")]
    RoleNotFound(String),

    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// A batch operation observed its cancellation token mid-run.
    #[error("operation cancelled")]
    Cancelled,

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
