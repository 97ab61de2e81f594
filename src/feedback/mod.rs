//! Feedback interpretation and the learning tracker.
//!
//! Free-text recruiter feedback is turned into a bounded reward by an
//! explicit interpreter capability (deterministic lexical classifier or an
//! LLM-backed one, chosen by configuration). The tracker drives policy
//! updates from accepted events and persists state synchronously so a
//! crash never loses an accepted observation.

pub mod interpreter;
pub mod tracker;

pub use interpreter::{
    FeedbackInterpreter, LexicalInterpreter, LlmClient, LlmInterpreter, reward_from_grade,
};
pub use tracker::LearningTracker;
