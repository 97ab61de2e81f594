//! Engine facade: wires the estimator, scorer, clusterer, screener, and
//! learning tracker behind the library's public operations.
//!
//! Each role's bandit state sits behind its own lock inside the tracker,
//! so screening and learning on unrelated roles never serialize. Cluster
//! models are immutable snapshots swapped in atomically; concurrent
//! readers never observe a half-updated run.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::cancel::CancellationToken;
use crate::clustering::{ClusterModel, TalentClusterer};
use crate::config::{Config, InterpreterKind};
use crate::error::{Result, ScoutError};
use crate::feedback::{
    FeedbackInterpreter, LearningTracker, LexicalInterpreter, LlmClient, LlmInterpreter,
};
use crate::bandit::LearningMetrics;
use crate::scoring::ExceptionalScorer;
use crate::screening::ScreeningEngine;
use crate::similarity::{EmbeddingProvider, SimilarityEstimator};
use crate::storage::{BanditStore, DerivedFields, ProfileStore};
use crate::types::{CandidateProfile, Decision, FeedbackEvent, RoleContext};

pub struct ScoutEngine {
    estimator: Arc<SimilarityEstimator>,
    scorer: ExceptionalScorer,
    clusterer: TalentClusterer,
    screener: ScreeningEngine,
    tracker: LearningTracker,
    profiles: Arc<dyn ProfileStore>,
    interpreter: Arc<dyn FeedbackInterpreter>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    cluster_model: RwLock<Option<Arc<ClusterModel>>>,
}

impl ScoutEngine {
    /// Build an engine over injected stores. The feedback interpreter
    /// variant follows `config.feedback.interpreter`; the `Llm` variant
    /// additionally requires a client via [`Self::with_llm_client`].
    pub fn new(
        config: Config,
        profiles: Arc<dyn ProfileStore>,
        bandit_store: Arc<dyn BanditStore>,
    ) -> Result<Self> {
        if config.feedback.interpreter == InterpreterKind::Llm {
            return Err(ScoutError::Config(
                "llm feedback interpreter requires a client; use with_llm_client".to_string(),
            ));
        }
        Self::build(config, profiles, bandit_store, Arc::new(LexicalInterpreter::new()))
    }

    /// Build an engine with an LLM-backed feedback interpreter.
    pub fn with_llm_client(
        config: Config,
        profiles: Arc<dyn ProfileStore>,
        bandit_store: Arc<dyn BanditStore>,
        client: Arc<dyn LlmClient>,
    ) -> Result<Self> {
        let interpreter: Arc<dyn FeedbackInterpreter> = match config.feedback.interpreter {
            InterpreterKind::Lexical => Arc::new(LexicalInterpreter::new()),
            InterpreterKind::Llm => Arc::new(LlmInterpreter::new(client)),
        };
        Self::build(config, profiles, bandit_store, interpreter)
    }

    fn build(
        config: Config,
        profiles: Arc<dyn ProfileStore>,
        bandit_store: Arc<dyn BanditStore>,
        interpreter: Arc<dyn FeedbackInterpreter>,
    ) -> Result<Self> {
        Ok(Self {
            estimator: Arc::new(SimilarityEstimator::new(config.similarity.clone())),
            scorer: ExceptionalScorer::new(config.scoring.clone()),
            clusterer: TalentClusterer::new(config.clustering.clone()),
            screener: ScreeningEngine::new(config.screening.clone()),
            tracker: LearningTracker::new(
                config.bandit.clone(),
                bandit_store,
                profiles.clone(),
            ),
            profiles,
            interpreter,
            embedder: None,
            cluster_model: RwLock::new(None),
        })
    }

    /// Attach an embedding provider used to backfill dense representations
    /// for profiles that arrive without one.
    #[must_use]
    pub fn with_embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Backfill a missing embedding from the provider, when one is
    /// attached. Profile text is the tag set plus education entries.
    fn ensure_embedding(&self, candidate: &CandidateProfile) -> CandidateProfile {
        if candidate.embedding.is_some() {
            return candidate.clone();
        }
        let Some(embedder) = &self.embedder else {
            return candidate.clone();
        };

        let text = candidate
            .tags
            .iter()
            .map(String::as_str)
            .chain(candidate.education.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        let mut backfilled = candidate.clone();
        if !text.is_empty() {
            backfilled.embedding = Some(embedder.embed(&text));
        }
        backfilled
    }

    /// Initialize (or resume) the selection policy for an open role.
    pub fn initialize_policy(
        &self,
        role_id: &str,
        candidates: &[CandidateProfile],
        role: &RoleContext,
    ) -> Result<()> {
        self.tracker
            .initialize(role_id, candidates, role, &self.estimator)
    }

    /// Thompson-select the next candidate to advance for a role.
    pub fn select(&self, role_id: &str) -> Result<String> {
        self.tracker.select(role_id)
    }

    /// Apply one graded feedback observation and return the updated
    /// learning metrics. State is persisted before this returns.
    pub fn submit_feedback(
        &self,
        role_id: &str,
        candidate_id: &str,
        reward: f64,
        is_qualified: Option<bool>,
    ) -> Result<LearningMetrics> {
        let mut event = FeedbackEvent::new(candidate_id, role_id, reward);
        event.is_qualified = is_qualified;
        self.tracker.submit(&event)
    }

    /// Interpret free-text feedback into a reward, then apply it.
    pub fn submit_feedback_text(
        &self,
        role_id: &str,
        candidate_id: &str,
        text: &str,
        is_qualified: Option<bool>,
    ) -> Result<LearningMetrics> {
        let reward = self.interpreter.parse(text);
        self.submit_feedback(role_id, candidate_id, reward, is_qualified)
    }

    /// Run the five-stage screening gate for a candidate against a role.
    ///
    /// Sparse profiles never fail with an error; only an unknown candidate
    /// ID does.
    pub fn screen(&self, candidate_id: &str, role: &RoleContext) -> Result<Decision> {
        let candidate = self
            .profiles
            .get_profile(candidate_id)?
            .ok_or_else(|| ScoutError::ProfileNotFound(candidate_id.to_string()))?;
        let similarity = self.estimator.estimate(&candidate, role);
        let posterior = self.tracker.posterior_mean(&role.id, candidate_id);
        Ok(self.screener.screen(&candidate, role, &similarity, posterior))
    }

    /// Composite exceptional-talent score, optionally conditioned on a
    /// role. The global score is written back to the profile store as a
    /// derived field.
    pub fn score_exceptional(
        &self,
        candidate_id: &str,
        role: Option<&RoleContext>,
    ) -> Result<(f64, BTreeMap<String, f64>)> {
        let candidate = self
            .profiles
            .get_profile(candidate_id)?
            .ok_or_else(|| ScoutError::ProfileNotFound(candidate_id.to_string()))?;

        let (global, _) = self.scorer.score(&candidate);
        self.profiles.put_derived_fields(
            candidate_id,
            &DerivedFields {
                ability_cluster: None,
                exceptional_score: Some(global),
            },
        )?;

        Ok(match role {
            Some(role) => self.scorer.score_for_role(&candidate, role, &self.estimator),
            None => self.scorer.score(&candidate),
        })
    }

    /// Full batch clustering of a candidate population. The resulting
    /// model replaces the previous snapshot atomically and each member's
    /// `ability_cluster` derived field is written back.
    pub fn cluster_population(
        &self,
        candidates: &[CandidateProfile],
        token: &CancellationToken,
    ) -> Result<BTreeMap<String, String>> {
        let prepared: Vec<CandidateProfile> = candidates
            .iter()
            .map(|candidate| self.ensure_embedding(candidate))
            .collect();
        let model = Arc::new(self.clusterer.cluster(&prepared, token)?);
        let assignments = model.assignment_map();

        for (candidate_id, cluster_name) in &assignments {
            self.profiles.put_derived_fields(
                candidate_id,
                &DerivedFields {
                    ability_cluster: Some(cluster_name.clone()),
                    exceptional_score: None,
                },
            )?;
        }

        *self.cluster_model.write() = Some(model);
        info!(population = candidates.len(), "cluster model swapped in");
        Ok(assignments)
    }

    /// Assign one newly ingested candidate to the nearest existing
    /// cluster, without recomputing the model.
    pub fn assign_cluster(&self, candidate: &CandidateProfile) -> Result<String> {
        let model = self
            .cluster_model
            .read()
            .clone()
            .ok_or_else(|| ScoutError::InvalidState("no cluster model computed yet".to_string()))?;
        let candidate = self.ensure_embedding(candidate);
        let name = self.clusterer.assign_one(&candidate, &model);
        self.profiles.put_derived_fields(
            &candidate.id,
            &DerivedFields {
                ability_cluster: Some(name.clone()),
                exceptional_score: None,
            },
        )?;
        Ok(name)
    }

    /// Current learning metrics for a role.
    pub fn metrics(&self, role_id: &str) -> Result<LearningMetrics> {
        self.tracker.metrics(role_id)
    }

    /// Close a role: archive its bandit state and stop learning.
    pub fn close_role(&self, role_id: &str) -> Result<()> {
        self.tracker.close_role(role_id)
    }

    /// Batch exceptional scoring over a population, cancellable.
    pub fn score_population(
        &self,
        candidates: &[CandidateProfile],
        token: &CancellationToken,
    ) -> Result<Vec<(String, f64)>> {
        self.scorer.score_population(candidates, token)
    }
}
