use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub similarity: SimilarityConfig,
    #[serde(default)]
    pub bandit: BanditConfig,
    #[serde(default)]
    pub screening: ScreeningConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub clustering: ClusteringConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl Config {
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SCOUT_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_patch(&project_root.join("scout.toml"))? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            return Ok(None);
        };
        Self::load_patch(&dir.join("scout/config.toml"))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| ScoutError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| ScoutError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.similarity {
            self.similarity.merge(patch);
        }
        if let Some(patch) = patch.bandit {
            self.bandit.merge(patch);
        }
        if let Some(patch) = patch.screening {
            self.screening.merge(patch);
        }
        if let Some(patch) = patch.scoring {
            self.scoring.merge(patch);
        }
        if let Some(patch) = patch.clustering {
            self.clustering.merge(patch);
        }
        if let Some(patch) = patch.feedback {
            self.feedback.merge(patch);
        }
        if let Some(patch) = patch.storage {
            self.storage.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SCOUT_SIMILARITY_METHOD") {
            self.similarity.method = parse_method(&value)?;
        }
        if let Some(value) = env_usize("SCOUT_SIMILARITY_NEIGHBORS")? {
            self.similarity.neighbors = value;
        }
        if let Some(value) = env_f64("SCOUT_SIMILARITY_SHARPENING")? {
            self.similarity.sharpening = value;
        }

        if let Some(value) = env_f64("SCOUT_BANDIT_PRIOR_STRENGTH")? {
            self.bandit.prior_strength = value;
        }
        if let Some(value) = env_f64("SCOUT_BANDIT_OPTIMISM_LAMBDA")? {
            self.bandit.optimism_lambda = value;
        }
        if let Some(value) = env_f64("SCOUT_BANDIT_OPTIMISM_CAP")? {
            self.bandit.optimism_cap = value;
        }
        if let Some(value) = env_usize("SCOUT_BANDIT_METRICS_WINDOW")? {
            self.bandit.metrics_window = value;
        }

        if let Some(value) = env_f64("SCOUT_SCREENING_SIMILARITY_FLOOR")? {
            self.screening.similarity_floor = value;
        }
        if let Some(value) = env_f64("SCOUT_SCREENING_PASS_THRESHOLD")? {
            self.screening.pass_threshold = value;
        }

        if let Some(value) = env_f64("SCOUT_SCORING_STRONG_BAR")? {
            self.scoring.strong_signal_bar = value;
        }
        if let Some(value) = env_usize("SCOUT_SCORING_MIN_STRONG")? {
            self.scoring.min_strong_signals = value;
        }
        if let Some(value) = env_f64("SCOUT_SCORING_GATE_PENALTY")? {
            self.scoring.gate_penalty = value;
        }

        if let Some(value) = env_usize("SCOUT_CLUSTERING_MIN_K")? {
            self.clustering.min_k = value;
        }
        if let Some(value) = env_usize("SCOUT_CLUSTERING_MAX_K")? {
            self.clustering.max_k = value;
        }
        if let Some(value) = env_usize("SCOUT_CLUSTERING_MAX_ITERATIONS")? {
            self.clustering.max_iterations = value;
        }

        if let Some(value) = env_string("SCOUT_FEEDBACK_INTERPRETER") {
            self.feedback.interpreter = parse_interpreter(&value)?;
        }

        if let Some(value) = env_string("SCOUT_STATE_DIR") {
            self.storage.state_dir = Some(PathBuf::from(value));
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("screening.similarity_floor", self.screening.similarity_floor),
            ("screening.pass_threshold", self.screening.pass_threshold),
            ("scoring.strong_signal_bar", self.scoring.strong_signal_bar),
            ("scoring.gate_penalty", self.scoring.gate_penalty),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoutError::Config(format!(
                    "{name} must be in [0,1], got {value}"
                )));
            }
        }
        if self.bandit.prior_strength < 0.0 {
            return Err(ScoutError::Config(format!(
                "bandit.prior_strength must be >= 0, got {}",
                self.bandit.prior_strength
            )));
        }
        if self.clustering.min_k == 0 || self.clustering.min_k > self.clustering.max_k {
            return Err(ScoutError::Config(format!(
                "clustering k range invalid: {}..={}",
                self.clustering.min_k, self.clustering.max_k
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    Structural,
    Embedding,
}

impl Default for SimilarityMethod {
    fn default() -> Self {
        Self::Structural
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityConfig {
    /// Which estimator callers get; mode is fixed here, never branched per call.
    #[serde(default)]
    pub method: SimilarityMethod,
    /// Neighborhood size for the structural overlap measure.
    #[serde(default)]
    pub neighbors: usize,
    /// Sharpening exponent p; overlap is raised to 1/p.
    #[serde(default)]
    pub sharpening: f64,
    #[serde(default)]
    pub category_weights: CategoryWeights,
    /// Entries in the similarity score cache.
    #[serde(default)]
    pub cache_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub skills: f64,
    pub experience: f64,
    pub education: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            skills: 1.0,
            experience: 1.0,
            education: 1.0,
        }
    }
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            method: SimilarityMethod::Structural,
            neighbors: 10,
            sharpening: 4.0,
            category_weights: CategoryWeights::default(),
            cache_size: 1024,
        }
    }
}

impl SimilarityConfig {
    fn merge(&mut self, patch: SimilarityPatch) {
        if let Some(value) = patch.method {
            self.method = value;
        }
        if let Some(value) = patch.neighbors {
            self.neighbors = value;
        }
        if let Some(value) = patch.sharpening {
            self.sharpening = value;
        }
        if let Some(value) = patch.category_weights {
            self.category_weights = value;
        }
        if let Some(value) = patch.cache_size {
            self.cache_size = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BanditConfig {
    /// Pseudo-observation weight of the warm-start prior.
    #[serde(default)]
    pub prior_strength: f64,
    /// Scale of the optimism bonus added to each Thompson sample.
    #[serde(default)]
    pub optimism_lambda: f64,
    /// Upper bound on the per-arm term the bonus is computed from.
    #[serde(default)]
    pub optimism_cap: f64,
    /// Rolling window length for precision/recall/F1/regret samples.
    #[serde(default)]
    pub metrics_window: usize,
}

impl Default for BanditConfig {
    fn default() -> Self {
        Self {
            prior_strength: 10.0,
            optimism_lambda: 0.01,
            optimism_cap: 1000.0,
            metrics_window: 256,
        }
    }
}

impl BanditConfig {
    fn merge(&mut self, patch: BanditPatch) {
        if let Some(value) = patch.prior_strength {
            self.prior_strength = value;
        }
        if let Some(value) = patch.optimism_lambda {
            self.optimism_lambda = value;
        }
        if let Some(value) = patch.optimism_cap {
            self.optimism_cap = value;
        }
        if let Some(value) = patch.metrics_window {
            self.metrics_window = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningConfig {
    /// Minimum similarity to survive stage 2.
    #[serde(default)]
    pub similarity_floor: f64,
    /// Final fused score required to pass; stricter than the similarity floor.
    #[serde(default)]
    pub pass_threshold: f64,
    /// Fusion weights for stage 5.
    #[serde(default)]
    pub fusion_weights: FusionWeights,
    /// Minimum bars for extracted interview signals.
    #[serde(default)]
    pub evidence_bars: EvidenceBars,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionWeights {
    pub similarity: f64,
    pub consistency: f64,
    pub evidence: f64,
    pub bandit: f64,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            similarity: 0.35,
            consistency: 0.2,
            evidence: 0.25,
            bandit: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceBars {
    pub motivation: f64,
    pub communication: f64,
    pub technical_depth: f64,
}

impl Default for EvidenceBars {
    fn default() -> Self {
        Self {
            motivation: 0.4,
            communication: 0.4,
            technical_depth: 0.5,
        }
    }
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            similarity_floor: 0.65,
            pass_threshold: 0.70,
            fusion_weights: FusionWeights::default(),
            evidence_bars: EvidenceBars::default(),
        }
    }
}

impl ScreeningConfig {
    fn merge(&mut self, patch: ScreeningPatch) {
        if let Some(value) = patch.similarity_floor {
            self.similarity_floor = value;
        }
        if let Some(value) = patch.pass_threshold {
            self.pass_threshold = value;
        }
        if let Some(value) = patch.fusion_weights {
            self.fusion_weights = value;
        }
        if let Some(value) = patch.evidence_bars {
            self.evidence_bars = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// A signal at or above this normalized value counts as strong.
    #[serde(default)]
    pub strong_signal_bar: f64,
    /// Candidates below this many strong signals are gated.
    #[serde(default)]
    pub min_strong_signals: usize,
    /// Multiplier applied to gated composites. Calibrated so roughly one
    /// candidate in a thousand clears the exceptional bar.
    #[serde(default)]
    pub gate_penalty: f64,
    /// Normalization caps for raw evidence counts.
    #[serde(default)]
    pub caps: SignalCaps,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalCaps {
    pub publications: f64,
    pub repo_stars: f64,
    pub followers: f64,
}

impl Default for SignalCaps {
    fn default() -> Self {
        Self {
            publications: 50.0,
            repo_stars: 10_000.0,
            followers: 100_000.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strong_signal_bar: 0.75,
            min_strong_signals: 3,
            gate_penalty: 0.05,
            caps: SignalCaps::default(),
        }
    }
}

impl ScoringConfig {
    fn merge(&mut self, patch: ScoringPatch) {
        if let Some(value) = patch.strong_signal_bar {
            self.strong_signal_bar = value;
        }
        if let Some(value) = patch.min_strong_signals {
            self.min_strong_signals = value;
        }
        if let Some(value) = patch.gate_penalty {
            self.gate_penalty = value;
        }
        if let Some(value) = patch.caps {
            self.caps = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusteringConfig {
    #[serde(default)]
    pub min_k: usize,
    #[serde(default)]
    pub max_k: usize,
    #[serde(default)]
    pub max_iterations: usize,
    /// Tags at least this many times more frequent in-cluster than in the
    /// population are eligible cluster-name components.
    #[serde(default)]
    pub naming_lift: f64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            min_k: 5,
            max_k: 10,
            max_iterations: 50,
            naming_lift: 1.5,
        }
    }
}

impl ClusteringConfig {
    fn merge(&mut self, patch: ClusteringPatch) {
        if let Some(value) = patch.min_k {
            self.min_k = value;
        }
        if let Some(value) = patch.max_k {
            self.max_k = value;
        }
        if let Some(value) = patch.max_iterations {
            self.max_iterations = value;
        }
        if let Some(value) = patch.naming_lift {
            self.naming_lift = value;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpreterKind {
    Lexical,
    Llm,
}

impl Default for InterpreterKind {
    fn default() -> Self {
        Self::Lexical
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// Which feedback interpreter variant the engine constructs.
    #[serde(default)]
    pub interpreter: InterpreterKind,
}

impl FeedbackConfig {
    fn merge(&mut self, patch: FeedbackPatch) {
        if let Some(value) = patch.interpreter {
            self.interpreter = value;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for per-role bandit state files. Defaults to the platform
    /// data dir at engine construction time.
    #[serde(default)]
    pub state_dir: Option<PathBuf>,
}

impl StorageConfig {
    fn merge(&mut self, patch: StoragePatch) {
        if let Some(value) = patch.state_dir {
            self.state_dir = Some(value);
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub similarity: Option<SimilarityPatch>,
    pub bandit: Option<BanditPatch>,
    pub screening: Option<ScreeningPatch>,
    pub scoring: Option<ScoringPatch>,
    pub clustering: Option<ClusteringPatch>,
    pub feedback: Option<FeedbackPatch>,
    pub storage: Option<StoragePatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SimilarityPatch {
    pub method: Option<SimilarityMethod>,
    pub neighbors: Option<usize>,
    pub sharpening: Option<f64>,
    pub category_weights: Option<CategoryWeights>,
    pub cache_size: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BanditPatch {
    pub prior_strength: Option<f64>,
    pub optimism_lambda: Option<f64>,
    pub optimism_cap: Option<f64>,
    pub metrics_window: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ScreeningPatch {
    pub similarity_floor: Option<f64>,
    pub pass_threshold: Option<f64>,
    pub fusion_weights: Option<FusionWeights>,
    pub evidence_bars: Option<EvidenceBars>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ScoringPatch {
    pub strong_signal_bar: Option<f64>,
    pub min_strong_signals: Option<usize>,
    pub gate_penalty: Option<f64>,
    pub caps: Option<SignalCaps>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ClusteringPatch {
    pub min_k: Option<usize>,
    pub max_k: Option<usize>,
    pub max_iterations: Option<usize>,
    pub naming_lift: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct FeedbackPatch {
    pub interpreter: Option<InterpreterKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoragePatch {
    pub state_dir: Option<PathBuf>,
}

fn parse_method(value: &str) -> Result<SimilarityMethod> {
    match value.to_lowercase().as_str() {
        "structural" => Ok(SimilarityMethod::Structural),
        "embedding" => Ok(SimilarityMethod::Embedding),
        _ => Err(ScoutError::Config(format!(
            "invalid similarity method {value} (expected structural|embedding)"
        ))),
    }
}

fn parse_interpreter(value: &str) -> Result<InterpreterKind> {
    match value.to_lowercase().as_str() {
        "lexical" => Ok(InterpreterKind::Lexical),
        "llm" => Ok(InterpreterKind::Llm),
        _ => Err(ScoutError::Config(format!(
            "invalid feedback interpreter {value} (expected lexical|llm)"
        ))),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_f64(key: &str) -> Result<Option<f64>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<f64>()
            .map(Some)
            .map_err(|err| ScoutError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}

fn env_usize(key: &str) -> Result<Option<usize>> {
    match std::env::var(key) {
        Ok(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|err| ScoutError::Config(format!("invalid {key} value {value}: {err}"))),
        Err(_) => Ok(None),
    }
}
