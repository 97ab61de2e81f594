//! Command handlers. These operate directly on JSON fixture files and the
//! on-disk bandit state directory, below the engine facade, so they stay
//! usable without a live profile store.

use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use serde::de::DeserializeOwned;

use crate::bandit::RolePolicy;
use crate::cancel::CancellationToken;
use crate::cli::output::{HumanLayout, emit_human, emit_json};
use crate::cli::Cli;
use crate::clustering::TalentClusterer;
use crate::config::{Config, InterpreterKind};
use crate::error::{Result, ScoutError};
use crate::feedback::{FeedbackInterpreter, LexicalInterpreter};
use crate::scoring::ExceptionalScorer;
use crate::screening::ScreeningEngine;
use crate::similarity::SimilarityEstimator;
use crate::storage::{BanditStore, JsonBanditStore};
use crate::types::{CandidateProfile, RoleContext};

pub struct CliContext {
    pub config: Config,
    pub robot: bool,
    pub store: JsonBanditStore,
}

impl CliContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let config = Config::load(cli.config.as_deref(), &cwd)?;

        let state_dir = cli
            .state_dir
            .clone()
            .or_else(|| config.storage.state_dir.clone())
            .unwrap_or_else(default_state_dir);
        let store = JsonBanditStore::new(state_dir)?;

        Ok(Self {
            config,
            robot: cli.robot,
            store,
        })
    }

    fn load_policy(&self, role_id: &str) -> Result<RolePolicy> {
        let state = self
            .store
            .load(role_id)?
            .ok_or_else(|| ScoutError::RoleNotFound(role_id.to_string()))?;
        RolePolicy::resume(state, self.config.bandit.clone())
    }
}

fn default_state_dir() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("scout")
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| ScoutError::Config(format!("read {}: {err}", path.display())))?;
    serde_json::from_str(&raw)
        .map_err(|err| ScoutError::Config(format!("parse {}: {err}", path.display())))
}

#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Candidate profile JSON file.
    pub candidate: PathBuf,

    /// Role context JSON file.
    pub role: PathBuf,
}

pub fn screen(ctx: &CliContext, args: &ScreenArgs) -> Result<()> {
    let candidate: CandidateProfile = read_json(&args.candidate)?;
    let role: RoleContext = read_json(&args.role)?;

    let estimator = SimilarityEstimator::new(ctx.config.similarity.clone());
    let similarity = estimator.estimate(&candidate, &role);

    // Use the persisted policy's posterior when this role has one and the
    // candidate is among its arms.
    let posterior = ctx.store.load(&role.id)?.and_then(|state| {
        state
            .arm_index_of(&candidate.id)
            .map(|arm| state.posterior_mean(arm))
    });

    let engine = ScreeningEngine::new(ctx.config.screening.clone());
    let decision = engine.screen(&candidate, &role, &similarity, posterior);

    if ctx.robot {
        emit_json(&serde_json::to_value(&decision)?)
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Screening Decision")
            .kv("Candidate", &decision.candidate_id)
            .kv("Role", &decision.role_id)
            .kv("Outcome", if decision.outcome { "PASS" } else { "FAIL" })
            .kv("Confidence", &format!("{:.2}", decision.confidence))
            .section("Reasoning");
        for line in &decision.reasoning {
            layout.item(line);
        }
        emit_human(&layout);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Role whose policy should pick the next candidate.
    pub role_id: String,
}

pub fn select(ctx: &CliContext, args: &SelectArgs) -> Result<()> {
    let policy = ctx.load_policy(&args.role_id)?;
    let arm = policy.select()?;
    let candidate_id = policy.state().arms[arm].clone();

    if ctx.robot {
        emit_json(&serde_json::json!({
            "status": "ok",
            "role_id": args.role_id,
            "candidate_id": candidate_id,
            "arm": arm,
        }))
    } else {
        println!("{candidate_id}");
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    pub role_id: String,
    pub candidate_id: String,

    /// Explicit reward in [0,1].
    #[arg(long, conflicts_with = "text")]
    pub reward: Option<f64>,

    /// Free-text feedback, interpreted into a reward.
    #[arg(long)]
    pub text: Option<String>,

    /// Ground-truth qualification flag, when known.
    #[arg(long)]
    pub qualified: Option<bool>,
}

pub fn feedback(ctx: &CliContext, args: &FeedbackArgs) -> Result<()> {
    let reward = match (&args.reward, &args.text) {
        (Some(reward), _) => reward.clamp(0.0, 1.0),
        (None, Some(text)) => interpreter(&ctx.config)?.parse(text),
        (None, None) => {
            return Err(ScoutError::Config(
                "provide either --reward or --text".to_string(),
            ));
        }
    };

    let mut policy = ctx.load_policy(&args.role_id)?;
    let arm = policy
        .state()
        .arm_index_of(&args.candidate_id)
        .ok_or_else(|| {
            ScoutError::UnknownArm(format!(
                "candidate {} is not an arm of role {}",
                args.candidate_id, args.role_id
            ))
        })?;
    policy.update(arm, reward, args.qualified)?;
    ctx.store.save(policy.state())?;

    let metrics = policy.metrics();
    if ctx.robot {
        emit_json(&serde_json::to_value(&metrics)?)
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Feedback Applied")
            .kv("Reward", &format!("{reward:.2}"))
            .kv("Observations", &metrics.observations.to_string())
            .kv("Precision", &format!("{:.3}", metrics.precision))
            .kv("Recall", &format!("{:.3}", metrics.recall))
            .kv("F1", &format!("{:.3}", metrics.f1))
            .kv("Mean regret", &format!("{:.3}", metrics.mean_regret));
        emit_human(&layout);
        Ok(())
    }
}

fn interpreter(config: &Config) -> Result<Box<dyn FeedbackInterpreter>> {
    match config.feedback.interpreter {
        InterpreterKind::Lexical => Ok(Box::new(LexicalInterpreter::new())),
        InterpreterKind::Llm => Err(ScoutError::Config(
            "llm feedback interpreter is not available from the CLI; configure lexical".to_string(),
        )),
    }
}

#[derive(Args, Debug)]
pub struct BanditArgs {
    #[command(subcommand)]
    pub command: BanditCommand,
}

#[derive(Subcommand, Debug)]
pub enum BanditCommand {
    /// Show a role's policy state and learning metrics
    Stats(StatsArgs),

    /// Archive a role's policy state
    Reset(StatsArgs),
}

#[derive(Args, Debug)]
pub struct StatsArgs {
    pub role_id: String,
}

pub fn bandit(ctx: &CliContext, args: &BanditArgs) -> Result<()> {
    match &args.command {
        BanditCommand::Stats(args) => bandit_stats(ctx, args),
        BanditCommand::Reset(args) => bandit_reset(ctx, args),
    }
}

fn bandit_stats(ctx: &CliContext, args: &StatsArgs) -> Result<()> {
    let policy = ctx.load_policy(&args.role_id)?;
    let state = policy.state();
    let metrics = policy.metrics();

    if ctx.robot {
        let arms: Vec<_> = state
            .arms
            .iter()
            .enumerate()
            .map(|(i, id)| {
                serde_json::json!({
                    "candidate_id": id,
                    "alpha": state.alpha[i],
                    "beta": state.beta[i],
                    "posterior_mean": state.posterior_mean(i),
                })
            })
            .collect();
        emit_json(&serde_json::json!({
            "status": "ok",
            "role_id": args.role_id,
            "version": state.version,
            "metrics": serde_json::to_value(&metrics)?,
            "arms": arms,
        }))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Bandit Stats")
            .kv("Role", &args.role_id)
            .kv("Version", &state.version.to_string())
            .kv("Observations", &metrics.observations.to_string())
            .kv("Precision", &format!("{:.3}", metrics.precision))
            .kv("Recall", &format!("{:.3}", metrics.recall))
            .kv("F1", &format!("{:.3}", metrics.f1))
            .kv("Mean regret", &format!("{:.3}", metrics.mean_regret))
            .section("Arms");
        for (i, id) in state.arms.iter().enumerate() {
            layout.kv(
                id,
                &format!(
                    "mean {:.3} (alpha {:.1}, beta {:.1})",
                    state.posterior_mean(i),
                    state.alpha[i],
                    state.beta[i]
                ),
            );
        }
        emit_human(&layout);
        Ok(())
    }
}

fn bandit_reset(ctx: &CliContext, args: &StatsArgs) -> Result<()> {
    ctx.store.archive(&args.role_id)?;

    if ctx.robot {
        emit_json(&serde_json::json!({
            "status": "ok",
            "role_id": args.role_id,
            "archived": true,
        }))
    } else {
        println!("archived state for role {}", args.role_id);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ClusterArgs {
    /// JSON file holding an array of candidate profiles.
    pub profiles: PathBuf,
}

pub fn cluster(ctx: &CliContext, args: &ClusterArgs) -> Result<()> {
    let candidates: Vec<CandidateProfile> = read_json(&args.profiles)?;
    let clusterer = TalentClusterer::new(ctx.config.clustering.clone());
    let token = CancellationToken::new();

    let model = clusterer.cluster(&candidates, &token)?;
    let assignments = model.assignment_map();

    if ctx.robot {
        emit_json(&serde_json::json!({
            "status": "ok",
            "clusters": serde_json::to_value(&model.clusters)?,
            "assignments": serde_json::to_value(&assignments)?,
        }))
    } else {
        let mut layout = HumanLayout::new();
        layout.title("Ability Clusters");
        for cluster in &model.clusters {
            layout.section(&cluster.name);
            for member in &cluster.members {
                layout.item(member);
            }
        }
        emit_human(&layout);
        Ok(())
    }
}

#[derive(Args, Debug)]
pub struct ScoreArgs {
    /// Candidate profile JSON file.
    pub profile: PathBuf,

    /// Optional role context JSON file for a position-specific score.
    #[arg(long)]
    pub role: Option<PathBuf>,
}

pub fn score(ctx: &CliContext, args: &ScoreArgs) -> Result<()> {
    let candidate: CandidateProfile = read_json(&args.profile)?;
    let scorer = ExceptionalScorer::new(ctx.config.scoring.clone());

    let (composite, breakdown) = match &args.role {
        Some(path) => {
            let role: RoleContext = read_json(path)?;
            let estimator = SimilarityEstimator::new(ctx.config.similarity.clone());
            scorer.score_for_role(&candidate, &role, &estimator)
        }
        None => scorer.score(&candidate),
    };

    if ctx.robot {
        emit_json(&serde_json::json!({
            "status": "ok",
            "candidate_id": candidate.id,
            "composite": composite,
            "exceptional": scorer.is_exceptional(composite),
            "breakdown": serde_json::to_value(&breakdown)?,
        }))
    } else {
        let mut layout = HumanLayout::new();
        layout
            .title("Exceptional Talent Score")
            .kv("Candidate", &candidate.id)
            .kv("Composite", &format!("{composite:.3}"))
            .kv(
                "Exceptional",
                if scorer.is_exceptional(composite) { "yes" } else { "no" },
            )
            .section("Breakdown");
        for (signal, value) in &breakdown {
            layout.kv(signal, &format!("{value:.3}"));
        }
        emit_human(&layout);
        Ok(())
    }
}
