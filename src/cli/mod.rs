//! CLI argument surface and dispatch.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

#[derive(Parser, Debug)]
#[command(name = "scout", version, about = "Candidate screening engine")]
pub struct Cli {
    /// Explicit config file path.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding per-role bandit state files.
    #[arg(long, global = true, env = "SCOUT_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Emit machine-readable JSON instead of human output.
    #[arg(long, global = true)]
    pub robot: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Screen a candidate against a role
    Screen(commands::ScreenArgs),

    /// Select the next candidate to advance for a role
    Select(commands::SelectArgs),

    /// Apply a feedback observation to a role's policy
    Feedback(commands::FeedbackArgs),

    /// Inspect or reset per-role bandit state
    Bandit(commands::BanditArgs),

    /// Cluster a candidate population into named ability groups
    Cluster(commands::ClusterArgs),

    /// Compute the exceptional-talent score for a candidate
    Score(commands::ScoreArgs),
}

pub fn run(cli: &Cli) -> Result<()> {
    let ctx = commands::CliContext::from_cli(cli)?;
    match &cli.command {
        Commands::Screen(args) => commands::screen(&ctx, args),
        Commands::Select(args) => commands::select(&ctx, args),
        Commands::Feedback(args) => commands::feedback(&ctx, args),
        Commands::Bandit(args) => commands::bandit(&ctx, args),
        Commands::Cluster(args) => commands::cluster(&ctx, args),
        Commands::Score(args) => commands::score(&ctx, args),
    }
}
