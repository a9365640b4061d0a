use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gha_version_updater::cli::{run_update_workflow, Args, RunOutcome};
use gha_version_updater::config::load_config;
use gha_version_updater::git::Git2Repository;
use gha_version_updater::github::GitHubClient;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let env = args.environment()?;

    let mut config = load_config(args.config.as_deref(), &env.workspace)
        .context("Error loading config")?;
    args.apply(&mut config)?;
    tracing::debug!(?config, ?env, "Effective configuration");

    let token = config.token().map(String::from);
    let api = GitHubClient::new(env.api_url.clone(), token.clone())?;
    let git = Git2Repository::open(&env.workspace)
        .context("Workspace is not a git repository")?
        .with_token(token);

    match run_update_workflow(&config, &env, &api, &git)? {
        RunOutcome::ChangesPendingReview => {
            tracing::error!(
                "Updates found but skipping pull request. Checkout build summary for update details."
            );
            std::process::exit(1);
        }
        outcome => {
            tracing::debug!(?outcome, "Run finished");
            Ok(())
        }
    }
}
