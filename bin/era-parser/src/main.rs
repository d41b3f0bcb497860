mod cli;
mod commands;
mod config;
mod output;
mod pipeline;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt().with_max_level(cli.verbosity.level()).init();

    match &cli.command {
        Commands::Local { era_file, action } => commands::run_local(era_file, action, &cli.store).await,
        Commands::Batch { glob_or_dir, action } => commands::run_batch(glob_or_dir, action, &cli.store).await,
        Commands::Remote { network, era_range, action, force, download_only } => {
            commands::run_remote(*network, era_range, action.as_ref(), *force, *download_only, &cli.store).await
        }
        Commands::EraStatus { network } => commands::run_era_status(network, &cli.store).await,
        Commands::EraFailed { network, limit } => commands::run_era_failed(network, *limit, &cli.store).await,
        Commands::EraCleanup { timeout_minutes } => commands::run_era_cleanup(*timeout_minutes, &cli.store).await,
        Commands::EraCheck { era_file } => commands::run_era_check(era_file).await,
        Commands::Migrate { action } => commands::run_migrate(action, &cli.store).await,
    }
}
