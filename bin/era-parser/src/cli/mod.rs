pub mod dataset_command;
pub mod export;
pub mod migrate;
pub mod verbosity;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use era_network_spec::Network;

use crate::{
    cli::{dataset_command::DatasetCommand, migrate::MigrateAction, verbosity::{Verbosity, verbosity_parser}},
    config::StoreConfig,
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingests Ethereum beacon-chain era files into normalized, queryable records.", long_about = None)]
pub struct Cli {
    /// Verbosity level (1=error, 2=warn, 3=info, 4=debug, 5=trace)
    #[arg(short, long, default_value = "3", value_parser = verbosity_parser)]
    pub verbosity: Verbosity,

    #[command(flatten)]
    pub store: StoreConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Operate on a single local era file.
    Local {
        era_file: PathBuf,
        #[command(subcommand)]
        action: DatasetCommand,
    },

    /// Operate on every era file matching a glob or directory.
    Batch {
        glob_or_dir: String,
        #[command(subcommand)]
        action: DatasetCommand,
    },

    /// Discover, download, and process a range of remote era files.
    Remote {
        network: Network,
        era_range: String,
        #[command(subcommand)]
        action: Option<DatasetCommand>,
        /// Re-clean and reprocess eras already marked complete.
        #[arg(long)]
        force: bool,
        /// Download only; skip parsing and loading.
        #[arg(long)]
        download_only: bool,
    },

    /// Show per-dataset processing status for a network (or `all`).
    EraStatus { network: String },

    /// List the most recent failed `(era, dataset)` pairs for a network (or `all`).
    EraFailed {
        network: String,
        limit: Option<usize>,
    },

    /// Requeue eras stuck in `processing` longer than `timeout_minutes`.
    EraCleanup { timeout_minutes: Option<u64> },

    /// Validate a local era file's framing without processing it.
    EraCheck { era_file: PathBuf },

    /// Inspect or apply schema migrations.
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_local_stats() {
        let cli = Cli::parse_from(["era-parser", "local", "mainnet-01082-abcd1234.era", "stats"]);
        assert_eq!(cli.verbosity, Verbosity::Info);
        match cli.command {
            Commands::Local { era_file, action } => {
                assert_eq!(era_file, PathBuf::from("mainnet-01082-abcd1234.era"));
                assert!(matches!(action, DatasetCommand::Stats));
            }
            _ => unreachable!("expected local command"),
        }
    }

    #[test]
    fn parses_local_block() {
        let cli = Cli::parse_from(["era-parser", "local", "era.era", "block", "1082"]);
        match cli.command {
            Commands::Local { action: DatasetCommand::Block { slot }, .. } => assert_eq!(slot, 1082),
            _ => unreachable!("expected block subcommand"),
        }
    }

    #[test]
    fn parses_remote_with_force_and_export() {
        let cli = Cli::parse_from([
            "era-parser",
            "--verbosity",
            "5",
            "remote",
            "mainnet",
            "1082-1090",
            "--force",
            "all-blocks",
            "--export",
            "clickhouse",
        ]);
        assert_eq!(cli.verbosity, Verbosity::Trace);
        match cli.command {
            Commands::Remote { network, era_range, force, action, .. } => {
                assert_eq!(network, Network::Mainnet);
                assert_eq!(era_range, "1082-1090");
                assert!(force);
                assert!(matches!(action, Some(DatasetCommand::AllBlocks { .. })));
            }
            _ => unreachable!("expected remote command"),
        }
    }

    #[test]
    fn parses_remote_download_only_without_action() {
        let cli = Cli::parse_from(["era-parser", "remote", "gnosis", "500+", "--download-only"]);
        match cli.command {
            Commands::Remote { download_only, action, .. } => {
                assert!(download_only);
                assert!(action.is_none());
            }
            _ => unreachable!("expected remote command"),
        }
    }

    #[test]
    fn parses_era_status() {
        let cli = Cli::parse_from(["era-parser", "era-status", "all"]);
        match cli.command {
            Commands::EraStatus { network } => assert_eq!(network, "all"),
            _ => unreachable!("expected era-status command"),
        }
    }

    #[test]
    fn parses_migrate_run_with_version() {
        let cli = Cli::parse_from(["era-parser", "migrate", "run", "0002"]);
        match cli.command {
            Commands::Migrate { action: MigrateAction::Run { version } } => {
                assert_eq!(version, Some("0002".to_string()));
            }
            _ => unreachable!("expected migrate run"),
        }
    }

    #[test]
    fn rejects_out_of_range_verbosity() {
        let result = Cli::try_parse_from(["era-parser", "--verbosity", "9", "era-check", "era.era"]);
        assert!(result.is_err());
    }
}
