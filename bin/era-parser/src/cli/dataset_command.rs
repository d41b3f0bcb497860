use std::path::PathBuf;

use clap::Subcommand;

use crate::cli::export::ExportTarget;

/// The per-era operation to run, shared by the local, batch, and remote
/// invocation forms. `output` is optional everywhere: a remote run may
/// write only to the analytics store via `--export clickhouse` and skip a
/// file entirely.
#[derive(Debug, Clone, Subcommand)]
pub enum DatasetCommand {
    /// Print era-level record counts and fork coverage.
    Stats,
    /// Decode and print a single block at `slot`.
    Block { slot: u64 },
    /// Decode every dataset for every block in the era.
    AllBlocks {
        output: Option<PathBuf>,
        #[arg(long)]
        separate: bool,
        #[arg(long, value_enum)]
        export: Option<ExportTarget>,
    },
    Transactions {
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        export: Option<ExportTarget>,
    },
    Withdrawals {
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        export: Option<ExportTarget>,
    },
    Attestations {
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        export: Option<ExportTarget>,
    },
    SyncAggregates {
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        export: Option<ExportTarget>,
    },
}
