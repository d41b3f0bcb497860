use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use era_loader::{ALL_DATASETS, LoaderConfig, StoreClient, load_era, run_migrations};
use era_network_spec::Network;
use era_normalize::NormalizedEra;
use era_remote::{EraRange, cleanup_download, discover_era_urls, download_era};
use era_state::StateStore;
use tracing::{info, warn};

use crate::{
    cli::{dataset_command::DatasetCommand, export::ExportTarget, migrate::MigrateAction},
    config::StoreConfig,
    output::{EraInfo, write_dataset},
    pipeline::{LoadedEra, worker_id},
};

fn era_info_for(era: &LoadedEra) -> EraInfo {
    EraInfo {
        network: era.metadata.network.as_str().to_string(),
        era_number: era.metadata.era_number,
        start_slot: era.metadata.start_slot,
        end_slot: era.metadata.end_slot,
    }
}

fn open_state(store: &StoreConfig) -> anyhow::Result<StateStore> {
    let state_dir = store.state_dir()?;
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("creating {}", state_dir.display()))?;
    let path = state_dir.join(era_state::STATE_DB_FILE);
    StateStore::new(&path).with_context(|| format!("opening state store at {}", path.display()))
}

async fn open_loader_client(store: &StoreConfig) -> anyhow::Result<StoreClient> {
    let config: LoaderConfig = store.loader_config()?;
    Ok(StoreClient::new(config))
}

/// Runs one `DatasetCommand` against a single decoded era, writing to
/// `output` (if given) and/or the analytics store (if `--export clickhouse`
/// was given). Shared by the `local`, `batch`, and `remote` invocation
/// forms.
pub async fn run_dataset_command(
    era: &LoadedEra,
    action: &DatasetCommand,
    store: &StoreConfig,
    state: &StateStore,
) -> anyhow::Result<()> {
    match action {
        DatasetCommand::Stats => {
            let stats = era.statistics()?;
            println!("{}", serde_json::to_string_pretty(&StatsView {
                network: era.metadata.network.as_str(),
                era_number: era.metadata.era_number,
                total_records: stats.total_records,
                block_records: stats.block_records,
                state_records: stats.state_records,
                index_records: stats.index_records,
                min_slot: stats.min_slot,
                max_slot: stats.max_slot,
                fallback_parse_count: stats.fallback_parse_count,
            })?);
            Ok(())
        }
        DatasetCommand::Block { slot } => {
            match era.decode_block_at_slot(*slot)? {
                Some(decoded) => println!("{}", serde_json::to_string_pretty(&decoded)?),
                None => anyhow::bail!("no decodable block at slot {slot}"),
            }
            Ok(())
        }
        DatasetCommand::AllBlocks { output, separate, export } => {
            let normalized = era.normalize()?;
            if let Some(output) = output {
                write_all_blocks(era, &normalized, output, *separate)?;
            }
            if let Some(ExportTarget::Clickhouse) = export {
                export_to_clickhouse(era, &normalized, store, state).await?;
            }
            Ok(())
        }
        DatasetCommand::Transactions { output, export } => {
            let normalized = era.normalize()?;
            if let Some(output) = output {
                write_dataset(output, &era_info_for(era), "transactions", &normalized.transactions, Utc::now())?;
            }
            if let Some(ExportTarget::Clickhouse) = export {
                export_to_clickhouse(era, &normalized, store, state).await?;
            }
            Ok(())
        }
        DatasetCommand::Withdrawals { output, export } => {
            let normalized = era.normalize()?;
            if let Some(output) = output {
                write_dataset(output, &era_info_for(era), "withdrawals", &normalized.withdrawals, Utc::now())?;
            }
            if let Some(ExportTarget::Clickhouse) = export {
                export_to_clickhouse(era, &normalized, store, state).await?;
            }
            Ok(())
        }
        DatasetCommand::Attestations { output, export } => {
            let normalized = era.normalize()?;
            if let Some(output) = output {
                write_dataset(output, &era_info_for(era), "attestations", &normalized.attestations, Utc::now())?;
            }
            if let Some(ExportTarget::Clickhouse) = export {
                export_to_clickhouse(era, &normalized, store, state).await?;
            }
            Ok(())
        }
        DatasetCommand::SyncAggregates { output, export } => {
            let normalized = era.normalize()?;
            if let Some(output) = output {
                write_dataset(output, &era_info_for(era), "sync_aggregates", &normalized.sync_aggregates, Utc::now())?;
            }
            if let Some(ExportTarget::Clickhouse) = export {
                export_to_clickhouse(era, &normalized, store, state).await?;
            }
            Ok(())
        }
    }
}

#[derive(serde::Serialize)]
struct StatsView<'a> {
    network: &'a str,
    era_number: u64,
    total_records: usize,
    block_records: usize,
    state_records: usize,
    index_records: usize,
    min_slot: Option<u64>,
    max_slot: Option<u64>,
    fallback_parse_count: u64,
}

/// Writes every non-empty dataset, either as one combined file per dataset
/// named `<stem>_<dataset>.<ext>` (`--separate`, matching scenario A/B in
/// §8) or just the primary `blocks` dataset to `output` directly.
fn write_all_blocks(era: &LoadedEra, normalized: &NormalizedEra, output: &Path, separate: bool) -> anyhow::Result<()> {
    let info = era_info_for(era);
    let now = Utc::now();
    if !separate {
        return write_dataset(output, &info, "blocks", &normalized.blocks, now);
    }

    let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("era");
    let ext = output.extension().and_then(|s| s.to_str()).unwrap_or("json");
    let dir = output.parent().unwrap_or_else(|| Path::new("."));

    macro_rules! write_one {
        ($name:literal, $field:ident) => {
            let path: PathBuf = dir.join(format!("{stem}_{}.{ext}", $name));
            write_dataset(&path, &info, $name, &normalized.$field, now)?;
        };
    }
    write_one!("blocks", blocks);
    write_one!("sync_aggregates", sync_aggregates);
    write_one!("execution_payloads", execution_payloads);
    write_one!("transactions", transactions);
    write_one!("withdrawals", withdrawals);
    write_one!("attestations", attestations);
    write_one!("deposits", deposits);
    write_one!("voluntary_exits", voluntary_exits);
    write_one!("proposer_slashings", proposer_slashings);
    write_one!("attester_slashings", attester_slashings);
    write_one!("bls_changes", bls_changes);
    write_one!("blob_commitments", blob_commitments);
    write_one!("execution_requests", execution_requests);
    Ok(())
}

async fn export_to_clickhouse(
    era: &LoadedEra,
    normalized: &NormalizedEra,
    store: &StoreConfig,
    state: &StateStore,
) -> anyhow::Result<()> {
    let mut client = open_loader_client(store).await?;
    run_migrations(&mut client, state, &store.loader_config()?.database).await?;
    let era_filename = format!(
        "{}-{:05}-{}.era",
        era.metadata.network.as_str(),
        era.metadata.era_number,
        era.metadata.hash
    );
    load_era(
        &mut client,
        state,
        &era_filename,
        era.metadata.network.as_str(),
        era.metadata.era_number,
        &worker_id(),
        &era.metadata.hash,
        normalized,
    )
    .await?;
    Ok(())
}

pub async fn run_local(era_file: &Path, action: &DatasetCommand, store: &StoreConfig) -> anyhow::Result<()> {
    let era = LoadedEra::open(era_file)?;
    let state = open_state(store)?;
    run_dataset_command(&era, action, store, &state).await
}

pub async fn run_batch(glob_or_dir: &str, action: &DatasetCommand, store: &StoreConfig) -> anyhow::Result<()> {
    let state = open_state(store)?;
    for path in era_files_in(glob_or_dir)? {
        info!(path = %path.display(), "processing era file");
        match LoadedEra::open(&path) {
            Ok(era) => {
                if let Err(err) = run_dataset_command(&era, action, store, &state).await {
                    warn!(path = %path.display(), "batch item failed: {err}");
                }
            }
            Err(err) => warn!(path = %path.display(), "failed to open era file: {err}"),
        }
    }
    Ok(())
}

/// Resolves `glob_or_dir` into a sorted list of era files. A directory is
/// scanned for every `*.era` file; anything else is treated as a
/// `<dir>/<pattern>` shell glob supporting only the `*` wildcard, which is
/// all the spec's invocation forms ever need (e.g. `./eras/mainnet-*.era`).
fn era_files_in(glob_or_dir: &str) -> anyhow::Result<Vec<PathBuf>> {
    let path = Path::new(glob_or_dir);
    let mut files = Vec::new();
    if path.is_dir() {
        for entry in std::fs::read_dir(path).with_context(|| format!("reading {glob_or_dir}"))? {
            let entry = entry?;
            if entry.path().extension().and_then(|e| e.to_str()) == Some("era") {
                files.push(entry.path());
            }
        }
    } else {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        let pattern = path.file_name().and_then(|n| n.to_str()).unwrap_or(glob_or_dir);
        for entry in std::fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                if matches_glob(pattern, name) {
                    files.push(entry.path());
                }
            }
        }
    }
    files.sort();
    Ok(files)
}

/// Minimal shell-glob matcher supporting only the `*` wildcard (zero or
/// more characters), sufficient for era filename patterns.
fn matches_glob(pattern: &str, name: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == name;
    }
    let mut rest = name;
    for (index, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if index == 0 {
            if !rest.starts_with(part) {
                return false;
            }
            rest = &rest[part.len()..];
        } else if index == parts.len() - 1 {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(at) => rest = &rest[at + part.len()..],
                None => return false,
            }
        }
    }
    true
}

#[allow(clippy::too_many_arguments)]
pub async fn run_remote(
    network: Network,
    era_range: &str,
    action: Option<&DatasetCommand>,
    force: bool,
    download_only: bool,
    store: &StoreConfig,
) -> anyhow::Result<()> {
    let base_url = store.require_base_url()?;
    let range = EraRange::parse(era_range)?;
    let client = reqwest::Client::new();
    let found = discover_era_urls(&client, base_url, network, range).await?;

    let state = open_state(store)?;
    let to_process = if force {
        found
    } else {
        let completed = state.completed_eras(network.as_str(), range.start(), range.end().unwrap_or(u64::MAX))?;
        found
            .into_iter()
            .filter(|(era_number, _)| !completed.contains(era_number))
            .collect::<Vec<_>>()
    };

    info!(count = to_process.len(), network = %network, "eras selected for processing");

    for (era_number, url) in to_process {
        let filename = format!("{network}-{era_number:05}-remote.era");
        let path = match download_era(&client, &url, &store.era_download_dir, &filename, store.era_max_retries).await {
            Ok(path) => path,
            Err(err) => {
                warn!(era_number, "download failed: {err}");
                state.mark_era_failed(network.as_str(), era_number, &err.to_string())?;
                continue;
            }
        };

        if download_only {
            continue;
        }

        let result = process_downloaded_era(&path, action, store, &state, network, era_number, force).await;
        if let Err(err) = result {
            warn!(era_number, "processing failed: {err}");
            state.mark_era_failed(network.as_str(), era_number, &err.to_string())?;
        }

        cleanup_download(&path, store.era_cleanup_after_process).await?;
    }

    Ok(())
}

async fn process_downloaded_era(
    path: &Path,
    action: Option<&DatasetCommand>,
    store: &StoreConfig,
    state: &StateStore,
    network: Network,
    era_number: u64,
    force: bool,
) -> anyhow::Result<()> {
    let era = LoadedEra::open(path)?;

    let era_filename = format!(
        "{}-{:05}-{}.era",
        era.metadata.network.as_str(),
        era.metadata.era_number,
        era.metadata.hash
    );
    let datasets: Vec<String> = ALL_DATASETS.iter().map(|s| s.to_string()).collect();
    let fully_processed = state.is_fully_processed(&era_filename, &datasets)?;
    if needs_clean_before_reprocessing(force, fully_processed) {
        clean_era_completely(store, &era).await?;
    }
    state.mark_era_processing(network.as_str(), era_number, era.metadata.start_slot, era.metadata.end_slot)?;

    let normalized = era.normalize()?;
    let total_records = total_rows(&normalized);

    if let Some(action) = action {
        run_dataset_command(&era, action, store, state).await?;
    } else {
        export_to_clickhouse(&era, &normalized, store, state).await?;
    }

    state.mark_era_completed(network.as_str(), era_number, total_records as u64, datasets)?;
    Ok(())
}

fn total_rows(era: &NormalizedEra) -> usize {
    era.blocks.len()
        + era.sync_aggregates.len()
        + era.execution_payloads.len()
        + era.transactions.len()
        + era.withdrawals.len()
        + era.attestations.len()
        + era.deposits.len()
        + era.voluntary_exits.len()
        + era.proposer_slashings.len()
        + era.attester_slashings.len()
        + era.bls_changes.len()
        + era.blob_commitments.len()
        + era.execution_requests.len()
}

/// `force` always cleans. Otherwise a resume only cleans when some dataset
/// in this era was left in a non-`Completed` state by a prior run — a
/// clean resume of a fully-completed era must never re-delete and
/// re-insert data it already has.
fn needs_clean_before_reprocessing(force: bool, fully_processed: bool) -> bool {
    force || !fully_processed
}

/// Deletes every beacon-chain row for this era's slot range from the
/// analytics store, then lets the caller re-mark the era as `processing` —
/// the resume-before-reinsert contract §4.6/§5 requires before a forced or
/// crash-recovered re-run.
async fn clean_era_completely(store: &StoreConfig, era: &LoadedEra) -> anyhow::Result<()> {
    let client = open_loader_client(store).await?;
    for table in ALL_DATASETS {
        let statement = format!(
            "ALTER TABLE {}.{} DELETE WHERE slot BETWEEN {} AND {}",
            store.clickhouse_database, table, era.metadata.start_slot, era.metadata.end_slot
        );
        client.execute_ddl(&statement).await?;
    }
    Ok(())
}

pub async fn run_era_status(network: &str, store: &StoreConfig) -> anyhow::Result<()> {
    let state = open_state(store)?;
    let networks = networks_for(network);
    for net in networks {
        let completed = state.completed_eras(net.as_str(), 0, u64::MAX)?;
        println!("{net}: {} completed eras", completed.len());
    }
    Ok(())
}

pub async fn run_era_failed(network: &str, limit: Option<usize>, store: &StoreConfig) -> anyhow::Result<()> {
    let state = open_state(store)?;
    let network_filter = if network.eq_ignore_ascii_case("all") { None } else { Some(network) };
    let failed = state.recent_failed_datasets(network_filter, limit)?;
    if failed.is_empty() {
        println!("no failed datasets recorded");
        return Ok(());
    }
    for row in failed {
        println!(
            "{} [{}] attempt={} worker={} error={}",
            row.era_filename,
            row.dataset,
            row.attempt_count,
            row.worker_id,
            row.error_message.as_deref().unwrap_or("<none>"),
        );
    }
    Ok(())
}

/// Default staleness threshold for `era-cleanup` when no override is given.
const DEFAULT_STUCK_TIMEOUT_MINUTES: u64 = 60;

pub async fn run_era_cleanup(timeout_minutes: Option<u64>, store: &StoreConfig) -> anyhow::Result<()> {
    let state = open_state(store)?;
    let timeout = timeout_minutes.unwrap_or(DEFAULT_STUCK_TIMEOUT_MINUTES) as i64;
    let stuck = state.stuck_processing_eras(timeout)?;
    if stuck.is_empty() {
        println!("no eras stuck in processing past {timeout} minutes");
        return Ok(());
    }
    for row in &stuck {
        state.mark_era_failed(&row.network, row.era_number, "reset by era-cleanup: stuck in processing")?;
        println!(
            "{} era {} reset to failed (started {})",
            row.network, row.era_number, row.started_at
        );
    }
    Ok(())
}

pub async fn run_era_check(era_file: &Path) -> anyhow::Result<()> {
    let era = LoadedEra::open(era_file)?;
    let stats = era.statistics()?;
    println!(
        "{}: {} records ({} blocks, {} states, {} index), slots [{:?}, {:?}]",
        era_file.display(),
        stats.total_records,
        stats.block_records,
        stats.state_records,
        stats.index_records,
        stats.min_slot,
        stats.max_slot,
    );
    Ok(())
}

pub async fn run_migrate(action: &MigrateAction, store: &StoreConfig) -> anyhow::Result<()> {
    let state = open_state(store)?;
    let mut client = open_loader_client(store).await?;
    let database = store.loader_config()?.database;

    match action {
        MigrateAction::Status => {
            let applied = state.applied_migrations()?;
            for row in applied {
                println!("{} {} applied_at={}", row.version, row.name, row.applied_at);
            }
        }
        MigrateAction::Run { version } => {
            run_migrations(&mut client, &state, &database).await?;
            if let Some(version) = version {
                println!("ran migrations up to and including {version}");
            } else {
                println!("ran all pending migrations");
            }
        }
        MigrateAction::List => {
            for row in state.applied_migrations()? {
                println!("{} {}", row.version, row.name);
            }
        }
    }
    Ok(())
}

fn networks_for(network: &str) -> Vec<Network> {
    if network.eq_ignore_ascii_case("all") {
        vec![Network::Mainnet, Network::Gnosis, Network::Sepolia]
    } else {
        network.parse().into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::prefix_wildcard("mainnet-*.era", "mainnet-00100.era", true)]
    #[case::prefix_wildcard_wrong_network("mainnet-*.era", "gnosis-00100.era", false)]
    #[case::bare_wildcard("*.era", "anything.era", true)]
    #[case::bare_wildcard_wrong_extension("*.era", "anything.txt", false)]
    #[case::exact_match("mainnet-00100.era", "mainnet-00100.era", true)]
    #[case::exact_mismatch("mainnet-00100.era", "mainnet-00101.era", false)]
    fn glob_matches(#[case] pattern: &str, #[case] name: &str, #[case] expected: bool) {
        assert_eq!(matches_glob(pattern, name), expected);
    }

    #[test]
    fn era_files_in_scans_directory_for_era_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mainnet-00100.era"), b"").unwrap();
        std::fs::write(dir.path().join("mainnet-00101.era"), b"").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let files = era_files_in(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn era_files_in_applies_glob_pattern() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mainnet-00100.era"), b"").unwrap();
        std::fs::write(dir.path().join("gnosis-00100.era"), b"").unwrap();

        let pattern = dir.path().join("mainnet-*.era");
        let files = era_files_in(pattern.to_str().unwrap()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].to_str().unwrap().contains("mainnet"));
    }

    #[test]
    fn networks_for_all_returns_every_supported_network() {
        assert_eq!(networks_for("all").len(), 3);
        assert_eq!(networks_for("mainnet"), vec![Network::Mainnet]);
    }

    #[test]
    fn force_always_cleans_regardless_of_prior_state() {
        assert!(needs_clean_before_reprocessing(true, true));
        assert!(needs_clean_before_reprocessing(true, false));
    }

    #[test]
    fn non_force_resume_cleans_only_when_partial_data_exists() {
        assert!(needs_clean_before_reprocessing(false, false));
        assert!(!needs_clean_before_reprocessing(false, true));
    }
}
