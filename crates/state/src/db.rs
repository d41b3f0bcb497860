use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::Utc;
use redb::{Builder, Database, Durability, ReadableTable, TableDefinition};
use tracing::info;

use crate::{
    error::StoreError,
    types::{CompletionStatus, EraCompletionRow, EraProcessingStateRow, MigrationRow, ProcessingStatus, truncate_error},
};

const ERA_PROCESSING_STATE_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("era_processing_state");
const ERA_COMPLETION_TABLE: TableDefinition<&str, &str> = TableDefinition::new("era_completion");
const SCHEMA_MIGRATIONS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("schema_migrations");

pub const STATE_DB_FILE: &str = "era_parser_state.redb";
const STATE_DB_CACHE_SIZE: usize = 256 * 1024 * 1024;

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn next_sequence() -> u64 {
    SEQUENCE.fetch_add(1, Ordering::Relaxed)
}

fn log_key(parts: &[&str]) -> String {
    let now = Utc::now();
    let nanos = now.timestamp_nanos_opt().unwrap_or(0).max(0) as u128;
    format!("{}\u{0}{:032}\u{0}{:010}", parts.join("\u{0}"), nanos, next_sequence())
}

fn prefix_bounds(parts: &[&str]) -> (String, String) {
    let prefix = format!("{}\u{0}", parts.join("\u{0}"));
    let upper = format!("{prefix}\u{7f}");
    (prefix, upper)
}

/// Dataset-granular, append-only state store backed by an embedded redb
/// database. Every write is an append; the row with the greatest key
/// (keys are time-ordered) for a given `(era_filename, dataset)` pair is
/// the authoritative current state — mirroring the "latest row wins"
/// contract without needing an upsert primitive.
#[derive(Clone)]
pub struct StateStore {
    db: Arc<Database>,
}

impl StateStore {
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let db = Builder::new()
            .set_cache_size(STATE_DB_CACHE_SIZE)
            .create(path)?;

        let write_txn = db.begin_write()?;
        write_txn.open_table(ERA_PROCESSING_STATE_TABLE)?;
        write_txn.open_table(ERA_COMPLETION_TABLE)?;
        write_txn.open_table(SCHEMA_MIGRATIONS_TABLE)?;
        write_txn.commit()?;

        info!(path = %path.display(), "opened era-parser state store");
        Ok(Self { db: Arc::new(db) })
    }

    fn append_processing_row(&self, row: &EraProcessingStateRow) -> Result<(), StoreError> {
        let key = log_key(&[&row.era_filename, &row.dataset]);
        let value = serde_json::to_string(row)?;
        let mut write_txn = self.db.begin_write()?;
        write_txn.set_durability(Durability::Immediate);
        let mut table = write_txn.open_table(ERA_PROCESSING_STATE_TABLE)?;
        table.insert(key.as_str(), value.as_str())?;
        drop(table);
        write_txn.commit()?;
        Ok(())
    }

    fn append_completion_row(&self, row: &EraCompletionRow) -> Result<(), StoreError> {
        let key = log_key(&[&row.network, &row.era_number.to_string()]);
        let value = serde_json::to_string(row)?;
        let mut write_txn = self.db.begin_write()?;
        write_txn.set_durability(Durability::Immediate);
        let mut table = write_txn.open_table(ERA_COMPLETION_TABLE)?;
        table.insert(key.as_str(), value.as_str())?;
        drop(table);
        write_txn.commit()?;
        Ok(())
    }

    /// Returns the current (latest-appended) processing state for
    /// `(era_filename, dataset)`, or `None` if it has never been touched.
    pub fn latest_processing_state(
        &self,
        era_filename: &str,
        dataset: &str,
    ) -> Result<Option<EraProcessingStateRow>, StoreError> {
        let (lower, upper) = prefix_bounds(&[era_filename, dataset]);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ERA_PROCESSING_STATE_TABLE)?;
        let mut latest = None;
        for entry in table.range(lower.as_str()..upper.as_str())? {
            let (_, value) = entry?;
            latest = Some(serde_json::from_str(value.value())?);
        }
        Ok(latest)
    }

    /// Attempts to claim `(era_filename, dataset)` for `worker_id`. Returns
    /// `true` if the claim succeeded (the prior state was absent, pending,
    /// or failed); `false` if another worker already holds it.
    ///
    /// redb allows only one write transaction at a time, so the read of the
    /// prior state and the append of the new `Processing` row happen inside
    /// a single write transaction here rather than as two separate
    /// transactions — that is what turns "check, then act" into an atomic
    /// claim. Two threads racing this call will never both observe a
    /// claimable prior state: whichever write transaction commits second
    /// sees the first one's row and backs off.
    pub fn claim(
        &self,
        era_filename: &str,
        network: &str,
        era_number: u64,
        dataset: &str,
        worker_id: &str,
        file_hash: &str,
    ) -> Result<bool, StoreError> {
        let (lower, upper) = prefix_bounds(&[era_filename, dataset]);
        let mut write_txn = self.db.begin_write()?;
        write_txn.set_durability(Durability::Immediate);

        let prior: Option<EraProcessingStateRow> = {
            let table = write_txn.open_table(ERA_PROCESSING_STATE_TABLE)?;
            let mut latest = None;
            for entry in table.range(lower.as_str()..upper.as_str())? {
                let (_, value) = entry?;
                latest = Some(serde_json::from_str(value.value())?);
            }
            latest
        };

        let claimable = match prior.as_ref().map(|row| row.status) {
            None | Some(ProcessingStatus::Pending) | Some(ProcessingStatus::Failed) => true,
            Some(ProcessingStatus::Processing) | Some(ProcessingStatus::Completed) => false,
        };
        if !claimable {
            write_txn.commit()?;
            return Ok(false);
        }

        let attempt_count = prior.map(|row| row.attempt_count).unwrap_or(0);
        let row = EraProcessingStateRow {
            era_filename: era_filename.to_string(),
            network: network.to_string(),
            era_number,
            dataset: dataset.to_string(),
            status: ProcessingStatus::Processing,
            worker_id: worker_id.to_string(),
            attempt_count,
            file_hash: file_hash.to_string(),
            error_message: None,
            rows_inserted: 0,
            processing_duration_ms: 0,
            created_at: Utc::now(),
        };
        let key = log_key(&[era_filename, dataset]);
        let value = serde_json::to_string(&row)?;
        {
            let mut table = write_txn.open_table(ERA_PROCESSING_STATE_TABLE)?;
            table.insert(key.as_str(), value.as_str())?;
        }
        write_txn.commit()?;
        Ok(true)
    }

    pub fn complete(
        &self,
        era_filename: &str,
        network: &str,
        era_number: u64,
        dataset: &str,
        rows_inserted: u64,
        duration_ms: u64,
    ) -> Result<(), StoreError> {
        let prior = self.latest_processing_state(era_filename, dataset)?;
        self.append_processing_row(&EraProcessingStateRow {
            era_filename: era_filename.to_string(),
            network: network.to_string(),
            era_number,
            dataset: dataset.to_string(),
            status: ProcessingStatus::Completed,
            worker_id: prior.as_ref().map(|row| row.worker_id.clone()).unwrap_or_default(),
            attempt_count: prior.as_ref().map(|row| row.attempt_count).unwrap_or(0),
            file_hash: prior.map(|row| row.file_hash).unwrap_or_default(),
            error_message: None,
            rows_inserted,
            processing_duration_ms: duration_ms,
            created_at: Utc::now(),
        })
    }

    pub fn fail(
        &self,
        era_filename: &str,
        network: &str,
        era_number: u64,
        dataset: &str,
        error: &str,
    ) -> Result<(), StoreError> {
        let prior = self.latest_processing_state(era_filename, dataset)?;
        let attempt_count = prior.as_ref().map(|row| row.attempt_count).unwrap_or(0) + 1;
        self.append_processing_row(&EraProcessingStateRow {
            era_filename: era_filename.to_string(),
            network: network.to_string(),
            era_number,
            dataset: dataset.to_string(),
            status: ProcessingStatus::Failed,
            worker_id: prior.as_ref().map(|row| row.worker_id.clone()).unwrap_or_default(),
            attempt_count,
            file_hash: prior.map(|row| row.file_hash).unwrap_or_default(),
            error_message: Some(truncate_error(error)),
            rows_inserted: 0,
            processing_duration_ms: 0,
            created_at: Utc::now(),
        })
    }

    pub fn pending_datasets(
        &self,
        era_filename: &str,
        targets: &[String],
    ) -> Result<Vec<String>, StoreError> {
        let mut pending = Vec::new();
        for dataset in targets {
            let state = self.latest_processing_state(era_filename, dataset)?;
            let is_completed = matches!(
                state.map(|row| row.status),
                Some(ProcessingStatus::Completed)
            );
            if !is_completed {
                pending.push(dataset.clone());
            }
        }
        Ok(pending)
    }

    pub fn is_fully_processed(&self, era_filename: &str, targets: &[String]) -> Result<bool, StoreError> {
        Ok(self.pending_datasets(era_filename, targets)?.is_empty())
    }

    pub fn mark_era_processing(
        &self,
        network: &str,
        era_number: u64,
        slot_start: u64,
        slot_end: u64,
    ) -> Result<(), StoreError> {
        self.append_completion_row(&EraCompletionRow {
            network: network.to_string(),
            era_number,
            status: CompletionStatus::Processing,
            slot_start,
            slot_end,
            total_records: 0,
            datasets_processed: Vec::new(),
            started_at: Utc::now(),
            completed_at: None,
            error_message: None,
            retry_count: 0,
        })
    }

    pub fn mark_era_completed(
        &self,
        network: &str,
        era_number: u64,
        total_records: u64,
        datasets_processed: Vec<String>,
    ) -> Result<(), StoreError> {
        let prior = self.latest_completion(network, era_number)?;
        self.append_completion_row(&EraCompletionRow {
            network: network.to_string(),
            era_number,
            status: CompletionStatus::Completed,
            slot_start: prior.as_ref().map(|row| row.slot_start).unwrap_or(0),
            slot_end: prior.as_ref().map(|row| row.slot_end).unwrap_or(0),
            total_records,
            datasets_processed,
            started_at: prior.as_ref().map(|row| row.started_at).unwrap_or_else(Utc::now),
            completed_at: Some(Utc::now()),
            error_message: None,
            retry_count: prior.map(|row| row.retry_count).unwrap_or(0),
        })
    }

    pub fn mark_era_failed(&self, network: &str, era_number: u64, error: &str) -> Result<(), StoreError> {
        let prior = self.latest_completion(network, era_number)?;
        self.append_completion_row(&EraCompletionRow {
            network: network.to_string(),
            era_number,
            status: CompletionStatus::Failed,
            slot_start: prior.as_ref().map(|row| row.slot_start).unwrap_or(0),
            slot_end: prior.as_ref().map(|row| row.slot_end).unwrap_or(0),
            total_records: prior.as_ref().map(|row| row.total_records).unwrap_or(0),
            datasets_processed: prior.as_ref().map(|row| row.datasets_processed.clone()).unwrap_or_default(),
            started_at: prior.as_ref().map(|row| row.started_at).unwrap_or_else(Utc::now),
            completed_at: None,
            error_message: Some(truncate_error(error)),
            retry_count: prior.map(|row| row.retry_count).unwrap_or(0) + 1,
        })
    }

    pub fn latest_completion(
        &self,
        network: &str,
        era_number: u64,
    ) -> Result<Option<EraCompletionRow>, StoreError> {
        let era_number_str = era_number.to_string();
        let (lower, upper) = prefix_bounds(&[network, &era_number_str]);
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ERA_COMPLETION_TABLE)?;
        let mut latest = None;
        for entry in table.range(lower.as_str()..upper.as_str())? {
            let (_, value) = entry?;
            latest = Some(serde_json::from_str(value.value())?);
        }
        Ok(latest)
    }

    /// Eras for `network` whose latest completion status is `Completed`,
    /// within `[lo, hi]` inclusive.
    pub fn completed_eras(&self, network: &str, lo: u64, hi: u64) -> Result<Vec<u64>, StoreError> {
        let mut completed = Vec::new();
        for era_number in lo..=hi {
            if let Some(row) = self.latest_completion(network, era_number)? {
                if row.status == CompletionStatus::Completed {
                    completed.push(era_number);
                }
            }
        }
        Ok(completed)
    }

    pub fn record_migration(&self, row: &MigrationRow) -> Result<(), StoreError> {
        let value = serde_json::to_string(row)?;
        let mut write_txn = self.db.begin_write()?;
        write_txn.set_durability(Durability::Immediate);
        let mut table = write_txn.open_table(SCHEMA_MIGRATIONS_TABLE)?;
        table.insert(row.version.as_str(), value.as_str())?;
        drop(table);
        write_txn.commit()?;
        Ok(())
    }

    pub fn applied_migrations(&self) -> Result<Vec<MigrationRow>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SCHEMA_MIGRATIONS_TABLE)?;
        let mut rows = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            rows.push(serde_json::from_str(value.value())?);
        }
        rows.sort_by(|a: &MigrationRow, b: &MigrationRow| a.version.cmp(&b.version));
        Ok(rows)
    }

    /// Collapses the append-only `era_processing_state` log down to one row
    /// per `(era_filename, dataset)` key by keeping the last entry seen —
    /// keys sort lexicographically by `era_filename`, `dataset`, then the
    /// zero-padded timestamp, so iterating in key order and overwriting on
    /// every hit leaves the latest row per key standing.
    fn latest_processing_rows(&self) -> Result<Vec<EraProcessingStateRow>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ERA_PROCESSING_STATE_TABLE)?;
        let mut latest: HashMap<(String, String), EraProcessingStateRow> = HashMap::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let row: EraProcessingStateRow = serde_json::from_str(value.value())?;
            latest.insert((row.era_filename.clone(), row.dataset.clone()), row);
        }
        Ok(latest.into_values().collect())
    }

    /// Datasets whose latest recorded state is `Failed`, newest first,
    /// optionally restricted to `network` and truncated to `limit` rows.
    pub fn recent_failed_datasets(
        &self,
        network: Option<&str>,
        limit: Option<usize>,
    ) -> Result<Vec<EraProcessingStateRow>, StoreError> {
        let mut rows: Vec<EraProcessingStateRow> = self
            .latest_processing_rows()?
            .into_iter()
            .filter(|row| row.status == ProcessingStatus::Failed)
            .filter(|row| network.is_none_or(|net| row.network == net))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    /// Collapses `era_completion` down to one row per `(network, era_number)`
    /// the same way `latest_processing_rows` does for the processing log.
    fn latest_completion_rows(&self) -> Result<Vec<EraCompletionRow>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ERA_COMPLETION_TABLE)?;
        let mut latest: HashMap<(String, u64), EraCompletionRow> = HashMap::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let row: EraCompletionRow = serde_json::from_str(value.value())?;
            latest.insert((row.network.clone(), row.era_number), row);
        }
        Ok(latest.into_values().collect())
    }

    /// Eras stuck in `Processing` whose `started_at` is older than
    /// `timeout_minutes`, i.e. a worker claimed them and crashed or hung
    /// before marking completion or failure. Used to decide what `era-cleanup`
    /// should reset to `Failed` so it becomes eligible for reclaiming.
    pub fn stuck_processing_eras(&self, timeout_minutes: i64) -> Result<Vec<EraCompletionRow>, StoreError> {
        let cutoff = Utc::now() - chrono::Duration::minutes(timeout_minutes);
        let mut rows: Vec<EraCompletionRow> = self
            .latest_completion_rows()?
            .into_iter()
            .filter(|row| row.status == CompletionStatus::Processing && row.started_at < cutoff)
            .collect();
        rows.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn store() -> (StateStore, tempfile::TempDir) {
        let dir = tempdir().expect("tempdir");
        let store = StateStore::new(&dir.path().join(STATE_DB_FILE)).expect("open store");
        (store, dir)
    }

    #[test]
    fn claim_succeeds_on_untouched_dataset() {
        let (store, _dir) = store();
        let claimed = store
            .claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-1", "abc")
            .expect("claim");
        assert!(claimed);
    }

    #[test]
    fn claim_is_rejected_while_another_worker_holds_it() {
        let (store, _dir) = store();
        assert!(store.claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-1", "abc").unwrap());
        let second = store
            .claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-2", "abc")
            .unwrap();
        assert!(!second);
    }

    #[test]
    fn exactly_one_of_many_concurrent_claims_succeeds() {
        let (store, _dir) = store();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .claim("mainnet-00100.era", "mainnet", 100, "blocks", &format!("worker-{i}"), "abc")
                        .expect("claim")
                })
            })
            .collect();

        let winners = handles.into_iter().map(|h| h.join().unwrap()).filter(|&won| won).count();
        assert_eq!(winners, 1);
    }

    #[test]
    fn claim_succeeds_again_after_failure() {
        let (store, _dir) = store();
        assert!(store.claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-1", "abc").unwrap());
        store
            .fail("mainnet-00100.era", "mainnet", 100, "blocks", "boom")
            .unwrap();
        let retried = store
            .claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-2", "abc")
            .unwrap();
        assert!(retried);

        let state = store
            .latest_processing_state("mainnet-00100.era", "blocks")
            .unwrap()
            .unwrap();
        assert_eq!(state.attempt_count, 1);
        assert_eq!(state.worker_id, "worker-2");
    }

    #[test]
    fn completed_dataset_is_not_pending() {
        let (store, _dir) = store();
        store.claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-1", "abc").unwrap();
        store.complete("mainnet-00100.era", "mainnet", 100, "blocks", 8192, 450).unwrap();

        let targets = vec!["blocks".to_string(), "attestations".to_string()];
        let pending = store.pending_datasets("mainnet-00100.era", &targets).unwrap();
        assert_eq!(pending, vec!["attestations".to_string()]);
        assert!(!store.is_fully_processed("mainnet-00100.era", &targets).unwrap());
    }

    #[test]
    fn era_completion_round_trips_through_latest_completion() {
        let (store, _dir) = store();
        store.mark_era_processing("mainnet", 100, 3200000, 3208191).unwrap();
        store
            .mark_era_completed("mainnet", 100, 50_000, vec!["blocks".to_string()])
            .unwrap();

        let completion = store.latest_completion("mainnet", 100).unwrap().unwrap();
        assert_eq!(completion.status, CompletionStatus::Completed);
        assert_eq!(completion.total_records, 50_000);
        assert_eq!(store.completed_eras("mainnet", 99, 101).unwrap(), vec![100]);
    }

    #[test]
    fn recent_failed_datasets_filters_by_network_and_limit() {
        let (store, _dir) = store();
        store.claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-1", "abc").unwrap();
        store.fail("mainnet-00100.era", "mainnet", 100, "blocks", "boom").unwrap();
        store.claim("gnosis-00100.era", "gnosis", 100, "blocks", "worker-1", "abc").unwrap();
        store.fail("gnosis-00100.era", "gnosis", 100, "blocks", "kaboom").unwrap();

        let all = store.recent_failed_datasets(None, None).unwrap();
        assert_eq!(all.len(), 2);

        let mainnet_only = store.recent_failed_datasets(Some("mainnet"), None).unwrap();
        assert_eq!(mainnet_only.len(), 1);
        assert_eq!(mainnet_only[0].era_filename, "mainnet-00100.era");

        let limited = store.recent_failed_datasets(None, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn completed_dataset_is_excluded_from_recent_failures() {
        let (store, _dir) = store();
        store.claim("mainnet-00100.era", "mainnet", 100, "blocks", "worker-1", "abc").unwrap();
        store.complete("mainnet-00100.era", "mainnet", 100, "blocks", 10, 5).unwrap();
        assert!(store.recent_failed_datasets(None, None).unwrap().is_empty());
    }

    #[test]
    fn stuck_processing_eras_ignores_recent_and_completed_entries() {
        let (store, _dir) = store();
        store.mark_era_processing("mainnet", 100, 3200000, 3208191).unwrap();
        store.mark_era_processing("mainnet", 101, 3208192, 3216383).unwrap();
        store.mark_era_completed("mainnet", 101, 1000, vec!["blocks".to_string()]).unwrap();

        // era 100 is still "processing" and was just marked, so a 60-minute
        // timeout should not flag it yet.
        assert!(store.stuck_processing_eras(60).unwrap().is_empty());

        // a timeout of 0 minutes treats any processing row as stale.
        let stuck = store.stuck_processing_eras(0).unwrap();
        assert_eq!(stuck.len(), 1);
        assert_eq!(stuck[0].era_number, 100);
    }

    #[test]
    fn migrations_are_returned_in_version_order() {
        let (store, _dir) = store();
        store
            .record_migration(&MigrationRow {
                version: "0002".to_string(),
                name: "add_blob_commitments".to_string(),
                applied_at: Utc::now(),
                checksum: "deadbeef".to_string(),
            })
            .unwrap();
        store
            .record_migration(&MigrationRow {
                version: "0001".to_string(),
                name: "initial_schema".to_string(),
                applied_at: Utc::now(),
                checksum: "cafef00d".to_string(),
            })
            .unwrap();

        let applied = store.applied_migrations().unwrap();
        let versions: Vec<_> = applied.iter().map(|row| row.version.clone()).collect();
        assert_eq!(versions, vec!["0001".to_string(), "0002".to_string()]);
    }
}
