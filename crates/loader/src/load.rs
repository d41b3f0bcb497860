use era_normalize::NormalizedEra;
use era_state::StateStore;
use tracing::{info, warn};

use crate::{clamp::ClampableRow, client::StoreClient, error::LoaderError};

/// Every dataset name the loader knows how to write, in the order
/// migrations create their tables. Used for resume/pending-dataset
/// bookkeeping across the whole era, not just the datasets a given
/// command actually touches.
pub const ALL_DATASETS: &[&str] = &[
    "blocks",
    "sync_aggregates",
    "execution_payloads",
    "transactions",
    "withdrawals",
    "attestations",
    "deposits",
    "voluntary_exits",
    "proposer_slashings",
    "attester_slashings",
    "bls_changes",
    "blob_commitments",
    "execution_requests",
];

/// Loads every non-empty dataset in `era` into the store, respecting the
/// claim/complete/fail protocol so a concurrent worker or a resumed run
/// does not double-insert a dataset another worker already finished.
#[allow(clippy::too_many_arguments)]
pub async fn load_era(
    client: &mut StoreClient,
    state: &StateStore,
    era_filename: &str,
    network: &str,
    era_number: u64,
    worker_id: &str,
    file_hash: &str,
    era: &NormalizedEra,
) -> Result<(), LoaderError> {
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "blocks", &era.blocks).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "sync_aggregates", &era.sync_aggregates).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "execution_payloads", &era.execution_payloads).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "transactions", &era.transactions).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "withdrawals", &era.withdrawals).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "attestations", &era.attestations).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "deposits", &era.deposits).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "voluntary_exits", &era.voluntary_exits).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "proposer_slashings", &era.proposer_slashings).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "attester_slashings", &era.attester_slashings).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "bls_changes", &era.bls_changes).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "blob_commitments", &era.blob_commitments).await?;
    load_one(client, state, era_filename, network, era_number, worker_id, file_hash, "execution_requests", &era.execution_requests).await?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn load_one<T>(
    client: &mut StoreClient,
    state: &StateStore,
    era_filename: &str,
    network: &str,
    era_number: u64,
    worker_id: &str,
    file_hash: &str,
    table: &str,
    rows: &[T],
) -> Result<(), LoaderError>
where
    T: clickhouse::Row + serde::Serialize + Clone + ClampableRow,
{
    if rows.is_empty() {
        return Ok(());
    }

    let claimed = state.claim(era_filename, network, era_number, table, worker_id, file_hash)?;
    if !claimed {
        info!(table, "dataset already claimed or completed, skipping");
        return Ok(());
    }

    let clamped: Vec<T> = rows.iter().cloned().map(ClampableRow::clamped).collect();

    let started = std::time::Instant::now();
    match client.insert_batched(table, table, &clamped).await {
        Ok(()) => {
            state.complete(era_filename, network, era_number, table, clamped.len() as u64, started.elapsed().as_millis() as u64)?;
            Ok(())
        }
        Err(err) => {
            warn!(table, "insert failed: {err}");
            state.fail(era_filename, network, era_number, table, &err.to_string())?;
            Ok(())
        }
    }
}
