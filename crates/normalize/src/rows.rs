use chrono::{DateTime, Utc};
use clickhouse::Row;
use serde::Serialize;

#[derive(Debug, Clone, Row, Serialize)]
pub struct BlockRow {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: String,
    pub state_root: String,
    pub signature: String,
    pub version: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
    pub randao_reveal: String,
    pub graffiti: String,
    pub eth1_deposit_root: String,
    pub eth1_deposit_count: u64,
    pub eth1_block_hash: String,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct SyncAggregateRow {
    pub slot: u64,
    pub sync_committee_bits: String,
    pub sync_committee_signature: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
    pub participating_validators: u32,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct ExecutionPayloadRow {
    pub slot: u64,
    pub parent_hash: String,
    pub fee_recipient: String,
    pub state_root: String,
    pub receipts_root: String,
    pub logs_bloom: String,
    pub prev_randao: String,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
    pub base_fee_per_gas: String,
    pub block_hash: String,
    pub blob_gas_used: Option<u64>,
    pub excess_blob_gas: Option<u64>,
    pub extra_data: String,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct TransactionRow {
    pub slot: u64,
    pub block_number: u64,
    pub block_hash: String,
    pub transaction_index: u64,
    pub transaction_hash: String,
    pub fee_recipient: String,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub base_fee_per_gas: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct WithdrawalRow {
    pub slot: u64,
    pub block_number: u64,
    pub block_hash: String,
    pub withdrawal_index: u64,
    pub validator_index: u64,
    pub address: String,
    pub amount: u64,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct AttestationRow {
    pub slot: u64,
    pub attestation_index: u64,
    pub aggregation_bits: String,
    pub signature: String,
    pub attestation_slot: u64,
    pub committee_index: u64,
    pub beacon_block_root: String,
    pub source_epoch: u64,
    pub source_root: String,
    pub target_epoch: u64,
    pub target_root: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct DepositRow {
    pub slot: u64,
    pub deposit_index: u64,
    pub pubkey: String,
    pub withdrawal_credentials: String,
    pub amount: u64,
    pub signature: String,
    pub proof: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct VoluntaryExitRow {
    pub slot: u64,
    pub exit_index: u64,
    pub signature: String,
    pub epoch: u64,
    pub validator_index: u64,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct ProposerSlashingRow {
    pub slot: u64,
    pub slashing_index: u64,
    pub header_1_slot: u64,
    pub header_1_proposer_index: u64,
    pub header_1_parent_root: String,
    pub header_1_state_root: String,
    pub header_1_body_root: String,
    pub header_1_signature: String,
    pub header_2_slot: u64,
    pub header_2_proposer_index: u64,
    pub header_2_parent_root: String,
    pub header_2_state_root: String,
    pub header_2_body_root: String,
    pub header_2_signature: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct AttesterSlashingRow {
    pub slot: u64,
    pub slashing_index: u64,
    pub att_1_slot: u64,
    pub att_1_committee_index: u64,
    pub att_1_beacon_block_root: String,
    pub att_1_source_epoch: u64,
    pub att_1_source_root: String,
    pub att_1_target_epoch: u64,
    pub att_1_target_root: String,
    pub att_1_signature: String,
    pub att_1_attesting_indices: String,
    pub att_1_validator_count: u64,
    pub att_2_slot: u64,
    pub att_2_committee_index: u64,
    pub att_2_beacon_block_root: String,
    pub att_2_source_epoch: u64,
    pub att_2_source_root: String,
    pub att_2_target_epoch: u64,
    pub att_2_target_root: String,
    pub att_2_signature: String,
    pub att_2_attesting_indices: String,
    pub att_2_validator_count: u64,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
    pub total_slashed_validators: u64,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct BlsChangeRow {
    pub slot: u64,
    pub change_index: u64,
    pub signature: String,
    pub validator_index: u64,
    pub from_bls_pubkey: String,
    pub to_execution_address: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct BlobCommitmentRow {
    pub slot: u64,
    pub commitment_index: u64,
    pub commitment: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}

#[derive(Debug, Clone, Row, Serialize)]
pub struct ExecutionRequestRow {
    pub slot: u64,
    pub request_type: String,
    pub request_index: u64,
    pub pubkey: String,
    pub withdrawal_credentials: String,
    pub amount: u64,
    pub signature: String,
    pub deposit_request_index: u64,
    pub source_address: String,
    pub validator_pubkey: String,
    pub source_pubkey: String,
    pub target_pubkey: String,
    #[serde(with = "clickhouse::serde::chrono::datetime")]
    pub timestamp_utc: DateTime<Utc>,
}
