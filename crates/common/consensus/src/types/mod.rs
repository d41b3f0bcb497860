pub mod attestation;
pub mod attestation_data;
pub mod attester_slashing;
pub mod beacon_block_header;
pub mod bls_to_execution_change;
pub mod checkpoint;
pub mod deposit;
pub mod eth1_data;
pub mod execution_payload;
pub mod execution_requests;
pub mod indexed_attestation;
pub mod proposer_slashing;
pub mod sync_aggregate;
pub mod voluntary_exit;
pub mod withdrawal;

pub use attestation::Attestation;
pub use attestation_data::AttestationData;
pub use attester_slashing::AttesterSlashing;
pub use beacon_block_header::{BeaconBlockHeader, SignedBeaconBlockHeader};
pub use bls_to_execution_change::SignedBlsToExecutionChange;
pub use checkpoint::Checkpoint;
pub use deposit::Deposit;
pub use eth1_data::Eth1Data;
pub use execution_payload::{ExecutionPayload, PayloadShape};
pub use execution_requests::{ConsolidationRequest, DepositRequest, ExecutionRequests, WithdrawalRequest};
pub use indexed_attestation::IndexedAttestation;
pub use proposer_slashing::ProposerSlashing;
pub use sync_aggregate::SyncAggregate;
pub use voluntary_exit::SignedVoluntaryExit;
pub use withdrawal::Withdrawal;
