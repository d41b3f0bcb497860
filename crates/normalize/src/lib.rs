mod normalize;
mod rows;
mod timestamp;

pub use normalize::{NormalizedEra, normalize_era};
pub use rows::{
    AttestationRow, AttesterSlashingRow, BlockRow, BlobCommitmentRow, BlsChangeRow, DepositRow,
    ExecutionPayloadRow, ExecutionRequestRow, ProposerSlashingRow, SyncAggregateRow,
    TransactionRow, VoluntaryExitRow, WithdrawalRow,
};
pub use timestamp::canonical_timestamp;
