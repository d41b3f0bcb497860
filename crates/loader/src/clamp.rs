use era_normalize::{
    AttestationRow, AttesterSlashingRow, BlockRow, BlobCommitmentRow, BlsChangeRow, DepositRow,
    ExecutionPayloadRow, ExecutionRequestRow, ProposerSlashingRow, SyncAggregateRow,
    TransactionRow, VoluntaryExitRow, WithdrawalRow,
};

use crate::coerce::clamp_timestamp;

/// Implemented by every row type the loader inserts, so `load_one` can
/// apply the storage-ceiling timestamp clamp generically instead of
/// special-casing each dataset.
pub trait ClampableRow {
    fn clamped(self) -> Self;
}

macro_rules! impl_clampable_row {
    ($ty:ty) => {
        impl ClampableRow for $ty {
            fn clamped(mut self) -> Self {
                self.timestamp_utc = clamp_timestamp(self.timestamp_utc);
                self
            }
        }
    };
}

impl_clampable_row!(BlockRow);
impl_clampable_row!(SyncAggregateRow);
impl_clampable_row!(ExecutionPayloadRow);
impl_clampable_row!(TransactionRow);
impl_clampable_row!(WithdrawalRow);
impl_clampable_row!(AttestationRow);
impl_clampable_row!(DepositRow);
impl_clampable_row!(VoluntaryExitRow);
impl_clampable_row!(ProposerSlashingRow);
impl_clampable_row!(AttesterSlashingRow);
impl_clampable_row!(BlsChangeRow);
impl_clampable_row!(BlobCommitmentRow);
impl_clampable_row!(ExecutionRequestRow);
