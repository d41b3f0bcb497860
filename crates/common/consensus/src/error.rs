#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("block bytes too short: need at least {need} bytes, got {got}")]
    Truncated { need: usize, got: usize },
    #[error("unsupported fork for slot {slot}")]
    UnsupportedFork { slot: u64 },
}
