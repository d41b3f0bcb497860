use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::{hexutil::to_hex, types::checkpoint::Checkpoint};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationData {
    pub slot: u64,
    pub index: u64,
    pub beacon_block_root: String,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

impl AttestationData {
    pub const SSZ_SIZE: usize = 128;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            slot: read_u64_le(bytes, 0),
            index: read_u64_le(bytes, 8),
            beacon_block_root: to_hex(&bytes[16..48]),
            source: Checkpoint::parse(&bytes[48..88])?,
            target: Checkpoint::parse(&bytes[88..128])?,
        })
    }
}
