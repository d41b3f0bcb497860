use serde::{Deserialize, Serialize};

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAggregate {
    pub sync_committee_bits: String,
    pub sync_committee_signature: String,
}

impl SyncAggregate {
    pub const SSZ_SIZE: usize = 160;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            sync_committee_bits: to_hex(&bytes[0..64]),
            sync_committee_signature: to_hex(&bytes[64..160]),
        })
    }
}
