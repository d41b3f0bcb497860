use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub index: u64,
    pub validator_index: u64,
    pub address: String,
    pub amount: u64,
}

impl Withdrawal {
    pub const SSZ_SIZE: usize = 44;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            index: read_u64_le(bytes, 0),
            validator_index: read_u64_le(bytes, 8),
            address: to_hex(&bytes[16..36]),
            amount: read_u64_le(bytes, 36),
        })
    }
}
