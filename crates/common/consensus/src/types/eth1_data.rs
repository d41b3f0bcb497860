use serde::{Deserialize, Serialize};

use era_ssz::{read_u64_le};

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Eth1Data {
    pub deposit_root: String,
    pub deposit_count: u64,
    pub block_hash: String,
}

impl Eth1Data {
    pub const SSZ_SIZE: usize = 72;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            deposit_root: to_hex(&bytes[0..32]),
            deposit_count: read_u64_le(bytes, 32),
            block_hash: to_hex(&bytes[40..72]),
        })
    }
}
