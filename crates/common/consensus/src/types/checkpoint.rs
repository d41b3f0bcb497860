use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: u64,
    pub root: String,
}

impl Checkpoint {
    pub const SSZ_SIZE: usize = 40;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            epoch: read_u64_le(bytes, 0),
            root: to_hex(&bytes[8..40]),
        })
    }
}
