use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedVoluntaryExit {
    pub epoch: u64,
    pub validator_index: u64,
    pub signature: String,
}

impl SignedVoluntaryExit {
    pub const SSZ_SIZE: usize = 112;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            epoch: read_u64_le(bytes, 0),
            validator_index: read_u64_le(bytes, 8),
            signature: to_hex(&bytes[16..112]),
        })
    }
}
