use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlsToExecutionChange {
    pub validator_index: u64,
    pub from_bls_pubkey: String,
    pub to_execution_address: String,
    pub signature: String,
}

impl SignedBlsToExecutionChange {
    pub const SSZ_SIZE: usize = 172;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            validator_index: read_u64_le(bytes, 0),
            from_bls_pubkey: to_hex(&bytes[8..56]),
            to_execution_address: to_hex(&bytes[56..76]),
            signature: to_hex(&bytes[76..172]),
        })
    }
}
