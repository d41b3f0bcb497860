use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub proof: Vec<String>,
    pub pubkey: String,
    pub withdrawal_credentials: String,
    pub amount: u64,
    pub signature: String,
}

impl Deposit {
    pub const SSZ_SIZE: usize = 1240;
    const PROOF_LEN: usize = 33;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        let proof = (0..Self::PROOF_LEN)
            .map(|i| to_hex(&bytes[i * 32..(i + 1) * 32]))
            .collect();
        let data = &bytes[Self::PROOF_LEN * 32..];
        Some(Self {
            proof,
            pubkey: to_hex(&data[0..48]),
            withdrawal_credentials: to_hex(&data[48..80]),
            amount: read_u64_le(data, 80),
            signature: to_hex(&data[88..184]),
        })
    }
}
