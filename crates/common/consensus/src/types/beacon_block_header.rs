use serde::{Deserialize, Serialize};

use era_ssz::read_u64_le;

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: String,
    pub state_root: String,
    pub body_root: String,
}

impl BeaconBlockHeader {
    pub const SSZ_SIZE: usize = 112;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            slot: read_u64_le(bytes, 0),
            proposer_index: read_u64_le(bytes, 8),
            parent_root: to_hex(&bytes[16..48]),
            state_root: to_hex(&bytes[48..80]),
            body_root: to_hex(&bytes[80..112]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub header: BeaconBlockHeader,
    pub signature: String,
}

impl SignedBeaconBlockHeader {
    pub const SSZ_SIZE: usize = BeaconBlockHeader::SSZ_SIZE + 96;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            header: BeaconBlockHeader::parse(&bytes[0..BeaconBlockHeader::SSZ_SIZE])?,
            signature: to_hex(&bytes[BeaconBlockHeader::SSZ_SIZE..Self::SSZ_SIZE]),
        })
    }
}
