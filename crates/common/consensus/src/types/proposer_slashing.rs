use serde::{Deserialize, Serialize};

use crate::types::beacon_block_header::SignedBeaconBlockHeader;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposerSlashing {
    pub header_1: SignedBeaconBlockHeader,
    pub header_2: SignedBeaconBlockHeader,
}

impl ProposerSlashing {
    pub const SSZ_SIZE: usize = SignedBeaconBlockHeader::SSZ_SIZE * 2;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            header_1: SignedBeaconBlockHeader::parse(
                &bytes[0..SignedBeaconBlockHeader::SSZ_SIZE],
            )?,
            header_2: SignedBeaconBlockHeader::parse(
                &bytes[SignedBeaconBlockHeader::SSZ_SIZE..Self::SSZ_SIZE],
            )?,
        })
    }
}
