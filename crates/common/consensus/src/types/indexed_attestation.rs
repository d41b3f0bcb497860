use serde::{Deserialize, Serialize};

use era_ssz::{read_u32_le, read_u64_le};

use crate::{hexutil::to_hex, types::attestation_data::AttestationData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedAttestation {
    pub attesting_indices: Vec<u64>,
    pub data: AttestationData,
    pub signature: String,
}

impl IndexedAttestation {
    pub const FIXED_PREFIX: usize = 4 + AttestationData::SSZ_SIZE + 96;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::FIXED_PREFIX {
            return None;
        }
        let indices_offset = read_u32_le(bytes, 0) as usize;
        if indices_offset > bytes.len() {
            return None;
        }
        let indices_bytes = &bytes[indices_offset..];
        let attesting_indices = indices_bytes
            .chunks_exact(8)
            .map(|chunk| read_u64_le(chunk, 0))
            .collect();
        Some(Self {
            data: AttestationData::parse(&bytes[4..4 + AttestationData::SSZ_SIZE])?,
            signature: to_hex(&bytes[4 + AttestationData::SSZ_SIZE..Self::FIXED_PREFIX]),
            attesting_indices,
        })
    }
}
