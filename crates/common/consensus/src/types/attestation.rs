use serde::{Deserialize, Serialize};

use era_ssz::read_u32_le;

use crate::{hexutil::to_hex, types::attestation_data::AttestationData};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    pub aggregation_bits: String,
    pub data: AttestationData,
    pub signature: String,
}

impl Attestation {
    /// `aggregation_bits` offset (4) + [`AttestationData`] (128) + BLS
    /// signature (96).
    pub const FIXED_PREFIX: usize = 4 + AttestationData::SSZ_SIZE + 96;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::FIXED_PREFIX {
            return None;
        }
        let bits_offset = read_u32_le(bytes, 0) as usize;
        if bits_offset > bytes.len() {
            return None;
        }
        Some(Self {
            data: AttestationData::parse(&bytes[4..4 + AttestationData::SSZ_SIZE])?,
            signature: to_hex(&bytes[4 + AttestationData::SSZ_SIZE..Self::FIXED_PREFIX]),
            aggregation_bits: to_hex(&bytes[bits_offset..]),
        })
    }
}
