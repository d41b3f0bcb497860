use serde::{Deserialize, Serialize};

use era_ssz::read_u32_le;

use crate::types::indexed_attestation::IndexedAttestation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

impl AttesterSlashing {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 8 {
            return None;
        }
        let offset_1 = read_u32_le(bytes, 0) as usize;
        let offset_2 = read_u32_le(bytes, 4) as usize;
        if offset_1 > bytes.len() || offset_2 > bytes.len() || offset_1 > offset_2 {
            return None;
        }
        Some(Self {
            attestation_1: IndexedAttestation::parse(&bytes[offset_1..offset_2])?,
            attestation_2: IndexedAttestation::parse(&bytes[offset_2..])?,
        })
    }
}
