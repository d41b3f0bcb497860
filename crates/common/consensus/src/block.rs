use era_network_spec::{Fork, NetworkSpec};
use era_ssz::{read_u32_le, read_u64_le};
use serde::{Deserialize, Serialize};

use crate::{body::{BeaconBlockBody, decode_body}, hexutil::to_hex};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeaconBlock {
    pub slot: u64,
    pub proposer_index: u64,
    pub parent_root: String,
    pub state_root: String,
    pub body: BeaconBlockBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedBeaconBlock {
    pub message: BeaconBlock,
    pub signature: String,
}

/// A block together with the fork that was selected to decode it — the
/// fork is not otherwise recoverable from the decoded tree alone (several
/// forks share identical non-empty field sets for a given block, e.g. an
/// Altair block with no sync participants looks like a Phase0 one).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecodedBlock {
    pub fork: Fork,
    pub block: SignedBeaconBlock,
}

const SIGNATURE_SIZE: usize = 96;
const ENVELOPE_HEADER_SIZE: usize = 4 + SIGNATURE_SIZE;
const MESSAGE_FIXED_PREFIX: usize = 8 + 8 + 32 + 32 + 4; // slot, proposer_index, parent_root, state_root, body_offset

/// Decodes one `SignedBeaconBlock` from already-decompressed SSZ bytes,
/// selecting the fork schema from the block's own slot via `network_spec`.
pub fn decode_signed_block(bytes: &[u8], network_spec: &NetworkSpec) -> Option<DecodedBlock> {
    if bytes.len() < ENVELOPE_HEADER_SIZE {
        return None;
    }
    let message_offset = read_u32_le(bytes, 0) as usize;
    if message_offset > bytes.len() || message_offset < ENVELOPE_HEADER_SIZE {
        return None;
    }
    let signature = to_hex(&bytes[4..ENVELOPE_HEADER_SIZE]);
    let message = &bytes[message_offset..];
    if message.len() < MESSAGE_FIXED_PREFIX {
        return None;
    }

    let slot = read_u64_le(message, 0);
    let proposer_index = read_u64_le(message, 8);
    let parent_root = to_hex(&message[16..48]);
    let state_root = to_hex(&message[48..80]);
    let body_offset = read_u32_le(message, 80) as usize;
    if body_offset > message.len() {
        return None;
    }

    let fork = network_spec.fork_for_slot(slot);
    let body = decode_body(fork, &message[body_offset..])?;

    Some(DecodedBlock {
        fork,
        block: SignedBeaconBlock {
            message: BeaconBlock {
                slot,
                proposer_index,
                parent_root,
                state_root,
                body,
            },
            signature,
        },
    })
}

#[cfg(test)]
mod tests {
    use era_network_spec::mainnet;

    use super::*;

    fn empty_phase0_block_bytes(slot: u64) -> Vec<u8> {
        let body_offset: u32 = 84;
        let body_len = 200 + 5 * 4;
        let offsets = [body_len as u32; 5];

        let mut body = Vec::new();
        body.extend_from_slice(&[0u8; 96]); // randao_reveal
        body.extend_from_slice(&[0u8; 72]); // eth1_data
        body.extend_from_slice(&[0u8; 32]); // graffiti
        for offset in offsets {
            body.extend_from_slice(&offset.to_le_bytes());
        }

        let mut message = Vec::new();
        message.extend_from_slice(&slot.to_le_bytes());
        message.extend_from_slice(&0u64.to_le_bytes()); // proposer_index
        message.extend_from_slice(&[0u8; 32]); // parent_root
        message.extend_from_slice(&[0u8; 32]); // state_root
        message.extend_from_slice(&body_offset.to_le_bytes());
        message.extend_from_slice(&body);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(ENVELOPE_HEADER_SIZE as u32).to_le_bytes());
        bytes.extend_from_slice(&[0u8; SIGNATURE_SIZE]);
        bytes.extend_from_slice(&message);
        bytes
    }

    #[test]
    fn decodes_empty_phase0_block() {
        let spec = mainnet();
        let bytes = empty_phase0_block_bytes(100);
        let decoded = decode_signed_block(&bytes, &spec).expect("decodes");
        assert_eq!(decoded.fork, Fork::Phase0);
        assert_eq!(decoded.block.message.slot, 100);
        assert!(decoded.block.message.body.attestations.is_empty());
        assert!(decoded.block.message.body.execution_payload.is_none());
    }

    #[test]
    fn truncated_envelope_is_rejected() {
        let spec = mainnet();
        assert!(decode_signed_block(&[0u8; 3], &spec).is_none());
    }
}
