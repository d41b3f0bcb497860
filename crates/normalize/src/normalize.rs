use era_consensus::DecodedBlock;
use era_network_spec::NetworkSpec;

use crate::{
    rows::{
        AttestationRow, AttesterSlashingRow, BlockRow, BlobCommitmentRow, BlsChangeRow, DepositRow,
        ExecutionPayloadRow, ExecutionRequestRow, ProposerSlashingRow, SyncAggregateRow,
        TransactionRow, VoluntaryExitRow, WithdrawalRow,
    },
    timestamp::canonical_timestamp,
};

/// The ~13 relational datasets a decoded era flattens into, one row array
/// per dataset, every row carrying its parent block's `slot` and the one
/// canonical `timestamp_utc` computed for that block.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct NormalizedEra {
    pub blocks: Vec<BlockRow>,
    pub sync_aggregates: Vec<SyncAggregateRow>,
    pub execution_payloads: Vec<ExecutionPayloadRow>,
    pub transactions: Vec<TransactionRow>,
    pub withdrawals: Vec<WithdrawalRow>,
    pub attestations: Vec<AttestationRow>,
    pub deposits: Vec<DepositRow>,
    pub voluntary_exits: Vec<VoluntaryExitRow>,
    pub proposer_slashings: Vec<ProposerSlashingRow>,
    pub attester_slashings: Vec<AttesterSlashingRow>,
    pub bls_changes: Vec<BlsChangeRow>,
    pub blob_commitments: Vec<BlobCommitmentRow>,
    pub execution_requests: Vec<ExecutionRequestRow>,
}

pub fn normalize_era(blocks: &[DecodedBlock], spec: &NetworkSpec) -> NormalizedEra {
    let mut era = NormalizedEra::default();
    for decoded in blocks {
        normalize_block(decoded, spec, &mut era);
    }
    era
}

fn normalize_block(decoded: &DecodedBlock, spec: &NetworkSpec, era: &mut NormalizedEra) {
    let message = &decoded.block.message;
    let body = &message.body;
    let slot = message.slot;
    let timestamp_utc = canonical_timestamp(body.execution_payload.as_ref(), slot, spec);

    era.blocks.push(BlockRow {
        slot,
        proposer_index: message.proposer_index,
        parent_root: message.parent_root.clone(),
        state_root: message.state_root.clone(),
        signature: decoded.block.signature.clone(),
        version: decoded.fork.to_string(),
        timestamp_utc,
        randao_reveal: body.randao_reveal.clone(),
        graffiti: body.graffiti.clone(),
        eth1_deposit_root: body.eth1_data.deposit_root.clone(),
        eth1_deposit_count: body.eth1_data.deposit_count,
        eth1_block_hash: body.eth1_data.block_hash.clone(),
    });

    if let Some(sync_aggregate) = &body.sync_aggregate {
        era.sync_aggregates.push(SyncAggregateRow {
            slot,
            sync_committee_bits: sync_aggregate.sync_committee_bits.clone(),
            sync_committee_signature: sync_aggregate.sync_committee_signature.clone(),
            timestamp_utc,
            participating_validators: count_hex_bits(&sync_aggregate.sync_committee_bits),
        });
    }

    if let Some(payload) = &body.execution_payload {
        era.execution_payloads.push(ExecutionPayloadRow {
            slot,
            parent_hash: payload.parent_hash.clone(),
            fee_recipient: payload.fee_recipient.clone(),
            state_root: payload.state_root.clone(),
            receipts_root: payload.receipts_root.clone(),
            logs_bloom: payload.logs_bloom.clone(),
            prev_randao: payload.prev_randao.clone(),
            block_number: payload.block_number,
            gas_limit: payload.gas_limit,
            gas_used: payload.gas_used,
            timestamp_utc,
            base_fee_per_gas: payload.base_fee_per_gas.clone(),
            block_hash: payload.block_hash.clone(),
            blob_gas_used: payload.blob_gas_used,
            excess_blob_gas: payload.excess_blob_gas,
            extra_data: payload.extra_data.clone(),
        });

        for (index, tx) in payload.transactions.iter().enumerate() {
            era.transactions.push(TransactionRow {
                slot,
                block_number: payload.block_number,
                block_hash: payload.block_hash.clone(),
                transaction_index: index as u64,
                transaction_hash: tx.clone(),
                fee_recipient: payload.fee_recipient.clone(),
                gas_limit: payload.gas_limit,
                gas_used: payload.gas_used,
                base_fee_per_gas: payload.base_fee_per_gas.clone(),
                timestamp_utc,
            });
        }

        for (index, withdrawal) in payload.withdrawals.iter().enumerate() {
            era.withdrawals.push(WithdrawalRow {
                slot,
                block_number: payload.block_number,
                block_hash: payload.block_hash.clone(),
                withdrawal_index: index as u64,
                validator_index: withdrawal.validator_index,
                address: withdrawal.address.clone(),
                amount: withdrawal.amount,
                timestamp_utc,
            });
        }
    }

    for (index, attestation) in body.attestations.iter().enumerate() {
        era.attestations.push(AttestationRow {
            slot,
            attestation_index: index as u64,
            aggregation_bits: attestation.aggregation_bits.clone(),
            signature: attestation.signature.clone(),
            attestation_slot: attestation.data.slot,
            committee_index: attestation.data.index,
            beacon_block_root: attestation.data.beacon_block_root.clone(),
            source_epoch: attestation.data.source.epoch,
            source_root: attestation.data.source.root.clone(),
            target_epoch: attestation.data.target.epoch,
            target_root: attestation.data.target.root.clone(),
            timestamp_utc,
        });
    }

    for (index, deposit) in body.deposits.iter().enumerate() {
        era.deposits.push(DepositRow {
            slot,
            deposit_index: index as u64,
            pubkey: deposit.pubkey.clone(),
            withdrawal_credentials: deposit.withdrawal_credentials.clone(),
            amount: deposit.amount,
            signature: deposit.signature.clone(),
            proof: serde_json::to_string(&deposit.proof).unwrap_or_default(),
            timestamp_utc,
        });
    }

    for (index, exit) in body.voluntary_exits.iter().enumerate() {
        era.voluntary_exits.push(VoluntaryExitRow {
            slot,
            exit_index: index as u64,
            signature: exit.signature.clone(),
            epoch: exit.epoch,
            validator_index: exit.validator_index,
            timestamp_utc,
        });
    }

    for (index, slashing) in body.proposer_slashings.iter().enumerate() {
        era.proposer_slashings.push(ProposerSlashingRow {
            slot,
            slashing_index: index as u64,
            header_1_slot: slashing.header_1.header.slot,
            header_1_proposer_index: slashing.header_1.header.proposer_index,
            header_1_parent_root: slashing.header_1.header.parent_root.clone(),
            header_1_state_root: slashing.header_1.header.state_root.clone(),
            header_1_body_root: slashing.header_1.header.body_root.clone(),
            header_1_signature: slashing.header_1.signature.clone(),
            header_2_slot: slashing.header_2.header.slot,
            header_2_proposer_index: slashing.header_2.header.proposer_index,
            header_2_parent_root: slashing.header_2.header.parent_root.clone(),
            header_2_state_root: slashing.header_2.header.state_root.clone(),
            header_2_body_root: slashing.header_2.header.body_root.clone(),
            header_2_signature: slashing.header_2.signature.clone(),
            timestamp_utc,
        });
    }

    for (index, slashing) in body.attester_slashings.iter().enumerate() {
        let att_1 = &slashing.attestation_1;
        let att_2 = &slashing.attestation_2;
        era.attester_slashings.push(AttesterSlashingRow {
            slot,
            slashing_index: index as u64,
            att_1_slot: att_1.data.slot,
            att_1_committee_index: att_1.data.index,
            att_1_beacon_block_root: att_1.data.beacon_block_root.clone(),
            att_1_source_epoch: att_1.data.source.epoch,
            att_1_source_root: att_1.data.source.root.clone(),
            att_1_target_epoch: att_1.data.target.epoch,
            att_1_target_root: att_1.data.target.root.clone(),
            att_1_signature: att_1.signature.clone(),
            att_1_attesting_indices: serde_json::to_string(&att_1.attesting_indices).unwrap_or_default(),
            att_1_validator_count: att_1.attesting_indices.len() as u64,
            att_2_slot: att_2.data.slot,
            att_2_committee_index: att_2.data.index,
            att_2_beacon_block_root: att_2.data.beacon_block_root.clone(),
            att_2_source_epoch: att_2.data.source.epoch,
            att_2_source_root: att_2.data.source.root.clone(),
            att_2_target_epoch: att_2.data.target.epoch,
            att_2_target_root: att_2.data.target.root.clone(),
            att_2_signature: att_2.signature.clone(),
            att_2_attesting_indices: serde_json::to_string(&att_2.attesting_indices).unwrap_or_default(),
            att_2_validator_count: att_2.attesting_indices.len() as u64,
            timestamp_utc,
            total_slashed_validators: (att_1.attesting_indices.len() + att_2.attesting_indices.len()) as u64,
        });
    }

    for (index, change) in body.bls_to_execution_changes.iter().enumerate() {
        era.bls_changes.push(BlsChangeRow {
            slot,
            change_index: index as u64,
            signature: change.signature.clone(),
            validator_index: change.validator_index,
            from_bls_pubkey: change.from_bls_pubkey.clone(),
            to_execution_address: change.to_execution_address.clone(),
            timestamp_utc,
        });
    }

    for (index, commitment) in body.blob_kzg_commitments.iter().enumerate() {
        era.blob_commitments.push(BlobCommitmentRow {
            slot,
            commitment_index: index as u64,
            commitment: commitment.clone(),
            timestamp_utc,
        });
    }

    if let Some(requests) = &body.execution_requests {
        for (index, deposit) in requests.deposits.iter().enumerate() {
            era.execution_requests.push(ExecutionRequestRow {
                slot,
                request_type: "deposit".to_string(),
                request_index: index as u64,
                pubkey: deposit.pubkey.clone(),
                withdrawal_credentials: deposit.withdrawal_credentials.clone(),
                amount: deposit.amount,
                signature: deposit.signature.clone(),
                deposit_request_index: deposit.index,
                source_address: String::new(),
                validator_pubkey: String::new(),
                source_pubkey: String::new(),
                target_pubkey: String::new(),
                timestamp_utc,
            });
        }
        for (index, withdrawal) in requests.withdrawals.iter().enumerate() {
            era.execution_requests.push(ExecutionRequestRow {
                slot,
                request_type: "withdrawal".to_string(),
                request_index: index as u64,
                pubkey: String::new(),
                withdrawal_credentials: String::new(),
                amount: withdrawal.amount,
                signature: String::new(),
                deposit_request_index: 0,
                source_address: withdrawal.source_address.clone(),
                validator_pubkey: withdrawal.validator_pubkey.clone(),
                source_pubkey: String::new(),
                target_pubkey: String::new(),
                timestamp_utc,
            });
        }
        for (index, consolidation) in requests.consolidations.iter().enumerate() {
            era.execution_requests.push(ExecutionRequestRow {
                slot,
                request_type: "consolidation".to_string(),
                request_index: index as u64,
                pubkey: String::new(),
                withdrawal_credentials: String::new(),
                amount: 0,
                signature: String::new(),
                deposit_request_index: 0,
                source_address: consolidation.source_address.clone(),
                validator_pubkey: String::new(),
                source_pubkey: consolidation.source_pubkey.clone(),
                target_pubkey: consolidation.target_pubkey.clone(),
                timestamp_utc,
            });
        }
    }
}

/// Counts set bits in a `0x`-prefixed hex string, used to derive
/// `participating_validators` from `sync_committee_bits` without decoding
/// it into a bitvector type.
fn count_hex_bits(hex_str: &str) -> u32 {
    let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    match hex::decode(stripped) {
        Ok(bytes) => bytes.iter().map(|b| b.count_ones()).sum(),
        Err(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use era_consensus::decode_signed_block;
    use era_network_spec::{Fork, mainnet};

    use super::*;

    #[test]
    fn empty_block_list_yields_empty_datasets() {
        let era = normalize_era(&[], &mainnet());
        assert!(era.blocks.is_empty());
        assert!(era.attestations.is_empty());
    }

    #[test]
    fn counts_set_bits_in_hex() {
        assert_eq!(count_hex_bits("0xff"), 8);
        assert_eq!(count_hex_bits("0x00"), 0);
        assert_eq!(count_hex_bits("0x0f"), 4);
    }

    /// Bytes for a minimal Phase0 `SignedBeaconBlock` with no attestations,
    /// deposits, or other variable-length children — same layout as
    /// `era_consensus::block::tests::empty_phase0_block_bytes`.
    fn empty_phase0_block_bytes(slot: u64) -> Vec<u8> {
        const SIGNATURE_SIZE: usize = 96;
        const ENVELOPE_HEADER_SIZE: usize = 4 + SIGNATURE_SIZE;

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
        message.extend_from_slice(&0u64.to_le_bytes());
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&body_offset.to_le_bytes());
        message.extend_from_slice(&body);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(ENVELOPE_HEADER_SIZE as u32).to_le_bytes());
        bytes.extend_from_slice(&[0u8; SIGNATURE_SIZE]);
        bytes.extend_from_slice(&message);
        bytes
    }

    #[test]
    fn one_block_row_per_distinct_slot_with_consistent_timestamps() {
        let spec = mainnet();
        let slots = [100u64, 105, 200];
        let blocks: Vec<_> = slots
            .iter()
            .map(|&slot| decode_signed_block(&empty_phase0_block_bytes(slot), &spec).expect("decodes"))
            .collect();

        let era = normalize_era(&blocks, &spec);

        assert_eq!(era.blocks.len(), slots.len());
        let mut seen_slots: Vec<u64> = era.blocks.iter().map(|row| row.slot).collect();
        seen_slots.sort_unstable();
        assert_eq!(seen_slots, slots);

        for row in &era.blocks {
            let expected = spec.genesis_plus_slot(row.slot);
            assert_eq!(row.timestamp_utc.timestamp() as u64, expected);
            assert!(row.timestamp_utc.timestamp() as u64 >= spec.genesis_time);
        }
    }

    /// Bytes for a minimal Altair `SignedBeaconBlock`: same empty variable
    /// fields as `empty_phase0_block_bytes`, but with the fixed-size
    /// `sync_aggregate` spliced in after the body's fixed prefix, matching
    /// Altair's body schema.
    fn empty_altair_block_bytes(slot: u64) -> Vec<u8> {
        const SIGNATURE_SIZE: usize = 96;
        const ENVELOPE_HEADER_SIZE: usize = 4 + SIGNATURE_SIZE;
        const FIXED_PREFIX_SIZE: usize = 200; // randao_reveal + eth1_data + graffiti
        const SYNC_AGGREGATE_SIZE: usize = 160;

        let body_offset: u32 = 84;
        let body_len = FIXED_PREFIX_SIZE + SYNC_AGGREGATE_SIZE + 5 * 4;
        let offsets = [body_len as u32; 5];

        let mut body = Vec::new();
        body.extend_from_slice(&[0u8; 96]); // randao_reveal
        body.extend_from_slice(&[0u8; 72]); // eth1_data
        body.extend_from_slice(&[0u8; 32]); // graffiti
        body.extend_from_slice(&[0u8; SYNC_AGGREGATE_SIZE]); // sync_aggregate
        for offset in offsets {
            body.extend_from_slice(&offset.to_le_bytes());
        }

        let mut message = Vec::new();
        message.extend_from_slice(&slot.to_le_bytes());
        message.extend_from_slice(&0u64.to_le_bytes());
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&[0u8; 32]);
        message.extend_from_slice(&body_offset.to_le_bytes());
        message.extend_from_slice(&body);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(ENVELOPE_HEADER_SIZE as u32).to_le_bytes());
        bytes.extend_from_slice(&[0u8; SIGNATURE_SIZE]);
        bytes.extend_from_slice(&message);
        bytes
    }

    #[test]
    fn era_straddling_a_fork_boundary_normalizes_each_block_by_its_own_slot() {
        let spec = mainnet();
        let altair_start_slot = spec.altair_epoch * spec.slots_per_epoch;
        let phase0_slot = altair_start_slot - spec.slots_per_epoch;

        let phase0_block = decode_signed_block(&empty_phase0_block_bytes(phase0_slot), &spec)
            .expect("decodes phase0 block");
        let altair_block = decode_signed_block(&empty_altair_block_bytes(altair_start_slot), &spec)
            .expect("decodes altair block");
        assert_eq!(phase0_block.fork, Fork::Phase0);
        assert_eq!(altair_block.fork, Fork::Altair);

        let era = normalize_era(&[phase0_block, altair_block], &spec);

        assert_eq!(era.blocks.len(), 2);
        assert_eq!(era.sync_aggregates.len(), 1);
        assert_eq!(era.sync_aggregates[0].slot, altair_start_slot);
    }

    #[test]
    fn normalizing_the_same_blocks_twice_is_byte_identical() {
        let spec = mainnet();
        let bytes = empty_phase0_block_bytes(100);
        let decoded = decode_signed_block(&bytes, &spec).expect("decodes");
        let blocks = vec![decoded];

        let first = normalize_era(&blocks, &spec);
        let second = normalize_era(&blocks, &spec);

        let first_json = serde_json::to_string(&first.blocks).unwrap();
        let second_json = serde_json::to_string(&second.blocks).unwrap();
        assert_eq!(first_json, second_json);
        assert_eq!(first.blocks.len(), 1);
    }
}
