use era_network_spec::Fork;
use era_ssz::{ItemParser, parse_ssz_list, read_u32_le};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    schema::{BodyField, body_schema, payload_shape},
    types::{
        Attestation, AttesterSlashing, Deposit, Eth1Data, ExecutionPayload, ExecutionRequests,
        ProposerSlashing, SignedBlsToExecutionChange, SignedVoluntaryExit, SyncAggregate,
    },
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BeaconBlockBody {
    pub randao_reveal: String,
    pub eth1_data: Eth1Data,
    pub graffiti: String,
    pub proposer_slashings: Vec<ProposerSlashing>,
    pub attester_slashings: Vec<AttesterSlashing>,
    pub attestations: Vec<Attestation>,
    pub deposits: Vec<Deposit>,
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
    pub sync_aggregate: Option<SyncAggregate>,
    pub execution_payload: Option<ExecutionPayload>,
    pub bls_to_execution_changes: Vec<SignedBlsToExecutionChange>,
    pub blob_kzg_commitments: Vec<String>,
    pub execution_requests: Option<ExecutionRequests>,
}

const FIXED_PREFIX_SIZE: usize = 96 + Eth1Data::SSZ_SIZE + 32;

/// Decodes a block body according to the schema for `fork`. A single
/// malformed field is dropped (defaulted to empty/None), matching the
/// "one bad block never takes down the era" contract — only a body too
/// short to hold its own offset table fails outright.
pub fn decode_body(fork: Fork, body: &[u8]) -> Option<BeaconBlockBody> {
    let schema = body_schema(fork);

    if body.len() < FIXED_PREFIX_SIZE {
        return None;
    }

    let randao_reveal = crate::hexutil::to_hex(&body[0..96]);
    let eth1_data = Eth1Data::parse(&body[96..96 + Eth1Data::SSZ_SIZE]).unwrap_or_default();
    let graffiti_start = 96 + Eth1Data::SSZ_SIZE;
    let graffiti = crate::hexutil::to_hex(&body[graffiti_start..graffiti_start + 32]);

    let mut cursor = FIXED_PREFIX_SIZE;
    let sync_aggregate = if schema.has_sync_aggregate {
        if body.len() < cursor + SyncAggregate::SSZ_SIZE {
            return None;
        }
        let parsed = SyncAggregate::parse(&body[cursor..cursor + SyncAggregate::SSZ_SIZE]);
        cursor += SyncAggregate::SSZ_SIZE;
        parsed
    } else {
        None
    };

    let num_offsets = schema.variable_fields.len();
    if body.len() < cursor + num_offsets * 4 {
        return None;
    }
    let mut offsets = Vec::with_capacity(num_offsets);
    for i in 0..num_offsets {
        let offset = read_u32_le(body, cursor + i * 4) as usize;
        offsets.push(offset);
    }
    for &offset in &offsets {
        if offset > body.len() {
            warn!(fork = %fork, offset, "block body variable-field offset out of bounds");
            return None;
        }
    }
    let end_of = |start: usize| -> usize {
        offsets
            .iter()
            .copied()
            .filter(|&o| o > start)
            .min()
            .unwrap_or(body.len())
    };

    let mut result = BeaconBlockBody {
        randao_reveal,
        eth1_data,
        graffiti,
        sync_aggregate,
        ..Default::default()
    };

    for (field, &start) in schema.variable_fields.iter().zip(offsets.iter()) {
        let span = &body[start..end_of(start)];
        match field {
            BodyField::ProposerSlashings => {
                let parser = ItemParser::fixed(ProposerSlashing::SSZ_SIZE, ProposerSlashing::parse);
                result.proposer_slashings = parse_ssz_list(span, &parser, "proposer_slashings");
            }
            BodyField::AttesterSlashings => {
                let parser = ItemParser::variable(AttesterSlashing::parse);
                result.attester_slashings = parse_ssz_list(span, &parser, "attester_slashings");
            }
            BodyField::Attestations => {
                let parser = ItemParser::variable(Attestation::parse);
                result.attestations = parse_ssz_list(span, &parser, "attestations");
            }
            BodyField::Deposits => {
                let parser = ItemParser::fixed(Deposit::SSZ_SIZE, Deposit::parse);
                result.deposits = parse_ssz_list(span, &parser, "deposits");
            }
            BodyField::VoluntaryExits => {
                let parser =
                    ItemParser::fixed(SignedVoluntaryExit::SSZ_SIZE, SignedVoluntaryExit::parse);
                result.voluntary_exits = parse_ssz_list(span, &parser, "voluntary_exits");
            }
            BodyField::ExecutionPayload => {
                result.execution_payload = ExecutionPayload::parse(span, payload_shape(fork));
            }
            BodyField::BlsToExecutionChanges => {
                let parser = ItemParser::fixed(
                    SignedBlsToExecutionChange::SSZ_SIZE,
                    SignedBlsToExecutionChange::parse,
                );
                result.bls_to_execution_changes =
                    parse_ssz_list(span, &parser, "bls_to_execution_changes");
            }
            BodyField::BlobKzgCommitments => {
                let parser = ItemParser::fixed(48, |bytes: &[u8]| {
                    Some(crate::hexutil::to_hex(bytes))
                });
                result.blob_kzg_commitments = parse_ssz_list(span, &parser, "blob_kzg_commitments");
            }
            BodyField::ExecutionRequests => {
                result.execution_requests = ExecutionRequests::parse(span);
            }
        }
    }

    Some(result)
}
