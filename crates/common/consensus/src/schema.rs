use era_network_spec::Fork;

use crate::types::PayloadShape;

/// Tag for one of the variable-offset fields appended after a block body's
/// fixed prefix. The order here is the on-the-wire offset order: this list
/// *is* the schema, replacing a per-fork subclass chain with a single value
/// a generic decoder can walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyField {
    ProposerSlashings,
    AttesterSlashings,
    Attestations,
    Deposits,
    VoluntaryExits,
    ExecutionPayload,
    BlsToExecutionChanges,
    BlobKzgCommitments,
    ExecutionRequests,
}

/// The full shape of one fork's block body: whether it carries an inline
/// fixed `sync_aggregate`, and the ordered list of variable-offset fields.
#[derive(Debug, Clone)]
pub struct BodySchema {
    pub has_sync_aggregate: bool,
    pub variable_fields: Vec<BodyField>,
}

pub fn body_schema(fork: Fork) -> BodySchema {
    use BodyField::*;

    let mut variable_fields = vec![ProposerSlashings, AttesterSlashings, Attestations, Deposits, VoluntaryExits];
    if fork >= Fork::Bellatrix {
        variable_fields.push(ExecutionPayload);
    }
    if fork >= Fork::Capella {
        variable_fields.push(BlsToExecutionChanges);
    }
    if fork >= Fork::Deneb {
        variable_fields.push(BlobKzgCommitments);
    }
    if fork >= Fork::Electra {
        variable_fields.push(ExecutionRequests);
    }

    BodySchema {
        has_sync_aggregate: fork >= Fork::Altair,
        variable_fields,
    }
}

pub fn payload_shape(fork: Fork) -> PayloadShape {
    PayloadShape {
        has_withdrawals: fork >= Fork::Capella,
        has_blob_gas: fork >= Fork::Deneb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORKS_OLDEST_FIRST: [Fork; 6] = [
        Fork::Phase0,
        Fork::Altair,
        Fork::Bellatrix,
        Fork::Capella,
        Fork::Deneb,
        Fork::Electra,
    ];

    /// Every fork's variable-field set must be a superset of every
    /// predecessor's: the inheritance chain being flattened into data may
    /// never drop a field a prior fork required.
    #[test]
    fn each_fork_schema_is_a_superset_of_every_predecessor() {
        for (i, &fork) in FORKS_OLDEST_FIRST.iter().enumerate() {
            let fields = body_schema(fork).variable_fields;
            for &predecessor in &FORKS_OLDEST_FIRST[..i] {
                for field in body_schema(predecessor).variable_fields {
                    assert!(
                        fields.contains(&field),
                        "{fork:?} schema dropped a field present in {predecessor:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn sync_aggregate_present_from_altair_onward() {
        assert!(!body_schema(Fork::Phase0).has_sync_aggregate);
        for &fork in &FORKS_OLDEST_FIRST[1..] {
            assert!(body_schema(fork).has_sync_aggregate);
        }
    }

    #[test]
    fn execution_payload_present_from_bellatrix_onward() {
        assert!(!body_schema(Fork::Phase0).variable_fields.contains(&BodyField::ExecutionPayload));
        assert!(!body_schema(Fork::Altair).variable_fields.contains(&BodyField::ExecutionPayload));
        for &fork in &FORKS_OLDEST_FIRST[2..] {
            assert!(body_schema(fork).variable_fields.contains(&BodyField::ExecutionPayload));
        }
    }

    #[test]
    fn withdrawals_and_blob_gas_follow_their_own_forks() {
        assert!(!payload_shape(Fork::Bellatrix).has_withdrawals);
        assert!(payload_shape(Fork::Capella).has_withdrawals);
        assert!(!payload_shape(Fork::Capella).has_blob_gas);
        assert!(payload_shape(Fork::Deneb).has_blob_gas);
    }
}
