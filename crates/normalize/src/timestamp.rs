use chrono::{DateTime, Utc};
use era_consensus::types::ExecutionPayload;
use era_network_spec::NetworkSpec;

/// Computes the single canonical UTC instant for a block: its execution
/// payload's own timestamp when present and non-zero, otherwise a
/// genesis-plus-slot estimate. Every child row of the block inherits this
/// same value — there is exactly one timestamp per block, computed once.
pub fn canonical_timestamp(
    payload: Option<&ExecutionPayload>,
    slot: u64,
    spec: &NetworkSpec,
) -> DateTime<Utc> {
    if let Some(payload) = payload {
        if payload.timestamp > 0 {
            if let Some(ts) = DateTime::from_timestamp(payload.timestamp as i64, 0) {
                return ts;
            }
        }
    }
    genesis_fallback(slot, spec)
}

fn genesis_fallback(slot: u64, spec: &NetworkSpec) -> DateTime<Utc> {
    DateTime::from_timestamp(spec.genesis_plus_slot(slot) as i64, 0)
        .unwrap_or_else(|| DateTime::from_timestamp(0, 0).expect("epoch is representable"))
}

#[cfg(test)]
mod tests {
    use era_network_spec::mainnet;

    use super::*;

    #[test]
    fn uses_payload_timestamp_when_present() {
        let spec = mainnet();
        let payload = sample_payload(1_700_000_000);
        let ts = canonical_timestamp(Some(&payload), 100, &spec);
        assert_eq!(ts.timestamp(), 1_700_000_000);
    }

    #[test]
    fn falls_back_to_genesis_when_payload_timestamp_is_zero() {
        let spec = mainnet();
        let payload = sample_payload(0);
        let ts = canonical_timestamp(Some(&payload), 10, &spec);
        assert_eq!(ts.timestamp() as u64, spec.genesis_plus_slot(10));
    }

    #[test]
    fn falls_back_to_genesis_without_payload() {
        let spec = mainnet();
        let ts = canonical_timestamp(None, 10, &spec);
        assert_eq!(ts.timestamp() as u64, spec.genesis_plus_slot(10));
    }

    fn sample_payload(timestamp: u64) -> ExecutionPayload {
        ExecutionPayload {
            parent_hash: String::new(),
            fee_recipient: String::new(),
            state_root: String::new(),
            receipts_root: String::new(),
            logs_bloom: String::new(),
            prev_randao: String::new(),
            block_number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp,
            extra_data: String::new(),
            base_fee_per_gas: "0".to_string(),
            block_hash: String::new(),
            transactions: Vec::new(),
            withdrawals: Vec::new(),
            blob_gas_used: None,
            excess_blob_gas: None,
        }
    }
}
