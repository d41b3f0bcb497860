/// Adaptive insert batch size by dataset name. Attestations are the
/// highest-cardinality dataset per block and get a smaller batch;
/// transactions and withdrawals sit in the middle; everything else uses
/// the largest batch.
pub fn batch_size_for(dataset: &str) -> usize {
    match dataset {
        "attestations" => 3_000,
        "transactions" | "withdrawals" => 8_000,
        _ => 15_000,
    }
}

/// Row-count threshold above which a dataset is inserted via the
/// streaming (multi-batch) path rather than a single `insert`.
pub fn streaming_threshold(dataset: &str) -> usize {
    match dataset {
        "attestations" => 10_000,
        _ => 15_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attestations_get_the_smallest_batch() {
        assert_eq!(batch_size_for("attestations"), 3_000);
        assert_eq!(batch_size_for("transactions"), 8_000);
        assert_eq!(batch_size_for("blocks"), 15_000);
    }

    #[test]
    fn attestations_stream_at_a_lower_threshold() {
        assert_eq!(streaming_threshold("attestations"), 10_000);
        assert_eq!(streaming_threshold("blocks"), 15_000);
    }
}
