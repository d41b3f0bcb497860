use std::path::Path;

use anyhow::{Context, bail};
use era_consensus::DecodedBlock;
use era_network_spec::{NetworkSpec, spec_for};
use era_normalize::{NormalizedEra, normalize_era};
use era_reader::{EraMetadata, EraReader, EraStatistics};

/// One local era file, read and ready to decode. Holds the raw bytes so
/// `EraReader` (which borrows) can live alongside them.
pub struct LoadedEra {
    pub metadata: EraMetadata,
    pub spec: NetworkSpec,
    bytes: Vec<u8>,
}

impl LoadedEra {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("{} has no valid filename", path.display()))?;
        let metadata = EraMetadata::from_filename(filename)
            .with_context(|| format!("parsing era metadata from {filename}"))?;
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let spec = spec_for(metadata.network);
        Ok(Self { metadata, spec, bytes })
    }

    pub fn reader(&self) -> EraReader<'_> {
        EraReader::new(&self.bytes)
    }

    pub fn statistics(&self) -> anyhow::Result<EraStatistics> {
        Ok(self.reader().statistics()?)
    }

    /// Decodes every block record in slot order. A block that fails to
    /// decode (corrupt framing, truncated SSZ) is dropped, not propagated —
    /// matching the "one bad block doesn't abort the era" contract.
    pub fn decode_blocks(&self) -> anyhow::Result<Vec<DecodedBlock>> {
        let records = self.reader().block_records()?;
        let decoded: Vec<DecodedBlock> = records
            .iter()
            .filter_map(|record| record.decode_block(&self.spec))
            .collect();
        Ok(decoded)
    }

    pub fn decode_block_at_slot(&self, slot: u64) -> anyhow::Result<Option<DecodedBlock>> {
        let records = self.reader().block_records()?;
        let Some(record) = records.into_iter().find(|record| record.slot == slot) else {
            return Ok(None);
        };
        Ok(record.decode_block(&self.spec))
    }

    pub fn normalize(&self) -> anyhow::Result<NormalizedEra> {
        let blocks = self.decode_blocks()?;
        if blocks.is_empty() {
            bail!(
                "era file {} contains no decodable blocks",
                self.metadata.era_number
            );
        }
        Ok(normalize_era(&blocks, &self.spec))
    }
}

/// A stable identifier for the worker claiming datasets in the state store —
/// process id is sufficient since the state store's claim protocol is
/// advisory, not a hard mutex, and collisions only cost a retried claim.
pub fn worker_id() -> String {
    format!("era-parser-{}", std::process::id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_id_is_stable_within_a_process() {
        assert_eq!(worker_id(), worker_id());
        assert!(worker_id().starts_with("era-parser-"));
    }

    #[test]
    fn open_rejects_unparseable_filename() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-an-era-file.bin");
        std::fs::write(&path, b"junk").unwrap();
        assert!(LoadedEra::open(&path).is_err());
    }
}
