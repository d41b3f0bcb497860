use era_consensus::{DecodedBlock, decode_signed_block};
use era_network_spec::NetworkSpec;
use era_ssz::{read_u32_le, read_u64_le};
use tracing::warn;

use crate::{compression::decompress_snappy_framed, error::ReaderError};

const VERSION_HEADER_SIZE: usize = 8;
const RECORD_HEADER_SIZE: usize = 8;

/// Record type tags as they appear in an era file's 2-byte header field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordType {
    CompressedBlock,
    CompressedState,
    SlotIndex,
    Other(u16),
}

impl RecordType {
    fn from_tag(tag: u16) -> Self {
        match tag {
            0x0100 => RecordType::CompressedBlock,
            0x0200 => RecordType::CompressedState,
            0x6932 => RecordType::SlotIndex,
            other => RecordType::Other(other),
        }
    }
}

/// One framed record from an era file. Block payloads are kept compressed
/// (`data`) — decompression happens once, downstream, rather than twice.
#[derive(Debug, Clone)]
pub struct EraRecord {
    pub record_type: RecordType,
    pub slot: u64,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct EraStatistics {
    pub total_records: usize,
    pub block_records: usize,
    pub state_records: usize,
    pub index_records: usize,
    pub min_slot: Option<u64>,
    pub max_slot: Option<u64>,
    pub fallback_parse_count: u64,
}

/// Reads the framed record structure of an era file.
pub struct EraReader<'a> {
    bytes: &'a [u8],
}

impl<'a> EraReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Iterates every record in the file, skipping the 8-byte version
    /// header. Block records have their slot peeked (by decompressing just
    /// far enough to read it) so callers can sort/filter without a second
    /// decompression pass.
    pub fn read_all_records(&self) -> Result<Vec<EraRecord>, ReaderError> {
        if self.bytes.len() < VERSION_HEADER_SIZE {
            return Err(ReaderError::MissingVersionHeader);
        }

        let mut records = Vec::new();
        let mut pos = VERSION_HEADER_SIZE;

        while pos < self.bytes.len() {
            if pos + RECORD_HEADER_SIZE > self.bytes.len() {
                return Err(ReaderError::TruncatedRecordHeader { offset: pos });
            }
            let record_type = RecordType::from_tag(u16::from_le_bytes([
                self.bytes[pos],
                self.bytes[pos + 1],
            ]));
            let length = read_u32_le(self.bytes, pos + 2) as usize;
            pos += RECORD_HEADER_SIZE;

            if pos + length > self.bytes.len() {
                return Err(ReaderError::TruncatedRecordPayload {
                    offset: pos,
                    need: length,
                });
            }
            let payload = &self.bytes[pos..pos + length];
            pos += length;

            let slot = if record_type == RecordType::CompressedBlock {
                peek_block_slot(payload).unwrap_or(0)
            } else {
                0
            };

            records.push(EraRecord {
                record_type,
                slot,
                data: payload.to_vec(),
            });
        }

        Ok(records)
    }

    /// Block records only, sorted ascending by slot.
    pub fn block_records(&self) -> Result<Vec<EraRecord>, ReaderError> {
        let mut blocks: Vec<EraRecord> = self
            .read_all_records()?
            .into_iter()
            .filter(|record| record.record_type == RecordType::CompressedBlock)
            .collect();
        blocks.sort_by_key(|record| record.slot);
        Ok(blocks)
    }

    pub fn statistics(&self) -> Result<EraStatistics, ReaderError> {
        era_ssz::reset_fallback_count();
        let records = self.read_all_records()?;
        let mut stats = EraStatistics::default();
        stats.total_records = records.len();
        for record in &records {
            match record.record_type {
                RecordType::CompressedBlock => {
                    stats.block_records += 1;
                    stats.min_slot = Some(stats.min_slot.map_or(record.slot, |m| m.min(record.slot)));
                    stats.max_slot = Some(stats.max_slot.map_or(record.slot, |m| m.max(record.slot)));
                }
                RecordType::CompressedState => stats.state_records += 1,
                RecordType::SlotIndex => stats.index_records += 1,
                RecordType::Other(_) => {}
            }
        }
        stats.fallback_parse_count = era_ssz::fallback_count();
        Ok(stats)
    }
}

impl EraRecord {
    /// Decompresses and fully decodes a block record into its fork-aware
    /// block tree. Returns `None` for non-block records or malformed
    /// blocks, neither of which should abort the caller's era loop.
    pub fn decode_block(&self, network_spec: &NetworkSpec) -> Option<DecodedBlock> {
        if self.record_type != RecordType::CompressedBlock {
            return None;
        }
        let decompressed = match decompress_snappy_framed(&self.data) {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(slot = self.slot, %err, "dropping block record: snappy decompression failed");
                return None;
            }
        };
        let decoded = decode_signed_block(&decompressed, network_spec);
        if decoded.is_none() {
            warn!(slot = self.slot, "dropping block record: body decode failed");
        }
        decoded
    }
}

/// Decompresses a block payload just far enough to read its slot, which sits
/// at a fixed offset relative to the block envelope's `message_offset`.
fn peek_block_slot(compressed: &[u8]) -> Option<u64> {
    let decompressed = decompress_snappy_framed(compressed).ok()?;
    let message_offset = read_u32_le(&decompressed, 0) as usize;
    if message_offset > decompressed.len() {
        return None;
    }
    let message = &decompressed[message_offset..];
    if message.len() < 8 {
        return None;
    }
    Some(read_u64_le(message, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn era_with_one_uncompressed_wrapped_record() -> Vec<u8> {
        // A record whose payload we don't need to decompress: a slot-index
        // record, which carries slot=0 unconditionally.
        let mut bytes = vec![0u8; VERSION_HEADER_SIZE];
        let tag: u16 = 0x6932;
        bytes.extend_from_slice(&tag.to_le_bytes());
        let payload = b"index-payload";
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&[0u8, 0u8]); // reserved
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn reads_a_single_index_record() {
        let bytes = era_with_one_uncompressed_wrapped_record();
        let reader = EraReader::new(&bytes);
        let records = reader.read_all_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, RecordType::SlotIndex);
        assert_eq!(records[0].slot, 0);
    }

    #[test]
    fn too_short_file_fails() {
        let reader = EraReader::new(&[0u8; 4]);
        assert!(reader.read_all_records().is_err());
    }

    #[test]
    fn statistics_count_records_by_type() {
        let bytes = era_with_one_uncompressed_wrapped_record();
        let reader = EraReader::new(&bytes);
        let stats = reader.statistics().unwrap();
        assert_eq!(stats.total_records, 1);
        assert_eq!(stats.index_records, 1);
        assert_eq!(stats.block_records, 0);
    }
}
